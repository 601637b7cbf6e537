use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::card::CardOptions;
use crate::credential::WifiCredential;
use crate::export::ExportFormat;

/// Settings read from the optional YAML config file. Every key is optional.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub network: WifiCredential,
    pub card: CardOptions,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default = "default_qr_size")]
    pub qr_size: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: ExportFormat::default(),
            qr_size: default_qr_size(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let cfg: Config = serde_yaml::from_slice(&data)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        Ok(cfg)
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_qr_size() -> u32 {
    512
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Orientation, Template};
    use crate::color::Rgb;
    use crate::credential::Encryption;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").expect("parse config");
        assert_eq!(cfg.network.encryption, Encryption::Wpa);
        assert!(!cfg.network.hidden);
        assert_eq!(cfg.card.template, Template::Business);
        assert_eq!(cfg.card.orientation, Orientation::Landscape);
        assert_eq!(cfg.output.dir, PathBuf::from("."));
        assert_eq!(cfg.output.qr_size, 512);
        assert_eq!(cfg.output.format, ExportFormat::Png);
    }

    #[test]
    fn parses_kebab_case_card_section() {
        let cfg: Config = serde_yaml::from_str(
            r##"
network:
  ssid: "Office;Net"
  password: "p:w"
  encryption: wep
  hidden: true
card:
  template: modern
  orientation: portrait
  colors:
    primary: "#112233"
  show-password: true
  show-ssid: false
  additional-info: For guests only
  expires: 2027-03-05
output:
  dir: /tmp/cards
  format: svg
  qr-size: 800
"##,
        )
        .expect("parse config");
        assert_eq!(cfg.network.ssid, "Office;Net");
        assert_eq!(cfg.network.encryption, Encryption::Wep);
        assert!(cfg.network.hidden);
        assert_eq!(cfg.card.template, Template::Modern);
        assert_eq!(cfg.card.orientation, Orientation::Portrait);
        let colors = cfg.card.colors();
        assert_eq!(colors.primary, Rgb([0x11, 0x22, 0x33]));
        // missing secondary falls back to the modern palette
        assert_eq!(colors.secondary, Rgb::from_hex(0xeef2ff));
        assert!(cfg.card.show_password);
        assert_eq!(cfg.card.show_ssid, Some(false));
        assert_eq!(cfg.card.additional_info.as_deref(), Some("For guests only"));
        assert_eq!(
            cfg.card.expires,
            chrono::NaiveDate::from_ymd_opt(2027, 3, 5)
        );
        assert_eq!(cfg.output.format, ExportFormat::Svg);
        assert_eq!(cfg.output.qr_size, 800);
    }

    #[test]
    fn rejects_unknown_encryption() {
        let err = serde_yaml::from_str::<Config>("network:\n  encryption: WPA-EAP\n").unwrap_err();
        assert!(err.to_string().contains("WPA-EAP"));
    }
}
