pub mod layout;
pub mod raster;
pub mod svg;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use image::ImageFormat;
use serde::Deserialize;
use tracing::{info, warn};

use crate::card::{CardContent, CardOptions};
use crate::error::{Error, Result};
use crate::provisioning::ProvisioningString;
use crate::qr::QrPayload;

pub use raster::render_png;
pub use svg::render_svg;

/// Side of the QR-only image written when the full card cannot be drawn.
const FALLBACK_QR_SIDE: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// Raster card, the "download" output.
    #[default]
    Png,
    /// Vector card sized for printing.
    Svg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(Error::UnknownFormat(raw.to_string())),
        }
    }
}

/// What actually ended up on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exported {
    Card,
    /// The card could not be drawn and only the QR code was written.
    QrOnly,
}

/// `wifi-<ssid>.<ext>`, with characters that are unsafe in file names replaced.
pub fn default_file_name(ssid: &str, format: ExportFormat) -> String {
    let safe: String = ssid
        .chars()
        .map(|ch| match ch {
            '/' | '\\' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();
    let safe = match safe.trim() {
        "" | "." | ".." => "network".to_string(),
        trimmed => trimmed.to_string(),
    };
    format!("wifi-{safe}.{}", format.extension())
}

pub fn export_card(
    content: &CardContent,
    options: &CardOptions,
    format: ExportFormat,
    path: &Path,
) -> Result<Exported> {
    ensure_parent(path)?;
    match format {
        ExportFormat::Png => export_png(content, options, path),
        ExportFormat::Svg => {
            let svg = render_svg(content, options)?;
            fs::write(path, svg)?;
            info!(path = %path.display(), "wrote SVG card");
            Ok(Exported::Card)
        }
    }
}

/// Writes the PNG card, falling back to the bare QR code if drawing fails.
pub fn export_png(content: &CardContent, options: &CardOptions, path: &Path) -> Result<Exported> {
    ensure_parent(path)?;
    let rendered = raster::load_font().and_then(|font| render_png(content, options, &font));
    match rendered {
        Ok(image) => {
            image.save_with_format(path, ImageFormat::Png)?;
            info!(
                path = %path.display(),
                width = image.width(),
                height = image.height(),
                "wrote PNG card"
            );
            Ok(Exported::Card)
        }
        Err(err) => {
            warn!(error = %err, "card render failed, writing QR code only");
            write_qr_png(&content.payload, FALLBACK_QR_SIDE, path).map_err(|fallback| {
                warn!(error = %fallback, "QR fallback failed");
                fallback
            })?;
            Ok(Exported::QrOnly)
        }
    }
}

pub fn write_qr_png(payload: &ProvisioningString, min_side: u32, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let image = QrPayload::new(payload)?.to_luma(min_side);
    image.save_with_format(path, ImageFormat::Png)?;
    info!(path = %path.display(), side = image.width(), "wrote QR code");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(Error::from)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_replaces_path_separators() {
        assert_eq!(default_file_name("HomeNet", ExportFormat::Png), "wifi-HomeNet.png");
        assert_eq!(default_file_name("a/b\\c", ExportFormat::Svg), "wifi-a_b_c.svg");
        assert_eq!(default_file_name("..", ExportFormat::Png), "wifi-network.png");
        assert_eq!(default_file_name("tab\there", ExportFormat::Png), "wifi-tab_here.png");
    }

    #[test]
    fn unknown_format_is_a_typed_error() {
        let err = "jpeg".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(ref raw) if raw == "jpeg"));
        assert_eq!(" SVG ".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
    }

    #[test]
    fn format_from_path_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("card.SVG")), Some(ExportFormat::Svg));
        assert_eq!(ExportFormat::from_path(Path::new("card.png")), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_path(Path::new("card")), None);
    }
}
