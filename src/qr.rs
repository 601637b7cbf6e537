use image::{GrayImage, Luma};
use qrcode::render::{svg, unicode};
use qrcode::types::Color;
use qrcode::{EcLevel, QrCode};

use crate::error::Result;
use crate::provisioning::ProvisioningString;

/// Modules of blank border scanners expect around the symbol.
pub const QUIET_ZONE: usize = 4;

/// A provisioning string encoded as a QR symbol.
pub struct QrPayload {
    code: QrCode,
}

impl QrPayload {
    pub fn new(payload: &ProvisioningString) -> Result<Self> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)?;
        Ok(Self { code })
    }

    /// Modules per side, without the quiet zone.
    pub fn width(&self) -> usize {
        self.code.width()
    }

    /// Row-major dark flags, without the quiet zone.
    pub fn modules(&self) -> Vec<bool> {
        self.code
            .to_colors()
            .into_iter()
            .map(|color| matches!(color, Color::Dark))
            .collect()
    }

    /// Black on white with quiet zone, at least `min_side` pixels square.
    pub fn to_luma(&self, min_side: u32) -> GrayImage {
        self.code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .min_dimensions(min_side, min_side)
            .build()
    }

    /// Black on white `<svg>` element with quiet zone, one user unit per module.
    pub fn to_svg(&self) -> String {
        let document = self
            .code
            .render::<svg::Color>()
            .quiet_zone(true)
            .module_dimensions(1, 1)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();
        // drop the XML declaration so the symbol can be nested in a card
        match document.find("<svg") {
            Some(start) => document[start..].to_string(),
            None => document,
        }
    }

    pub fn to_terminal(&self) -> String {
        self.code
            .render::<unicode::Dense1x2>()
            .quiet_zone(true)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{Encryption, WifiCredential};
    use crate::provisioning::encode;

    fn payload() -> QrPayload {
        let cred = WifiCredential::new("HomeNet", "secret123", Encryption::Wpa);
        QrPayload::new(&encode(&cred)).expect("encode qr")
    }

    #[test]
    fn modules_cover_the_whole_symbol() {
        let qr = payload();
        assert_eq!(qr.modules().len(), qr.width() * qr.width());
        assert!(qr.modules().iter().any(|dark| *dark));
    }

    #[test]
    fn luma_respects_minimum_size() {
        let img = payload().to_luma(256);
        assert!(img.width() >= 256);
        assert_eq!(img.width(), img.height());
        // quiet zone corner is light
        assert_eq!(img.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn svg_symbol_is_embeddable_and_unit_scaled() {
        let qr = payload();
        let markup = qr.to_svg();
        let total = qr.width() + 2 * QUIET_ZONE;
        assert!(markup.starts_with("<svg"));
        assert!(!markup.contains("<?xml"));
        assert!(markup.contains(&format!(r#"viewBox="0 0 {total} {total}""#)));
        assert!(markup.contains(r##"fill="#000000""##));
        assert!(markup.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn terminal_rendering_packs_two_rows_per_line() {
        let qr = payload();
        let text = qr.to_terminal();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() >= (qr.width() + 2 * QUIET_ZONE) / 2);
        assert!(lines.len() < qr.width() + 2 * QUIET_ZONE);
        let first = lines[0].chars().count();
        assert!(lines.iter().all(|line| line.chars().count() == first));
    }
}
