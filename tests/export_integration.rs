use std::fs;

use tempfile::tempdir;
use wifi_card::card::{CardContent, CardOptions, Orientation, Template};
use wifi_card::export::{self, ExportFormat, Exported};
use wifi_card::{Encryption, WifiCredential, encode};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

fn content(options: &CardOptions) -> CardContent {
    let cred = WifiCredential::new("Office;Net", "p<w>&", Encryption::Wep).hidden(true);
    CardContent::build(&cred, options)
}

#[test]
fn svg_card_is_sized_in_inches() {
    let options = CardOptions::default();
    let svg = export::render_svg(&content(&options), &options).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"width="4.5in" height="2.5in""#));
    assert!(svg.contains(r#"viewBox="0 0 1350 750""#));
    assert!(!svg.contains("rotate(90)"));
    assert!(!svg.contains("<?xml"));
    assert!(svg.contains(r#"shape-rendering="crispEdges""#));
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn portrait_svg_swaps_dimensions_and_rotates() {
    let options = CardOptions {
        orientation: Orientation::Portrait,
        ..Default::default()
    };
    let svg = export::render_svg(&content(&options), &options).unwrap();
    assert!(svg.contains(r#"width="2.5in" height="4.5in""#));
    assert!(svg.contains("translate(750 0) rotate(90)"));
}

#[test]
fn svg_escapes_card_text() {
    let options = CardOptions {
        show_password: true,
        show_ssid: Some(true),
        template: Template::Modern,
        ..Default::default()
    };
    let svg = export::render_svg(&content(&options), &options).unwrap();
    assert!(svg.contains("p&lt;w&gt;&amp;"));
    assert!(!svg.contains("p<w>&"));
    assert!(svg.contains("Office;Net"));
    assert!(svg.contains("(hidden)"));
}

#[test]
fn svg_replaces_control_characters_in_names() {
    let options = CardOptions::default();
    let cred = WifiCredential::new("Home\u{1}Net", "pw", Encryption::Wpa);
    let svg = export::render_svg(&CardContent::build(&cred, &options), &options).unwrap();
    assert!(svg.contains("Home_Net"));
    assert!(!svg.contains('\u{1}'));
}

#[test]
fn export_card_writes_svg_into_new_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("card.svg");
    let options = CardOptions::default();
    let outcome =
        export::export_card(&content(&options), &options, ExportFormat::Svg, &path).unwrap();
    assert_eq!(outcome, Exported::Card);
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("<path fill=\"#000000\""));
}

#[test]
fn export_png_writes_a_png_either_way() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wifi-card.png");
    let options = CardOptions {
        orientation: Orientation::Portrait,
        ..Default::default()
    };
    let outcome = export::export_png(&content(&options), &options, &path).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(PNG_SIGNATURE));

    let (w, h) = image::image_dimensions(&path).unwrap();
    match outcome {
        Exported::Card => assert_eq!((w, h), (750, 1350)),
        // headless machines without fonts only get the QR code
        Exported::QrOnly => assert_eq!(w, h),
    }
}

#[test]
fn qr_png_honors_minimum_side() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("qr.png");
    let cred = WifiCredential::new("HomeNet", "secret123", Encryption::Wpa);
    export::write_qr_png(&encode(&cred), 300, &path).unwrap();
    let (w, h) = image::image_dimensions(&path).unwrap();
    assert_eq!(w, h);
    assert!(w >= 300);
}

#[test]
fn full_png_render_when_a_font_is_available() {
    let Ok(font) = export::raster::load_font() else {
        return;
    };
    let options = CardOptions::default();
    let image = export::render_png(&content(&options), &options, &font).unwrap();
    assert_eq!((image.width(), image.height()), (1350, 750));
    // rounded corner stays transparent, the card body is opaque
    assert_eq!(image.get_pixel(0, 0)[3], 0);
    assert_eq!(image.get_pixel(675, 375)[3], 255);
}
