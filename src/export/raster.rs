use std::fs;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use fontdb::{Database, Family, Query, Source};
use image::{Rgba, RgbaImage, imageops};
use tracing::debug;

use super::layout::{self, Anchor, CARD_HEIGHT, CARD_WIDTH, Element, TextMeasure, TextSpan};
use crate::card::{CardContent, CardOptions, Orientation};
use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::qr::{QUIET_ZONE, QrPayload};

/// Finds a sans-serif system font, preferring common UI faces.
pub fn load_font() -> Result<FontArc> {
    let mut db = Database::new();
    db.load_system_fonts();

    let preferred_families = [
        Family::Name("Inter"),
        Family::Name("Noto Sans"),
        Family::Name("DejaVu Sans"),
        Family::Name("Liberation Sans"),
        Family::SansSerif,
    ];

    for family in preferred_families {
        if let Some(id) = db.query(&Query {
            families: &[family],
            ..Default::default()
        }) && let Some(font) = load_face(&db, id)?
        {
            debug!(family = ?family, "loaded card font");
            return Ok(font);
        }
    }

    for face in db.faces() {
        if let Some(font) = load_face(&db, face.id)? {
            return Ok(font);
        }
    }

    Err(Error::Font("no usable system font found".to_string()))
}

fn load_face(db: &Database, id: fontdb::ID) -> Result<Option<FontArc>> {
    let face = db
        .face(id)
        .ok_or_else(|| Error::Font("missing font face in database".to_string()))?;
    // Unreadable files, collections and odd formats are skipped rather than failing the search.
    Ok(read_source(&face.source).and_then(|data| FontArc::try_from_vec(data).ok()))
}

fn read_source(source: &Source) -> Option<Vec<u8>> {
    match source {
        Source::Binary(data) => Some(data.as_ref().as_ref().to_vec()),
        Source::File(path) => match fs::read(path) {
            Ok(data) => Some(data),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping unreadable font file");
                None
            }
        },
        Source::SharedFile(_, data) => Some(data.as_ref().as_ref().to_vec()),
    }
}

pub struct FontMeasure<'a>(pub &'a FontArc);

impl TextMeasure for FontMeasure<'_> {
    fn measure(&self, text: &str, size: f32) -> f32 {
        measure_text(self.0, text, PxScale::from(size))
    }
}

fn measure_text(font: &FontArc, text: &str, scale: PxScale) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Rasterizes the full card, rotated for portrait orientation.
pub fn render_png(
    content: &CardContent,
    options: &CardOptions,
    font: &FontArc,
) -> Result<RgbaImage> {
    let qr = QrPayload::new(&content.payload)?;
    let elements = layout::layout(content, options.colors(), &FontMeasure(font));
    let mut canvas = RgbaImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, Rgba([0, 0, 0, 0]));
    for element in &elements {
        draw_element(&mut canvas, element, font, &qr);
    }
    Ok(match options.orientation {
        Orientation::Landscape => canvas,
        Orientation::Portrait => imageops::rotate90(&canvas),
    })
}

fn draw_element(canvas: &mut RgbaImage, element: &Element, font: &FontArc, qr: &QrPayload) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    match element {
        Element::Background {
            gradient,
            radius,
            border,
            border_width,
        } => {
            for y in 0..canvas.height() {
                for x in 0..canvas.width() {
                    let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                    let dist = rounded_rect_distance(px, py, 0.0, 0.0, w, h, *radius);
                    let coverage = (0.5 - dist).clamp(0.0, 1.0);
                    if coverage <= 0.0 {
                        continue;
                    }
                    let color = if dist > -border_width {
                        *border
                    } else {
                        gradient.at(px / w, py / h)
                    };
                    blend_pixel(canvas, x, y, color, coverage);
                }
            }
        }
        Element::RoundedRect {
            x,
            y,
            w: rw,
            h: rh,
            radius,
            fill,
            stroke,
        } => {
            for (cx, cy) in bounds(*x, *y, *rw, *rh, w, h) {
                let (px, py) = (cx as f32 + 0.5, cy as f32 + 0.5);
                let dist = rounded_rect_distance(px, py, *x, *y, *rw, *rh, *radius);
                let coverage = (0.5 - dist).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let color = match stroke {
                    Some(stroke) if dist > -2.0 => *stroke,
                    _ => *fill,
                };
                blend_pixel(canvas, cx, cy, color, coverage);
            }
        }
        Element::Circle { cx, cy, r, fill } => {
            for (x, y) in bounds(cx - r, cy - r, 2.0 * r, 2.0 * r, w, h) {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt() - r;
                let coverage = (0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    blend_pixel(canvas, x, y, *fill, coverage);
                }
            }
        }
        Element::Line {
            x1,
            x2,
            y,
            width,
            color,
        } => {
            for (x, yy) in bounds(*x1, y - width / 2.0, x2 - x1, *width, w, h) {
                blend_pixel(canvas, x, yy, *color, 1.0);
            }
        }
        Element::Text(span) => draw_text(canvas, font, span),
        Element::Qr { x, y, side } => draw_qr(canvas, qr, *x, *y, *side),
    }
}

/// Pixel coordinates covering a rectangle, clipped to the canvas.
fn bounds(
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    max_w: f32,
    max_h: f32,
) -> impl Iterator<Item = (u32, u32)> {
    let x0 = x.floor().max(0.0) as u32;
    let y0 = y.floor().max(0.0) as u32;
    let x1 = (x + w).ceil().clamp(0.0, max_w) as u32;
    let y1 = (y + h).ceil().clamp(0.0, max_h) as u32;
    (y0..y1).flat_map(move |py| (x0..x1).map(move |px| (px, py)))
}

/// Signed distance to a rounded rectangle; negative inside.
fn rounded_rect_distance(px: f32, py: f32, x: f32, y: f32, w: f32, h: f32, radius: f32) -> f32 {
    let r = radius.min(w / 2.0).min(h / 2.0);
    let cx = x + w / 2.0;
    let cy = y + h / 2.0;
    let qx = (px - cx).abs() - (w / 2.0 - r);
    let qy = (py - cy).abs() - (h / 2.0 - r);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    outside + inside - r
}

fn blend_pixel(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgb, alpha: f32) {
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let dst = canvas.get_pixel_mut(x, y);
    let src_a = alpha.clamp(0.0, 1.0);
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= f32::EPSILON {
        return;
    }
    for c in 0..3 {
        let value = (color.0[c] as f32 * src_a + dst[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
        dst[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

fn draw_text(canvas: &mut RgbaImage, font: &FontArc, span: &TextSpan) {
    let scale = PxScale::from(span.size);
    let width = measure_text(font, &span.text, scale);
    let start_x = match span.anchor {
        Anchor::Start => span.x,
        Anchor::Middle => span.x - width / 2.0,
        Anchor::End => span.x - width,
    };
    let mut caret = point(start_x, span.y);
    let scaled_font = font.as_scaled(scale);
    let mut previous = None;
    for ch in span.text.chars() {
        let glyph_id = scaled_font.glyph_id(ch);
        if let Some(prev) = previous {
            caret.x += scaled_font.kern(prev, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, caret);
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let origin_x = bounds.min.x.floor() as i32;
            let origin_y = bounds.min.y.floor() as i32;
            outlined.draw(|gx, gy, v| {
                let px = origin_x + gx as i32;
                let py = origin_y + gy as i32;
                if px < 0 || py < 0 {
                    return;
                }
                blend_pixel(canvas, px as u32, py as u32, span.color, v);
            });
        }
        caret.x += scaled_font.h_advance(glyph_id);
        previous = Some(glyph_id);
    }
}

fn draw_qr(canvas: &mut RgbaImage, qr: &QrPayload, left: f32, top: f32, side: f32) {
    let modules = qr.modules();
    let width = qr.width();
    let total = (width + 2 * QUIET_ZONE) as f32;
    let (cw, ch) = (canvas.width() as f32, canvas.height() as f32);
    for (x, y) in bounds(left, top, side, side, cw, ch) {
        let mx = module_index(x as f32 + 0.5 - left, side, total);
        let my = module_index(y as f32 + 0.5 - top, side, total);
        let dark = mx >= 0
            && my >= 0
            && (mx as usize) < width
            && (my as usize) < width
            && modules[my as usize * width + mx as usize];
        let color = if dark { Rgb::BLACK } else { Rgb::WHITE };
        blend_pixel(canvas, x, y, color, 1.0);
    }
}

/// Module column/row under a pixel offset, relative to the symbol origin.
fn module_index(offset: f32, side: f32, total: f32) -> isize {
    ((offset / side) * total).floor() as isize - QUIET_ZONE as isize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::{Encryption, WifiCredential};
    use crate::provisioning::encode;

    #[test]
    fn rounded_rect_distance_signs() {
        assert!(rounded_rect_distance(50.0, 50.0, 0.0, 0.0, 100.0, 100.0, 10.0) < 0.0);
        assert!(rounded_rect_distance(150.0, 50.0, 0.0, 0.0, 100.0, 100.0, 10.0) > 0.0);
        // the square corner itself is cut off by the radius
        assert!(rounded_rect_distance(0.5, 0.5, 0.0, 0.0, 100.0, 100.0, 10.0) > 0.0);
    }

    #[test]
    fn unreadable_font_files_are_skipped() {
        let missing = Source::File(std::path::PathBuf::from("/nonexistent/font.ttf"));
        assert!(read_source(&missing).is_none());
        let bytes = Source::Binary(std::sync::Arc::new(vec![1u8, 2, 3]));
        assert_eq!(read_source(&bytes), Some(vec![1, 2, 3]));
    }

    #[test]
    fn blend_over_transparent_takes_source_color() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        blend_pixel(&mut img, 0, 0, Rgb([10, 20, 30]), 1.0);
        assert_eq!(img.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn qr_tile_draws_dark_finder_pattern_corner() {
        let cred = WifiCredential::new("A", "B", Encryption::Wpa);
        let qr = QrPayload::new(&encode(&cred)).unwrap();
        let side = ((qr.width() + 2 * QUIET_ZONE) * 4) as f32;
        let mut img = RgbaImage::from_pixel(side as u32, side as u32, Rgba([0, 0, 0, 0]));
        draw_qr(&mut img, &qr, 0.0, 0.0, side);
        // quiet zone is white, first finder module is dark
        assert_eq!(img.get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
        let m = (QUIET_ZONE * 4 + 1) as u32;
        assert_eq!(img.get_pixel(m, m), &Rgba([0, 0, 0, 255]));
    }
}
