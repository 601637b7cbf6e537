use std::fmt::Write as _;

use super::layout::{
    self, Anchor, ApproxMeasure, CARD_HEIGHT, CARD_WIDTH, DPI, Element, GradientDirection,
};
use crate::card::{CardContent, CardOptions, Orientation};
use crate::error::Result;
use crate::qr::{QUIET_ZONE, QrPayload};

/// Print-ready SVG of the card at its physical size.
pub fn render_svg(content: &CardContent, options: &CardOptions) -> Result<String> {
    let qr = QrPayload::new(&content.payload)?;
    let elements = layout::layout(content, options.colors(), &ApproxMeasure);

    let (w, h) = match options.orientation {
        Orientation::Landscape => (CARD_WIDTH, CARD_HEIGHT),
        Orientation::Portrait => (CARD_HEIGHT, CARD_WIDTH),
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}in" height="{}in" viewBox="0 0 {w} {h}">"#,
        inches(w),
        inches(h),
    );
    out.push_str(r#"<g font-family="Inter, 'Noto Sans', 'DejaVu Sans', Arial, sans-serif""#);
    if options.orientation == Orientation::Portrait {
        let _ = write!(out, r#" transform="translate({w} 0) rotate(90)""#);
    }
    out.push_str(">\n");

    for element in &elements {
        write_element(&mut out, element, &qr);
    }

    out.push_str("</g>\n</svg>\n");
    Ok(out)
}

fn inches(px: u32) -> String {
    let value = px as f32 / DPI as f32;
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn write_element(out: &mut String, element: &Element, qr: &QrPayload) {
    match element {
        Element::Background {
            gradient,
            radius,
            border,
            border_width,
        } => {
            let (x2, y2) = match gradient.direction {
                GradientDirection::ToRight => (1, 0),
                GradientDirection::ToBottomRight => (1, 1),
            };
            let _ = writeln!(
                out,
                r#"<defs><linearGradient id="card-bg" x1="0" y1="0" x2="{x2}" y2="{y2}"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient></defs>"#,
                gradient.from, gradient.to,
            );
            let inset = border_width / 2.0;
            let _ = writeln!(
                out,
                r#"<rect x="{inset}" y="{inset}" width="{}" height="{}" rx="{radius}" fill="url(#card-bg)" stroke="{border}" stroke-width="{border_width}"/>"#,
                CARD_WIDTH as f32 - border_width,
                CARD_HEIGHT as f32 - border_width,
            );
        }
        Element::RoundedRect {
            x,
            y,
            w,
            h,
            radius,
            fill,
            stroke,
        } => {
            let stroke = stroke
                .map(|color| format!(r#" stroke="{color}" stroke-width="2""#))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" rx="{radius}" fill="{fill}"{stroke}/>"#
            );
        }
        Element::Circle { cx, cy, r, fill } => {
            let _ = writeln!(out, r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{fill}"/>"#);
        }
        Element::Line {
            x1,
            x2,
            y,
            width,
            color,
        } => {
            let _ = writeln!(
                out,
                r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{color}" stroke-width="{width}"/>"#
            );
        }
        Element::Text(span) => {
            let anchor = match span.anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
                Anchor::End => "end",
            };
            let style = if span.italic { r#" font-style="italic""# } else { "" };
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="{anchor}"{style}>{}</text>"#,
                span.x,
                span.y,
                span.size,
                span.color,
                escape_xml(&span.text),
            );
        }
        Element::Qr { x, y, side } => {
            let total = (qr.width() + 2 * QUIET_ZONE) as f32;
            let scale = side / total;
            let _ = writeln!(
                out,
                r#"<g transform="translate({x} {y}) scale({scale})">{}</g>"#,
                qr.to_svg(),
            );
        }
    }
}

pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // control characters other than tab and line breaks are not valid XML text
            ch if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r') => out.push('_'),
            other => out.push(other),
        }
    }
    out
}
