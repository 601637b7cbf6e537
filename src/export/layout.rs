//! Card geometry shared by the raster and vector writers.
//!
//! Coordinates are pixels of a landscape card at 300 dpi; text `y` values are
//! baselines. Portrait output rotates the finished landscape card.

use crate::card::{CardContent, CardColors, Template};
use crate::color::Rgb;

pub const DPI: u32 = 300;
/// 4.5in
pub const CARD_WIDTH: u32 = 1350;
/// 2.5in
pub const CARD_HEIGHT: u32 = 750;

const PAD: f32 = 72.0;
const CORNER_RADIUS: f32 = 24.0;
const QR_TILE: f32 = 420.0;
const QR_TILE_PAD: f32 = 20.0;
const FIELD_TOP: f32 = 170.0;
const FIELD_ADVANCE: f32 = 84.0;

const TEXT_STRONG: Rgb = Rgb::from_hex(0x1f2937);
const TEXT_BODY: Rgb = Rgb::from_hex(0x374151);
const TEXT_MUTED: Rgb = Rgb::from_hex(0x6b7280);

/// Width of rendered text, in pixels, at a font size.
pub trait TextMeasure {
    fn measure(&self, text: &str, size: f32) -> f32;
}

/// Average advance of a sans-serif face; good enough for SVG where the
/// viewer picks the font.
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.56
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientDirection {
    ToRight,
    ToBottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub from: Rgb,
    pub to: Rgb,
    pub direction: GradientDirection,
}

impl Gradient {
    /// Color at normalized card position (`u`, `v`).
    pub fn at(&self, u: f32, v: f32) -> Rgb {
        let t = match self.direction {
            GradientDirection::ToRight => u,
            GradientDirection::ToBottomRight => (u + v) * 0.5,
        };
        self.from.lerp(self.to, t.clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub size: f32,
    pub color: Rgb,
    pub text: String,
    pub anchor: Anchor,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Background {
        gradient: Gradient,
        radius: f32,
        border: Rgb,
        border_width: f32,
    },
    RoundedRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Rgb,
        stroke: Option<Rgb>,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        fill: Rgb,
    },
    Line {
        x1: f32,
        x2: f32,
        y: f32,
        width: f32,
        color: Rgb,
    },
    Text(TextSpan),
    Qr {
        x: f32,
        y: f32,
        side: f32,
    },
}

/// Lays out `content` as a list of drawing operations, back to front.
pub fn layout(
    content: &CardContent,
    colors: CardColors,
    measure: &dyn TextMeasure,
) -> Vec<Element> {
    let width = CARD_WIDTH as f32;
    let height = CARD_HEIGHT as f32;
    let primary = colors.primary;
    let border = primary.over(Rgb::WHITE, 0.2);
    let soft_primary = primary.over(Rgb::WHITE, 0.7);
    let gradient = Gradient {
        from: colors.secondary,
        to: colors.secondary.over(Rgb::WHITE, 0.3),
        direction: match content.template {
            Template::Business => GradientDirection::ToBottomRight,
            Template::Modern => GradientDirection::ToRight,
        },
    };

    let mut out = vec![Element::Background {
        gradient,
        radius: CORNER_RADIUS,
        border,
        border_width: 3.0,
    }];

    // header
    let title_x = match content.template {
        Template::Business => PAD,
        Template::Modern => {
            out.push(Element::Circle {
                cx: PAD + 26.0,
                cy: PAD + 28.0,
                r: 26.0,
                fill: primary,
            });
            PAD + 68.0
        }
    };
    out.push(text(title_x, PAD + 46.0, 52.0, primary, content.title));

    let badge_fill = match content.template {
        Template::Business => colors.secondary.over(Rgb::WHITE, 0.3),
        Template::Modern => Rgb::WHITE,
    };
    push_pill(
        &mut out,
        measure,
        content.badge,
        width - PAD,
        PAD + 4.0,
        Anchor::End,
        primary,
        badge_fill,
        border,
    );

    // QR tile
    let tile_x = width - PAD - QR_TILE;
    let tile_y = FIELD_TOP - 22.0;
    out.push(Element::RoundedRect {
        x: tile_x,
        y: tile_y,
        w: QR_TILE,
        h: QR_TILE,
        radius: 16.0,
        fill: Rgb::WHITE,
        stroke: None,
    });
    out.push(Element::Qr {
        x: tile_x + QR_TILE_PAD,
        y: tile_y + QR_TILE_PAD,
        side: QR_TILE - 2.0 * QR_TILE_PAD,
    });

    // fields
    let column = tile_x - PAD - 48.0;
    let mut cursor = FIELD_TOP;

    out.push(text(PAD, cursor + 22.0, 22.0, primary, content.network_label));
    if content.hidden {
        let after_label = PAD + measure.measure(content.network_label, 22.0) + 12.0;
        out.push(Element::Text(TextSpan {
            italic: true,
            ..span(after_label, cursor + 22.0, 22.0, TEXT_MUTED, "(hidden)")
        }));
    }
    let network = fit(measure, &content.network, 34.0, column);
    out.push(text(PAD, cursor + 62.0, 34.0, TEXT_STRONG, &network));
    cursor += FIELD_ADVANCE;

    if let Some(password) = &content.password {
        out.push(text(PAD, cursor + 22.0, 22.0, primary, password.label));
        let value = fit(measure, &password.value, 32.0, column);
        out.push(text(PAD, cursor + 62.0, 32.0, TEXT_BODY, &value));
        cursor += FIELD_ADVANCE;
    }

    match content.template {
        Template::Business => {
            let security = &content.security;
            out.push(text(PAD, cursor + 22.0, 22.0, primary, security.label));
            out.push(text(PAD, cursor + 58.0, 28.0, TEXT_BODY, &security.value));
            cursor += FIELD_ADVANCE;
        }
        Template::Modern => {
            push_pill(
                &mut out,
                measure,
                &content.security.value,
                PAD,
                cursor,
                Anchor::Start,
                primary,
                Rgb::WHITE,
                border,
            );
            cursor += 64.0;
        }
    }

    if let Some(expires) = &content.expires {
        out.push(text(PAD, cursor + 22.0, 22.0, primary, expires.label));
        out.push(text(PAD, cursor + 58.0, 28.0, TEXT_BODY, &expires.value));
        cursor += FIELD_ADVANCE;
    }

    if let Some(info) = &content.additional_info {
        let info = fit(measure, info, 26.0, column);
        out.push(text(PAD, cursor + 30.0, 26.0, TEXT_BODY, &info));
    }

    // footer
    let rule_y = height - PAD - 38.0;
    out.push(Element::Line {
        x1: PAD,
        x2: width - PAD,
        y: rule_y,
        width: 2.0,
        color: border,
    });
    out.push(Element::Text(TextSpan {
        anchor: Anchor::Middle,
        ..span(
            width / 2.0,
            height - PAD + 2.0,
            22.0,
            soft_primary,
            &fit(measure, content.footer, 22.0, width - 2.0 * PAD),
        )
    }));

    out
}

fn span(x: f32, y: f32, size: f32, color: Rgb, value: &str) -> TextSpan {
    TextSpan {
        x,
        y,
        size,
        color,
        text: value.to_string(),
        anchor: Anchor::Start,
        italic: false,
    }
}

fn text(x: f32, y: f32, size: f32, color: Rgb, value: &str) -> Element {
    Element::Text(span(x, y, size, color, value))
}

#[allow(clippy::too_many_arguments)]
fn push_pill(
    out: &mut Vec<Element>,
    measure: &dyn TextMeasure,
    label: &str,
    edge_x: f32,
    top: f32,
    anchor: Anchor,
    color: Rgb,
    fill: Rgb,
    stroke: Rgb,
) {
    let size = 24.0;
    let w = measure.measure(label, size) + 40.0;
    let h = 44.0;
    let x = match anchor {
        Anchor::End => edge_x - w,
        Anchor::Middle => edge_x - w / 2.0,
        Anchor::Start => edge_x,
    };
    out.push(Element::RoundedRect {
        x,
        y: top,
        w,
        h,
        radius: h / 2.0,
        fill,
        stroke: Some(stroke),
    });
    out.push(Element::Text(TextSpan {
        anchor: Anchor::Middle,
        ..span(x + w / 2.0, top + 30.0, size, color, label)
    }));
}

/// Truncates `value` with an ellipsis until it fits `max_width`.
pub fn fit(measure: &dyn TextMeasure, value: &str, size: f32, max_width: f32) -> String {
    if measure.measure(value, size) <= max_width {
        return value.to_string();
    }
    let mut chars: Vec<char> = value.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().chain(std::iter::once(&'…')).collect();
        if measure.measure(&candidate, size) <= max_width {
            return candidate;
        }
    }
    "…".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardOptions, Template};
    use crate::credential::{Encryption, WifiCredential};

    fn texts(elements: &[Element]) -> Vec<&str> {
        elements
            .iter()
            .filter_map(|el| match el {
                Element::Text(span) => Some(span.text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fit_keeps_short_text_and_truncates_long_text() {
        assert_eq!(fit(&ApproxMeasure, "Home", 20.0, 200.0), "Home");
        let long = "x".repeat(100);
        let fitted = fit(&ApproxMeasure, &long, 20.0, 112.0);
        assert!(fitted.ends_with('…'));
        assert!(ApproxMeasure.measure(&fitted, 20.0) <= 112.0);
    }

    #[test]
    fn business_layout_lists_security_label() {
        let cred = WifiCredential::new("HomeNet", "secret123", Encryption::Wpa);
        let content = CardContent::build(&cred, &CardOptions::default());
        let elements = layout(&content, CardOptions::default().colors(), &ApproxMeasure);
        let texts = texts(&elements);
        assert!(texts.contains(&"WiFi Access"));
        assert!(texts.contains(&"SECURITY"));
        assert!(texts.contains(&"WPA"));
        assert!(matches!(elements[0], Element::Background { .. }));
        assert_eq!(
            elements
                .iter()
                .filter(|el| matches!(el, Element::Qr { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn modern_layout_shows_security_as_pill_only() {
        let cred = WifiCredential::new("Cafe", "", Encryption::None);
        let options = CardOptions {
            template: Template::Modern,
            ..Default::default()
        };
        let content = CardContent::build(&cred, &options);
        let elements = layout(&content, options.colors(), &ApproxMeasure);
        let texts = texts(&elements);
        assert!(texts.contains(&"Open Network"));
        assert!(!texts.contains(&"SECURITY"));
        assert!(!texts.contains(&"PASSWORD"));
        assert!(elements.iter().any(|el| matches!(el, Element::Circle { .. })));
    }

    #[test]
    fn gradient_runs_from_secondary_to_faded_secondary() {
        let g = Gradient {
            from: Rgb::BLACK,
            to: Rgb::WHITE,
            direction: GradientDirection::ToBottomRight,
        };
        assert_eq!(g.at(0.0, 0.0), Rgb::BLACK);
        assert_eq!(g.at(1.0, 1.0), Rgb::WHITE);
        assert_eq!(g.at(1.0, 0.0), g.at(0.0, 1.0));
    }
}
