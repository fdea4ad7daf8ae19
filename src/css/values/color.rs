//! Colors.
//!
//! [`Rgba`] is a resolved color with channels in `0.0..=1.0`. [`ColorValue`]
//! is the specified form, which may still refer to `currentColor` or wrap
//! other colors in `shade()`, `alpha()` and `mix()`. Computing resolves it
//! to a literal.

use std::fmt;
use std::rc::Rc;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::tokenizer::Token;
use crate::css::values::number::{lerp, parse_dimension, NumberFlags, Unit};
use crate::css::values::ComputeContext;

/// A color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    }

    /// Fully transparent colors paint nothing.
    pub fn is_clear(&self) -> bool {
        self.alpha <= 0.0
    }

    /// Scale lightness and saturation by `factor` in HLS space.
    pub fn shade(&self, factor: f64) -> Rgba {
        let (h, l, s) = rgb_to_hls(self.red, self.green, self.blue);
        let l = (l * factor).clamp(0.0, 1.0);
        let s = (s * factor).clamp(0.0, 1.0);
        let (r, g, b) = hls_to_rgb(h, l, s);
        Rgba::new(r, g, b, self.alpha)
    }

    /// Multiply alpha by `factor`, clamped.
    pub fn fade(&self, factor: f64) -> Rgba {
        Rgba::new(
            self.red,
            self.green,
            self.blue,
            (self.alpha * factor).clamp(0.0, 1.0),
        )
    }

    /// Blend channel-wise towards `other` by `factor`.
    pub fn mix(&self, other: &Rgba, factor: f64) -> Rgba {
        let f = factor.clamp(0.0, 1.0);
        Rgba::new(
            lerp(self.red, other.red, f),
            lerp(self.green, other.green, f),
            lerp(self.blue, other.blue, f),
            lerp(self.alpha, other.alpha, f),
        )
    }

    /// Interpolate with premultiplied alpha, so fading towards a
    /// transparent color keeps the opaque side's hue.
    pub fn interpolate(&self, end: &Rgba, progress: f64) -> Rgba {
        if progress <= 0.0 || self == end {
            return *self;
        }
        if progress >= 1.0 {
            return *end;
        }
        let alpha = lerp(self.alpha, end.alpha, progress);
        if alpha <= 0.0 {
            return Rgba::TRANSPARENT;
        }
        let channel = |a: f64, b: f64| lerp(a * self.alpha, b * end.alpha, progress) / alpha;
        Rgba::new(
            channel(self.red, end.red),
            channel(self.green, end.green),
            channel(self.blue, end.blue),
            alpha,
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b) = (byte(self.red), byte(self.green), byte(self.blue));
        if self.alpha >= 1.0 {
            write!(f, "rgb({r},{g},{b})")
        } else {
            write!(f, "rgba({r},{g},{b},{})", self.alpha.max(0.0))
        }
    }
}

fn rgb_to_hls(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, l, 0.0);
    }
    let delta = max - min;
    let s = if l <= 0.5 {
        delta / (max + min)
    } else {
        delta / (2.0 - max - min)
    };
    let mut h = if r == max {
        (g - b) / delta
    } else if g == max {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };
    h *= 60.0;
    if h < 0.0 {
        h += 360.0;
    }
    (h, l, s)
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    let channel = |hue: f64| {
        let hue = hue.rem_euclid(360.0);
        if hue < 60.0 {
            m1 + (m2 - m1) * hue / 60.0
        } else if hue < 180.0 {
            m2
        } else if hue < 240.0 {
            m1 + (m2 - m1) * (240.0 - hue) / 60.0
        } else {
            m1
        }
    };
    (channel(h + 120.0), channel(h), channel(h - 120.0))
}

// ---------------------------------------------------------------------------
// ColorValue
// ---------------------------------------------------------------------------

/// A specified color.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    Literal(Rgba),
    CurrentColor,
    Shade(Rc<ColorValue>, f64),
    Alpha(Rc<ColorValue>, f64),
    Mix(Rc<ColorValue>, Rc<ColorValue>, f64),
}

impl From<Rgba> for ColorValue {
    fn from(rgba: Rgba) -> Self {
        ColorValue::Literal(rgba)
    }
}

impl ColorValue {
    pub fn is_computed(&self) -> bool {
        matches!(self, ColorValue::Literal(_))
    }

    /// The literal color, if already resolved.
    pub fn rgba(&self) -> Option<Rgba> {
        match self {
            ColorValue::Literal(c) => Some(*c),
            _ => None,
        }
    }

    /// Resolve against the given `currentColor`.
    pub fn resolve(&self, current: Rgba) -> Rgba {
        match self {
            ColorValue::Literal(c) => *c,
            ColorValue::CurrentColor => current,
            ColorValue::Shade(c, factor) => c.resolve(current).shade(*factor),
            ColorValue::Alpha(c, factor) => c.resolve(current).fade(*factor),
            ColorValue::Mix(a, b, factor) => a.resolve(current).mix(&b.resolve(current), *factor),
        }
    }

    /// `currentColor` means the parent's color for `color` itself and the
    /// style's own color everywhere else.
    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> ColorValue {
        if self.is_computed() {
            return self.clone();
        }
        let current = if property == PropertyId::Color {
            ctx.parent_color()
        } else {
            ctx.color
        };
        ColorValue::Literal(self.resolve(current))
    }

    pub fn transition(&self, end: &ColorValue, progress: f64) -> Option<ColorValue> {
        match (self, end) {
            (ColorValue::Literal(a), ColorValue::Literal(b)) => {
                Some(ColorValue::Literal(a.interpolate(b, progress)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::Literal(c) => write!(f, "{c}"),
            ColorValue::CurrentColor => f.write_str("currentColor"),
            ColorValue::Shade(c, factor) => write!(f, "shade({c}, {factor})"),
            ColorValue::Alpha(c, factor) => write!(f, "alpha({c}, {factor})"),
            ColorValue::Mix(a, b, factor) => write!(f, "mix({a}, {b}, {factor})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const NAMED_COLORS: [(&str, u8, u8, u8); 24] = [
    ("black", 0, 0, 0),
    ("white", 255, 255, 255),
    ("red", 255, 0, 0),
    ("green", 0, 128, 0),
    ("lime", 0, 255, 0),
    ("blue", 0, 0, 255),
    ("yellow", 255, 255, 0),
    ("cyan", 0, 255, 255),
    ("aqua", 0, 255, 255),
    ("magenta", 255, 0, 255),
    ("fuchsia", 255, 0, 255),
    ("gray", 128, 128, 128),
    ("grey", 128, 128, 128),
    ("silver", 192, 192, 192),
    ("maroon", 128, 0, 0),
    ("olive", 128, 128, 0),
    ("navy", 0, 0, 128),
    ("purple", 128, 0, 128),
    ("teal", 0, 128, 128),
    ("orange", 255, 165, 0),
    ("pink", 255, 192, 203),
    ("brown", 165, 42, 42),
    ("gold", 255, 215, 0),
    ("indigo", 75, 0, 130),
];

/// Whether the next token can start a color.
pub fn has_color(parser: &Parser) -> bool {
    match parser.peek() {
        Some(t) if t.token == Token::Hash => true,
        Some(t) if t.token == Token::Ident => {
            t.text.eq_ignore_ascii_case("transparent")
                || t.text.eq_ignore_ascii_case("currentcolor")
                || NAMED_COLORS
                    .iter()
                    .any(|(name, ..)| t.text.eq_ignore_ascii_case(name))
        }
        _ => ["rgb", "rgba", "shade", "alpha", "mix"]
            .iter()
            .any(|name| parser.has_function(name)),
    }
}

/// Parse a color.
pub fn parse_color(parser: &mut Parser) -> Result<ColorValue, ParseError> {
    let position = parser.position();
    if parser.try_ident("transparent") {
        return Ok(Rgba::TRANSPARENT.into());
    }
    if parser.try_ident("currentcolor") {
        return Ok(ColorValue::CurrentColor);
    }
    if let Some(index) = parser.try_ident_of(&NAMED_COLORS.map(|(name, ..)| name)) {
        let (_, r, g, b) = NAMED_COLORS[index];
        return Ok(Rgba::from_rgb8(r, g, b).into());
    }
    if parser.peek_token() == Some(Token::Hash) {
        let text = parser.advance().map(|t| t.text).unwrap_or_default();
        return parse_hex(&text[1..])
            .map(ColorValue::from)
            .ok_or_else(|| ParseError::InvalidValue {
                position,
                message: format!("invalid hex color '{text}'"),
            });
    }
    if parser.try_function("rgb") || parser.try_function("rgba") {
        return parse_rgb_args(parser).map(ColorValue::from);
    }
    if parser.try_function("shade") {
        let color = parse_color(parser)?;
        parser.expect_comma()?;
        let factor = parse_dimension(parser, NumberFlags::NUMBER)?.value;
        parser.expect_close()?;
        return Ok(ColorValue::Shade(Rc::new(color), factor));
    }
    if parser.try_function("alpha") {
        let color = parse_color(parser)?;
        parser.expect_comma()?;
        let factor = parse_dimension(parser, NumberFlags::NUMBER)?.value;
        parser.expect_close()?;
        return Ok(ColorValue::Alpha(Rc::new(color), factor));
    }
    if parser.try_function("mix") {
        let a = parse_color(parser)?;
        parser.expect_comma()?;
        let b = parse_color(parser)?;
        parser.expect_comma()?;
        let factor = parse_dimension(parser, NumberFlags::NUMBER)?.value;
        parser.expect_close()?;
        return Ok(ColorValue::Mix(Rc::new(a), Rc::new(b), factor));
    }
    Err(parser.error("expected a color"))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    let short = |i: usize| digit(i).map(|d| d * 17);
    let (r, g, b, a) = match hex.len() {
        3 => (short(0)?, short(1)?, short(2)?, 255),
        4 => (short(0)?, short(1)?, short(2)?, short(3)?),
        6 => (pair(0)?, pair(2)?, pair(4)?, 255),
        8 => (pair(0)?, pair(2)?, pair(4)?, pair(6)?),
        _ => return None,
    };
    let mut rgba = Rgba::from_rgb8(r, g, b);
    rgba.alpha = f64::from(a) / 255.0;
    Some(rgba)
}

fn parse_rgb_args(parser: &mut Parser) -> Result<Rgba, ParseError> {
    let mut channels = [0.0; 3];
    for (i, slot) in channels.iter_mut().enumerate() {
        if i > 0 {
            parser.expect_comma()?;
        }
        let d = parse_dimension(parser, NumberFlags::NUMBER | NumberFlags::PERCENT)?;
        *slot = if d.unit == Unit::Percent {
            d.value / 100.0
        } else {
            d.value / 255.0
        }
        .clamp(0.0, 1.0);
    }
    let alpha = if parser.try_token(Token::Comma) {
        let d = parse_dimension(parser, NumberFlags::NUMBER | NumberFlags::PERCENT)?;
        if d.unit == Unit::Percent {
            d.value / 100.0
        } else {
            d.value
        }
        .clamp(0.0, 1.0)
    } else {
        1.0
    };
    parser.expect_close()?;
    Ok(Rgba::new(channels[0], channels[1], channels[2], alpha))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_all;
    use crate::css::provider::StaticProvider;

    fn color(input: &str) -> ColorValue {
        parse_all(input, parse_color).unwrap()
    }

    #[test]
    fn hex_forms() {
        assert_eq!(color("#f00"), color("#ff0000"));
        assert!(color("#ff000080").to_string().starts_with("rgba(255,0,0,0.50"));
        assert!(parse_all("#ff00", parse_color).is_ok());
        assert!(parse_all("#ggg", parse_color).is_err());
        assert!(parse_all("#12345", parse_color).is_err());
    }

    #[test]
    fn named_and_functional() {
        assert_eq!(color("red"), color("rgb(255, 0, 0)"));
        assert_eq!(color("rgba(0, 0, 255, 0.5)").to_string(), "rgba(0,0,255,0.5)");
        assert_eq!(color("rgb(100%, 0%, 0%)"), color("red"));
        assert_eq!(color("transparent").to_string(), "rgba(0,0,0,0)");
        assert_eq!(color("currentColor"), ColorValue::CurrentColor);
    }

    #[test]
    fn has_color_peeks_without_consuming() {
        let p = Parser::new("#abc").unwrap();
        assert!(has_color(&p));
        let p = Parser::new("solid").unwrap();
        assert!(!has_color(&p));
        let p = Parser::new("shade(red, 1.2)").unwrap();
        assert!(has_color(&p));
    }

    #[test]
    fn shade_lightens_and_darkens() {
        let gray = Rgba::from_rgb8(100, 100, 100);
        assert!(gray.shade(1.8).red > gray.red);
        assert!(gray.shade(1.0 / 1.8).red < gray.red);
        assert_eq!(Rgba::WHITE.shade(2.0), Rgba::WHITE);
    }

    #[test]
    fn shade_keeps_hue() {
        let red = Rgba::from_rgb8(200, 0, 0);
        let darker = red.shade(0.5);
        assert_eq!(darker.green, darker.blue);
        assert!(darker.red > darker.green);
        assert!(darker.red < red.red);
    }

    #[test]
    fn compute_resolves_current_color() {
        let provider = StaticProvider::default();
        let mut ctx = ComputeContext::root(&provider);
        ctx.color = Rgba::BLACK;
        let v = color("alpha(currentColor, 0.5)");
        assert_eq!(
            v.compute(PropertyId::BorderTopColor, &ctx),
            ColorValue::Literal(Rgba::new(0.0, 0.0, 0.0, 0.5))
        );
    }

    #[test]
    fn current_color_for_color_uses_parent() {
        let provider = StaticProvider::default();
        let mut ctx = ComputeContext::root(&provider);
        ctx.color = Rgba::BLACK;
        // No parent: falls back to the initial color.
        assert_eq!(
            ColorValue::CurrentColor.compute(PropertyId::Color, &ctx),
            ColorValue::Literal(Rgba::WHITE)
        );
    }

    #[test]
    fn mix_and_print() {
        let v = color("mix(black, white, 0.5)");
        assert_eq!(v.to_string(), "mix(rgb(0,0,0), rgb(255,255,255), 0.5)");
        assert_eq!(v.resolve(Rgba::BLACK), Rgba::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn transition_literals_only() {
        let a = color("black");
        let b = color("white");
        assert_eq!(
            a.transition(&b, 0.25),
            Some(ColorValue::Literal(Rgba::new(0.25, 0.25, 0.25, 1.0)))
        );
        assert_eq!(ColorValue::CurrentColor.transition(&b, 0.5), None);
    }

    #[test]
    fn fading_to_transparent_keeps_hue() {
        let red = color("red");
        let clear = color("transparent");
        assert_eq!(
            red.transition(&clear, 0.5),
            Some(ColorValue::Literal(Rgba::new(1.0, 0.0, 0.0, 0.5)))
        );
        assert_eq!(
            red.transition(&clear, 1.0),
            Some(ColorValue::Literal(Rgba::TRANSPARENT))
        );
    }
}
