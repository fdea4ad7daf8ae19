//! `line-height`.

use std::fmt;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::values::number::{lerp, parse_dimension, Dimension, NumberFlags, Unit};
use crate::css::values::ComputeContext;

/// `normal`, or a number, percentage or length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineHeight {
    #[default]
    Normal,
    Value(Dimension),
}

impl LineHeight {
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        if parser.try_ident("normal") {
            return Ok(LineHeight::Normal);
        }
        parse_dimension(
            parser,
            NumberFlags::NUMBER
                | NumberFlags::PERCENT
                | NumberFlags::LENGTH
                | NumberFlags::POSITIVE_ONLY,
        )
        .map(LineHeight::Value)
    }

    pub fn is_computed(&self) -> bool {
        match self {
            LineHeight::Normal => true,
            LineHeight::Value(d) => matches!(d.unit, Unit::Number | Unit::Px),
        }
    }

    /// Percentages resolve against the style's own computed font size.
    pub fn compute(&self, ctx: &ComputeContext<'_>) -> LineHeight {
        match self {
            LineHeight::Normal => LineHeight::Normal,
            LineHeight::Value(d) if d.unit == Unit::Percent => {
                LineHeight::Value(Dimension::px(d.value * ctx.font_size / 100.0))
            }
            LineHeight::Value(d) => LineHeight::Value(d.compute(PropertyId::LineHeight, ctx)),
        }
    }

    /// Line height in px for a given font size; `None` for `normal`.
    pub fn resolve(&self, font_size: f64) -> Option<f64> {
        match self {
            LineHeight::Normal => None,
            LineHeight::Value(d) if d.unit == Unit::Number => Some(d.value * font_size),
            LineHeight::Value(d) => Some(d.get(font_size)),
        }
    }

    pub fn transition(&self, end: &LineHeight, progress: f64) -> Option<LineHeight> {
        match (self, end) {
            (LineHeight::Value(a), LineHeight::Value(b)) if a.unit == b.unit => Some(
                LineHeight::Value(Dimension::new(lerp(a.value, b.value, progress), a.unit)),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for LineHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineHeight::Normal => f.write_str("normal"),
            LineHeight::Value(d) => write!(f, "{d}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_all;
    use crate::css::provider::StaticProvider;

    #[test]
    fn parse_forms() {
        assert_eq!(parse_all("normal", LineHeight::parse).unwrap(), LineHeight::Normal);
        assert_eq!(
            parse_all("1.5", LineHeight::parse).unwrap().to_string(),
            "1.5"
        );
        assert!(parse_all("-2px", LineHeight::parse).is_err());
    }

    #[test]
    fn percentage_uses_own_font_size() {
        let provider = StaticProvider::default();
        let mut ctx = ComputeContext::root(&provider);
        ctx.font_size = 20.0;
        let v = parse_all("150%", LineHeight::parse).unwrap();
        assert_eq!(v.compute(&ctx), LineHeight::Value(Dimension::px(30.0)));
        assert!(v.compute(&ctx).is_computed());
    }

    #[test]
    fn number_stays_a_multiplier() {
        let provider = StaticProvider::default();
        let ctx = ComputeContext::root(&provider);
        let v = parse_all("2", LineHeight::parse).unwrap();
        assert_eq!(v.compute(&ctx), v);
        assert_eq!(v.resolve(12.0), Some(24.0));
        assert_eq!(LineHeight::Normal.resolve(12.0), None);
    }

    #[test]
    fn transition_needs_matching_units() {
        let a = LineHeight::Value(Dimension::px(10.0));
        let b = LineHeight::Value(Dimension::px(20.0));
        assert_eq!(a.transition(&b, 0.5), Some(LineHeight::Value(Dimension::px(15.0))));
        assert_eq!(a.transition(&LineHeight::Normal, 0.5), None);
        assert_eq!(a.transition(&LineHeight::Value(Dimension::number(2.0)), 0.5), None);
    }
}
