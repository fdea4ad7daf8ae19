//! Corner radii: a horizontal and a vertical length.

use std::fmt;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::values::number::{parse_number, NumberFlags};
use crate::css::values::{ComputeContext, CssValue};

pub(crate) const RADIUS: NumberFlags = NumberFlags::LENGTH
    .union(NumberFlags::PERCENT)
    .union(NumberFlags::POSITIVE_ONLY);

/// One `border-*-radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerValue {
    pub x: CssValue,
    pub y: CssValue,
}

impl Default for CornerValue {
    fn default() -> Self {
        Self::new(CssValue::px(0.0), CssValue::px(0.0))
    }
}

impl CornerValue {
    pub fn new(x: CssValue, y: CssValue) -> Self {
        Self { x, y }
    }

    /// One or two non-negative lengths; one means a circular corner.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let x = parse_number(parser, RADIUS)?;
        let y = if parser.has_number() {
            parse_number(parser, RADIUS)?
        } else {
            x.clone()
        };
        Ok(Self::new(x, y))
    }

    /// Radii in px, percentages taken against the box size.
    pub fn resolve(&self, width: f64, height: f64) -> (f64, f64) {
        (self.x.get(width), self.y.get(height))
    }

    pub fn is_computed(&self) -> bool {
        self.x.is_computed() && self.y.is_computed()
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> CornerValue {
        Self::new(self.x.compute(property, ctx), self.y.compute(property, ctx))
    }

    pub fn transition(
        &self,
        end: &CornerValue,
        property: PropertyId,
        progress: f64,
    ) -> Option<CornerValue> {
        Some(Self::new(
            self.x.transition(&end.x, property, progress)?,
            self.y.transition(&end.y, property, progress)?,
        ))
    }
}

impl fmt::Display for CornerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.x == self.y {
            write!(f, "{}", self.x)
        } else {
            write!(f, "{} {}", self.x, self.y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_all;

    #[test]
    fn one_or_two_radii() {
        let c = parse_all("5px", CornerValue::parse).unwrap();
        assert_eq!(c.to_string(), "5px");
        let c = parse_all("5px 10%", CornerValue::parse).unwrap();
        assert_eq!(c.to_string(), "5px 10%");
        assert_eq!(c.resolve(200.0, 50.0), (5.0, 5.0));
    }

    #[test]
    fn negative_radius_is_rejected() {
        assert!(parse_all("-1px", CornerValue::parse).is_err());
    }

    #[test]
    fn transition_both_axes() {
        let a = CornerValue::default();
        let b = parse_all("10px 20px", CornerValue::parse).unwrap();
        let mid = a.transition(&b, PropertyId::BorderTopLeftRadius, 0.5).unwrap();
        assert_eq!(mid.to_string(), "5px 10px");
    }
}
