//! Four-sided values: `border-image-slice`, `border-image-width`.
//!
//! One to four values are given in CSS order; a missing value `i` copies
//! value `(i - 1) >> 1`, so one value covers all sides, two give
//! vertical/horizontal and three give top/horizontal/bottom.

use std::fmt;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::values::number::{parse_number, NumberFlags};
use crate::css::values::{ComputeContext, CssValue};
use crate::geometry::Side;

/// Fill up to four parsed values to all four sides.
///
/// Returns `None` for an empty or over-long list.
pub fn expand_sides<T: Clone>(mut values: Vec<T>) -> Option<[T; 4]> {
    if values.is_empty() || values.len() > 4 {
        return None;
    }
    for i in values.len()..4 {
        let source = values[(i - 1) >> 1].clone();
        values.push(source);
    }
    values.try_into().ok()
}

/// Four optional sub-values plus the `fill` flag. `None` prints as `auto`.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderValue {
    pub values: [Option<CssValue>; 4],
    pub fill: bool,
}

impl BorderValue {
    pub fn new(values: [Option<CssValue>; 4], fill: bool) -> Self {
        Self { values, fill }
    }

    /// The same value on every side.
    pub fn uniform(value: CssValue) -> Self {
        Self::new(
            [
                Some(value.clone()),
                Some(value.clone()),
                Some(value.clone()),
                Some(value),
            ],
            false,
        )
    }

    pub fn side(&self, side: Side) -> Option<&CssValue> {
        self.values[side.index()].as_ref()
    }

    /// Parse one to four numbers, optionally `auto` and `fill`.
    pub fn parse(
        parser: &mut Parser,
        flags: NumberFlags,
        allow_auto: bool,
        allow_fill: bool,
    ) -> Result<Self, ParseError> {
        let mut fill = allow_fill && parser.try_ident("fill");
        let mut values = Vec::with_capacity(4);
        while values.len() < 4 {
            if allow_auto && parser.try_ident("auto") {
                values.push(None);
            } else if parser.has_number() {
                values.push(Some(parse_number(parser, flags)?));
            } else {
                break;
            }
        }
        if allow_fill && !fill {
            fill = parser.try_ident("fill");
        }
        match expand_sides(values) {
            Some(values) => Ok(Self::new(values, fill)),
            None => Err(parser.error("expected 1 to 4 values")),
        }
    }

    pub fn is_computed(&self) -> bool {
        self.values.iter().flatten().all(CssValue::is_computed)
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> BorderValue {
        let values = self
            .values
            .clone()
            .map(|v| v.map(|v| v.compute(property, ctx)));
        Self::new(values, self.fill)
    }

    /// Side-wise interpolation; `auto` sides and `fill` must match.
    pub fn transition(
        &self,
        end: &BorderValue,
        property: PropertyId,
        progress: f64,
    ) -> Option<BorderValue> {
        if self.fill != end.fill {
            return None;
        }
        let mut values: [Option<CssValue>; 4] = Default::default();
        for (i, slot) in values.iter_mut().enumerate() {
            *slot = match (&self.values[i], &end.values[i]) {
                (Some(a), Some(b)) => Some(a.transition(b, property, progress)?),
                (None, None) => None,
                _ => return None,
            };
        }
        Some(Self::new(values, self.fill))
    }
}

impl fmt::Display for BorderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [top, right, bottom, left] = &self.values;
        let n = if right != left {
            4
        } else if top != bottom {
            3
        } else if top != right {
            2
        } else {
            1
        };
        for (i, value) in self.values.iter().take(n).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match value {
                Some(v) => write!(f, "{v}")?,
                None => f.write_str("auto")?,
            }
        }
        if self.fill {
            f.write_str(" fill")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_all;
    use pretty_assertions::assert_eq;

    const LENGTH: NumberFlags = NumberFlags::LENGTH.union(NumberFlags::PERCENT);

    fn border(input: &str) -> BorderValue {
        parse_all(input, |p| BorderValue::parse(p, LENGTH, true, true)).unwrap()
    }

    #[test]
    fn expand_fills_from_opposite_side() {
        assert_eq!(expand_sides(vec![1]), Some([1, 1, 1, 1]));
        assert_eq!(expand_sides(vec![1, 2]), Some([1, 2, 1, 2]));
        assert_eq!(expand_sides(vec![1, 2, 3]), Some([1, 2, 3, 2]));
        assert_eq!(expand_sides(vec![1, 2, 3, 4]), Some([1, 2, 3, 4]));
        assert_eq!(expand_sides::<i32>(vec![]), None);
        assert_eq!(expand_sides(vec![1, 2, 3, 4, 5]), None);
    }

    #[test]
    fn one_value_sets_all_sides() {
        let v = border("10px");
        for side in Side::ALL {
            assert_eq!(v.side(side), Some(&CssValue::px(10.0)));
        }
        assert_eq!(v.to_string(), "10px");
    }

    #[test]
    fn two_values_are_vertical_and_horizontal() {
        let v = border("10px 20px");
        assert_eq!(v.side(Side::Top), Some(&CssValue::px(10.0)));
        assert_eq!(v.side(Side::Bottom), Some(&CssValue::px(10.0)));
        assert_eq!(v.side(Side::Left), Some(&CssValue::px(20.0)));
        assert_eq!(v.side(Side::Right), Some(&CssValue::px(20.0)));
        assert_eq!(v.to_string(), "10px 20px");
    }

    #[test]
    fn print_minimal_forms() {
        assert_eq!(border("1px 2px 3px").to_string(), "1px 2px 3px");
        assert_eq!(border("1px 2px 3px 4px").to_string(), "1px 2px 3px 4px");
        assert_eq!(border("1px 2px 1px 2px").to_string(), "1px 2px");
    }

    #[test]
    fn auto_and_fill() {
        assert_eq!(border("auto 10%").to_string(), "auto 10%");
        assert_eq!(border("fill 5px").to_string(), "5px fill");
        assert!(border("5px fill").fill);
        assert!(parse_all("fill", |p| BorderValue::parse(p, LENGTH, true, true)).is_err());
        assert!(parse_all("auto", |p| BorderValue::parse(p, LENGTH, false, false)).is_err());
    }

    #[test]
    fn transition_needs_matching_fill() {
        let a = border("0px");
        let b = border("10px");
        assert_eq!(
            a.transition(&b, PropertyId::BorderImageWidth, 0.5),
            Some(border("5px"))
        );
        let c = border("10px fill");
        assert_eq!(a.transition(&c, PropertyId::BorderImageWidth, 0.5), None);
        let d = border("auto");
        assert_eq!(a.transition(&d, PropertyId::BorderImageWidth, 0.5), None);
    }
}
