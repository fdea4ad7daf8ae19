//! `background-position`: a horizontal and a vertical offset.
//!
//! Keywords become percentages (`left` = 0%, `center` = 50%, `right` =
//! 100%). An offset after `right` or `bottom` measures from the far edge and
//! turns into a calc sum, e.g. `right 10px` is `calc(100% - 10px)`.

use std::fmt;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::values::calc::CalcValue;
use crate::css::values::number::{parse_number, Dimension, NumberFlags};
use crate::css::values::{ComputeContext, CssValue};

const OFFSET: NumberFlags = NumberFlags::LENGTH.union(NumberFlags::PERCENT);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
    Center,
    Any,
}

const KEYWORDS: [(&str, Axis, f64); 5] = [
    ("left", Axis::Horizontal, 0.0),
    ("right", Axis::Horizontal, 100.0),
    ("top", Axis::Vertical, 0.0),
    ("bottom", Axis::Vertical, 100.0),
    ("center", Axis::Center, 50.0),
];

/// A two-dimensional offset into a positioning area.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionValue {
    pub x: CssValue,
    pub y: CssValue,
}

impl Default for PositionValue {
    fn default() -> Self {
        Self::new(CssValue::percent(0.0), CssValue::percent(0.0))
    }
}

impl PositionValue {
    pub fn new(x: CssValue, y: CssValue) -> Self {
        Self { x, y }
    }

    pub fn can_parse(parser: &Parser) -> bool {
        parser.has_number() || KEYWORDS.iter().any(|(name, ..)| parser.has_ident(name))
    }

    /// One or two components, keywords in either order.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let first = parse_component(parser)?
            .ok_or_else(|| parser.error("expected a position"))?;
        let Some(second) = parse_component(parser)? else {
            let center = CssValue::percent(50.0);
            return Ok(match first.0 {
                Axis::Vertical => Self::new(center, first.1),
                _ => Self::new(first.1, center),
            });
        };
        let (x, y) = if first.0 == Axis::Vertical || second.0 == Axis::Horizontal {
            (second, first)
        } else {
            (first, second)
        };
        if matches!(x.0, Axis::Vertical) || matches!(y.0, Axis::Horizontal) {
            return Err(parser.invalid("conflicting position keywords"));
        }
        Ok(Self::new(x.1, y.1))
    }

    /// Offsets in px for a positioning area of the given size.
    pub fn resolve(&self, width: f64, height: f64) -> (f64, f64) {
        (self.x.get(width), self.y.get(height))
    }

    pub fn is_computed(&self) -> bool {
        self.x.is_computed() && self.y.is_computed()
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> PositionValue {
        Self::new(self.x.compute(property, ctx), self.y.compute(property, ctx))
    }

    pub fn transition(
        &self,
        end: &PositionValue,
        property: PropertyId,
        progress: f64,
    ) -> Option<PositionValue> {
        Some(Self::new(
            self.x.transition(&end.x, property, progress)?,
            self.y.transition(&end.y, property, progress)?,
        ))
    }
}

fn parse_component(parser: &mut Parser) -> Result<Option<(Axis, CssValue)>, ParseError> {
    for (name, axis, percent) in KEYWORDS {
        if !parser.try_ident(name) {
            continue;
        }
        let value = if axis != Axis::Center && parser.has_number() {
            let offset = parse_number(parser, OFFSET)?;
            if percent == 0.0 {
                offset
            } else {
                from_far_edge(&offset)
            }
        } else {
            CssValue::percent(percent)
        };
        return Ok(Some((axis, value)));
    }
    if parser.has_number() {
        return parse_number(parser, OFFSET).map(|v| Some((Axis::Any, v)));
    }
    Ok(None)
}

/// `100% - offset`.
fn from_far_edge(offset: &CssValue) -> CssValue {
    let negated: Vec<Dimension> = match offset {
        CssValue::Number(d) => vec![d.scale(-1.0)],
        CssValue::Calc(c) => c.terms().iter().map(|d| d.scale(-1.0)).collect(),
        _ => Vec::new(),
    };
    CalcValue::sum(std::iter::once(Dimension::percent(100.0)).chain(negated))
}

fn keyword(value: &CssValue, names: [&'static str; 3]) -> Option<&'static str> {
    match value {
        CssValue::Number(d) if *d == Dimension::percent(0.0) => Some(names[0]),
        CssValue::Number(d) if *d == Dimension::percent(50.0) => Some(names[1]),
        CssValue::Number(d) if *d == Dimension::percent(100.0) => Some(names[2]),
        _ => None,
    }
}

impl fmt::Display for PositionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = keyword(&self.x, ["left", "center", "right"]);
        let y = keyword(&self.y, ["top", "center", "bottom"]);
        if x == Some("center") && y == Some("center") {
            return f.write_str("center");
        }
        match x {
            Some(name) => f.write_str(name)?,
            None => write!(f, "{}", self.x)?,
        }
        f.write_str(" ")?;
        match y {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.y),
        }
    }
}
