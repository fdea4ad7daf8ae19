//! Numbers, dimensions and their units.
//!
//! A [`Dimension`] is a number tagged with a [`Unit`]. Parsing goes through
//! [`parse_number`], which also handles `calc()` and returns a [`CssValue`]:
//! either a plain number or a calc sum. Computing converts lengths to `px`,
//! angles to `deg` and times to `s`; numbers and percentages are kept.

use std::f64::consts::PI;
use std::fmt;

use bitflags::bitflags;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::tokenizer::Token;
use crate::css::values::calc::{self, CalcValue};
use crate::css::values::{ComputeContext, CssValue};

bitflags! {
    /// Which kinds of number a grammar slot accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NumberFlags: u8 {
        const NUMBER = 1 << 0;
        const PERCENT = 1 << 1;
        const LENGTH = 1 << 2;
        const ANGLE = 1 << 3;
        const TIME = 1 << 4;
        /// Reject negative values.
        const POSITIVE_ONLY = 1 << 5;
        /// Accept a unitless number as `px` where a length is expected.
        const NUMBER_AS_PIXELS = 1 << 6;
    }
}

/// Unit of a [`Dimension`]. Declaration order is the canonical term order
/// of calc sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    Number,
    Percent,
    Px,
    Pt,
    Em,
    Ex,
    Rem,
    Pc,
    In,
    Cm,
    Mm,
    Rad,
    Deg,
    Grad,
    Turn,
    S,
    Ms,
}

/// Grouping of units that may be mixed in a calc sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    Number,
    Percent,
    Length,
    Angle,
    Time,
}

const UNITS: [Unit; 17] = [
    Unit::Number,
    Unit::Percent,
    Unit::Px,
    Unit::Pt,
    Unit::Em,
    Unit::Ex,
    Unit::Rem,
    Unit::Pc,
    Unit::In,
    Unit::Cm,
    Unit::Mm,
    Unit::Rad,
    Unit::Deg,
    Unit::Grad,
    Unit::Turn,
    Unit::S,
    Unit::Ms,
];

const UNIT_NAMES: [&str; 17] = [
    "", "%", "px", "pt", "em", "ex", "rem", "pc", "in", "cm", "mm", "rad", "deg", "grad",
    "turn", "s", "ms",
];

impl Unit {
    pub fn name(self) -> &'static str {
        UNIT_NAMES[self as usize]
    }

    /// Look up a unit suffix, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Unit> {
        UNIT_NAMES
            .iter()
            .skip(2)
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| UNITS[i + 2])
    }

    pub fn class(self) -> UnitClass {
        match self {
            Unit::Number => UnitClass::Number,
            Unit::Percent => UnitClass::Percent,
            Unit::Px
            | Unit::Pt
            | Unit::Em
            | Unit::Ex
            | Unit::Rem
            | Unit::Pc
            | Unit::In
            | Unit::Cm
            | Unit::Mm => UnitClass::Length,
            Unit::Rad | Unit::Deg | Unit::Grad | Unit::Turn => UnitClass::Angle,
            Unit::S | Unit::Ms => UnitClass::Time,
        }
    }

    /// Whether values in this unit are left unchanged by compute.
    pub fn is_computed(self) -> bool {
        matches!(
            self,
            Unit::Number | Unit::Percent | Unit::Px | Unit::Deg | Unit::S
        )
    }

    fn allowed_by(self, flags: NumberFlags) -> bool {
        match self.class() {
            UnitClass::Number => flags.contains(NumberFlags::NUMBER),
            UnitClass::Percent => flags.contains(NumberFlags::PERCENT),
            UnitClass::Length => flags.contains(NumberFlags::LENGTH),
            UnitClass::Angle => flags.contains(NumberFlags::ANGLE),
            UnitClass::Time => flags.contains(NumberFlags::TIME),
        }
    }
}

/// Whether two unit classes can be added together.
pub fn classes_compatible(a: UnitClass, b: UnitClass) -> bool {
    a == b
        || matches!(
            (a, b),
            (UnitClass::Length, UnitClass::Percent) | (UnitClass::Percent, UnitClass::Length)
        )
}

/// A number with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: Unit,
}

impl Dimension {
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn number(value: f64) -> Self {
        Self::new(value, Unit::Number)
    }

    pub const fn px(value: f64) -> Self {
        Self::new(value, Unit::Px)
    }

    pub const fn percent(value: f64) -> Self {
        Self::new(value, Unit::Percent)
    }

    pub const fn deg(value: f64) -> Self {
        Self::new(value, Unit::Deg)
    }

    pub fn is_computed(&self) -> bool {
        self.unit.is_computed()
    }

    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.value * factor, self.unit)
    }

    /// Resolve against `one_hundred_percent` if this is a percentage.
    pub fn get(&self, one_hundred_percent: f64) -> f64 {
        if self.unit == Unit::Percent {
            self.value * one_hundred_percent / 100.0
        } else {
            self.value
        }
    }

    /// Convert to the computed unit of the dimension's class.
    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> Dimension {
        let font_size = if property == PropertyId::FontSize {
            ctx.parent_font_size()
        } else {
            ctx.font_size
        };
        let v = self.value;
        match self.unit {
            Unit::Number | Unit::Px | Unit::Deg | Unit::S => *self,
            Unit::Percent => {
                if property == PropertyId::FontSize {
                    Dimension::px(v * font_size / 100.0)
                } else {
                    *self
                }
            }
            Unit::Pt => Dimension::px(v * ctx.dpi / 72.0),
            Unit::Pc => Dimension::px(v * ctx.dpi / 72.0 * 12.0),
            Unit::In => Dimension::px(v * ctx.dpi),
            Unit::Cm => Dimension::px(v * ctx.dpi * 0.393_700_787_401_574_77),
            Unit::Mm => Dimension::px(v * ctx.dpi * 0.039_370_078_740_157_477),
            Unit::Em => Dimension::px(v * font_size),
            Unit::Ex => Dimension::px(v * font_size * 0.5),
            Unit::Rem => Dimension::px(v * ctx.default_font_size()),
            Unit::Rad => Dimension::deg(v * 180.0 / PI),
            Unit::Grad => Dimension::deg(v * 360.0 / 400.0),
            Unit::Turn => Dimension::deg(v * 360.0),
            Unit::Ms => Dimension::new(v / 1000.0, Unit::S),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.name())
    }
}

/// Linear interpolation that is exact at both ends and when `a == b`.
pub fn lerp(a: f64, b: f64, progress: f64) -> f64 {
    if a == b {
        a
    } else {
        a + (b - a) * progress
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a number, dimension, percentage or `calc()` accepted by `flags`.
pub fn parse_number(parser: &mut Parser, flags: NumberFlags) -> Result<CssValue, ParseError> {
    if parser.has_function("calc") || parser.has_function("-gtk-calc") {
        return calc::parse_calc(parser, flags);
    }
    parse_dimension(parser, flags).map(CssValue::Number)
}

/// Parse a single number token without calc() support.
pub fn parse_dimension(parser: &mut Parser, flags: NumberFlags) -> Result<Dimension, ParseError> {
    let position = parser.position();
    let dim = match parser.peek_token() {
        Some(Token::Number) => {
            let value = parser.consume_number()?;
            if flags.contains(NumberFlags::NUMBER) {
                Dimension::number(value)
            } else if flags.contains(NumberFlags::LENGTH)
                && (value == 0.0 || flags.contains(NumberFlags::NUMBER_AS_PIXELS))
            {
                Dimension::px(value)
            } else if flags.contains(NumberFlags::ANGLE) && value == 0.0 {
                Dimension::deg(value)
            } else {
                return Err(ParseError::InvalidValue {
                    position,
                    message: "unitless number is not allowed here".into(),
                });
            }
        }
        Some(Token::Percentage) => {
            let dim = read_dimension(parser)?;
            if !flags.contains(NumberFlags::PERCENT) {
                return Err(ParseError::InvalidValue {
                    position,
                    message: "percentage is not allowed here".into(),
                });
            }
            dim
        }
        Some(Token::Dimension) => {
            let dim = read_dimension(parser)?;
            if !dim.unit.allowed_by(flags) {
                return Err(ParseError::InvalidValue {
                    position,
                    message: format!("unit '{}' is not allowed here", dim.unit.name()),
                });
            }
            dim
        }
        _ => return Err(parser.error("expected a number")),
    };
    if flags.contains(NumberFlags::POSITIVE_ONLY) && dim.value < 0.0 {
        return Err(ParseError::InvalidValue {
            position,
            message: "negative values are not allowed".into(),
        });
    }
    Ok(dim)
}

/// Read a percentage or dimension token into a [`Dimension`], any unit.
pub(crate) fn read_dimension(parser: &mut Parser) -> Result<Dimension, ParseError> {
    let position = parser.position();
    let Some(tok) = parser.advance() else {
        return Err(ParseError::UnexpectedEof("expected a dimension".into()));
    };
    let invalid = |message: String| ParseError::InvalidValue { position, message };
    match tok.token {
        Token::Number => tok
            .text
            .parse()
            .map(Dimension::number)
            .map_err(|_| invalid(format!("bad number '{}'", tok.text))),
        Token::Percentage => tok.text[..tok.text.len() - 1]
            .parse()
            .map(Dimension::percent)
            .map_err(|_| invalid(format!("bad percentage '{}'", tok.text))),
        Token::Dimension => {
            let split = tok
                .text
                .find(|c: char| c.is_ascii_alphabetic())
                .unwrap_or(tok.text.len());
            let (number, suffix) = tok.text.split_at(split);
            let value: f64 = number
                .parse()
                .map_err(|_| invalid(format!("bad number '{}'", tok.text)))?;
            let unit = Unit::from_name(suffix)
                .ok_or_else(|| invalid(format!("unknown unit '{suffix}'")))?;
            Ok(Dimension::new(value, unit))
        }
        _ => Err(ParseError::UnexpectedToken {
            position,
            message: format!("expected a number, got '{}'", tok.text),
        }),
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Interpolate two numeric values (plain or calc).
///
/// Same-unit numbers interpolate directly, numbers of different but
/// compatible units become a calc sum, calc sums interpolate term by term
/// and fail when their terms do not line up.
pub fn transition_numbers(start: &CssValue, end: &CssValue, progress: f64) -> Option<CssValue> {
    match (start, end) {
        (CssValue::Number(a), CssValue::Number(b)) => {
            if a.unit == b.unit {
                Some(CssValue::Number(Dimension::new(
                    lerp(a.value, b.value, progress),
                    a.unit,
                )))
            } else if classes_compatible(a.unit.class(), b.unit.class()) {
                Some(CalcValue::sum([
                    a.scale(1.0 - progress),
                    b.scale(progress),
                ]))
            } else {
                None
            }
        }
        (CssValue::Calc(a), CssValue::Calc(b)) => a.transition(b, progress),
        _ => None,
    }
}
