//! `calc()` sums.
//!
//! A calc value is a sum of dimension terms with distinct units, kept in
//! [`Unit`] order so equal expressions compare and print identically. A sum
//! that collapses to one term is returned as a plain number instead.

use std::fmt;
use std::rc::Rc;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::tokenizer::Token;
use crate::css::values::number::{
    classes_compatible, lerp, read_dimension, Dimension, NumberFlags, Unit, UnitClass,
};
use crate::css::values::{ComputeContext, CssValue};

/// A canonical sum of two or more terms.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcValue {
    terms: Vec<Dimension>,
}

impl CalcValue {
    /// Add `terms` together, merging equal units.
    ///
    /// Returns a plain number when the sum has a single term left.
    pub fn sum(terms: impl IntoIterator<Item = Dimension>) -> CssValue {
        let terms = canonicalize(terms);
        match terms.as_slice() {
            [single] => CssValue::Number(*single),
            _ => CssValue::Calc(Rc::new(CalcValue { terms })),
        }
    }

    pub fn terms(&self) -> &[Dimension] {
        &self.terms
    }

    pub fn is_computed(&self) -> bool {
        self.terms.iter().all(Dimension::is_computed)
    }

    /// Resolve to a number with percentages taken against `one_hundred_percent`.
    pub fn get(&self, one_hundred_percent: f64) -> f64 {
        self.terms.iter().map(|t| t.get(one_hundred_percent)).sum()
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> CssValue {
        CalcValue::sum(self.terms.iter().map(|t| t.compute(property, ctx)))
    }

    /// Term-wise interpolation; `None` unless both sums have the same units.
    pub fn transition(&self, end: &CalcValue, progress: f64) -> Option<CssValue> {
        if self.terms.len() != end.terms.len() {
            return None;
        }
        let mut terms = Vec::with_capacity(self.terms.len());
        for (a, b) in self.terms.iter().zip(&end.terms) {
            if a.unit != b.unit {
                return None;
            }
            terms.push(Dimension::new(lerp(a.value, b.value, progress), a.unit));
        }
        Some(CalcValue::sum(terms))
    }
}

impl fmt::Display for CalcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("calc(")?;
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                write!(f, "{term}")?;
            } else if term.value < 0.0 {
                write!(f, " - {}", term.scale(-1.0))?;
            } else {
                write!(f, " + {term}")?;
            }
        }
        f.write_str(")")
    }
}

/// Sort by unit, merge equal units and drop zero terms.
fn canonicalize(terms: impl IntoIterator<Item = Dimension>) -> Vec<Dimension> {
    let mut sorted: Vec<Dimension> = terms.into_iter().collect();
    sorted.sort_by_key(|t| t.unit);
    let first_unit = sorted.first().map(|t| t.unit);
    let mut out: Vec<Dimension> = Vec::with_capacity(sorted.len());
    for term in sorted {
        match out.last_mut() {
            Some(last) if last.unit == term.unit => last.value += term.value,
            _ => out.push(term),
        }
    }
    out.retain(|t| t.value != 0.0);
    if out.is_empty() {
        out.push(Dimension::new(0.0, first_unit.unwrap_or(Unit::Number)));
    }
    out
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse `calc(<sum>)` (or the `-gtk-calc` alias) accepted by `flags`.
pub fn parse_calc(parser: &mut Parser, flags: NumberFlags) -> Result<CssValue, ParseError> {
    let position = parser.position();
    if !parser.try_function("calc") && !parser.try_function("-gtk-calc") {
        return Err(parser.error("expected calc()"));
    }
    let terms = parse_sum(parser)?;
    parser.expect_close()?;

    let terms = canonicalize(terms);
    let invalid = |message: &str| ParseError::InvalidValue {
        position,
        message: message.into(),
    };
    let mut class: Option<UnitClass> = None;
    for term in &terms {
        let term_class = term.unit.class();
        let allowed = match term_class {
            UnitClass::Number => flags.contains(NumberFlags::NUMBER),
            UnitClass::Percent => flags.contains(NumberFlags::PERCENT),
            UnitClass::Length => flags.contains(NumberFlags::LENGTH),
            UnitClass::Angle => flags.contains(NumberFlags::ANGLE),
            UnitClass::Time => flags.contains(NumberFlags::TIME),
        };
        if !allowed {
            return Err(invalid("calc() result has a unit that is not allowed here"));
        }
        match class {
            Some(c) if !classes_compatible(c, term_class) => {
                return Err(invalid("calc() mixes incompatible units"));
            }
            Some(UnitClass::Percent) => class = Some(term_class),
            Some(_) => {}
            None => class = Some(term_class),
        }
    }
    if flags.contains(NumberFlags::POSITIVE_ONLY)
        && terms.len() == 1
        && terms[0].value < 0.0
    {
        return Err(invalid("negative values are not allowed"));
    }
    Ok(match terms.as_slice() {
        [single] => CssValue::Number(*single),
        _ => CssValue::Calc(Rc::new(CalcValue { terms })),
    })
}

fn parse_sum(parser: &mut Parser) -> Result<Vec<Dimension>, ParseError> {
    let mut terms = parse_product(parser)?;
    loop {
        let sign = if parser.try_token(Token::Plus) {
            1.0
        } else if parser.try_token(Token::Minus) {
            -1.0
        } else {
            return Ok(terms);
        };
        let rhs = parse_product(parser)?;
        terms.extend(rhs.into_iter().map(|t| t.scale(sign)));
    }
}

fn parse_product(parser: &mut Parser) -> Result<Vec<Dimension>, ParseError> {
    let mut value = parse_factor(parser)?;
    loop {
        if parser.try_token(Token::Star) {
            let position = parser.position();
            let rhs = parse_factor(parser)?;
            value = if let Some(factor) = as_plain_number(&rhs) {
                value.into_iter().map(|t| t.scale(factor)).collect()
            } else if let Some(factor) = as_plain_number(&value) {
                rhs.into_iter().map(|t| t.scale(factor)).collect()
            } else {
                return Err(ParseError::InvalidValue {
                    position,
                    message: "calc() can only multiply by a number".into(),
                });
            };
        } else if parser.try_token(Token::Slash) {
            let position = parser.position();
            let rhs = parse_factor(parser)?;
            match as_plain_number(&rhs) {
                Some(divisor) if divisor != 0.0 => {
                    value = value.into_iter().map(|t| t.scale(1.0 / divisor)).collect();
                }
                _ => {
                    return Err(ParseError::InvalidValue {
                        position,
                        message: "calc() can only divide by a non-zero number".into(),
                    })
                }
            }
        } else {
            return Ok(value);
        }
    }
}

fn parse_factor(parser: &mut Parser) -> Result<Vec<Dimension>, ParseError> {
    if parser.try_token(Token::ParenOpen)
        || parser.try_function("calc")
        || parser.try_function("-gtk-calc")
    {
        let terms = parse_sum(parser)?;
        parser.expect_close()?;
        return Ok(canonicalize(terms));
    }
    match parser.peek_token() {
        Some(Token::Number | Token::Dimension | Token::Percentage) => {
            Ok(vec![read_dimension(parser)?])
        }
        _ => Err(parser.error("expected a calc() term")),
    }
}

fn as_plain_number(terms: &[Dimension]) -> Option<f64> {
    match canonicalize(terms.iter().copied()).as_slice() {
        [t] if t.unit == Unit::Number => Some(t.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_all;
    use crate::css::provider::StaticProvider;

    const LENGTH: NumberFlags = NumberFlags::LENGTH.union(NumberFlags::PERCENT);

    fn calc(input: &str) -> CssValue {
        parse_all(input, |p| parse_calc(p, LENGTH)).unwrap()
    }

    #[test]
    fn same_units_collapse_to_a_number() {
        assert_eq!(calc("calc(1px + 2px)"), CssValue::Number(Dimension::px(3.0)));
    }

    #[test]
    fn terms_are_ordered_by_unit() {
        let a = calc("calc(10px + 50%)");
        let b = calc("calc(50% + 10px)");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "calc(50% + 10px)");
    }

    #[test]
    fn subtraction_prints_minus() {
        assert_eq!(calc("calc(100% - 10px)").to_string(), "calc(100% - 10px)");
    }

    #[test]
    fn multiply_and_divide() {
        assert_eq!(calc("calc(2 * 3px)"), CssValue::Number(Dimension::px(6.0)));
        assert_eq!(calc("calc((10px + 4px) / 2)"), CssValue::Number(Dimension::px(7.0)));
        assert_eq!(
            calc("calc(calc(1em + 1px) * 2)").to_string(),
            "calc(2px + 2em)"
        );
    }

    #[test]
    fn invalid_expressions() {
        let bad = |s: &str| parse_all(s, |p| parse_calc(p, LENGTH)).is_err();
        assert!(bad("calc(1px * 2px)"));
        assert!(bad("calc(1px / 0)"));
        assert!(bad("calc(1 + 1px)"));
        assert!(bad("calc(1px + 1deg)"));
        assert!(bad("calc(1px +)"));
        assert!(bad("calc(1px"));
    }

    #[test]
    fn cancelling_terms_leave_zero() {
        assert_eq!(calc("calc(10px - 10px)"), CssValue::Number(Dimension::px(0.0)));
    }

    #[test]
    fn compute_is_idempotent() {
        let provider = StaticProvider::default();
        let ctx = ComputeContext::root(&provider);
        let value = calc("calc(1in + 2em - 10% + 3pt)");
        let once = value.compute(PropertyId::MarginLeft, &ctx);
        let twice = once.compute(PropertyId::MarginLeft, &ctx);
        assert_eq!(once, twice);
        assert!(once.is_computed());
    }

    #[test]
    fn compute_merges_converted_terms() {
        let provider = StaticProvider::default();
        let ctx = ComputeContext::root(&provider);
        let value = calc("calc(1in + 4px)");
        // 1in and 4px are distinct terms until both become px.
        assert_eq!(
            value.compute(PropertyId::MarginLeft, &ctx),
            CssValue::Number(Dimension::px(100.0))
        );
    }

    #[test]
    fn transition_termwise() {
        let a = calc("calc(10px + 10%)");
        let b = calc("calc(20px + 30%)");
        let CssValue::Calc(a) = a else { panic!("expected calc") };
        let CssValue::Calc(b) = b else { panic!("expected calc") };
        assert_eq!(
            a.transition(&b, 0.5).map(|v| v.to_string()),
            Some("calc(20% + 15px)".to_string())
        );
    }

    #[test]
    fn transition_with_mismatched_terms_fails() {
        let a = calc("calc(10px + 10%)");
        let b = calc("calc(20px + 3em)");
        let (CssValue::Calc(a), CssValue::Calc(b)) = (a, b) else {
            panic!("expected calc")
        };
        assert_eq!(a.transition(&b, 0.5), None);
    }

    #[test]
    fn get_sums_terms() {
        let CssValue::Calc(c) = calc("calc(100% - 10px)") else { panic!("expected calc") };
        assert_eq!(c.get(200.0), 190.0);
    }
}
