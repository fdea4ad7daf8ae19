//! `transform` lists.
//!
//! A transform value is an ordered list of primitives. Lists of different
//! length compare and interpolate as if the shorter one were padded with
//! identity primitives of the matching kind. When the common prefix does
//! not line up kind by kind, interpolation falls back to the composed
//! matrices.

use std::fmt;
use std::rc::Rc;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::tokenizer::Token;
use crate::css::values::matrix::Matrix4;
use crate::css::values::number::{parse_dimension, parse_number, Dimension, NumberFlags, Unit};
use crate::css::values::{ComputeContext, CssValue};

/// A single transform function.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    Matrix(Matrix4),
    Translate {
        x: CssValue,
        y: CssValue,
        z: CssValue,
    },
    Rotate {
        x: CssValue,
        y: CssValue,
        z: CssValue,
        angle: CssValue,
    },
    Scale {
        x: CssValue,
        y: CssValue,
        z: CssValue,
    },
    Skew {
        x: CssValue,
        y: CssValue,
    },
    SkewX(CssValue),
    SkewY(CssValue),
    Perspective(CssValue),
}

fn num(v: f64) -> CssValue {
    CssValue::Number(Dimension::number(v))
}

fn px(v: f64) -> CssValue {
    CssValue::Number(Dimension::px(v))
}

fn deg(v: f64) -> CssValue {
    CssValue::Number(Dimension::deg(v))
}

/// Degrees of an angle value, converting uncomputed units.
fn degrees(v: &CssValue) -> f64 {
    match v {
        CssValue::Number(d) => match d.unit {
            Unit::Rad => d.value.to_degrees(),
            Unit::Grad => d.value * 0.9,
            Unit::Turn => d.value * 360.0,
            _ => d.value,
        },
        other => other.get(100.0),
    }
}

impl Transform {
    /// The identity primitive of the same kind.
    pub fn identity_like(&self) -> Transform {
        match self {
            Transform::Matrix(_) => Transform::Matrix(Matrix4::IDENTITY),
            Transform::Translate { .. } => Transform::Translate {
                x: px(0.0),
                y: px(0.0),
                z: px(0.0),
            },
            Transform::Rotate { .. } => Transform::Rotate {
                x: num(0.0),
                y: num(0.0),
                z: num(0.0),
                angle: deg(0.0),
            },
            Transform::Scale { .. } => Transform::Scale {
                x: num(1.0),
                y: num(1.0),
                z: num(1.0),
            },
            Transform::Skew { .. } => Transform::Skew {
                x: deg(0.0),
                y: deg(0.0),
            },
            Transform::SkewX(_) => Transform::SkewX(deg(0.0)),
            Transform::SkewY(_) => Transform::SkewY(deg(0.0)),
            Transform::Perspective(_) => Transform::Perspective(px(0.0)),
        }
    }

    fn same_kind(&self, other: &Transform) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn to_matrix(&self) -> Matrix4 {
        match self {
            Transform::Matrix(m) => *m,
            Transform::Translate { x, y, z } => {
                Matrix4::translation(x.get(100.0), y.get(100.0), z.get(100.0))
            }
            Transform::Rotate { x, y, z, angle } => {
                Matrix4::rotation(x.get(1.0), y.get(1.0), z.get(1.0), degrees(angle))
            }
            Transform::Scale { x, y, z } => Matrix4::scale(x.get(1.0), y.get(1.0), z.get(1.0)),
            Transform::Skew { x, y } => Matrix4::skew(degrees(x), degrees(y)),
            Transform::SkewX(a) => Matrix4::skew(degrees(a), 0.0),
            Transform::SkewY(a) => Matrix4::skew(0.0, degrees(a)),
            Transform::Perspective(d) => Matrix4::perspective(d.get(0.0)),
        }
    }

    fn values(&self) -> Vec<&CssValue> {
        match self {
            Transform::Matrix(_) => Vec::new(),
            Transform::Translate { x, y, z } | Transform::Scale { x, y, z } => vec![x, y, z],
            Transform::Rotate { x, y, z, angle } => vec![x, y, z, angle],
            Transform::Skew { x, y } => vec![x, y],
            Transform::SkewX(a) | Transform::SkewY(a) | Transform::Perspective(a) => vec![a],
        }
    }

    pub fn is_computed(&self) -> bool {
        self.values().into_iter().all(CssValue::is_computed)
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> Transform {
        let c = |v: &CssValue| v.compute(property, ctx);
        match self {
            Transform::Matrix(m) => Transform::Matrix(*m),
            Transform::Translate { x, y, z } => Transform::Translate {
                x: c(x),
                y: c(y),
                z: c(z),
            },
            Transform::Rotate { x, y, z, angle } => Transform::Rotate {
                x: c(x),
                y: c(y),
                z: c(z),
                angle: c(angle),
            },
            Transform::Scale { x, y, z } => Transform::Scale {
                x: c(x),
                y: c(y),
                z: c(z),
            },
            Transform::Skew { x, y } => Transform::Skew { x: c(x), y: c(y) },
            Transform::SkewX(a) => Transform::SkewX(c(a)),
            Transform::SkewY(a) => Transform::SkewY(c(a)),
            Transform::Perspective(d) => Transform::Perspective(c(d)),
        }
    }

    /// Interpolate two primitives of the same kind.
    fn transition(
        &self,
        end: &Transform,
        property: PropertyId,
        progress: f64,
    ) -> Option<Transform> {
        let t = |a: &CssValue, b: &CssValue| a.transition(b, property, progress);
        Some(match (self, end) {
            (Transform::Matrix(a), Transform::Matrix(b)) if a == b => Transform::Matrix(*a),
            (Transform::Matrix(a), Transform::Matrix(b)) => {
                Transform::Matrix(a.interpolate(b, progress))
            }
            (
                Transform::Translate { x, y, z },
                Transform::Translate {
                    x: x2,
                    y: y2,
                    z: z2,
                },
            ) => Transform::Translate {
                x: t(x, x2)?,
                y: t(y, y2)?,
                z: t(z, z2)?,
            },
            (
                Transform::Rotate { x, y, z, angle },
                Transform::Rotate {
                    x: x2,
                    y: y2,
                    z: z2,
                    angle: angle2,
                },
            ) => Transform::Rotate {
                x: t(x, x2)?,
                y: t(y, y2)?,
                z: t(z, z2)?,
                angle: t(angle, angle2)?,
            },
            (
                Transform::Scale { x, y, z },
                Transform::Scale {
                    x: x2,
                    y: y2,
                    z: z2,
                },
            ) => Transform::Scale {
                x: t(x, x2)?,
                y: t(y, y2)?,
                z: t(z, z2)?,
            },
            (Transform::Skew { x, y }, Transform::Skew { x: x2, y: y2 }) => Transform::Skew {
                x: t(x, x2)?,
                y: t(y, y2)?,
            },
            (Transform::SkewX(a), Transform::SkewX(b)) => Transform::SkewX(t(a, b)?),
            (Transform::SkewY(a), Transform::SkewY(b)) => Transform::SkewY(t(a, b)?),
            (Transform::Perspective(a), Transform::Perspective(b)) => {
                // Depth interpolates through its reciprocal; zero is "none".
                let inv = |d: f64| if d == 0.0 { 0.0 } else { 1.0 / d };
                let (a, b) = (a.get(0.0), b.get(0.0));
                let mixed = inv(a) + (inv(b) - inv(a)) * progress;
                Transform::Perspective(px(inv(mixed)))
            }
            _ => return None,
        })
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Matrix(m) => write!(f, "{m}"),
            Transform::Translate { x, y, z } => write!(f, "translate3d({x}, {y}, {z})"),
            Transform::Rotate { x, y, z, angle } => {
                write!(f, "rotate3d({x}, {y}, {z}, {angle})")
            }
            Transform::Scale { x, y, z } => {
                if z.get(100.0) == 1.0 {
                    if x == y {
                        write!(f, "scale({x})")
                    } else {
                        write!(f, "scale({x}, {y})")
                    }
                } else {
                    write!(f, "scale3d({x}, {y}, {z})")
                }
            }
            Transform::Skew { x, y } => write!(f, "skew({x}, {y})"),
            Transform::SkewX(a) => write!(f, "skewX({a})"),
            Transform::SkewY(a) => write!(f, "skewY({a})"),
            Transform::Perspective(d) => write!(f, "perspective({d})"),
        }
    }
}

// ---------------------------------------------------------------------------
// TransformValue
// ---------------------------------------------------------------------------

/// An immutable, shared list of transforms. Empty means `none`.
#[derive(Debug, Clone)]
pub struct TransformValue(Rc<[Transform]>);

impl Default for TransformValue {
    fn default() -> Self {
        Self::none()
    }
}

impl TransformValue {
    pub fn none() -> Self {
        Self(Rc::from(Vec::new()))
    }

    pub fn new(transforms: Vec<Transform>) -> Self {
        Self(Rc::from(transforms))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.0
    }

    /// Compose the list into one matrix, first function outermost.
    pub fn to_matrix(&self) -> Matrix4 {
        self.0
            .iter()
            .fold(Matrix4::IDENTITY, |m, t| m.multiply(&t.to_matrix()))
    }

    pub fn is_computed(&self) -> bool {
        self.0.iter().all(Transform::is_computed)
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> TransformValue {
        if self.is_computed() {
            return self.clone();
        }
        Self::new(self.0.iter().map(|t| t.compute(property, ctx)).collect())
    }

    pub fn transition(
        &self,
        end: &TransformValue,
        property: PropertyId,
        progress: f64,
    ) -> Option<TransformValue> {
        if self.is_none() && end.is_none() {
            return Some(self.clone());
        }
        let prefix = self.0.len().min(end.0.len());
        let mismatched = self.0[..prefix]
            .iter()
            .zip(&end.0[..prefix])
            .any(|(a, b)| !a.same_kind(b));
        if mismatched {
            let m = self.to_matrix().interpolate(&end.to_matrix(), progress);
            return Some(Self::new(vec![Transform::Matrix(m)]));
        }

        let len = self.0.len().max(end.0.len());
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let t = match (self.0.get(i), end.0.get(i)) {
                (Some(a), Some(b)) => a.transition(b, property, progress)?,
                (Some(a), None) => a.transition(&a.identity_like(), property, progress)?,
                (None, Some(b)) => b.identity_like().transition(b, property, progress)?,
                (None, None) => break,
            };
            out.push(t);
        }
        Some(Self::new(out))
    }
}

impl PartialEq for TransformValue {
    fn eq(&self, other: &Self) -> bool {
        let len = self.0.len().max(other.0.len());
        (0..len).all(|i| match (self.0.get(i), other.0.get(i)) {
            (Some(a), Some(b)) => a == b,
            (Some(t), None) | (None, Some(t)) => *t == t.identity_like(),
            (None, None) => true,
        })
    }
}

impl fmt::Display for TransformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("none");
        }
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

const LENGTH: NumberFlags = NumberFlags::LENGTH.union(NumberFlags::PERCENT);

/// Parse `none` or a whitespace separated list of transform functions.
pub fn parse_transform(parser: &mut Parser) -> Result<TransformValue, ParseError> {
    if parser.try_ident("none") {
        return Ok(TransformValue::none());
    }
    let mut list = Vec::new();
    loop {
        list.push(parse_primitive(parser)?);
        if parser.is_value_end() {
            break;
        }
    }
    Ok(TransformValue::new(list))
}

/// Comma separated arguments, between `min` and `max` of them.
fn args(
    parser: &mut Parser,
    min: usize,
    max: usize,
    flags: NumberFlags,
) -> Result<Vec<CssValue>, ParseError> {
    let mut out = vec![parse_number(parser, flags)?];
    while out.len() < max && parser.try_token(Token::Comma) {
        out.push(parse_number(parser, flags)?);
    }
    if out.len() < min {
        return Err(parser.error(&format!("expected {min} arguments")));
    }
    Ok(out)
}

fn plain_numbers<const N: usize>(parser: &mut Parser) -> Result<[f64; N], ParseError> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        if i > 0 {
            parser.expect_comma()?;
        }
        *slot = parse_dimension(parser, NumberFlags::NUMBER)?.value;
    }
    Ok(out)
}

fn parse_primitive(parser: &mut Parser) -> Result<Transform, ParseError> {
    let Some(name) = parser.peek_function().map(str::to_ascii_lowercase) else {
        return Err(parser.error("expected a transform function"));
    };
    let position = parser.position();
    parser.advance();

    let transform = match name.as_str() {
        "matrix" => {
            let [a, b, c, d, e, f] = plain_numbers::<6>(parser)?;
            Transform::Matrix(Matrix4::from_2d(a, b, c, d, e, f))
        }
        "matrix3d" => Transform::Matrix(Matrix4::from_column_major(&plain_numbers::<16>(parser)?)),
        "translate" => {
            let mut v = args(parser, 1, 2, LENGTH)?.into_iter();
            Transform::Translate {
                x: v.next().unwrap_or_else(|| px(0.0)),
                y: v.next().unwrap_or_else(|| px(0.0)),
                z: px(0.0),
            }
        }
        "translatex" => Transform::Translate {
            x: parse_number(parser, LENGTH)?,
            y: px(0.0),
            z: px(0.0),
        },
        "translatey" => Transform::Translate {
            x: px(0.0),
            y: parse_number(parser, LENGTH)?,
            z: px(0.0),
        },
        "translatez" => Transform::Translate {
            x: px(0.0),
            y: px(0.0),
            z: parse_number(parser, NumberFlags::LENGTH)?,
        },
        "translate3d" => {
            let x = parse_number(parser, LENGTH)?;
            parser.expect_comma()?;
            let y = parse_number(parser, LENGTH)?;
            parser.expect_comma()?;
            let z = parse_number(parser, NumberFlags::LENGTH)?;
            Transform::Translate { x, y, z }
        }
        "scale" => {
            let v = args(parser, 1, 2, NumberFlags::NUMBER)?;
            let x = v[0].clone();
            let y = v.get(1).cloned().unwrap_or_else(|| x.clone());
            Transform::Scale { x, y, z: num(1.0) }
        }
        "scalex" => Transform::Scale {
            x: parse_number(parser, NumberFlags::NUMBER)?,
            y: num(1.0),
            z: num(1.0),
        },
        "scaley" => Transform::Scale {
            x: num(1.0),
            y: parse_number(parser, NumberFlags::NUMBER)?,
            z: num(1.0),
        },
        "scalez" => Transform::Scale {
            x: num(1.0),
            y: num(1.0),
            z: parse_number(parser, NumberFlags::NUMBER)?,
        },
        "scale3d" => {
            let mut v = args(parser, 3, 3, NumberFlags::NUMBER)?.into_iter();
            Transform::Scale {
                x: v.next().unwrap_or_else(|| num(1.0)),
                y: v.next().unwrap_or_else(|| num(1.0)),
                z: v.next().unwrap_or_else(|| num(1.0)),
            }
        }
        "rotate" | "rotatez" => Transform::Rotate {
            x: num(0.0),
            y: num(0.0),
            z: num(1.0),
            angle: parse_number(parser, NumberFlags::ANGLE)?,
        },
        "rotatex" => Transform::Rotate {
            x: num(1.0),
            y: num(0.0),
            z: num(0.0),
            angle: parse_number(parser, NumberFlags::ANGLE)?,
        },
        "rotatey" => Transform::Rotate {
            x: num(0.0),
            y: num(1.0),
            z: num(0.0),
            angle: parse_number(parser, NumberFlags::ANGLE)?,
        },
        "rotate3d" => {
            let mut axis = args(parser, 3, 3, NumberFlags::NUMBER)?.into_iter();
            parser.expect_comma()?;
            let angle = parse_number(parser, NumberFlags::ANGLE)?;
            Transform::Rotate {
                x: axis.next().unwrap_or_else(|| num(0.0)),
                y: axis.next().unwrap_or_else(|| num(0.0)),
                z: axis.next().unwrap_or_else(|| num(0.0)),
                angle,
            }
        }
        "skew" => {
            let mut v = args(parser, 1, 2, NumberFlags::ANGLE)?.into_iter();
            Transform::Skew {
                x: v.next().unwrap_or_else(|| deg(0.0)),
                y: v.next().unwrap_or_else(|| deg(0.0)),
            }
        }
        "skewx" => Transform::SkewX(parse_number(parser, NumberFlags::ANGLE)?),
        "skewy" => Transform::SkewY(parse_number(parser, NumberFlags::ANGLE)?),
        "perspective" => Transform::Perspective(parse_number(
            parser,
            NumberFlags::LENGTH | NumberFlags::POSITIVE_ONLY,
        )?),
        other => {
            return Err(ParseError::InvalidValue {
                position,
                message: format!("unknown transform function '{other}'"),
            })
        }
    };
    parser.expect_close()?;
    Ok(transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_all;
    use crate::css::provider::StaticProvider;

    fn parse(input: &str) -> TransformValue {
        parse_all(input, parse_transform).unwrap()
    }

    fn assert_matrix_close(a: &Matrix4, b: &Matrix4) {
        for row in 0..4 {
            for col in 0..4 {
                assert!((a.m[row][col] - b.m[row][col]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn none_prints_none() {
        assert_eq!(parse("none").to_string(), "none");
        assert!(parse("none").is_none());
    }

    #[test]
    fn print_canonical_forms() {
        assert_eq!(parse("translate(10px)").to_string(), "translate3d(10px, 0px, 0px)");
        assert_eq!(parse("rotate(45deg)").to_string(), "rotate3d(0, 0, 1, 45deg)");
        assert_eq!(parse("scale(2)").to_string(), "scale(2)");
        assert_eq!(parse("scale(2, 3)").to_string(), "scale(2, 3)");
        assert_eq!(parse("scaleZ(2)").to_string(), "scale3d(1, 1, 2)");
        assert_eq!(parse("skew(10deg)").to_string(), "skew(10deg, 0deg)");
        assert_eq!(parse("skewY(5deg)").to_string(), "skewY(5deg)");
        assert_eq!(
            parse("matrix(1, 0, 0, 1, 5, 6)").to_string(),
            "matrix(1, 0, 0, 1, 5, 6)"
        );
        assert_eq!(
            parse("translateX(1px) scale(2)").to_string(),
            "translate3d(1px, 0px, 0px) scale(2)"
        );
    }

    #[test]
    fn parse_errors() {
        let bad = |s: &str| parse_all(s, parse_transform).is_err();
        assert!(bad("wobble(1px)"));
        assert!(bad("translate(10deg)"));
        assert!(bad("matrix(1, 2, 3)"));
        assert!(bad("rotate(10px)"));
        assert!(bad("perspective(-1px)"));
        assert!(bad("scale3d(1, 2)"));
    }

    #[test]
    fn padding_with_identity_is_equal() {
        assert_eq!(parse("translate(0px)"), parse("none"));
        assert_eq!(parse("scale(2) scale(1)"), parse("scale(2)"));
        assert_ne!(parse("scale(2)"), parse("none"));
    }

    #[test]
    fn to_matrix_composes_in_order() {
        let m = parse("translate(10px, 0px) scale(2)").to_matrix();
        assert_eq!(m.transform_point(1.0, 1.0), (12.0, 2.0));
    }

    #[test]
    fn turn_angles_convert_in_matrix() {
        let a = parse("rotate(0.25turn)").to_matrix();
        let b = parse("rotate(90deg)").to_matrix();
        assert_matrix_close(&a, &b);
    }

    #[test]
    fn transition_same_kinds() {
        let a = parse("translate(0px) rotate(0deg)");
        let b = parse("translate(10px) rotate(90deg)");
        let mid = a.transition(&b, PropertyId::Transform, 0.5).unwrap();
        assert_eq!(mid.to_string(), "translate3d(5px, 0px, 0px) rotate3d(0, 0, 1, 45deg)");
    }

    #[test]
    fn transition_pads_with_identity() {
        let a = parse("none");
        let b = parse("scale(3)");
        let mid = a.transition(&b, PropertyId::Transform, 0.5).unwrap();
        assert_eq!(mid.to_string(), "scale(2)");
    }

    #[test]
    fn transition_mismatch_uses_matrix() {
        let a = parse("translate(10px)");
        let b = parse("scale(2)");
        let mid = a.transition(&b, PropertyId::Transform, 0.5).unwrap();
        assert_eq!(mid.transforms().len(), 1);
        assert!(matches!(mid.transforms()[0], Transform::Matrix(_)));
        let expected = Matrix4::translation(5.0, 0.0, 0.0).multiply(&Matrix4::scale(1.5, 1.5, 1.0));
        assert_matrix_close(&mid.to_matrix(), &expected);
    }

    #[test]
    fn transition_with_self_is_identity() {
        let a = parse("matrix(2, 0, 0, 2, 3, 4) translate(1px)");
        assert_eq!(a.transition(&a, PropertyId::Transform, 0.3), Some(a.clone()));
    }

    #[test]
    fn perspective_interpolates_reciprocal() {
        let a = parse("perspective(100px)");
        let b = parse("perspective(300px)");
        let mid = a.transition(&b, PropertyId::Transform, 0.5).unwrap();
        let Transform::Perspective(depth) = &mid.transforms()[0] else {
            panic!("expected perspective")
        };
        assert!((depth.get(0.0) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn compute_resolves_units() {
        let provider = StaticProvider::default();
        let ctx = ComputeContext::root(&provider);
        let v = parse("translate(1in) rotate(0.5turn)");
        let computed = v.compute(PropertyId::Transform, &ctx);
        assert_eq!(
            computed.to_string(),
            "translate3d(96px, 0px, 0px) rotate3d(0, 0, 1, 180deg)"
        );
        assert!(computed.is_computed());
    }
}
