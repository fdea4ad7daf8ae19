//! `box-shadow`.

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::values::color::{has_color, parse_color, ColorValue, Rgba};
use crate::css::values::number::{parse_number, NumberFlags};
use crate::css::values::{ComputeContext, CssValue};
use crate::geometry::Sides;

const OFFSET: NumberFlags = NumberFlags::LENGTH;
const RADIUS: NumberFlags = NumberFlags::LENGTH.union(NumberFlags::POSITIVE_ONLY);

/// One shadow of a `box-shadow` list.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub inset: bool,
    pub x: CssValue,
    pub y: CssValue,
    pub radius: CssValue,
    pub spread: CssValue,
    pub color: ColorValue,
}

impl Shadow {
    /// `[inset]? <x> <y> [<blur> [<spread>]]? <color>?`, in any order of
    /// the three groups.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let mut inset = false;
        let mut lengths: Option<[CssValue; 4]> = None;
        let mut color = None;
        loop {
            if !inset && parser.try_ident("inset") {
                inset = true;
            } else if lengths.is_none() && parser.has_number() {
                let x = parse_number(parser, OFFSET)?;
                let y = parse_number(parser, OFFSET)?;
                let radius = if parser.has_number() {
                    parse_number(parser, RADIUS)?
                } else {
                    CssValue::px(0.0)
                };
                let spread = if parser.has_number() {
                    parse_number(parser, OFFSET)?
                } else {
                    CssValue::px(0.0)
                };
                lengths = Some([x, y, radius, spread]);
            } else if color.is_none() && has_color(parser) {
                color = Some(parse_color(parser)?);
            } else {
                break;
            }
        }
        let Some([x, y, radius, spread]) = lengths else {
            return Err(parser.error("expected shadow offsets"));
        };
        Ok(Self {
            inset,
            x,
            y,
            radius,
            spread,
            color: color.unwrap_or(ColorValue::CurrentColor),
        })
    }

    /// A fully transparent shadow to pad transitions with.
    fn transparent_like(&self) -> Shadow {
        Shadow {
            inset: self.inset,
            x: CssValue::px(0.0),
            y: CssValue::px(0.0),
            radius: CssValue::px(0.0),
            spread: CssValue::px(0.0),
            color: Rgba::TRANSPARENT.into(),
        }
    }

    pub fn is_computed(&self) -> bool {
        self.x.is_computed()
            && self.y.is_computed()
            && self.radius.is_computed()
            && self.spread.is_computed()
            && self.color.is_computed()
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> Shadow {
        Shadow {
            inset: self.inset,
            x: self.x.compute(property, ctx),
            y: self.y.compute(property, ctx),
            radius: self.radius.compute(property, ctx),
            spread: self.spread.compute(property, ctx),
            color: self.color.compute(property, ctx),
        }
    }

    pub fn transition(&self, end: &Shadow, property: PropertyId, progress: f64) -> Option<Shadow> {
        if self.inset != end.inset {
            return None;
        }
        Some(Shadow {
            inset: self.inset,
            x: self.x.transition(&end.x, property, progress)?,
            y: self.y.transition(&end.y, property, progress)?,
            radius: self.radius.transition(&end.radius, property, progress)?,
            spread: self.spread.transition(&end.spread, property, progress)?,
            color: self.color.transition(&end.color, progress)?,
        })
    }

    /// Pixels the blur reaches beyond the shadow's edge.
    pub fn clip_radius(&self) -> f64 {
        let radius = self.radius.get(0.0);
        (radius * 1.5 * 3.0 * (2.0 * PI).sqrt() / 4.0 + 0.5).floor()
    }

    /// How far an outset shadow extends past each side of the border box.
    pub fn extents(&self) -> Sides<f64> {
        if self.inset {
            return Sides::all(0.0);
        }
        let reach = self.clip_radius() + self.spread.get(0.0);
        let (x, y) = (self.x.get(0.0), self.y.get(0.0));
        Sides::new(
            (reach - y).ceil().max(0.0),
            (reach + x).ceil().max(0.0),
            (reach + y).ceil().max(0.0),
            (reach - x).ceil().max(0.0),
        )
    }
}

impl fmt::Display for Shadow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)?;
        let zero = CssValue::px(0.0);
        if self.radius != zero || self.spread != zero {
            write!(f, " {}", self.radius)?;
            if self.spread != zero {
                write!(f, " {}", self.spread)?;
            }
        }
        write!(f, " {}", self.color)?;
        if self.inset {
            f.write_str(" inset")?;
        }
        Ok(())
    }
}

/// A possibly empty list of shadows; empty prints as `none`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowsValue(Rc<[Shadow]>);

impl Default for ShadowsValue {
    fn default() -> Self {
        Self::none()
    }
}

impl ShadowsValue {
    pub fn none() -> Self {
        Self(Rc::from(Vec::new()))
    }

    pub fn new(shadows: Vec<Shadow>) -> Self {
        Self(Rc::from(shadows))
    }

    pub fn shadows(&self) -> &[Shadow] {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        if parser.try_ident("none") {
            return Ok(Self::none());
        }
        parser.parse_comma_list(Shadow::parse).map(Self::new)
    }

    pub fn is_computed(&self) -> bool {
        self.0.iter().all(Shadow::is_computed)
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> ShadowsValue {
        if self.is_computed() {
            return self.clone();
        }
        Self(self.0.iter().map(|s| s.compute(property, ctx)).collect())
    }

    /// Shadow-wise interpolation; the shorter list is padded with
    /// transparent shadows.
    pub fn transition(
        &self,
        end: &ShadowsValue,
        property: PropertyId,
        progress: f64,
    ) -> Option<ShadowsValue> {
        let len = self.0.len().max(end.0.len());
        let mut shadows = Vec::with_capacity(len);
        for i in 0..len {
            let shadow = match (self.0.get(i), end.0.get(i)) {
                (Some(a), Some(b)) => a.transition(b, property, progress)?,
                (Some(a), None) => a.transition(&a.transparent_like(), property, progress)?,
                (None, Some(b)) => b.transparent_like().transition(b, property, progress)?,
                (None, None) => break,
            };
            shadows.push(shadow);
        }
        Some(Self::new(shadows))
    }

    /// Per-side maximum of the outset shadows' extents.
    pub fn extents(&self) -> Sides<f64> {
        self.0.iter().fold(Sides::all(0.0), |acc, shadow| {
            let e = shadow.extents();
            Sides::new(
                acc.top.max(e.top),
                acc.right.max(e.right),
                acc.bottom.max(e.bottom),
                acc.left.max(e.left),
            )
        })
    }

    pub fn outset(&self) -> impl Iterator<Item = &Shadow> {
        self.0.iter().filter(|s| !s.inset)
    }

    pub fn inset(&self) -> impl Iterator<Item = &Shadow> {
        self.0.iter().filter(|s| s.inset)
    }
}

impl fmt::Display for ShadowsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        for (i, shadow) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{shadow}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_all;
    use crate::css::provider::StaticProvider;
    use pretty_assertions::assert_eq;

    fn shadows(input: &str) -> ShadowsValue {
        parse_all(input, ShadowsValue::parse).unwrap()
    }

    #[test]
    fn parse_any_order() {
        let v = shadows("inset red 1px 2px");
        assert_eq!(v.to_string(), "1px 2px rgb(255,0,0) inset");
        let v = shadows("1px 2px 3px 4px black, 0 0");
        assert_eq!(v.to_string(), "1px 2px 3px 4px rgb(0,0,0), 0px 0px currentColor");
        assert_eq!(shadows("none").to_string(), "none");
        assert!(parse_all("red", ShadowsValue::parse).is_err());
        assert!(parse_all("1px 2px -3px", ShadowsValue::parse).is_err());
    }

    #[test]
    fn compute_resolves_current_color() {
        let provider = StaticProvider::default();
        let ctx = ComputeContext::root(&provider);
        let v = shadows("1px 1px").compute(PropertyId::BoxShadow, &ctx);
        assert_eq!(v.shadows()[0].color, ColorValue::Literal(Rgba::WHITE));
        assert!(v.is_computed());
    }

    #[test]
    fn transition_pads_with_transparent() {
        let a = shadows("none");
        let b = shadows("4px 4px rgba(0,0,0,1)");
        let mid = a.transition(&b, PropertyId::BoxShadow, 0.5).unwrap();
        let s = &mid.shadows()[0];
        assert_eq!(s.x, CssValue::px(2.0));
        assert_eq!(s.color.rgba().map(|c| c.alpha), Some(0.5));
    }

    #[test]
    fn transition_inset_mismatch_fails() {
        let a = shadows("1px 1px black");
        let b = shadows("1px 1px black inset");
        assert_eq!(a.transition(&b, PropertyId::BoxShadow, 0.5), None);
    }

    #[test]
    fn extents_follow_offset_and_blur() {
        let v = shadows("2px 3px black");
        assert_eq!(v.extents(), Sides::new(0.0, 2.0, 3.0, 0.0));
        let v = shadows("0 0 4px 1px black, 1px 1px black inset");
        // 4 * 1.5 * 3 * sqrt(2 pi) / 4 = 11.28, rounds to 11; plus spread.
        assert_eq!(v.extents(), Sides::all(12.0));
    }
}
