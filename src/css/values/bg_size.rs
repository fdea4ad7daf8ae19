//! `background-size`.

use std::fmt;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::values::image::CssImage;
use crate::css::values::number::{parse_number, NumberFlags};
use crate::css::values::{ComputeContext, CssValue};

const SIZE: NumberFlags = NumberFlags::LENGTH
    .union(NumberFlags::PERCENT)
    .union(NumberFlags::POSITIVE_ONLY);

/// `contain`, `cover`, or explicit sizes where `None` is `auto`.
#[derive(Debug, Clone, PartialEq)]
pub enum BgSizeValue {
    Contain,
    Cover,
    Explicit {
        x: Option<CssValue>,
        y: Option<CssValue>,
    },
}

impl Default for BgSizeValue {
    fn default() -> Self {
        BgSizeValue::Explicit { x: None, y: None }
    }
}

fn parse_auto_or_size(parser: &mut Parser) -> Result<Option<CssValue>, ParseError> {
    if parser.try_ident("auto") {
        Ok(None)
    } else {
        parse_number(parser, SIZE).map(Some)
    }
}

impl BgSizeValue {
    pub fn can_parse(parser: &Parser) -> bool {
        parser.has_ident("contain")
            || parser.has_ident("cover")
            || parser.has_ident("auto")
            || parser.has_number()
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        if parser.try_ident("contain") {
            return Ok(BgSizeValue::Contain);
        }
        if parser.try_ident("cover") {
            return Ok(BgSizeValue::Cover);
        }
        let x = parse_auto_or_size(parser)?;
        let y = if parser.has_ident("auto") || parser.has_number() {
            parse_auto_or_size(parser)?
        } else {
            None
        };
        Ok(BgSizeValue::Explicit { x, y })
    }

    /// Size of `image` painted into an area of `area_width` x `area_height`.
    ///
    /// An explicit size resolving to 0 or less gives `(0, 0)`, which callers
    /// treat as "skip this layer".
    pub fn compute_size(
        &self,
        image: &dyn CssImage,
        area_width: f64,
        area_height: f64,
    ) -> (f64, f64) {
        match self {
            BgSizeValue::Contain | BgSizeValue::Cover => {
                let aspect = image.aspect_ratio();
                if aspect <= 0.0 || area_height <= 0.0 {
                    return (area_width, area_height);
                }
                let wider = aspect > area_width / area_height;
                if matches!(self, BgSizeValue::Contain) == wider {
                    (area_width, area_width / aspect)
                } else {
                    (area_height * aspect, area_height)
                }
            }
            BgSizeValue::Explicit { x, y } => {
                let width = x.as_ref().map_or(0.0, |v| v.get(area_width));
                let height = y.as_ref().map_or(0.0, |v| v.get(area_height));
                if (x.is_some() && width <= 0.0) || (y.is_some() && height <= 0.0) {
                    return (0.0, 0.0);
                }
                image.concrete_size(width, height, area_width, area_height)
            }
        }
    }

    pub fn is_computed(&self) -> bool {
        match self {
            BgSizeValue::Explicit { x, y } => {
                x.iter().chain(y).all(CssValue::is_computed)
            }
            _ => true,
        }
    }

    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> BgSizeValue {
        match self {
            BgSizeValue::Explicit { x, y } => BgSizeValue::Explicit {
                x: x.as_ref().map(|v| v.compute(property, ctx)),
                y: y.as_ref().map(|v| v.compute(property, ctx)),
            },
            _ => self.clone(),
        }
    }

    /// Explicit sizes interpolate when their `auto`s line up.
    pub fn transition(
        &self,
        end: &BgSizeValue,
        property: PropertyId,
        progress: f64,
    ) -> Option<BgSizeValue> {
        let (
            BgSizeValue::Explicit { x: x0, y: y0 },
            BgSizeValue::Explicit { x: x1, y: y1 },
        ) = (self, end)
        else {
            return None;
        };
        let axis = |a: &Option<CssValue>, b: &Option<CssValue>| match (a, b) {
            (Some(a), Some(b)) => a.transition(b, property, progress).map(Some),
            (None, None) => Some(None),
            _ => None,
        };
        Some(BgSizeValue::Explicit {
            x: axis(x0, x1)?,
            y: axis(y0, y1)?,
        })
    }
}

impl fmt::Display for BgSizeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BgSizeValue::Contain => f.write_str("contain"),
            BgSizeValue::Cover => f.write_str("cover"),
            BgSizeValue::Explicit { x, y } => {
                match x {
                    Some(x) => write!(f, "{x}")?,
                    None => f.write_str("auto")?,
                }
                if let Some(y) = y {
                    write!(f, " {y}")?;
                }
                Ok(())
            }
        }
    }
}
