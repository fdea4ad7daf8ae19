//! The CSS value algebra.
//!
//! [`CssValue`] is an immutable, cheaply clonable tagged union over every
//! value kind the style system knows. Heavy payloads sit behind `Rc`, so
//! cloning a value shares its structure. Every kind supports four
//! operations:
//!
//! - `compute`: resolve relative units, keywords and `currentColor`
//!   against a [`ComputeContext`]
//! - equality (`PartialEq`), structural
//! - `transition`: interpolate between two computed values, `None` when the
//!   two sides cannot be interpolated
//! - printing (`Display`), canonical CSS text

use std::fmt;
use std::rc::Rc;

use crate::css::properties::PropertyId;
use crate::css::provider::StyleProvider;
use crate::css::style::ComputedStyle;

/// Define a keyword enum backed by a `const` name table indexed by variant.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $css:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];
            const NAMES: &'static [&'static str] = &[$($css,)+];

            pub fn name(self) -> &'static str {
                Self::NAMES[self as usize]
            }

            /// Consume one of the keywords if it is next.
            pub fn try_parse(parser: &mut $crate::css::parser::Parser) -> Option<Self> {
                parser.try_ident_of(Self::NAMES).map(|i| Self::ALL[i])
            }

            pub fn parse(
                parser: &mut $crate::css::parser::Parser,
            ) -> Result<Self, $crate::css::parser::ParseError> {
                match Self::try_parse(parser) {
                    Some(value) => Ok(value),
                    None => Err(parser.error(concat!("expected ", stringify!($name)))),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub mod bg_size;
pub mod border;
pub mod calc;
pub mod color;
pub mod corner;
pub mod enums;
pub mod font_size;
pub mod image;
pub mod line_height;
pub mod matrix;
pub mod number;
pub mod position;
pub mod repeat;
pub mod shadow;
pub mod transform;

pub use bg_size::BgSizeValue;
pub use border::BorderValue;
pub use calc::CalcValue;
pub use color::{ColorValue, Rgba};
pub use corner::CornerValue;
pub use enums::{Area, BlendMode, BorderStyle, FontWeightKeyword};
pub use font_size::FontSizeKeyword;
pub use image::{CssImage, ImageValue};
pub use line_height::LineHeight;
pub use matrix::Matrix4;
pub use number::{Dimension, NumberFlags, Unit};
pub use position::PositionValue;
pub use repeat::{BackgroundRepeat, BorderImageRepeat, BorderRepeatStyle, RepeatStyle};
pub use shadow::{Shadow, ShadowsValue};
pub use transform::{Transform, TransformValue};

// ---------------------------------------------------------------------------
// ComputeContext
// ---------------------------------------------------------------------------

/// Everything a value needs to compute itself.
///
/// `font_size` and `color` are the style's own computed values; they are
/// filled in before the properties that depend on them are computed.
#[derive(Clone, Copy)]
pub struct ComputeContext<'a> {
    pub provider: &'a dyn StyleProvider,
    pub parent: Option<&'a ComputedStyle>,
    pub dpi: f64,
    pub font_size: f64,
    pub color: Rgba,
}

impl<'a> ComputeContext<'a> {
    /// Context for a style with no parent.
    pub fn root(provider: &'a dyn StyleProvider) -> Self {
        Self::new(provider, None)
    }

    /// Context seeded from the parent's values (or the defaults).
    pub fn new(provider: &'a dyn StyleProvider, parent: Option<&'a ComputedStyle>) -> Self {
        let dpi = parent.map_or_else(|| provider.settings().dpi, ComputedStyle::dpi);
        let mut ctx = Self {
            provider,
            parent,
            dpi,
            font_size: 0.0,
            color: Rgba::WHITE,
        };
        ctx.font_size = ctx.parent_font_size();
        ctx.color = ctx.parent_color();
        ctx
    }

    /// The provider's default font size in px at the context's DPI.
    pub fn default_font_size(&self) -> f64 {
        self.provider.settings().default_font_size_px(self.dpi)
    }

    pub fn parent_font_size(&self) -> f64 {
        self.parent
            .map_or_else(|| self.default_font_size(), ComputedStyle::font_size)
    }

    pub fn parent_color(&self) -> Rgba {
        self.parent.map_or(Rgba::WHITE, ComputedStyle::color)
    }

    pub fn parent_font_weight(&self) -> f64 {
        self.parent.map_or(400.0, ComputedStyle::font_weight)
    }
}

// ---------------------------------------------------------------------------
// CssValue
// ---------------------------------------------------------------------------

/// A CSS value of any kind.
#[derive(Debug, Clone)]
pub enum CssValue {
    Number(Dimension),
    Calc(Rc<CalcValue>),
    Transform(TransformValue),
    Border(Rc<BorderValue>),
    Corner(Rc<CornerValue>),
    Position(Rc<PositionValue>),
    Repeat(BackgroundRepeat),
    BorderRepeat(BorderImageRepeat),
    LineHeight(LineHeight),
    FontSize(FontSizeKeyword),
    FontWeight(FontWeightKeyword),
    BgSize(Rc<BgSizeValue>),
    Color(ColorValue),
    Shadows(ShadowsValue),
    Image(ImageValue),
    BorderStyle(BorderStyle),
    BlendMode(BlendMode),
    Area(Area),
    Array(Rc<[CssValue]>),
}

impl CssValue {
    pub fn px(value: f64) -> CssValue {
        CssValue::Number(Dimension::px(value))
    }

    pub fn number(value: f64) -> CssValue {
        CssValue::Number(Dimension::number(value))
    }

    pub fn percent(value: f64) -> CssValue {
        CssValue::Number(Dimension::percent(value))
    }

    pub fn array(items: Vec<CssValue>) -> CssValue {
        CssValue::Array(Rc::from(items))
    }

    /// Whether computing this value would leave it unchanged.
    pub fn is_computed(&self) -> bool {
        match self {
            CssValue::Number(d) => d.is_computed(),
            CssValue::Calc(c) => c.is_computed(),
            CssValue::Transform(t) => t.is_computed(),
            CssValue::Border(b) => b.is_computed(),
            CssValue::Corner(c) => c.is_computed(),
            CssValue::Position(p) => p.is_computed(),
            CssValue::LineHeight(l) => l.is_computed(),
            CssValue::FontSize(_) | CssValue::FontWeight(_) => false,
            CssValue::BgSize(b) => b.is_computed(),
            CssValue::Color(c) => c.is_computed(),
            CssValue::Shadows(s) => s.is_computed(),
            CssValue::Image(i) => i.is_computed(),
            CssValue::Array(items) => items.iter().all(CssValue::is_computed),
            CssValue::Repeat(_)
            | CssValue::BorderRepeat(_)
            | CssValue::BorderStyle(_)
            | CssValue::BlendMode(_)
            | CssValue::Area(_) => true,
        }
    }

    /// Resolve the value for `property` against `ctx`.
    pub fn compute(&self, property: PropertyId, ctx: &ComputeContext<'_>) -> CssValue {
        // Percentages are final everywhere except font-size, where they
        // resolve against the parent's font size.
        if self.is_computed() && property != PropertyId::FontSize {
            log::trace!("{}: '{self}' is already computed", property.name());
            return self.clone();
        }
        match self {
            CssValue::Number(d) => CssValue::Number(d.compute(property, ctx)),
            CssValue::Calc(c) => c.compute(property, ctx),
            CssValue::Transform(t) => CssValue::Transform(t.compute(property, ctx)),
            CssValue::Border(b) => CssValue::Border(Rc::new(b.compute(property, ctx))),
            CssValue::Corner(c) => CssValue::Corner(Rc::new(c.compute(property, ctx))),
            CssValue::Position(p) => CssValue::Position(Rc::new(p.compute(property, ctx))),
            CssValue::LineHeight(l) => CssValue::LineHeight(l.compute(ctx)),
            CssValue::FontSize(k) => CssValue::Number(k.compute(ctx)),
            CssValue::FontWeight(k) => CssValue::number(k.resolve(ctx.parent_font_weight())),
            CssValue::BgSize(b) => CssValue::BgSize(Rc::new(b.compute(property, ctx))),
            CssValue::Color(c) => CssValue::Color(c.compute(property, ctx)),
            CssValue::Shadows(s) => CssValue::Shadows(s.compute(property, ctx)),
            CssValue::Image(i) => CssValue::Image(i.compute(ctx)),
            CssValue::Array(items) => {
                CssValue::Array(items.iter().map(|v| v.compute(property, ctx)).collect())
            }
            CssValue::Repeat(_)
            | CssValue::BorderRepeat(_)
            | CssValue::BorderStyle(_)
            | CssValue::BlendMode(_)
            | CssValue::Area(_) => self.clone(),
        }
    }

    /// Interpolate towards `end`. Equal values transition to themselves.
    pub fn transition(
        &self,
        end: &CssValue,
        property: PropertyId,
        progress: f64,
    ) -> Option<CssValue> {
        if self == end {
            return Some(self.clone());
        }
        match (self, end) {
            (
                CssValue::Number(_) | CssValue::Calc(_),
                CssValue::Number(_) | CssValue::Calc(_),
            ) => number::transition_numbers(self, end, progress),
            (CssValue::Transform(a), CssValue::Transform(b)) => a
                .transition(b, property, progress)
                .map(CssValue::Transform),
            (CssValue::Border(a), CssValue::Border(b)) => a
                .transition(b, property, progress)
                .map(|v| CssValue::Border(Rc::new(v))),
            (CssValue::Corner(a), CssValue::Corner(b)) => a
                .transition(b, property, progress)
                .map(|v| CssValue::Corner(Rc::new(v))),
            (CssValue::Position(a), CssValue::Position(b)) => a
                .transition(b, property, progress)
                .map(|v| CssValue::Position(Rc::new(v))),
            (CssValue::LineHeight(a), CssValue::LineHeight(b)) => {
                a.transition(b, progress).map(CssValue::LineHeight)
            }
            (CssValue::BgSize(a), CssValue::BgSize(b)) => a
                .transition(b, property, progress)
                .map(|v| CssValue::BgSize(Rc::new(v))),
            (CssValue::Color(a), CssValue::Color(b)) => {
                a.transition(b, progress).map(CssValue::Color)
            }
            (CssValue::Shadows(a), CssValue::Shadows(b)) => a
                .transition(b, property, progress)
                .map(CssValue::Shadows),
            (CssValue::Array(a), CssValue::Array(b)) => transition_arrays(a, b, property, progress),
            _ => None,
        }
    }

    /// Numeric value with percentages resolved against `one_hundred_percent`.
    ///
    /// Non-numeric values read as zero.
    pub fn get(&self, one_hundred_percent: f64) -> f64 {
        match self {
            CssValue::Number(d) => d.get(one_hundred_percent),
            CssValue::Calc(c) => c.get(one_hundred_percent),
            _ => 0.0,
        }
    }

    /// Element `i` of an array, wrapping around; non-arrays are their own
    /// single element.
    pub fn nth(&self, i: usize) -> &CssValue {
        match self {
            CssValue::Array(items) if !items.is_empty() => &items[i % items.len()],
            _ => self,
        }
    }

    /// Number of elements (1 for non-arrays).
    pub fn len(&self) -> usize {
        match self {
            CssValue::Array(items) => items.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The literal color, if this is a computed color.
    pub fn rgba(&self) -> Option<Rgba> {
        match self {
            CssValue::Color(c) => c.rgba(),
            _ => None,
        }
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Arrays of different lengths are repeated up to their least common multiple.
fn transition_arrays(
    start: &[CssValue],
    end: &[CssValue],
    property: PropertyId,
    progress: f64,
) -> Option<CssValue> {
    if start.is_empty() || end.is_empty() {
        return None;
    }
    let len = start.len() / gcd(start.len(), end.len()) * end.len();
    let items = (0..len)
        .map(|i| start[i % start.len()].transition(&end[i % end.len()], property, progress))
        .collect::<Option<Vec<_>>>()?;
    Some(CssValue::array(items))
}

impl PartialEq for CssValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CssValue::Number(a), CssValue::Number(b)) => a == b,
            (CssValue::Calc(a), CssValue::Calc(b)) => a == b,
            (CssValue::Transform(a), CssValue::Transform(b)) => a == b,
            (CssValue::Border(a), CssValue::Border(b)) => a == b,
            (CssValue::Corner(a), CssValue::Corner(b)) => a == b,
            (CssValue::Position(a), CssValue::Position(b)) => a == b,
            (CssValue::Repeat(a), CssValue::Repeat(b)) => a == b,
            (CssValue::BorderRepeat(a), CssValue::BorderRepeat(b)) => a == b,
            (CssValue::LineHeight(a), CssValue::LineHeight(b)) => a == b,
            (CssValue::FontSize(a), CssValue::FontSize(b)) => a == b,
            (CssValue::FontWeight(a), CssValue::FontWeight(b)) => a == b,
            (CssValue::BgSize(a), CssValue::BgSize(b)) => a == b,
            (CssValue::Color(a), CssValue::Color(b)) => a == b,
            (CssValue::Shadows(a), CssValue::Shadows(b)) => a == b,
            (CssValue::Image(a), CssValue::Image(b)) => a == b,
            (CssValue::BorderStyle(a), CssValue::BorderStyle(b)) => a == b,
            (CssValue::BlendMode(a), CssValue::BlendMode(b)) => a == b,
            (CssValue::Area(a), CssValue::Area(b)) => a == b,
            (CssValue::Array(a), CssValue::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Number(d) => write!(f, "{d}"),
            CssValue::Calc(c) => write!(f, "{c}"),
            CssValue::Transform(t) => write!(f, "{t}"),
            CssValue::Border(b) => write!(f, "{b}"),
            CssValue::Corner(c) => write!(f, "{c}"),
            CssValue::Position(p) => write!(f, "{p}"),
            CssValue::Repeat(r) => write!(f, "{r}"),
            CssValue::BorderRepeat(r) => write!(f, "{r}"),
            CssValue::LineHeight(l) => write!(f, "{l}"),
            CssValue::FontSize(k) => write!(f, "{k}"),
            CssValue::FontWeight(k) => write!(f, "{k}"),
            CssValue::BgSize(b) => write!(f, "{b}"),
            CssValue::Color(c) => write!(f, "{c}"),
            CssValue::Shadows(s) => write!(f, "{s}"),
            CssValue::Image(i) => write!(f, "{i}"),
            CssValue::BorderStyle(s) => write!(f, "{s}"),
            CssValue::BlendMode(m) => write!(f, "{m}"),
            CssValue::Area(a) => write!(f, "{a}"),
            CssValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
