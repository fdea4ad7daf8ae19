//! Computed styles.
//!
//! A [`ComputedStyle`] holds one computed value per [`PropertyId`], split
//! into value groups. Each group sits behind its own `Rc`; a group that
//! computes to the same values as the parent's is shared with the parent
//! instead of allocated again.

use std::fmt;
use std::rc::Rc;

use crate::css::properties::{DeclaredValue, Group, PropertyId};
use crate::css::provider::StyleProvider;
use crate::css::tree::DeclarationBlock;
use crate::css::values::{
    Area, BorderStyle, ComputeContext, CornerValue, CssValue, Rgba, ShadowsValue,
    TransformValue,
};
use crate::geometry::{Side, Sides};

const GROUP_COUNT: usize = Group::ALL.len();

/// Fully resolved values for every property.
#[derive(Debug, Clone)]
pub struct ComputedStyle {
    groups: [Rc<[CssValue]>; GROUP_COUNT],
}

impl ComputedStyle {
    /// The style of a node with no declarations and no parent.
    pub fn initial(provider: &dyn StyleProvider) -> Self {
        Self::compute(&DeclarationBlock::default(), provider, None)
    }

    /// Cascade `declarations` over `parent` and compute every property.
    pub fn compute(
        declarations: &DeclarationBlock,
        provider: &dyn StyleProvider,
        parent: Option<&ComputedStyle>,
    ) -> Self {
        let mut ctx = ComputeContext::new(provider, parent);
        let mut values: Vec<CssValue> = Vec::with_capacity(PropertyId::ALL.len());

        for &property in PropertyId::ALL {
            let declared = declarations.get(property);
            let inherit = match declared {
                Some(DeclaredValue::Inherit) => true,
                Some(DeclaredValue::Unset) | None => property.is_inherited(),
                _ => false,
            };
            let mut value = match (declared, parent) {
                (_, Some(parent)) if inherit => parent.get(property).clone(),
                (Some(DeclaredValue::Value(v)), _) => v.compute(property, &ctx),
                _ => initial_value(property, provider).compute(property, &ctx),
            };

            if let Some(style) = side_style(property) {
                let style = &values[style as usize];
                if matches!(style, CssValue::BorderStyle(s) if s.is_invisible()) {
                    value = CssValue::px(0.0);
                }
            }

            match property {
                PropertyId::Dpi => ctx.dpi = value.get(0.0),
                PropertyId::Color => ctx.color = value.rgba().unwrap_or(Rgba::WHITE),
                PropertyId::FontSize => ctx.font_size = value.get(0.0),
                _ => {}
            }
            values.push(value);
        }

        let groups = Group::ALL.map(|group| {
            let slice: Vec<CssValue> = group
                .properties()
                .map(|p| values[p as usize].clone())
                .collect();
            match parent {
                Some(parent) if *parent.groups[group as usize] == *slice => {
                    Rc::clone(&parent.groups[group as usize])
                }
                _ => Rc::from(slice),
            }
        });
        Self { groups }
    }

    /// The computed value of `property`.
    pub fn get(&self, property: PropertyId) -> &CssValue {
        &self.groups[property.group() as usize][property.slot()]
    }

    /// Whether both styles share the same allocation for `group`.
    pub fn shares_group(&self, other: &ComputedStyle, group: Group) -> bool {
        Rc::ptr_eq(&self.groups[group as usize], &other.groups[group as usize])
    }

    /// Interpolate every property towards `end`.
    ///
    /// Properties that cannot interpolate snap to the end value; groups that
    /// are shared between the two styles stay shared.
    pub fn transition(&self, end: &ComputedStyle, progress: f64) -> ComputedStyle {
        let groups = Group::ALL.map(|group| {
            let (a, b) = (&self.groups[group as usize], &end.groups[group as usize]);
            if Rc::ptr_eq(a, b) {
                return Rc::clone(a);
            }
            group
                .properties()
                .zip(a.iter().zip(b.iter()))
                .map(|(property, (a, b))| {
                    a.transition(b, property, progress).unwrap_or_else(|| {
                        log::trace!("{property}: cannot interpolate '{a}' to '{b}'");
                        b.clone()
                    })
                })
                .collect()
        });
        ComputedStyle { groups }
    }

    // ── Typed accessors ─────────────────────────────────────────────────

    pub fn dpi(&self) -> f64 {
        self.get(PropertyId::Dpi).get(0.0)
    }

    pub fn font_size(&self) -> f64 {
        self.get(PropertyId::FontSize).get(0.0)
    }

    pub fn color(&self) -> Rgba {
        self.get(PropertyId::Color).rgba().unwrap_or(Rgba::WHITE)
    }

    pub fn font_weight(&self) -> f64 {
        self.get(PropertyId::FontWeight).get(0.0)
    }

    /// Line height in px, `None` for `normal`.
    pub fn line_height(&self) -> Option<f64> {
        match self.get(PropertyId::LineHeight) {
            CssValue::LineHeight(l) => l.resolve(self.font_size()),
            _ => None,
        }
    }

    pub fn opacity(&self) -> f64 {
        self.get(PropertyId::Opacity).get(0.0)
    }

    pub fn transform(&self) -> TransformValue {
        match self.get(PropertyId::Transform) {
            CssValue::Transform(t) => t.clone(),
            _ => TransformValue::none(),
        }
    }

    pub fn box_shadow(&self) -> ShadowsValue {
        match self.get(PropertyId::BoxShadow) {
            CssValue::Shadows(s) => s.clone(),
            _ => ShadowsValue::none(),
        }
    }

    pub fn margin(&self) -> Sides<f64> {
        self.lengths([
            PropertyId::MarginTop,
            PropertyId::MarginRight,
            PropertyId::MarginBottom,
            PropertyId::MarginLeft,
        ])
    }

    pub fn padding(&self) -> Sides<f64> {
        self.lengths([
            PropertyId::PaddingTop,
            PropertyId::PaddingRight,
            PropertyId::PaddingBottom,
            PropertyId::PaddingLeft,
        ])
    }

    pub fn border_widths(&self) -> Sides<f64> {
        self.lengths([
            PropertyId::BorderTopWidth,
            PropertyId::BorderRightWidth,
            PropertyId::BorderBottomWidth,
            PropertyId::BorderLeftWidth,
        ])
    }

    pub fn border_styles(&self) -> Sides<BorderStyle> {
        Sides::from_array(BORDER_STYLES.map(|p| self.border_style_of(p)))
    }

    pub fn border_colors(&self) -> Sides<Rgba> {
        Sides::from_array(
            [
                PropertyId::BorderTopColor,
                PropertyId::BorderRightColor,
                PropertyId::BorderBottomColor,
                PropertyId::BorderLeftColor,
            ]
            .map(|p| self.get(p).rgba().unwrap_or(Rgba::TRANSPARENT)),
        )
    }

    /// Corner radii in CSS order: top-left, top-right, bottom-right,
    /// bottom-left.
    pub fn border_radii(&self) -> [CornerValue; 4] {
        [
            PropertyId::BorderTopLeftRadius,
            PropertyId::BorderTopRightRadius,
            PropertyId::BorderBottomRightRadius,
            PropertyId::BorderBottomLeftRadius,
        ]
        .map(|p| match self.get(p) {
            CssValue::Corner(c) => (**c).clone(),
            _ => CornerValue::default(),
        })
    }

    pub fn outline_style(&self) -> BorderStyle {
        self.border_style_of(PropertyId::OutlineStyle)
    }

    pub fn outline_width(&self) -> f64 {
        self.get(PropertyId::OutlineWidth).get(0.0)
    }

    pub fn outline_offset(&self) -> f64 {
        self.get(PropertyId::OutlineOffset).get(0.0)
    }

    pub fn outline_color(&self) -> Rgba {
        self.get(PropertyId::OutlineColor)
            .rgba()
            .unwrap_or(Rgba::TRANSPARENT)
    }

    pub fn background_color(&self) -> Rgba {
        self.get(PropertyId::BackgroundColor)
            .rgba()
            .unwrap_or(Rgba::TRANSPARENT)
    }

    /// `background-clip` of layer `i` (wrapping).
    pub fn background_clip(&self, layer: usize) -> Area {
        self.area_of(PropertyId::BackgroundClip, layer, Area::BorderBox)
    }

    /// `background-origin` of layer `i` (wrapping).
    pub fn background_origin(&self, layer: usize) -> Area {
        self.area_of(PropertyId::BackgroundOrigin, layer, Area::PaddingBox)
    }

    pub fn min_width(&self) -> f64 {
        self.get(PropertyId::MinWidth).get(0.0)
    }

    pub fn min_height(&self) -> f64 {
        self.get(PropertyId::MinHeight).get(0.0)
    }

    fn lengths(&self, properties: [PropertyId; 4]) -> Sides<f64> {
        Sides::from_array(properties.map(|p| self.get(p).get(0.0)))
    }

    fn border_style_of(&self, property: PropertyId) -> BorderStyle {
        match self.get(property) {
            CssValue::BorderStyle(s) => *s,
            _ => BorderStyle::None,
        }
    }

    fn area_of(&self, property: PropertyId, layer: usize, default: Area) -> Area {
        match self.get(property).nth(layer) {
            CssValue::Area(a) => *a,
            _ => default,
        }
    }
}

const BORDER_STYLES: [PropertyId; 4] = [
    PropertyId::BorderTopStyle,
    PropertyId::BorderRightStyle,
    PropertyId::BorderBottomStyle,
    PropertyId::BorderLeftStyle,
];

/// The style property whose `none`/`hidden` zeroes this width property.
fn side_style(property: PropertyId) -> Option<PropertyId> {
    match property {
        PropertyId::BorderTopWidth => Some(BORDER_STYLES[Side::Top.index()]),
        PropertyId::BorderRightWidth => Some(BORDER_STYLES[Side::Right.index()]),
        PropertyId::BorderBottomWidth => Some(BORDER_STYLES[Side::Bottom.index()]),
        PropertyId::BorderLeftWidth => Some(BORDER_STYLES[Side::Left.index()]),
        PropertyId::OutlineWidth => Some(PropertyId::OutlineStyle),
        _ => None,
    }
}

fn initial_value(property: PropertyId, provider: &dyn StyleProvider) -> CssValue {
    match property {
        PropertyId::Dpi => CssValue::number(provider.settings().dpi),
        _ => property.initial_value(),
    }
}

impl PartialEq for ComputedStyle {
    fn eq(&self, other: &Self) -> bool {
        self.groups
            .iter()
            .zip(&other.groups)
            .all(|(a, b)| Rc::ptr_eq(a, b) || a == b)
    }
}

impl fmt::Display for ComputedStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &property in PropertyId::ALL {
            writeln!(f, "{property}: {};", self.get(property))?;
        }
        Ok(())
    }
}
