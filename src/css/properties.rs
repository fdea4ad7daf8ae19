//! Property table and declaration parsing.
//!
//! Every longhand the style system knows is a [`PropertyId`], with its
//! name, its style group, whether it inherits, its initial value and its
//! grammar. Shorthands (`margin`, `border`, `background`, ...) expand into
//! longhands in [`parse_declaration`].

use std::fmt;

use crate::css::parser::{ParseError, Parser};
use crate::css::tokenizer::Token;
use crate::css::values::border::expand_sides;
use crate::css::values::color::{has_color, parse_color};
use crate::css::values::corner::RADIUS;
use crate::css::values::number::{parse_number, NumberFlags};
use crate::css::values::transform::parse_transform;
use crate::css::values::{
    Area, BackgroundRepeat, BgSizeValue, BlendMode, BorderImageRepeat, BorderStyle,
    BorderValue, ColorValue, CornerValue, CssValue, FontSizeKeyword, FontWeightKeyword,
    ImageValue, LineHeight, PositionValue, Rgba, ShadowsValue, TransformValue,
};

/// Errors from property parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
    #[error(transparent)]
    Syntax(#[from] ParseError),
}

impl PropertyError {
    fn invalid(property: &str, error: ParseError) -> Self {
        PropertyError::InvalidValue {
            property: property.into(),
            message: error.to_string(),
        }
    }
}

/// Value groups of a computed style. Each is shared as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Core,
    Font,
    Background,
    Border,
    Outline,
    Size,
    Other,
}

impl Group {
    pub const ALL: [Group; 7] = [
        Group::Core,
        Group::Font,
        Group::Background,
        Group::Border,
        Group::Outline,
        Group::Size,
        Group::Other,
    ];

    /// The group's properties in slot order.
    pub fn properties(self) -> impl Iterator<Item = PropertyId> {
        PropertyId::ALL.iter().copied().filter(move |p| p.group() == self)
    }
}

macro_rules! properties {
    ($($variant:ident => $name:literal, $group:ident, $inherit:literal;)+) => {
        /// A longhand property.
        ///
        /// Declaration order is compute order: properties other values
        /// depend on (`-gtk-dpi`, `color`, `font-size`) come first.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum PropertyId {
            $($variant,)+
        }

        impl PropertyId {
            pub const ALL: &'static [PropertyId] = &[$(PropertyId::$variant,)+];
            const NAMES: &'static [&'static str] = &[$($name,)+];
            const GROUPS: &'static [Group] = &[$(Group::$group,)+];
            const INHERITED: &'static [bool] = &[$($inherit,)+];
        }
    };
}

properties! {
    Dpi => "-gtk-dpi", Core, true;
    Color => "color", Core, true;
    FontSize => "font-size", Font, true;
    LineHeight => "line-height", Font, true;
    FontWeight => "font-weight", Font, true;
    BackgroundColor => "background-color", Background, false;
    BoxShadow => "box-shadow", Background, false;
    BackgroundClip => "background-clip", Background, false;
    BackgroundOrigin => "background-origin", Background, false;
    BackgroundSize => "background-size", Background, false;
    BackgroundPosition => "background-position", Background, false;
    BackgroundRepeat => "background-repeat", Background, false;
    BackgroundImage => "background-image", Background, false;
    BackgroundBlendMode => "background-blend-mode", Background, false;
    BorderTopStyle => "border-top-style", Border, false;
    BorderTopWidth => "border-top-width", Border, false;
    BorderRightStyle => "border-right-style", Border, false;
    BorderRightWidth => "border-right-width", Border, false;
    BorderBottomStyle => "border-bottom-style", Border, false;
    BorderBottomWidth => "border-bottom-width", Border, false;
    BorderLeftStyle => "border-left-style", Border, false;
    BorderLeftWidth => "border-left-width", Border, false;
    BorderTopLeftRadius => "border-top-left-radius", Border, false;
    BorderTopRightRadius => "border-top-right-radius", Border, false;
    BorderBottomRightRadius => "border-bottom-right-radius", Border, false;
    BorderBottomLeftRadius => "border-bottom-left-radius", Border, false;
    BorderTopColor => "border-top-color", Border, false;
    BorderRightColor => "border-right-color", Border, false;
    BorderBottomColor => "border-bottom-color", Border, false;
    BorderLeftColor => "border-left-color", Border, false;
    BorderImageSource => "border-image-source", Border, false;
    BorderImageRepeat => "border-image-repeat", Border, false;
    BorderImageSlice => "border-image-slice", Border, false;
    BorderImageWidth => "border-image-width", Border, false;
    OutlineStyle => "outline-style", Outline, false;
    OutlineWidth => "outline-width", Outline, false;
    OutlineColor => "outline-color", Outline, false;
    OutlineOffset => "outline-offset", Outline, false;
    MarginTop => "margin-top", Size, false;
    MarginRight => "margin-right", Size, false;
    MarginBottom => "margin-bottom", Size, false;
    MarginLeft => "margin-left", Size, false;
    PaddingTop => "padding-top", Size, false;
    PaddingRight => "padding-right", Size, false;
    PaddingBottom => "padding-bottom", Size, false;
    PaddingLeft => "padding-left", Size, false;
    MinWidth => "min-width", Size, false;
    MinHeight => "min-height", Size, false;
    Transform => "transform", Other, false;
    Opacity => "opacity", Other, false;
}

const LENGTH: NumberFlags = NumberFlags::LENGTH;
const POSITIVE_LENGTH: NumberFlags = NumberFlags::LENGTH.union(NumberFlags::POSITIVE_ONLY);

impl PropertyId {
    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    pub fn from_name(name: &str) -> Option<PropertyId> {
        Self::NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| Self::ALL[i])
    }

    pub fn group(self) -> Group {
        Self::GROUPS[self as usize]
    }

    /// Index of the property within its group.
    pub fn slot(self) -> usize {
        let group = self.group();
        let index = self as usize;
        let first = (0..index)
            .rev()
            .take_while(|&i| Self::GROUPS[i] == group)
            .last()
            .unwrap_or(index);
        index - first
    }

    pub fn is_inherited(self) -> bool {
        Self::INHERITED[self as usize]
    }

    /// The initial (specified) value.
    ///
    /// The root style takes `-gtk-dpi` from the provider's settings instead.
    pub fn initial_value(self) -> CssValue {
        use PropertyId as P;
        match self {
            P::Dpi => CssValue::number(96.0),
            P::Color => CssValue::Color(Rgba::WHITE.into()),
            P::FontSize => CssValue::FontSize(FontSizeKeyword::Medium),
            P::LineHeight => CssValue::LineHeight(LineHeight::Normal),
            P::FontWeight => CssValue::number(400.0),
            P::BackgroundColor => CssValue::Color(Rgba::TRANSPARENT.into()),
            P::BoxShadow => CssValue::Shadows(ShadowsValue::none()),
            P::BackgroundClip => CssValue::array(vec![CssValue::Area(Area::BorderBox)]),
            P::BackgroundOrigin => CssValue::array(vec![CssValue::Area(Area::PaddingBox)]),
            P::BackgroundSize => CssValue::array(vec![initial_bg_size()]),
            P::BackgroundPosition => CssValue::array(vec![initial_position()]),
            P::BackgroundRepeat => {
                CssValue::array(vec![CssValue::Repeat(BackgroundRepeat::default())])
            }
            P::BackgroundImage => CssValue::array(vec![CssValue::Image(ImageValue::none())]),
            P::BackgroundBlendMode => CssValue::array(vec![CssValue::BlendMode(BlendMode::Normal)]),
            P::BorderTopStyle
            | P::BorderRightStyle
            | P::BorderBottomStyle
            | P::BorderLeftStyle
            | P::OutlineStyle => CssValue::BorderStyle(BorderStyle::None),
            P::BorderTopWidth
            | P::BorderRightWidth
            | P::BorderBottomWidth
            | P::BorderLeftWidth
            | P::OutlineWidth
            | P::OutlineOffset
            | P::MarginTop
            | P::MarginRight
            | P::MarginBottom
            | P::MarginLeft
            | P::PaddingTop
            | P::PaddingRight
            | P::PaddingBottom
            | P::PaddingLeft
            | P::MinWidth
            | P::MinHeight => CssValue::px(0.0),
            P::BorderTopLeftRadius
            | P::BorderTopRightRadius
            | P::BorderBottomRightRadius
            | P::BorderBottomLeftRadius => CssValue::Corner(CornerValue::default().into()),
            P::BorderTopColor
            | P::BorderRightColor
            | P::BorderBottomColor
            | P::BorderLeftColor
            | P::OutlineColor => CssValue::Color(ColorValue::CurrentColor),
            P::BorderImageSource => CssValue::Image(ImageValue::none()),
            P::BorderImageRepeat => CssValue::BorderRepeat(BorderImageRepeat::default()),
            P::BorderImageSlice => {
                CssValue::Border(BorderValue::uniform(CssValue::percent(100.0)).into())
            }
            P::BorderImageWidth => {
                CssValue::Border(BorderValue::uniform(CssValue::number(1.0)).into())
            }
            P::Transform => CssValue::Transform(TransformValue::none()),
            P::Opacity => CssValue::number(1.0),
        }
    }

    /// Parse a value of this property's grammar.
    pub fn parse_value(self, parser: &mut Parser) -> Result<CssValue, ParseError> {
        use PropertyId as P;
        match self {
            P::Dpi => parse_number(parser, NumberFlags::NUMBER | NumberFlags::POSITIVE_ONLY),
            P::Color
            | P::BackgroundColor
            | P::BorderTopColor
            | P::BorderRightColor
            | P::BorderBottomColor
            | P::BorderLeftColor
            | P::OutlineColor => parse_color(parser).map(CssValue::Color),
            P::FontSize => parse_font_size(parser),
            P::LineHeight => LineHeight::parse(parser).map(CssValue::LineHeight),
            P::FontWeight => parse_font_weight(parser),
            P::BoxShadow => ShadowsValue::parse(parser).map(CssValue::Shadows),
            P::BackgroundClip | P::BackgroundOrigin => {
                parse_layers(parser, |p| Area::parse(p).map(CssValue::Area))
            }
            P::BackgroundSize => parse_layers(parser, |p| {
                BgSizeValue::parse(p).map(|v| CssValue::BgSize(v.into()))
            }),
            P::BackgroundPosition => parse_layers(parser, |p| {
                PositionValue::parse(p).map(|v| CssValue::Position(v.into()))
            }),
            P::BackgroundRepeat => {
                parse_layers(parser, |p| BackgroundRepeat::parse(p).map(CssValue::Repeat))
            }
            P::BackgroundImage => parse_layers(parser, |p| ImageValue::parse(p).map(CssValue::Image)),
            P::BackgroundBlendMode => {
                parse_layers(parser, |p| BlendMode::parse(p).map(CssValue::BlendMode))
            }
            P::BorderTopStyle
            | P::BorderRightStyle
            | P::BorderBottomStyle
            | P::BorderLeftStyle
            | P::OutlineStyle => BorderStyle::parse(parser).map(CssValue::BorderStyle),
            P::BorderTopWidth
            | P::BorderRightWidth
            | P::BorderBottomWidth
            | P::BorderLeftWidth
            | P::OutlineWidth => parse_border_width(parser),
            P::BorderTopLeftRadius
            | P::BorderTopRightRadius
            | P::BorderBottomRightRadius
            | P::BorderBottomLeftRadius => {
                CornerValue::parse(parser).map(|v| CssValue::Corner(v.into()))
            }
            P::BorderImageSource => ImageValue::parse(parser).map(CssValue::Image),
            P::BorderImageRepeat => BorderImageRepeat::parse(parser).map(CssValue::BorderRepeat),
            P::BorderImageSlice => parse_border_image_slice(parser),
            P::BorderImageWidth => parse_border_image_width(parser),
            P::OutlineOffset | P::MarginTop | P::MarginRight | P::MarginBottom | P::MarginLeft => {
                parse_number(parser, LENGTH)
            }
            P::PaddingTop
            | P::PaddingRight
            | P::PaddingBottom
            | P::PaddingLeft
            | P::MinWidth
            | P::MinHeight => parse_number(parser, POSITIVE_LENGTH),
            P::Transform => parse_transform(parser).map(CssValue::Transform),
            P::Opacity => parse_number(parser, NumberFlags::NUMBER),
        }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn initial_bg_size() -> CssValue {
    CssValue::BgSize(BgSizeValue::default().into())
}

fn initial_position() -> CssValue {
    CssValue::Position(PositionValue::default().into())
}

fn parse_layers(
    parser: &mut Parser,
    item: impl FnMut(&mut Parser) -> Result<CssValue, ParseError>,
) -> Result<CssValue, ParseError> {
    parser.parse_comma_list(item).map(CssValue::array)
}

fn parse_font_size(parser: &mut Parser) -> Result<CssValue, ParseError> {
    if let Some(keyword) = FontSizeKeyword::try_parse(parser) {
        return Ok(CssValue::FontSize(keyword));
    }
    parse_number(
        parser,
        NumberFlags::LENGTH
            | NumberFlags::PERCENT
            | NumberFlags::POSITIVE_ONLY
            | NumberFlags::NUMBER_AS_PIXELS,
    )
}

fn parse_font_weight(parser: &mut Parser) -> Result<CssValue, ParseError> {
    if let Some(keyword) = FontWeightKeyword::try_parse(parser) {
        return Ok(CssValue::FontWeight(keyword));
    }
    if parser.try_ident("normal") {
        return Ok(CssValue::number(400.0));
    }
    if parser.try_ident("bold") {
        return Ok(CssValue::number(700.0));
    }
    let value = parse_number(parser, NumberFlags::NUMBER)?;
    let weight = value.get(0.0);
    if !(1.0..=1000.0).contains(&weight) {
        return Err(parser.invalid("font weight out of range"));
    }
    Ok(value)
}

const BORDER_WIDTH_KEYWORDS: [(&str, f64); 3] = [("thin", 1.0), ("medium", 3.0), ("thick", 5.0)];

fn has_border_width(parser: &Parser) -> bool {
    parser.has_number()
        || BORDER_WIDTH_KEYWORDS
            .iter()
            .any(|(name, _)| parser.has_ident(name))
}

fn parse_border_width(parser: &mut Parser) -> Result<CssValue, ParseError> {
    for (name, px) in BORDER_WIDTH_KEYWORDS {
        if parser.try_ident(name) {
            return Ok(CssValue::px(px));
        }
    }
    parse_number(parser, POSITIVE_LENGTH)
}

fn parse_border_image_slice(parser: &mut Parser) -> Result<CssValue, ParseError> {
    let flags = NumberFlags::NUMBER | NumberFlags::PERCENT | NumberFlags::POSITIVE_ONLY;
    BorderValue::parse(parser, flags, false, true).map(|v| CssValue::Border(v.into()))
}

fn parse_border_image_width(parser: &mut Parser) -> Result<CssValue, ParseError> {
    let flags = NumberFlags::NUMBER
        | NumberFlags::LENGTH
        | NumberFlags::PERCENT
        | NumberFlags::POSITIVE_ONLY;
    BorderValue::parse(parser, flags, true, false).map(|v| CssValue::Border(v.into()))
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// A declared value, before cascading.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredValue {
    Value(CssValue),
    Inherit,
    Initial,
    /// `inherit` for inherited properties, `initial` otherwise.
    Unset,
}

impl fmt::Display for DeclaredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredValue::Value(v) => write!(f, "{v}"),
            DeclaredValue::Inherit => f.write_str("inherit"),
            DeclaredValue::Initial => f.write_str("initial"),
            DeclaredValue::Unset => f.write_str("unset"),
        }
    }
}

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

fn sides(prefix: &str, suffix: &str) -> [PropertyId; 4] {
    use PropertyId as P;
    match (prefix, suffix) {
        ("margin", _) => [P::MarginTop, P::MarginRight, P::MarginBottom, P::MarginLeft],
        ("padding", _) => [P::PaddingTop, P::PaddingRight, P::PaddingBottom, P::PaddingLeft],
        (_, "style") => [
            P::BorderTopStyle,
            P::BorderRightStyle,
            P::BorderBottomStyle,
            P::BorderLeftStyle,
        ],
        (_, "width") => [
            P::BorderTopWidth,
            P::BorderRightWidth,
            P::BorderBottomWidth,
            P::BorderLeftWidth,
        ],
        _ => [
            P::BorderTopColor,
            P::BorderRightColor,
            P::BorderBottomColor,
            P::BorderLeftColor,
        ],
    }
}

const CORNERS: [PropertyId; 4] = [
    PropertyId::BorderTopLeftRadius,
    PropertyId::BorderTopRightRadius,
    PropertyId::BorderBottomRightRadius,
    PropertyId::BorderBottomLeftRadius,
];

const BORDER_IMAGE: [PropertyId; 4] = [
    PropertyId::BorderImageSource,
    PropertyId::BorderImageSlice,
    PropertyId::BorderImageWidth,
    PropertyId::BorderImageRepeat,
];

const BACKGROUND: [PropertyId; 7] = [
    PropertyId::BackgroundImage,
    PropertyId::BackgroundPosition,
    PropertyId::BackgroundSize,
    PropertyId::BackgroundRepeat,
    PropertyId::BackgroundOrigin,
    PropertyId::BackgroundClip,
    PropertyId::BackgroundColor,
];

/// The longhands a shorthand name expands to, `None` if it is not one.
pub fn shorthand_longhands(name: &str) -> Option<Vec<PropertyId>> {
    let name = name.to_ascii_lowercase();
    let longhands = match name.as_str() {
        "margin" | "padding" | "border-width" | "border-style" | "border-color" => {
            let (prefix, suffix) = name.split_once('-').unwrap_or((name.as_str(), ""));
            sides(prefix, suffix).to_vec()
        }
        "border-radius" => CORNERS.to_vec(),
        "border" => {
            let mut all = Vec::new();
            for suffix in ["width", "style", "color"] {
                all.extend(sides("border", suffix));
            }
            all.extend(BORDER_IMAGE);
            all
        }
        "border-image" => BORDER_IMAGE.to_vec(),
        "outline" => vec![
            PropertyId::OutlineWidth,
            PropertyId::OutlineStyle,
            PropertyId::OutlineColor,
        ],
        "background" => BACKGROUND.to_vec(),
        other => {
            let side = other.strip_prefix("border-")?;
            let i = SIDES.iter().position(|s| *s == side)?;
            vec![
                sides("border", "width")[i],
                sides("border", "style")[i],
                sides("border", "color")[i],
            ]
        }
    };
    Some(longhands)
}

/// Parse the value of declaration `name` up to the end of the value.
///
/// Longhands yield one entry, shorthands one per longhand. The CSS-wide
/// keywords apply to every longhand a shorthand covers.
pub fn parse_declaration(
    name: &str,
    parser: &mut Parser,
) -> Result<Vec<(PropertyId, DeclaredValue)>, PropertyError> {
    let longhands = match PropertyId::from_name(name) {
        Some(id) => vec![id],
        None => shorthand_longhands(name)
            .ok_or_else(|| PropertyError::UnknownProperty(name.to_string()))?,
    };

    for (keyword, value) in [
        ("inherit", DeclaredValue::Inherit),
        ("initial", DeclaredValue::Initial),
        ("unset", DeclaredValue::Unset),
    ] {
        let mark = parser.mark();
        if parser.try_ident(keyword) {
            if parser.is_declaration_end() {
                return Ok(longhands.into_iter().map(|p| (p, value.clone())).collect());
            }
            parser.reset(mark);
        }
    }

    let result = match PropertyId::from_name(name) {
        Some(id) => id.parse_value(parser).map(|v| vec![(id, v)]),
        None => parse_shorthand(&name.to_ascii_lowercase(), parser),
    };
    let values = result.map_err(|e| PropertyError::invalid(name, e))?;
    if !parser.is_declaration_end() {
        return Err(PropertyError::invalid(name, parser.error("unexpected trailing value")));
    }
    Ok(values
        .into_iter()
        .map(|(p, v)| (p, DeclaredValue::Value(v)))
        .collect())
}

fn parse_shorthand(
    name: &str,
    parser: &mut Parser,
) -> Result<Vec<(PropertyId, CssValue)>, ParseError> {
    match name {
        "margin" => parse_four(parser, sides("margin", ""), |p| parse_number(p, LENGTH)),
        "padding" => parse_four(parser, sides("padding", ""), |p| {
            parse_number(p, POSITIVE_LENGTH)
        }),
        "border-width" => parse_four(parser, sides("border", "width"), parse_border_width),
        "border-style" => parse_four(parser, sides("border", "style"), |p| {
            BorderStyle::parse(p).map(CssValue::BorderStyle)
        }),
        "border-color" => parse_four(parser, sides("border", "color"), |p| {
            parse_color(p).map(CssValue::Color)
        }),
        "border-radius" => parse_border_radius(parser),
        "border" => {
            let (width, style, color) = parse_border_side(parser)?;
            let mut values = Vec::new();
            for i in 0..4 {
                values.push((sides("border", "width")[i], width.clone()));
                values.push((sides("border", "style")[i], style.clone()));
                values.push((sides("border", "color")[i], color.clone()));
            }
            values.extend(initial_border_image());
            Ok(values)
        }
        "border-image" => parse_border_image(parser),
        "outline" => {
            let (width, style, color) = parse_border_side(parser)?;
            Ok(vec![
                (PropertyId::OutlineWidth, width),
                (PropertyId::OutlineStyle, style),
                (PropertyId::OutlineColor, color),
            ])
        }
        "background" => parse_background(parser),
        other => {
            let side = other.strip_prefix("border-").unwrap_or(other);
            let Some(i) = SIDES.iter().position(|s| *s == side) else {
                return Err(parser.invalid(format!("unknown shorthand '{other}'")));
            };
            let (width, style, color) = parse_border_side(parser)?;
            Ok(vec![
                (sides("border", "width")[i], width),
                (sides("border", "style")[i], style),
                (sides("border", "color")[i], color),
            ])
        }
    }
}

/// One to four values distributed over four longhands.
fn parse_four(
    parser: &mut Parser,
    longhands: [PropertyId; 4],
    mut item: impl FnMut(&mut Parser) -> Result<CssValue, ParseError>,
) -> Result<Vec<(PropertyId, CssValue)>, ParseError> {
    let mut values = vec![item(parser)?];
    while values.len() < 4 && !parser.is_value_end() {
        values.push(item(parser)?);
    }
    let values = expand_sides(values).ok_or_else(|| parser.error("expected 1 to 4 values"))?;
    Ok(longhands.into_iter().zip(values).collect())
}

/// `<x>{1,4} [ / <y>{1,4} ]?`.
fn parse_border_radius(parser: &mut Parser) -> Result<Vec<(PropertyId, CssValue)>, ParseError> {
    let parse_radii = |parser: &mut Parser| -> Result<[CssValue; 4], ParseError> {
        let mut radii = vec![parse_number(parser, RADIUS)?];
        while radii.len() < 4 && parser.has_number() {
            radii.push(parse_number(parser, RADIUS)?);
        }
        expand_sides(radii).ok_or_else(|| parser.error("expected 1 to 4 radii"))
    };
    let x = parse_radii(parser)?;
    let y = if parser.try_token(Token::Slash) {
        parse_radii(parser)?
    } else {
        x.clone()
    };
    Ok(CORNERS
        .into_iter()
        .zip(x.into_iter().zip(y))
        .map(|(p, (x, y))| (p, CssValue::Corner(CornerValue::new(x, y).into())))
        .collect())
}

/// `<width> || <style> || <color>`, missing parts reset to initial.
fn parse_border_side(parser: &mut Parser) -> Result<(CssValue, CssValue, CssValue), ParseError> {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    while !parser.is_value_end() {
        if width.is_none() && has_border_width(parser) {
            width = Some(parse_border_width(parser)?);
        } else if style.is_none() && BorderStyle::ALL.iter().any(|s| parser.has_ident(s.name())) {
            style = Some(CssValue::BorderStyle(BorderStyle::parse(parser)?));
        } else if color.is_none() && has_color(parser) {
            color = Some(CssValue::Color(parse_color(parser)?));
        } else {
            return Err(parser.error("expected a border width, style or color"));
        }
    }
    if width.is_none() && style.is_none() && color.is_none() {
        return Err(parser.error("expected a border width, style or color"));
    }
    Ok((
        width.unwrap_or_else(|| CssValue::px(0.0)),
        style.unwrap_or(CssValue::BorderStyle(BorderStyle::None)),
        color.unwrap_or(CssValue::Color(ColorValue::CurrentColor)),
    ))
}

fn initial_border_image() -> Vec<(PropertyId, CssValue)> {
    BORDER_IMAGE
        .into_iter()
        .map(|p| (p, p.initial_value()))
        .collect()
}

/// `<source> || <slice> [ / <width> ]? || <repeat>`.
fn parse_border_image(parser: &mut Parser) -> Result<Vec<(PropertyId, CssValue)>, ParseError> {
    let mut values = initial_border_image();
    let (mut source, mut slice, mut repeat) = (false, false, false);
    while !parser.is_value_end() {
        if !source && ImageValue::can_parse(parser) {
            values[0].1 = CssValue::Image(ImageValue::parse(parser)?);
            source = true;
        } else if !slice && parser.has_number() {
            values[1].1 = parse_border_image_slice(parser)?;
            if parser.try_token(Token::Slash) {
                values[2].1 = parse_border_image_width(parser)?;
            }
            slice = true;
        } else if !repeat && BorderImageRepeat::can_parse(parser) {
            values[3].1 = CssValue::BorderRepeat(BorderImageRepeat::parse(parser)?);
            repeat = true;
        } else {
            return Err(parser.error("expected a border image source, slice or repeat"));
        }
    }
    if !(source || slice || repeat) {
        return Err(parser.error("expected a border image"));
    }
    Ok(values)
}

/// One comma separated layer of the `background` shorthand.
#[derive(Default)]
struct Layer {
    image: Option<CssValue>,
    position: Option<CssValue>,
    size: Option<CssValue>,
    repeat: Option<CssValue>,
    origin: Option<Area>,
    clip: Option<Area>,
    color: Option<CssValue>,
}

fn parse_background_layer(parser: &mut Parser) -> Result<Layer, ParseError> {
    let mut layer = Layer::default();
    while !parser.is_value_end() {
        if layer.image.is_none() && ImageValue::can_parse(parser) {
            layer.image = Some(CssValue::Image(ImageValue::parse(parser)?));
        } else if layer.position.is_none() && PositionValue::can_parse(parser) {
            layer.position = Some(CssValue::Position(PositionValue::parse(parser)?.into()));
            if parser.try_token(Token::Slash) {
                layer.size = Some(CssValue::BgSize(BgSizeValue::parse(parser)?.into()));
            }
        } else if layer.repeat.is_none() && BackgroundRepeat::can_parse(parser) {
            layer.repeat = Some(CssValue::Repeat(BackgroundRepeat::parse(parser)?));
        } else if layer.origin.is_none() && Area::ALL.iter().any(|a| parser.has_ident(a.name())) {
            let origin = Area::parse(parser)?;
            layer.origin = Some(origin);
            layer.clip = Some(Area::try_parse(parser).unwrap_or(origin));
        } else if layer.color.is_none() && has_color(parser) {
            layer.color = Some(CssValue::Color(parse_color(parser)?));
        } else {
            return Err(parser.error("unexpected background component"));
        }
    }
    if layer.image.is_none()
        && layer.position.is_none()
        && layer.repeat.is_none()
        && layer.origin.is_none()
        && layer.color.is_none()
    {
        return Err(parser.error("empty background layer"));
    }
    Ok(layer)
}

fn parse_background(parser: &mut Parser) -> Result<Vec<(PropertyId, CssValue)>, ParseError> {
    let layers = parser.parse_comma_list(parse_background_layer)?;
    let last = layers.len() - 1;
    if layers[..last].iter().any(|l| l.color.is_some()) {
        return Err(parser.invalid("only the last background layer may set a color"));
    }
    let column = |f: &dyn Fn(&Layer) -> CssValue| CssValue::array(layers.iter().map(f).collect());
    Ok(vec![
        (
            PropertyId::BackgroundImage,
            column(&|l| l.image.clone().unwrap_or(CssValue::Image(ImageValue::none()))),
        ),
        (
            PropertyId::BackgroundPosition,
            column(&|l| l.position.clone().unwrap_or_else(initial_position)),
        ),
        (
            PropertyId::BackgroundSize,
            column(&|l| l.size.clone().unwrap_or_else(initial_bg_size)),
        ),
        (
            PropertyId::BackgroundRepeat,
            column(&|l| {
                l.repeat
                    .clone()
                    .unwrap_or(CssValue::Repeat(BackgroundRepeat::default()))
            }),
        ),
        (
            PropertyId::BackgroundOrigin,
            column(&|l| CssValue::Area(l.origin.unwrap_or(Area::PaddingBox))),
        ),
        (
            PropertyId::BackgroundClip,
            column(&|l| CssValue::Area(l.clip.unwrap_or(Area::BorderBox))),
        ),
        (
            PropertyId::BackgroundColor,
            layers[last]
                .color
                .clone()
                .unwrap_or(CssValue::Color(Rgba::TRANSPARENT.into())),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn declare(name: &str, value: &str) -> Result<Vec<(PropertyId, DeclaredValue)>, PropertyError> {
        let mut parser = Parser::new(value).unwrap();
        parse_declaration(name, &mut parser)
    }

    fn printed(name: &str, value: &str) -> Vec<(&'static str, String)> {
        declare(name, value)
            .unwrap()
            .into_iter()
            .map(|(p, v)| (p.name(), v.to_string()))
            .collect()
    }

    // ── Table ────────────────────────────────────────────────────────

    #[test]
    fn names_round_trip() {
        for &p in PropertyId::ALL {
            assert_eq!(PropertyId::from_name(p.name()), Some(p));
        }
        assert_eq!(PropertyId::from_name("Margin-Top"), Some(PropertyId::MarginTop));
        assert_eq!(PropertyId::from_name("margin"), None);
    }

    #[test]
    fn slots_are_dense_per_group() {
        for group in Group::ALL {
            for (i, p) in group.properties().enumerate() {
                assert_eq!(p.slot(), i, "{p}");
            }
        }
        assert_eq!(PropertyId::Dpi.slot(), 0);
        assert_eq!(PropertyId::Color.slot(), 1);
        assert_eq!(PropertyId::FontSize.slot(), 0);
    }

    #[test]
    fn inherited_properties() {
        assert!(PropertyId::Color.is_inherited());
        assert!(PropertyId::FontSize.is_inherited());
        assert!(!PropertyId::MarginTop.is_inherited());
        assert!(!PropertyId::BackgroundColor.is_inherited());
    }

    #[test]
    fn initial_values_parse_back() {
        for &p in PropertyId::ALL {
            let initial = p.initial_value().to_string();
            let mut parser = Parser::new(&initial).unwrap();
            let parsed = p.parse_value(&mut parser);
            assert!(parsed.is_ok(), "{p}: {initial}");
        }
    }

    // ── Longhands ────────────────────────────────────────────────────

    #[test]
    fn longhand_value() {
        assert_eq!(printed("margin-left", "-4px"), vec![("margin-left", "-4px".into())]);
        assert_eq!(
            printed("border-top-width", "thick"),
            vec![("border-top-width", "5px".into())]
        );
        assert_eq!(printed("font-weight", "bold"), vec![("font-weight", "700".into())]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            declare("padding-top", "-1px"),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert!(matches!(
            declare("opacity", "1 2"),
            Err(PropertyError::InvalidValue { .. })
        ));
        assert!(matches!(declare("font-weight", "0"), Err(PropertyError::InvalidValue { .. })));
    }

    #[test]
    fn unknown_property() {
        assert_eq!(
            declare("frobnicate", "1px"),
            Err(PropertyError::UnknownProperty("frobnicate".into()))
        );
    }

    #[test]
    fn css_wide_keywords() {
        assert_eq!(
            declare("color", "inherit").unwrap(),
            vec![(PropertyId::Color, DeclaredValue::Inherit)]
        );
        let values = declare("margin", "initial").unwrap();
        assert_eq!(values.len(), 4);
        assert!(values.iter().all(|(_, v)| *v == DeclaredValue::Initial));
    }

    // ── Shorthands ───────────────────────────────────────────────────

    #[test]
    fn margin_two_values() {
        assert_eq!(
            printed("margin", "10px 20px"),
            vec![
                ("margin-top", "10px".into()),
                ("margin-right", "20px".into()),
                ("margin-bottom", "10px".into()),
                ("margin-left", "20px".into()),
            ]
        );
        assert!(declare("margin", "1px 2px 3px 4px 5px").is_err());
    }

    #[test]
    fn border_radius_with_slash() {
        let values = printed("border-radius", "1px 2px / 3px");
        assert_eq!(
            values,
            vec![
                ("border-top-left-radius", "1px 3px".into()),
                ("border-top-right-radius", "2px 3px".into()),
                ("border-bottom-right-radius", "1px 3px".into()),
                ("border-bottom-left-radius", "2px 3px".into()),
            ]
        );
    }

    #[test]
    fn border_any_order_resets_missing() {
        let values = printed("border", "red 2px");
        assert!(values.contains(&("border-top-width", "2px".into())));
        assert!(values.contains(&("border-left-style", "none".into())));
        assert!(values.contains(&("border-bottom-color", "rgb(255,0,0)".into())));
        assert!(values.contains(&("border-image-source", "none".into())));
        assert_eq!(values.len(), 16);
    }

    #[test]
    fn border_side() {
        assert_eq!(
            printed("border-left", "dashed 3px"),
            vec![
                ("border-left-width", "3px".into()),
                ("border-left-style", "dashed".into()),
                ("border-left-color", "currentColor".into()),
            ]
        );
        assert!(declare("border-left", "solid solid").is_err());
    }

    #[test]
    fn border_image() {
        let values = printed("border-image", "url(b.png) 10 fill / 2px round");
        assert_eq!(
            values,
            vec![
                ("border-image-source", "url(\"b.png\")".into()),
                ("border-image-slice", "10 fill".into()),
                ("border-image-width", "2px".into()),
                ("border-image-repeat", "round".into()),
            ]
        );
    }

    #[test]
    fn outline() {
        assert_eq!(
            printed("outline", "1px solid blue"),
            vec![
                ("outline-width", "1px".into()),
                ("outline-style", "solid".into()),
                ("outline-color", "rgb(0,0,255)".into()),
            ]
        );
    }

    #[test]
    fn background_layers() {
        let values = printed(
            "background",
            "url(a.png) right 10px top / 20px repeat-x, content-box red",
        );
        assert_eq!(
            values,
            vec![
                ("background-image", "url(\"a.png\"), none".into()),
                ("background-position", "calc(100% - 10px) top, left top".into()),
                ("background-size", "20px, auto".into()),
                ("background-repeat", "repeat-x, repeat".into()),
                ("background-origin", "padding-box, content-box".into()),
                ("background-clip", "border-box, content-box".into()),
                ("background-color", "rgb(255,0,0)".into()),
            ]
        );
    }

    #[test]
    fn background_color_only_in_last_layer() {
        assert!(declare("background", "red, blue").is_err());
        assert!(declare("background", "none, blue").is_ok());
    }
}
