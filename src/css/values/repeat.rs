//! `background-repeat` and `border-image-repeat`.

use std::fmt;

use crate::css::parser::{ParseError, Parser};

keyword_enum! {
    /// How a background image tiles along one axis.
    pub enum RepeatStyle {
        NoRepeat => "no-repeat",
        Repeat => "repeat",
        Round => "round",
        Space => "space",
    }
}

keyword_enum! {
    /// How a border image edge fills its side.
    pub enum BorderRepeatStyle {
        Stretch => "stretch",
        Repeat => "repeat",
        Round => "round",
        Space => "space",
    }
}

/// Per-axis background repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundRepeat {
    pub x: RepeatStyle,
    pub y: RepeatStyle,
}

impl Default for BackgroundRepeat {
    fn default() -> Self {
        Self::new(RepeatStyle::Repeat, RepeatStyle::Repeat)
    }
}

impl BackgroundRepeat {
    pub const fn new(x: RepeatStyle, y: RepeatStyle) -> Self {
        Self { x, y }
    }

    /// Whether the parser is looking at a repeat keyword.
    pub fn can_parse(parser: &Parser) -> bool {
        parser.has_ident("repeat-x")
            || parser.has_ident("repeat-y")
            || RepeatStyle::ALL.iter().any(|s| parser.has_ident(s.name()))
    }

    /// `repeat-x`, `repeat-y`, or one or two repeat styles.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        if parser.try_ident("repeat-x") {
            return Ok(Self::new(RepeatStyle::Repeat, RepeatStyle::NoRepeat));
        }
        if parser.try_ident("repeat-y") {
            return Ok(Self::new(RepeatStyle::NoRepeat, RepeatStyle::Repeat));
        }
        let x = RepeatStyle::parse(parser)?;
        let y = RepeatStyle::try_parse(parser).unwrap_or(x);
        Ok(Self::new(x, y))
    }
}

impl fmt::Display for BackgroundRepeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.x, self.y) {
            (RepeatStyle::Repeat, RepeatStyle::NoRepeat) => f.write_str("repeat-x"),
            (RepeatStyle::NoRepeat, RepeatStyle::Repeat) => f.write_str("repeat-y"),
            (x, y) if x == y => write!(f, "{x}"),
            (x, y) => write!(f, "{x} {y}"),
        }
    }
}

/// Per-axis border image repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderImageRepeat {
    pub x: BorderRepeatStyle,
    pub y: BorderRepeatStyle,
}

impl Default for BorderImageRepeat {
    fn default() -> Self {
        Self::new(BorderRepeatStyle::Stretch, BorderRepeatStyle::Stretch)
    }
}

impl BorderImageRepeat {
    pub const fn new(x: BorderRepeatStyle, y: BorderRepeatStyle) -> Self {
        Self { x, y }
    }

    pub fn can_parse(parser: &Parser) -> bool {
        BorderRepeatStyle::ALL
            .iter()
            .any(|s| parser.has_ident(s.name()))
    }

    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        let x = BorderRepeatStyle::parse(parser)?;
        let y = BorderRepeatStyle::try_parse(parser).unwrap_or(x);
        Ok(Self::new(x, y))
    }
}

impl fmt::Display for BorderImageRepeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.x == self.y {
            write!(f, "{}", self.x)
        } else {
            write!(f, "{} {}", self.x, self.y)
        }
    }
}
