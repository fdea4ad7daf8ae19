//! Keyword enum values.

keyword_enum! {
    /// `border-style` and `outline-style`.
    pub enum BorderStyle {
        None => "none",
        Solid => "solid",
        Inset => "inset",
        Outset => "outset",
        Hidden => "hidden",
        Dotted => "dotted",
        Dashed => "dashed",
        Double => "double",
        Groove => "groove",
        Ridge => "ridge",
    }
}

impl BorderStyle {
    /// `none` and `hidden` paint nothing and take no width.
    pub fn is_invisible(self) -> bool {
        matches!(self, BorderStyle::None | BorderStyle::Hidden)
    }
}

keyword_enum! {
    /// `background-blend-mode`.
    pub enum BlendMode {
        Normal => "normal",
        Multiply => "multiply",
        Screen => "screen",
        Overlay => "overlay",
        Darken => "darken",
        Lighten => "lighten",
        ColorDodge => "color-dodge",
        ColorBurn => "color-burn",
        HardLight => "hard-light",
        SoftLight => "soft-light",
        Difference => "difference",
        Exclusion => "exclusion",
        Color => "color",
        Hue => "hue",
        Saturation => "saturation",
        Luminosity => "luminosity",
    }
}

keyword_enum! {
    /// A box of the CSS box model, for `background-clip` and `background-origin`.
    pub enum Area {
        BorderBox => "border-box",
        PaddingBox => "padding-box",
        ContentBox => "content-box",
    }
}

keyword_enum! {
    /// Relative `font-weight` keywords.
    pub enum FontWeightKeyword {
        Bolder => "bolder",
        Lighter => "lighter",
    }
}

impl FontWeightKeyword {
    /// Resolve against the parent's numeric weight.
    pub fn resolve(self, parent: f64) -> f64 {
        match self {
            FontWeightKeyword::Bolder => {
                if parent < 350.0 {
                    400.0
                } else if parent < 550.0 {
                    700.0
                } else {
                    900.0
                }
            }
            FontWeightKeyword::Lighter => {
                if parent > 750.0 {
                    700.0
                } else if parent > 550.0 {
                    400.0
                } else {
                    100.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::{parse_all, Parser};

    #[test]
    fn names_are_indexed_by_variant() {
        for style in BorderStyle::ALL {
            assert_eq!(
                parse_all(style.name(), BorderStyle::parse).unwrap(),
                *style
            );
        }
        assert_eq!(BlendMode::ColorDodge.to_string(), "color-dodge");
        assert_eq!(Area::ContentBox.name(), "content-box");
    }

    #[test]
    fn try_parse_leaves_other_tokens() {
        let mut p = Parser::new("10px").unwrap();
        assert_eq!(BorderStyle::try_parse(&mut p), None);
        assert!(!p.is_eof());
    }

    #[test]
    fn unknown_keyword_is_an_error() {
        assert!(parse_all("wavy", BorderStyle::parse).is_err());
    }

    #[test]
    fn invisible_styles() {
        assert!(BorderStyle::None.is_invisible());
        assert!(BorderStyle::Hidden.is_invisible());
        assert!(!BorderStyle::Dotted.is_invisible());
    }

    #[test]
    fn bolder_and_lighter() {
        assert_eq!(FontWeightKeyword::Bolder.resolve(400.0), 700.0);
        assert_eq!(FontWeightKeyword::Bolder.resolve(100.0), 400.0);
        assert_eq!(FontWeightKeyword::Bolder.resolve(700.0), 900.0);
        assert_eq!(FontWeightKeyword::Lighter.resolve(900.0), 700.0);
        assert_eq!(FontWeightKeyword::Lighter.resolve(700.0), 400.0);
        assert_eq!(FontWeightKeyword::Lighter.resolve(400.0), 100.0);
    }
}
