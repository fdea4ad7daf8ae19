//! Symbolic `font-size` keywords.

use crate::css::values::number::Dimension;
use crate::css::values::ComputeContext;

keyword_enum! {
    /// Absolute size keywords and the relative `smaller`/`larger`.
    pub enum FontSizeKeyword {
        XxSmall => "xx-small",
        XSmall => "x-small",
        Small => "small",
        Medium => "medium",
        Large => "large",
        XLarge => "x-large",
        XxLarge => "xx-large",
        Smaller => "smaller",
        Larger => "larger",
    }
}

/// Step between adjacent relative sizes.
const RELATIVE_FACTOR: f64 = 1.2;

impl FontSizeKeyword {
    /// Resolve to pixels.
    ///
    /// Absolute keywords scale the provider's default size; `smaller` and
    /// `larger` step the parent's size.
    pub fn compute(self, ctx: &ComputeContext<'_>) -> Dimension {
        let default = ctx.default_font_size();
        let px = match self {
            FontSizeKeyword::XxSmall => default * 3.0 / 5.0,
            FontSizeKeyword::XSmall => default * 3.0 / 4.0,
            FontSizeKeyword::Small => default * 8.0 / 9.0,
            FontSizeKeyword::Medium => default,
            FontSizeKeyword::Large => default * 6.0 / 5.0,
            FontSizeKeyword::XLarge => default * 3.0 / 2.0,
            FontSizeKeyword::XxLarge => default * 2.0,
            FontSizeKeyword::Smaller => ctx.parent_font_size() / RELATIVE_FACTOR,
            FontSizeKeyword::Larger => ctx.parent_font_size() * RELATIVE_FACTOR,
        };
        Dimension::px(px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::provider::{Settings, StaticProvider};

    #[test]
    fn medium_is_ten_points_at_dpi() {
        let provider = StaticProvider::default();
        let ctx = ComputeContext::root(&provider);
        let px = FontSizeKeyword::Medium.compute(&ctx).value;
        assert!((px - 10.0 * 96.0 / 72.0).abs() < 1e-12);
    }

    #[test]
    fn absolute_provider_size() {
        let provider =
            StaticProvider::new(Settings::default().with_font_size_absolute(16.0));
        let ctx = ComputeContext::root(&provider);
        assert_eq!(FontSizeKeyword::XxLarge.compute(&ctx), Dimension::px(32.0));
        assert_eq!(FontSizeKeyword::Larger.compute(&ctx), Dimension::px(16.0 * 1.2));
    }

    #[test]
    fn relative_provider_size_scales_with_dpi() {
        let provider = StaticProvider::new(Settings::default().with_font_size(12.0).with_dpi(144.0));
        let ctx = ComputeContext::root(&provider);
        assert_eq!(FontSizeKeyword::Medium.compute(&ctx), Dimension::px(24.0));
        assert_eq!(FontSizeKeyword::Smaller.compute(&ctx), Dimension::px(20.0));
    }
}
