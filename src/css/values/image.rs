//! Images usable as backgrounds and border images.
//!
//! [`CssImage`] is the seam between the style system and whatever can draw
//! itself into a [`Snapshot`]. The stock kinds are a URL (resolved through
//! the style provider when computed), a decoded texture and a flat color.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::css::parser::{ParseError, Parser};
use crate::css::properties::PropertyId;
use crate::css::tokenizer::Token;
use crate::css::values::color::{parse_color, ColorValue};
use crate::css::values::ComputeContext;
use crate::geometry::Rect;
use crate::render::snapshot::{Snapshot, Texture};

/// Something that can be sized and drawn as a CSS image.
pub trait CssImage: fmt::Debug {
    /// Intrinsic width, 0 if none.
    fn width(&self) -> f64 {
        0.0
    }

    /// Intrinsic height, 0 if none.
    fn height(&self) -> f64 {
        0.0
    }

    /// Intrinsic aspect ratio, 0 if none.
    fn aspect_ratio(&self) -> f64 {
        let (w, h) = (self.width(), self.height());
        if w > 0.0 && h > 0.0 {
            w / h
        } else {
            0.0
        }
    }

    /// The CSS default sizing algorithm.
    ///
    /// A specified size of 0 means "not specified". Missing dimensions come
    /// from the intrinsic size, then the aspect ratio, then the default size.
    fn concrete_size(
        &self,
        specified_width: f64,
        specified_height: f64,
        default_width: f64,
        default_height: f64,
    ) -> (f64, f64) {
        if specified_width > 0.0 && specified_height > 0.0 {
            return (specified_width, specified_height);
        }
        let (image_width, image_height) = (self.width(), self.height());
        let aspect = self.aspect_ratio();

        if specified_width > 0.0 {
            let height = if aspect > 0.0 {
                specified_width / aspect
            } else if image_height > 0.0 {
                image_height
            } else {
                default_height
            };
            return (specified_width, height);
        }
        if specified_height > 0.0 {
            let width = if aspect > 0.0 {
                specified_height * aspect
            } else if image_width > 0.0 {
                image_width
            } else {
                default_width
            };
            return (width, specified_height);
        }

        if image_width > 0.0 && image_height > 0.0 {
            (image_width, image_height)
        } else if image_width > 0.0 {
            let height = if aspect > 0.0 { image_width / aspect } else { default_height };
            (image_width, height)
        } else if image_height > 0.0 {
            let width = if aspect > 0.0 { image_height * aspect } else { default_width };
            (width, image_height)
        } else if aspect > 0.0 {
            if aspect * default_height > default_width {
                (default_width, default_width / aspect)
            } else {
                (default_height * aspect, default_height)
            }
        } else {
            (default_width, default_height)
        }
    }

    /// Draw the image into the rectangle `(0, 0, width, height)`.
    fn snapshot(&self, snapshot: &mut Snapshot, width: f64, height: f64);

    fn is_computed(&self) -> bool {
        true
    }

    /// Resolve against the style context; `None` if the image cannot be
    /// loaded.
    fn compute(&self, ctx: &ComputeContext<'_>) -> Option<Rc<dyn CssImage>>;

    fn equal(&self, other: &dyn CssImage) -> bool;

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn as_any(&self) -> &dyn Any;
}

/// `url(...)`, before the provider resolved it.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlImage {
    pub url: Rc<str>,
}

impl CssImage for UrlImage {
    fn snapshot(&self, _snapshot: &mut Snapshot, _width: f64, _height: f64) {}

    fn is_computed(&self) -> bool {
        false
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Option<Rc<dyn CssImage>> {
        match ctx.provider.lookup_image(&self.url) {
            Some(texture) => Some(Rc::new(TextureImage { texture })),
            None => {
                log::debug!("image '{}' could not be resolved", self.url);
                None
            }
        }
    }

    fn equal(&self, other: &dyn CssImage) -> bool {
        other.as_any().downcast_ref::<Self>() == Some(self)
    }

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "url(\"{}\")", self.url)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A loaded texture with an intrinsic size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub texture: Texture,
}

impl CssImage for TextureImage {
    fn width(&self) -> f64 {
        f64::from(self.texture.width)
    }

    fn height(&self) -> f64 {
        f64::from(self.texture.height)
    }

    fn snapshot(&self, snapshot: &mut Snapshot, width: f64, height: f64) {
        snapshot.append_texture(&self.texture, Rect::new(0.0, 0.0, width, height));
    }

    fn compute(&self, _ctx: &ComputeContext<'_>) -> Option<Rc<dyn CssImage>> {
        Some(Rc::new(self.clone()))
    }

    fn equal(&self, other: &dyn CssImage) -> bool {
        other.as_any().downcast_ref::<Self>() == Some(self)
    }

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "url(\"{}\")", self.texture.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `image(<color>)`: a flat color with no intrinsic size.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorImage {
    pub color: ColorValue,
}

impl CssImage for ColorImage {
    fn snapshot(&self, snapshot: &mut Snapshot, width: f64, height: f64) {
        if let Some(rgba) = self.color.rgba() {
            snapshot.append_color(rgba, Rect::new(0.0, 0.0, width, height));
        }
    }

    fn is_computed(&self) -> bool {
        self.color.is_computed()
    }

    fn compute(&self, ctx: &ComputeContext<'_>) -> Option<Rc<dyn CssImage>> {
        Some(Rc::new(ColorImage {
            color: self.color.compute(PropertyId::BackgroundImage, ctx),
        }))
    }

    fn equal(&self, other: &dyn CssImage) -> bool {
        other.as_any().downcast_ref::<Self>() == Some(self)
    }

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image({})", self.color)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An image or `none`.
#[derive(Debug, Clone, Default)]
pub struct ImageValue(pub Option<Rc<dyn CssImage>>);

impl ImageValue {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new(image: impl CssImage + 'static) -> Self {
        Self(Some(Rc::new(image)))
    }

    pub fn image(&self) -> Option<&dyn CssImage> {
        self.0.as_deref()
    }

    pub fn can_parse(parser: &Parser) -> bool {
        parser.has_ident("none")
            || parser.peek_token() == Some(Token::Url)
            || parser.has_function("url")
            || parser.has_function("image")
    }

    /// `none`, `url(...)` or `image(<color>)`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        if parser.try_ident("none") {
            return Ok(Self::none());
        }
        if parser.peek_token() == Some(Token::Url) {
            let text = parser.advance().map(|t| t.text).unwrap_or_default();
            let url = text
                .strip_prefix("url(")
                .and_then(|s| s.strip_suffix(')'))
                .unwrap_or_default();
            return Ok(Self::new(UrlImage { url: url.into() }));
        }
        if parser.try_function("url") {
            let token = parser.advance();
            let url = match token {
                Some(t) if matches!(t.token, Token::StringLiteral | Token::StringLiteralSingle) => {
                    t.text[1..t.text.len() - 1].to_string()
                }
                _ => return Err(parser.invalid("expected a quoted url")),
            };
            parser.expect_close()?;
            return Ok(Self::new(UrlImage { url: url.into() }));
        }
        if parser.try_function("image") {
            let color = parse_color(parser)?;
            parser.expect_close()?;
            return Ok(Self::new(ColorImage { color }));
        }
        Err(parser.error("expected an image"))
    }

    pub fn is_computed(&self) -> bool {
        self.0.as_ref().map_or(true, |image| image.is_computed())
    }

    pub fn compute(&self, ctx: &ComputeContext<'_>) -> ImageValue {
        match &self.0 {
            Some(image) if !image.is_computed() => ImageValue(image.compute(ctx)),
            _ => self.clone(),
        }
    }
}

impl PartialEq for ImageValue {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b) || a.equal(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Display for ImageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(image) => image.print(f),
            None => f.write_str("none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse_all;
    use crate::css::provider::StaticProvider;
    use crate::css::values::Rgba;

    #[derive(Debug)]
    struct Fixed(f64, f64);

    impl CssImage for Fixed {
        fn width(&self) -> f64 {
            self.0
        }
        fn height(&self) -> f64 {
            self.1
        }
        fn snapshot(&self, _: &mut Snapshot, _: f64, _: f64) {}
        fn compute(&self, _: &ComputeContext<'_>) -> Option<Rc<dyn CssImage>> {
            None
        }
        fn equal(&self, _: &dyn CssImage) -> bool {
            false
        }
        fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("fixed")
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn concrete_size_prefers_specified() {
        let image = Fixed(40.0, 20.0);
        assert_eq!(image.concrete_size(10.0, 10.0, 100.0, 100.0), (10.0, 10.0));
        assert_eq!(image.concrete_size(10.0, 0.0, 100.0, 100.0), (10.0, 5.0));
        assert_eq!(image.concrete_size(0.0, 10.0, 100.0, 100.0), (20.0, 10.0));
        assert_eq!(image.concrete_size(0.0, 0.0, 100.0, 100.0), (40.0, 20.0));
    }

    #[test]
    fn sizeless_image_fills_default() {
        let image = ColorImage { color: Rgba::BLACK.into() };
        assert_eq!(image.aspect_ratio(), 0.0);
        assert_eq!(image.concrete_size(0.0, 0.0, 30.0, 40.0), (30.0, 40.0));
        assert_eq!(image.concrete_size(12.0, 0.0, 30.0, 40.0), (12.0, 40.0));
    }

    #[test]
    fn parse_and_print() {
        let v = parse_all("url(a.png)", ImageValue::parse).unwrap();
        assert_eq!(v.to_string(), "url(\"a.png\")");
        let v = parse_all("url('b c.png')", ImageValue::parse).unwrap();
        assert_eq!(v.to_string(), "url(\"b c.png\")");
        let v = parse_all("image(red)", ImageValue::parse).unwrap();
        assert_eq!(v.to_string(), "image(rgb(255,0,0))");
        assert_eq!(parse_all("none", ImageValue::parse).unwrap(), ImageValue::none());
    }

    #[test]
    fn url_resolves_through_provider() {
        let mut provider = StaticProvider::default();
        provider.add_image("a.png", 16, 8);
        let ctx = ComputeContext::root(&provider);
        let v = parse_all("url(a.png)", ImageValue::parse).unwrap();
        assert!(!v.is_computed());
        let computed = v.compute(&ctx);
        assert!(computed.is_computed());
        let image = computed.image().unwrap();
        assert_eq!((image.width(), image.height()), (16.0, 8.0));

        let missing = parse_all("url(missing.png)", ImageValue::parse).unwrap();
        assert_eq!(missing.compute(&ctx), ImageValue::none());
    }

    #[test]
    fn current_color_image_computes() {
        let provider = StaticProvider::default();
        let ctx = ComputeContext::root(&provider);
        let v = parse_all("image(currentColor)", ImageValue::parse).unwrap();
        assert_eq!(v.compute(&ctx).to_string(), "image(rgb(255,255,255))");
    }
}
