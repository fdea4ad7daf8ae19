//! Background painting: box shadows, background color and image layers.

use crate::css::properties::PropertyId;
use crate::css::style::ComputedStyle;
use crate::css::values::{
    Area, BackgroundRepeat, BgSizeValue, BlendMode, CssImage, CssValue, PositionValue, RepeatStyle,
    Rgba, Shadow, ShadowsValue,
};
use crate::geometry::Rect;
use crate::render::rounded_box::RoundedBox;
use crate::render::snapshot::{ShadowParams, Snapshot};

/// The border, padding and content boxes of a style over a border box.
struct Boxes {
    border: RoundedBox,
    padding: RoundedBox,
    content: RoundedBox,
}

impl Boxes {
    fn new(style: &ComputedStyle, rect: Rect) -> Self {
        let border = RoundedBox::from_style(style, rect);
        let padding = border.shrink(style.border_widths());
        let content = padding.shrink(style.padding());
        Self {
            border,
            padding,
            content,
        }
    }

    fn get(&self, area: Area) -> &RoundedBox {
        match area {
            Area::BorderBox => &self.border,
            Area::PaddingBox => &self.padding,
            Area::ContentBox => &self.content,
        }
    }
}

/// Paint the background of `style` for the border box `rect`.
///
/// Paint order, bottom to top: outset shadows, background color, image
/// layers from the last to the first, inset shadows. When a layer blends,
/// the color and layers are isolated from the shadows and anything below.
pub fn render_background(style: &ComputedStyle, snapshot: &mut Snapshot, rect: Rect) {
    let color = style.background_color();
    let shadows = style.box_shadow();
    let images = style.get(PropertyId::BackgroundImage);
    let has_image = (0..images.len()).any(|i| image_at(images, i).is_some());
    if color.is_clear() && !has_image && shadows.is_none() {
        return;
    }

    let boxes = Boxes::new(style, rect);
    render_outset_shadows(&shadows, snapshot, &boxes.border);

    let layers = images.len().max(1);
    let isolate = (0..layers).any(|i| blend_mode(style, i) != BlendMode::Normal);
    if isolate {
        snapshot.push_isolate();
    }
    render_color(style, snapshot, &boxes, color, layers - 1);
    for index in (0..layers).rev() {
        render_layer(style, snapshot, &boxes, index);
    }
    if isolate {
        snapshot.pop();
    }

    render_inset_shadows(&shadows, snapshot, &boxes.padding);
}

fn blend_mode(style: &ComputedStyle, index: usize) -> BlendMode {
    match style.get(PropertyId::BackgroundBlendMode).nth(index) {
        CssValue::BlendMode(mode) => *mode,
        _ => BlendMode::Normal,
    }
}

fn image_at(images: &CssValue, index: usize) -> Option<&dyn CssImage> {
    match images.nth(index) {
        CssValue::Image(image) => image.image(),
        _ => None,
    }
}

fn shadow_params(shadow: &Shadow) -> Option<ShadowParams> {
    let color = shadow.color.rgba()?;
    if color.is_clear() {
        return None;
    }
    Some(ShadowParams {
        color,
        dx: shadow.x.get(0.0),
        dy: shadow.y.get(0.0),
        spread: shadow.spread.get(0.0),
        blur_radius: shadow.radius.get(0.0),
    })
}

/// Shadows earlier in the list paint on top, so the list is walked backwards.
fn render_outset_shadows(shadows: &ShadowsValue, snapshot: &mut Snapshot, border_box: &RoundedBox) {
    for shadow in shadows.shadows().iter().rev().filter(|s| !s.inset) {
        if let Some(params) = shadow_params(shadow) {
            snapshot.append_outset_shadow(border_box, params);
        }
    }
}

fn render_inset_shadows(shadows: &ShadowsValue, snapshot: &mut Snapshot, padding_box: &RoundedBox) {
    for shadow in shadows.shadows().iter().rev().filter(|s| s.inset) {
        if let Some(params) = shadow_params(shadow) {
            snapshot.append_inset_shadow(padding_box, params);
        }
    }
}

fn area_at(style: &ComputedStyle, property: PropertyId, index: usize, default: Area) -> Area {
    match style.get(property).nth(index) {
        CssValue::Area(area) => *area,
        _ => default,
    }
}

fn render_color(
    style: &ComputedStyle,
    snapshot: &mut Snapshot,
    boxes: &Boxes,
    color: Rgba,
    last_layer: usize,
) {
    if color.is_clear() {
        return;
    }
    let clip = boxes.get(area_at(style, PropertyId::BackgroundClip, last_layer, Area::BorderBox));
    if clip.is_rect() {
        snapshot.append_color(color, clip.rect);
    } else {
        snapshot.push_rounded_clip(clip);
        snapshot.append_color(color, clip.rect);
        snapshot.pop();
    }
}

/// Resize the image so `round` axes hold a whole number of tiles.
fn round_axes(
    repeat: BackgroundRepeat,
    (mut image_width, mut image_height): (f64, f64),
    width: f64,
    height: f64,
) -> (f64, f64) {
    if repeat.x == RepeatStyle::Round {
        let n = (width / image_width).round().max(1.0);
        if repeat.y != RepeatStyle::Round {
            image_height *= width / (image_width * n);
        }
        image_width = width / n;
    }
    if repeat.y == RepeatStyle::Round {
        let n = (height / image_height).round().max(1.0);
        if repeat.x != RepeatStyle::Round {
            image_width *= height / (image_height * n);
        }
        image_height = height / n;
    }
    (image_width, image_height)
}

/// Tile period along one axis: `space` spreads the leftover evenly between
/// whole tiles.
fn repeat_period(style: RepeatStyle, image_size: f64, area: f64) -> f64 {
    if style == RepeatStyle::Space {
        let n = (area / image_size).floor();
        if n > 0.0 {
            (area / n).round()
        } else {
            0.0
        }
    } else {
        image_size.round()
    }
}

fn render_layer(style: &ComputedStyle, snapshot: &mut Snapshot, boxes: &Boxes, index: usize) {
    let images = style.get(PropertyId::BackgroundImage);
    let Some(image) = image_at(images, index) else {
        return;
    };

    let origin = boxes.get(area_at(style, PropertyId::BackgroundOrigin, index, Area::PaddingBox));
    let clip = boxes.get(area_at(style, PropertyId::BackgroundClip, index, Area::BorderBox));
    let (width, height) = (origin.rect.width, origin.rect.height);
    if width <= 0.0 || height <= 0.0 {
        log::debug!("background layer {index}: empty origin box");
        return;
    }

    let size = match style.get(PropertyId::BackgroundSize).nth(index) {
        CssValue::BgSize(size) => (**size).clone(),
        _ => BgSizeValue::default(),
    };
    let position = match style.get(PropertyId::BackgroundPosition).nth(index) {
        CssValue::Position(position) => (**position).clone(),
        _ => PositionValue::default(),
    };
    let mut repeat = match style.get(PropertyId::BackgroundRepeat).nth(index) {
        CssValue::Repeat(repeat) => *repeat,
        _ => BackgroundRepeat::default(),
    };
    let blend = blend_mode(style, index);

    let (image_width, image_height) = size.compute_size(image, width, height);
    if image_width <= 0.0 || image_height <= 0.0 {
        log::debug!("background layer {index}: zero image size, skipped");
        return;
    }
    let (image_width, image_height) = round_axes(repeat, (image_width, image_height), width, height);

    if image_width == width {
        repeat.x = RepeatStyle::NoRepeat;
    }
    if image_height == height {
        repeat.y = RepeatStyle::NoRepeat;
    }

    if blend != BlendMode::Normal {
        snapshot.push_blend(blend);
    }
    snapshot.push_rounded_clip(clip);
    snapshot.offset(origin.rect.x, origin.rect.y);

    let (x, y) = position.resolve(width - image_width, height - image_height);
    if repeat.x == RepeatStyle::NoRepeat && repeat.y == RepeatStyle::NoRepeat {
        snapshot.offset(x, y);
        image.snapshot(snapshot, image_width, image_height);
    } else {
        let repeat_width = repeat_period(repeat.x, image_width, width);
        let repeat_height = repeat_period(repeat.y, image_height, height);

        let mut fill = clip.rect.offset(-origin.rect.x, -origin.rect.y);
        if repeat.x == RepeatStyle::NoRepeat {
            fill.x = x;
            fill.width = image_width;
        }
        if repeat.y == RepeatStyle::NoRepeat {
            fill.y = y;
            fill.height = image_height;
        }

        snapshot.push_repeat(fill, Rect::new(x, y, repeat_width, repeat_height));
        snapshot.offset(
            x + 0.5 * (repeat_width - image_width),
            y + 0.5 * (repeat_height - image_height),
        );
        image.snapshot(snapshot, image_width, image_height);
        snapshot.pop();
    }

    snapshot.pop();
    if blend != BlendMode::Normal {
        snapshot.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::provider::StaticProvider;
    use crate::css::tree::DeclarationBlock;
    use crate::render::snapshot::RenderNode;
    use pretty_assertions::assert_eq;

    fn paint(css: &str, rect: Rect) -> RenderNode {
        let provider = StaticProvider::default()
            .with_image("tile.png", 10, 10)
            .with_image("wide.png", 40, 20);
        let (block, errors) = DeclarationBlock::parse(css);
        assert!(errors.is_empty(), "{errors:?}");
        let style = ComputedStyle::compute(&block, &provider, None);
        let mut snapshot = Snapshot::new();
        render_background(&style, &mut snapshot, rect);
        snapshot.finish()
    }

    fn find<'a>(node: &'a RenderNode, pred: impl Fn(&RenderNode) -> bool) -> Vec<&'a RenderNode> {
        let mut found = Vec::new();
        node.walk(&mut |n| {
            if pred(n) {
                found.push(n);
            }
        });
        found
    }

    #[test]
    fn transparent_style_paints_nothing() {
        let node = paint("", Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(node, RenderNode::Container(Vec::new()));
    }

    #[test]
    fn color_clips_to_last_layer_clip() {
        let node = paint(
            "background-color: red; border: 2px solid black; background-image: none, none; \
             background-clip: border-box, padding-box",
            Rect::new(0.0, 0.0, 20.0, 20.0),
        );
        let colors = find(&node, |n| matches!(n, RenderNode::Color { .. }));
        assert_eq!(
            colors,
            vec![&RenderNode::Color {
                color: Rgba::from_rgb8(255, 0, 0),
                bounds: Rect::new(2.0, 2.0, 16.0, 16.0),
            }]
        );
    }

    #[test]
    fn no_repeat_paints_once_at_position() {
        let node = paint(
            "background: url(tile.png) no-repeat right bottom",
            Rect::new(0.0, 0.0, 50.0, 30.0),
        );
        let textures = find(&node, |n| matches!(n, RenderNode::Texture { .. }));
        assert_eq!(textures.len(), 1);
        let RenderNode::Texture { bounds, .. } = textures[0] else {
            unreachable!()
        };
        assert_eq!(*bounds, Rect::new(40.0, 20.0, 10.0, 10.0));
        assert!(find(&node, |n| matches!(n, RenderNode::Repeat { .. })).is_empty());
    }

    #[test]
    fn space_with_exact_multiple_has_no_gap() {
        let node = paint(
            "background-image: url(tile.png); background-repeat: space",
            Rect::new(0.0, 0.0, 30.0, 20.0),
        );
        let repeats = find(&node, |n| matches!(n, RenderNode::Repeat { .. }));
        let RenderNode::Repeat { child_bounds, bounds, .. } = repeats[0] else {
            unreachable!()
        };
        assert_eq!(*child_bounds, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(*bounds, Rect::new(0.0, 0.0, 30.0, 20.0));
    }

    #[test]
    fn space_distributes_leftover() {
        let node = paint(
            "background-image: url(tile.png); background-repeat: space no-repeat",
            Rect::new(0.0, 0.0, 35.0, 20.0),
        );
        let repeats = find(&node, |n| matches!(n, RenderNode::Repeat { .. }));
        let RenderNode::Repeat { child_bounds, bounds, child } = repeats[0] else {
            unreachable!()
        };
        // Three tiles in 35px: a period of 12px, image centered in it.
        assert_eq!(child_bounds.width, 12.0);
        assert_eq!(bounds.height, 10.0);
        let RenderNode::Texture { bounds: tile, .. } = &**child else {
            unreachable!()
        };
        assert_eq!(tile.x, 1.0);
    }

    #[test]
    fn round_fits_whole_tiles() {
        let node = paint(
            "background-image: url(tile.png); background-repeat: round",
            Rect::new(0.0, 0.0, 24.0, 20.0),
        );
        let textures = find(&node, |n| matches!(n, RenderNode::Texture { .. }));
        let RenderNode::Texture { bounds, .. } = textures[0] else {
            unreachable!()
        };
        // round(24 / 10) = 2 tiles of 12px; two 10px tiles already fill 20px.
        assert_eq!((bounds.width, bounds.height), (12.0, 10.0));
    }

    #[test]
    fn zero_size_skips_layer() {
        let node = paint(
            "background-image: url(tile.png); background-size: 0 10px",
            Rect::new(0.0, 0.0, 20.0, 20.0),
        );
        assert_eq!(node, RenderNode::Container(Vec::new()));
    }

    #[test]
    fn layers_paint_bottom_up_and_blend() {
        let node = paint(
            "background-image: url(tile.png), url(wide.png); \
             background-blend-mode: multiply, normal; background-repeat: no-repeat",
            Rect::new(0.0, 0.0, 40.0, 20.0),
        );
        let textures = find(&node, |n| matches!(n, RenderNode::Texture { .. }));
        let names: Vec<_> = textures
            .iter()
            .map(|n| match n {
                RenderNode::Texture { texture, .. } => texture.name.to_string(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(names, vec!["wide.png", "tile.png"]);
        let blends = find(&node, |n| matches!(n, RenderNode::Blend { .. }));
        assert_eq!(blends.len(), 1);
    }

    #[test]
    fn shadows_surround_the_background() {
        let node = paint(
            "background-color: blue; box-shadow: 1px 1px black, inset 0 0 2px red",
            Rect::new(0.0, 0.0, 10.0, 10.0),
        );
        let RenderNode::Container(nodes) = &node else {
            unreachable!()
        };
        assert!(matches!(nodes[0], RenderNode::OutsetShadow { .. }));
        assert!(matches!(nodes[1], RenderNode::Color { .. }));
        assert!(matches!(nodes[2], RenderNode::InsetShadow { .. }));
    }

    #[test]
    fn blend_layers_are_isolated_from_shadows() {
        let node = paint(
            "background-color: blue; box-shadow: 1px 1px black; background-image: url(tile.png); \
             background-blend-mode: multiply; background-repeat: no-repeat",
            Rect::new(0.0, 0.0, 20.0, 20.0),
        );
        let RenderNode::Container(nodes) = &node else {
            unreachable!()
        };
        assert_eq!(nodes.len(), 2);
        assert!(matches!(nodes[0], RenderNode::OutsetShadow { .. }));
        let RenderNode::Isolate { child } = &nodes[1] else {
            panic!("expected an isolation group, got {:?}", nodes[1]);
        };
        let RenderNode::Container(inner) = &**child else {
            panic!("expected color and layer, got {child:?}");
        };
        assert_eq!(inner.len(), 2);
        assert!(matches!(inner[0], RenderNode::Color { .. }));
        assert!(matches!(inner[1], RenderNode::Blend { .. }));
    }

    #[test]
    fn normal_layers_are_not_isolated() {
        let node = paint(
            "background-color: blue; background-image: url(tile.png)",
            Rect::new(0.0, 0.0, 20.0, 20.0),
        );
        assert!(find(&node, |n| matches!(n, RenderNode::Isolate { .. })).is_empty());
    }
}
