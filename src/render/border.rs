//! Border, border-image and outline painting.

use crate::css::properties::PropertyId;
use crate::css::style::ComputedStyle;
use crate::css::values::{
    BorderImageRepeat, BorderRepeatStyle, BorderStyle, BorderValue, CssImage, CssValue, Rgba,
    Unit,
};
use crate::geometry::{Rect, Side, Sides};
use crate::render::rounded_box::RoundedBox;
use crate::render::snapshot::Snapshot;

/// Widths below this do not visibly change any pixel.
const MIN_WIDTH: f64 = 1.0 / 1024.0;

/// HLS shading factor for the lit side of 3D styles.
const LIGHTER: f64 = 1.8;
const DARKER: f64 = 1.0 / 1.8;

type SideMask = [bool; 4];

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Paint the border of `style` for the border box `rect`.
///
/// A `border-image-source` that resolved to an image replaces the styled
/// border.
pub fn render_border(style: &ComputedStyle, snapshot: &mut Snapshot, rect: Rect) {
    let widths = style.border_widths();
    if let CssValue::Image(source) = style.get(PropertyId::BorderImageSource) {
        if let Some(image) = source.image() {
            render_border_image(style, image, snapshot, rect, widths);
            return;
        }
    }

    if widths.all_match(|w| *w < MIN_WIDTH) {
        return;
    }
    let outline = RoundedBox::from_style(style, rect);
    paint_border(
        snapshot,
        &outline,
        widths,
        style.border_colors(),
        style.border_styles(),
    );
}

/// Paint the outline of `style` around the border box `rect`.
pub fn render_outline(style: &ComputedStyle, snapshot: &mut Snapshot, rect: Rect) {
    let Some(outline) = outline_box(style, rect) else {
        return;
    };
    let width = style.outline_width();
    paint_border(
        snapshot,
        &outline,
        Sides::all(width),
        Sides::all(style.outline_color()),
        Sides::all(style.outline_style()),
    );
}

/// The area the outline of `style` covers around the border box `rect`,
/// `None` if it paints nothing.
pub fn outline_clip(style: &ComputedStyle, rect: Rect) -> Option<Rect> {
    outline_box(style, rect).map(|outline| outline.rect)
}

fn outline_box(style: &ComputedStyle, rect: Rect) -> Option<RoundedBox> {
    let width = style.outline_width();
    if style.outline_style().is_invisible() || width < MIN_WIDTH {
        return None;
    }
    let grow = width + style.outline_offset();
    Some(RoundedBox::from_rect(rect).grow(Sides::all(grow)))
}

// ---------------------------------------------------------------------------
// Styled borders
// ---------------------------------------------------------------------------

fn is_lit(side: Side) -> bool {
    matches!(side, Side::Bottom | Side::Right)
}

fn paint_border(
    snapshot: &mut Snapshot,
    outline: &RoundedBox,
    widths: Sides<f64>,
    colors: Sides<Rgba>,
    styles: Sides<BorderStyle>,
) {
    let mut widths = widths;
    for side in Side::ALL {
        if styles[side].is_invisible() {
            widths[side] = 0.0;
        }
    }

    if Side::ALL
        .iter()
        .all(|&s| widths[s] < MIN_WIDTH || styles[s] == BorderStyle::Solid)
    {
        fill_sides(snapshot, outline, widths, colors, [true; 4]);
        return;
    }

    let mut colors = colors;
    let mut done: SideMask = [false; 4];
    for side in Side::ALL {
        if done[side.index()] || widths[side] < MIN_WIDTH {
            continue;
        }
        match styles[side] {
            BorderStyle::None | BorderStyle::Hidden | BorderStyle::Solid => {}
            BorderStyle::Inset => {
                let factor = if is_lit(side) { LIGHTER } else { DARKER };
                colors[side] = colors[side].shade(factor);
            }
            BorderStyle::Outset => {
                let factor = if is_lit(side) { DARKER } else { LIGHTER };
                colors[side] = colors[side].shade(factor);
            }
            style @ (BorderStyle::Dotted | BorderStyle::Dashed) => {
                let color = colors[side];
                let group = take_group(&mut done, |s| styles[s] == style && colors[s] == color);
                stroke_sides(snapshot, outline, widths, colors[side], group, style);
            }
            BorderStyle::Double => {
                let group = take_group(&mut done, |s| styles[s] == BorderStyle::Double);
                let third = widths.map(|w| w / 3.0);
                fill_sides(snapshot, outline, third, colors, group);
                let inner = outline.shrink(third.map(|w| 2.0 * w));
                fill_sides(snapshot, &inner, third, colors, group);
            }
            BorderStyle::Groove | BorderStyle::Ridge => {
                let group = take_group(&mut done, |s| {
                    matches!(styles[s], BorderStyle::Groove | BorderStyle::Ridge)
                });
                let mut outer = colors;
                let mut inner = colors;
                for s in Side::ALL {
                    let lit_outside = is_lit(s) != (styles[s] == BorderStyle::Ridge);
                    let (o, i) = if lit_outside {
                        (LIGHTER, DARKER)
                    } else {
                        (DARKER, LIGHTER)
                    };
                    outer[s] = colors[s].shade(o);
                    inner[s] = colors[s].shade(i);
                }
                let half = widths.map(|w| w / 2.0);
                fill_sides(snapshot, outline, half, outer, group);
                fill_sides(snapshot, &outline.shrink(half), half, inner, group);
            }
        }
    }

    let rest = Side::ALL.map(|s| !done[s.index()] && widths[s] >= MIN_WIDTH);
    fill_sides(snapshot, outline, widths, colors, rest);
}

/// Mark every side matching `pred` as painted and return them.
fn take_group(done: &mut SideMask, pred: impl Fn(Side) -> bool) -> SideMask {
    let mut group = [false; 4];
    for side in Side::ALL {
        let i = side.index();
        if !done[i] && pred(side) {
            group[i] = true;
            done[i] = true;
        }
    }
    group
}

/// Fill the ring of `outline` for the sides in `mask`.
fn fill_sides(
    snapshot: &mut Snapshot,
    outline: &RoundedBox,
    widths: Sides<f64>,
    colors: Sides<Rgba>,
    mask: SideMask,
) {
    let colors = Sides::from_array(
        Side::ALL.map(|s| if mask[s.index()] { colors[s] } else { Rgba::TRANSPARENT }),
    );
    let visible = Side::ALL
        .iter()
        .any(|&s| mask[s.index()] && widths[s] >= MIN_WIDTH && !colors[s].is_clear());
    if visible {
        snapshot.append_border(outline, widths, colors);
    }
}

/// The dash pattern for a `dotted` or `dashed` line of `length`, sized so
/// whole segments fit.
fn dash_pattern(style: BorderStyle, line_width: f64, length: f64) -> Vec<f64> {
    if style == BorderStyle::Dotted {
        let n = (0.5 * length / line_width).round();
        return vec![0.0, if n > 0.0 { length / n } else { 2.0 }];
    }
    let n = length / line_width;
    if n == n.round() {
        vec![line_width, 2.0 * line_width]
    } else {
        let n = (n / 3.0).round();
        let dash = if n > 0.0 { length / 3.0 / n } else { 1.0 };
        vec![dash, 2.0 * dash]
    }
}

fn stroke_sides(
    snapshot: &mut Snapshot,
    outline: &RoundedBox,
    widths: Sides<f64>,
    color: Rgba,
    mask: SideMask,
    style: BorderStyle,
) {
    if color.is_clear() {
        return;
    }
    // Segments are counted along the center line the stroke follows.
    let path = outline.stroke_line(widths);
    if mask == [true; 4] && widths.is_uniform() {
        let dash = dash_pattern(style, widths.top, path.path_length());
        snapshot.append_stroke(&path, None, widths.top, &dash, color);
        return;
    }
    for side in Side::ALL {
        if !mask[side.index()] || widths[side] < MIN_WIDTH {
            continue;
        }
        let dash = dash_pattern(style, widths[side], path.side_length(side));
        snapshot.append_stroke(&path, Some(side), widths[side], &dash, color);
    }
}

// ---------------------------------------------------------------------------
// Border images
// ---------------------------------------------------------------------------

/// Offset and size of one of the three bands along an axis.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Band {
    offset: f64,
    size: f64,
}

/// Split `total` into start, middle and end bands.
fn bands(offset: f64, total: f64, start: f64, end: f64) -> [Band; 3] {
    [
        Band { offset, size: start },
        Band {
            offset: offset + start,
            size: (total - start - end).max(0.0),
        },
        Band {
            offset: offset + total - end,
            size: end,
        },
    ]
}

fn border_value(style: &ComputedStyle, property: PropertyId) -> BorderValue {
    match style.get(property) {
        CssValue::Border(value) => (**value).clone(),
        _ => BorderValue::uniform(CssValue::percent(100.0)),
    }
}

/// Slice sizes in source pixels: numbers are pixels, percentages are of
/// the source size.
fn slice_size(slice: &BorderValue, side: Side, source: f64) -> f64 {
    slice
        .side(side)
        .map_or(0.0, |v| v.get(source))
        .clamp(0.0, source)
}

/// Border image width of one side: numbers multiply the border width,
/// `auto` uses the slice size.
fn image_width(
    widths: &BorderValue,
    side: Side,
    border_width: f64,
    slice: f64,
    area: f64,
) -> f64 {
    match widths.side(side) {
        None => slice,
        Some(CssValue::Number(d)) if d.unit == Unit::Number => d.value * border_width,
        Some(value) => value.get(area),
    }
}

/// Scale two opposite widths down together when they overlap.
fn fit_pair(start: f64, end: f64, area: f64) -> (f64, f64) {
    if start + end > area && start + end > 0.0 {
        let factor = area / (start + end);
        (start * factor, end * factor)
    } else {
        (start, end)
    }
}

fn render_border_image(
    style: &ComputedStyle,
    image: &dyn CssImage,
    snapshot: &mut Snapshot,
    rect: Rect,
    border_widths: Sides<f64>,
) {
    let (source_width, source_height) = image.concrete_size(0.0, 0.0, rect.width, rect.height);
    if source_width <= 0.0 || source_height <= 0.0 {
        log::debug!("border image has no size, skipped");
        return;
    }
    let slice = border_value(style, PropertyId::BorderImageSlice);
    let widths = border_value(style, PropertyId::BorderImageWidth);
    let repeat = match style.get(PropertyId::BorderImageRepeat) {
        CssValue::BorderRepeat(repeat) => *repeat,
        _ => BorderImageRepeat::default(),
    };

    let s = Sides::from_array(Side::ALL.map(|side| {
        let source = if side.is_horizontal() { source_height } else { source_width };
        slice_size(&slice, side, source)
    }));
    let w = Sides::from_array(Side::ALL.map(|side| {
        let area = if side.is_horizontal() { rect.height } else { rect.width };
        image_width(&widths, side, border_widths[side], s[side], area)
    }));
    let (left, right) = fit_pair(w.left, w.right, rect.width);
    let (top, bottom) = fit_pair(w.top, w.bottom, rect.height);

    let slice_x = bands(0.0, source_width, s.left, s.right);
    let slice_y = bands(0.0, source_height, s.top, s.bottom);
    let area_x = bands(rect.x, rect.width, left, right);
    let area_y = bands(rect.y, rect.height, top, bottom);
    let source = (source_width, source_height);

    for v in 0..3 {
        for h in 0..3 {
            if v == 1 && h == 1 && !slice.fill {
                continue;
            }
            if slice_x[h].size <= 0.0 || slice_y[v].size <= 0.0 {
                continue;
            }
            let dest = Rect::new(area_x[h].offset, area_y[v].offset, area_x[h].size, area_y[v].size);
            let hrepeat = if h == 1 { repeat.x } else { BorderRepeatStyle::Stretch };
            let vrepeat = if v == 1 { repeat.y } else { BorderRepeatStyle::Stretch };
            let region = Rect::new(slice_x[h].offset, slice_y[v].offset, slice_x[h].size, slice_y[v].size);
            render_slice(snapshot, image, source, region, dest, hrepeat, vrepeat);
        }
    }
}

/// Tile geometry along one axis: scale, step between tiles and the
/// shrunken destination band.
struct Axis {
    scale: f64,
    step: f64,
    offset: f64,
    size: f64,
}

fn tile_axis(
    style: BorderRepeatStyle,
    slice: f64,
    offset: f64,
    size: f64,
    stretch_scale: f64,
    other_scale: f64,
) -> Option<Axis> {
    let axis = match style {
        BorderRepeatStyle::Stretch => Axis {
            scale: stretch_scale,
            step: size,
            offset,
            size,
        },
        BorderRepeatStyle::Repeat => Axis {
            scale: other_scale,
            step: other_scale * slice,
            offset,
            size,
        },
        BorderRepeatStyle::Round => {
            let n = (size / (slice * other_scale)).round().max(1.0);
            let scale = size / (slice * n);
            Axis {
                scale,
                step: scale * slice,
                offset,
                size,
            }
        }
        BorderRepeatStyle::Space => {
            let tile = other_scale * slice;
            let n = (size / tile).floor();
            if n < 1.0 {
                return None;
            }
            let space = (size - n * tile) / (n + 1.0);
            Axis {
                scale: other_scale,
                step: tile + space,
                offset: offset + space,
                size: size - 2.0 * space,
            }
        }
    };
    Some(axis)
}

fn render_slice(
    snapshot: &mut Snapshot,
    image: &dyn CssImage,
    (source_width, source_height): (f64, f64),
    region: Rect,
    dest: Rect,
    hrepeat: BorderRepeatStyle,
    vrepeat: BorderRepeatStyle,
) {
    if dest.is_empty() {
        return;
    }
    let hstretch = dest.width / region.width;
    let vstretch = dest.height / region.height;
    // Repeating axes keep the other axis' scale; two repeating axes (the
    // center) keep the image's own scale.
    let (hother, vother) = match (hrepeat, vrepeat) {
        (BorderRepeatStyle::Stretch, _) | (_, BorderRepeatStyle::Stretch) => (vstretch, hstretch),
        _ => (1.0, 1.0),
    };
    let Some(x) = tile_axis(hrepeat, region.width, dest.x, dest.width, hstretch, hother) else {
        return;
    };
    let Some(y) = tile_axis(vrepeat, region.height, dest.y, dest.height, vstretch, vother) else {
        return;
    };

    let tile = Rect::new(x.offset, y.offset, x.scale * region.width, y.scale * region.height);
    let tiled = hrepeat != BorderRepeatStyle::Stretch || vrepeat != BorderRepeatStyle::Stretch;
    if tiled {
        let bounds = Rect::new(x.offset, y.offset, x.size, y.size);
        snapshot.push_repeat(bounds, Rect::new(tile.x, tile.y, x.step, y.step));
    }
    snapshot.push_clip(tile);
    let origin = (tile.x - region.x * x.scale, tile.y - region.y * y.scale);
    snapshot.offset(origin.0, origin.1);
    image.snapshot(snapshot, source_width * x.scale, source_height * y.scale);
    snapshot.pop();
    if tiled {
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

    fn style(css: &str) -> ComputedStyle {
        let provider = StaticProvider::default().with_image("frame.png", 30, 30);
        let (block, errors) = DeclarationBlock::parse(css);
        assert!(errors.is_empty(), "{errors:?}");
        ComputedStyle::compute(&block, &provider, None)
    }

    fn paint(css: &str, rect: Rect) -> Vec<RenderNode> {
        let mut snapshot = Snapshot::new();
        render_border(&style(css), &mut snapshot, rect);
        match snapshot.finish() {
            RenderNode::Container(nodes) => nodes,
            other => vec![other],
        }
    }

    const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn solid_border_is_one_node() {
        let nodes = paint("border: 2px solid red", Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(
            nodes,
            vec![RenderNode::Border {
                outline: RoundedBox::from_rect(Rect::new(0.0, 0.0, 20.0, 10.0)),
                widths: Sides::all(2.0),
                colors: Sides::all(RED),
            }]
        );
    }

    #[test]
    fn no_style_no_border() {
        assert!(paint("border-width: 4px", Rect::new(0.0, 0.0, 20.0, 10.0)).is_empty());
    }

    #[test]
    fn double_splits_into_thirds() {
        let nodes = paint("border: 9px double red", Rect::new(0.0, 0.0, 30.0, 30.0));
        let rings: Vec<_> = nodes
            .iter()
            .map(|n| match n {
                RenderNode::Border { outline, widths, .. } => (outline.rect, widths.top),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            rings,
            vec![
                (Rect::new(0.0, 0.0, 30.0, 30.0), 3.0),
                (Rect::new(6.0, 6.0, 18.0, 18.0), 3.0),
            ]
        );
    }

    #[test]
    fn inset_shades_sides() {
        let nodes = paint("border: 4px inset rgb(100,100,100)", Rect::new(0.0, 0.0, 20.0, 20.0));
        let RenderNode::Border { colors, .. } = &nodes[0] else {
            panic!("expected a border");
        };
        assert_eq!(colors.top, colors.left);
        assert_eq!(colors.bottom, colors.right);
        assert!(colors.top.red < colors.bottom.red);
    }

    #[test]
    fn groove_paints_two_halves_with_swapped_shades() {
        let nodes = paint("border: 4px groove rgb(100,100,100)", Rect::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(nodes.len(), 2);
        let (RenderNode::Border { colors: outer, widths, .. }, RenderNode::Border { colors: inner, .. }) =
            (&nodes[0], &nodes[1])
        else {
            panic!("expected two borders");
        };
        assert_eq!(widths.top, 2.0);
        assert_eq!(outer.top, inner.bottom);
        assert!(outer.top.red < outer.bottom.red);
    }

    #[test]
    fn uniform_dashes_stroke_the_whole_outline() {
        let nodes = paint("border: 2px dashed red", Rect::new(0.0, 0.0, 30.0, 10.0));
        assert_eq!(
            nodes,
            vec![RenderNode::Stroke {
                path: RoundedBox::from_rect(Rect::new(1.0, 1.0, 28.0, 8.0)),
                side: None,
                line_width: 2.0,
                dash: vec![2.0, 4.0],
                color: RED,
            }]
        );
    }

    #[test]
    fn dotted_segments_fit_whole_dots() {
        // 80px outline, 2px dots: 20 dots every 4px.
        assert_eq!(dash_pattern(BorderStyle::Dotted, 2.0, 80.0), vec![0.0, 4.0]);
        // 50 / 3 = 16.7 is not whole: round(16.7 / 3) = 6 dashes of 50/18.
        let dash = dash_pattern(BorderStyle::Dashed, 3.0, 50.0);
        assert!((dash[0] - 50.0 / 18.0).abs() < 1e-12);
    }

    #[test]
    fn dotted_sides_of_different_colors_stroke_separately() {
        let nodes = paint(
            "border: 2px dotted red; border-bottom-color: blue",
            Rect::new(0.0, 0.0, 30.0, 10.0),
        );
        let strokes: Vec<_> = nodes
            .iter()
            .map(|n| match n {
                RenderNode::Stroke { side, color, .. } => (*side, *color),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        let blue = Rgba::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            strokes,
            vec![
                (Some(Side::Top), RED),
                (Some(Side::Right), RED),
                (Some(Side::Left), RED),
                (Some(Side::Bottom), blue),
            ]
        );
    }

    #[test]
    fn dots_fit_the_stroked_path_exactly() {
        let nodes = paint("border: 2px dotted red", Rect::new(0.0, 0.0, 25.5, 25.5));
        let [RenderNode::Stroke { path, side: None, dash, .. }] = &nodes[..] else {
            panic!("expected one stroke, got {nodes:?}");
        };
        // The center line is 23.5px square: 94px long.
        assert_eq!(path.path_length(), 94.0);
        let dots = path.path_length() / dash[1];
        assert!((dots - dots.round()).abs() < 1e-9, "{dots} dots");
    }

    #[test]
    fn mixed_styles_stroke_single_sides() {
        let nodes = paint(
            "border: 2px solid red; border-top-style: dotted",
            Rect::new(0.0, 0.0, 30.0, 10.0),
        );
        assert_eq!(nodes.len(), 2);
        assert!(matches!(
            nodes[0],
            RenderNode::Stroke { side: Some(Side::Top), .. }
        ));
        let RenderNode::Border { colors, .. } = &nodes[1] else {
            panic!("expected a border");
        };
        assert_eq!(colors.top, Rgba::TRANSPARENT);
        assert_eq!(colors.left, RED);
    }

    #[test]
    fn hairline_widths_are_skipped() {
        assert!(paint("border: 0.0001px solid red", Rect::new(0.0, 0.0, 5.0, 5.0)).is_empty());
    }

    fn textures(nodes: &[RenderNode]) -> Vec<Rect> {
        let mut found = Vec::new();
        for node in nodes {
            node.walk(&mut |n| {
                if let RenderNode::Texture { bounds, .. } = n {
                    found.push(*bounds);
                }
            });
        }
        found
    }

    #[test]
    fn border_image_nine_slice() {
        let rect = Rect::new(0.0, 0.0, 60.0, 60.0);
        let nodes = paint("border: 10px solid; border-image: url(frame.png) 10", rect);
        assert_eq!(textures(&nodes).len(), 8);
        let nodes = paint("border: 10px solid; border-image: url(frame.png) 10 fill", rect);
        assert_eq!(textures(&nodes).len(), 9);
    }

    #[test]
    fn border_image_corners_map_slices() {
        let rect = Rect::new(0.0, 0.0, 60.0, 60.0);
        let nodes = paint("border: 5px solid; border-image: url(frame.png) 10", rect);
        let RenderNode::Clip { clip, child } = &nodes[0] else {
            panic!("expected a clip");
        };
        // The 10px top-left slice shrinks into the 5px corner.
        assert_eq!(*clip, Rect::new(0.0, 0.0, 5.0, 5.0));
        assert!(matches!(
            **child,
            RenderNode::Texture { bounds, .. } if bounds == Rect::new(0.0, 0.0, 15.0, 15.0)
        ));
    }

    #[test]
    fn unresolved_border_image_falls_back_to_style() {
        let nodes = paint(
            "border: 2px solid red; border-image-source: url(missing.png)",
            Rect::new(0.0, 0.0, 10.0, 10.0),
        );
        assert!(matches!(nodes[..], [RenderNode::Border { .. }]));
    }

    #[test]
    fn outline_grows_by_width_and_offset() {
        let s = style("outline: 2px solid red; outline-offset: 1px");
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(outline_clip(&s, rect), Some(Rect::new(-3.0, -3.0, 16.0, 16.0)));
        let mut snapshot = Snapshot::new();
        render_outline(&s, &mut snapshot, rect);
        assert_eq!(
            snapshot.finish(),
            RenderNode::Container(vec![RenderNode::Border {
                outline: RoundedBox::from_rect(Rect::new(-3.0, -3.0, 16.0, 16.0)),
                widths: Sides::all(2.0),
                colors: Sides::all(RED),
            }])
        );
        assert_eq!(outline_clip(&style("outline-width: 3px"), rect), None);
    }
}
