//! Scene dump helpers.
//!
//! Functions for converting recorded render trees into indented plain text
//! suitable for snapshot testing and assertions.

use std::fmt::Write;

use crate::geometry::{Rect, Side, Sides};
use crate::render::snapshot::{RenderNode, ShadowParams, Snapshot};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render a node tree as text, one node per line, children indented by two
/// spaces. Lines are separated by `'\n'`; there is no trailing newline.
///
/// # Examples
///
/// ```
/// use gilt_css::geometry::Rect;
/// use gilt_css::css::values::Rgba;
/// use gilt_css::render::Snapshot;
/// use gilt_css::testing::dump;
///
/// let mut snapshot = Snapshot::new();
/// snapshot.append_color(Rgba::BLACK, Rect::new(0.0, 0.0, 4.0, 2.0));
/// assert_eq!(dump(&snapshot.finish()), "container\n  color rgb(0,0,0) 0 0 4 2");
/// ```
pub fn dump(node: &RenderNode) -> String {
    let mut out = String::new();
    dump_node(&mut out, node, 0);
    out
}

/// Run `paint` against a fresh [`Snapshot`] and dump the result.
pub fn paint_to_string(paint: impl FnOnce(&mut Snapshot)) -> String {
    let mut snapshot = Snapshot::new();
    paint(&mut snapshot);
    dump(&snapshot.finish())
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn rect(r: &Rect) -> String {
    format!("{} {} {} {}", r.x, r.y, r.width, r.height)
}

fn sides<T: Copy + PartialEq + std::fmt::Display>(s: &Sides<T>) -> String {
    if s.is_uniform() {
        s.top.to_string()
    } else {
        format!("{} {} {} {}", s.top, s.right, s.bottom, s.left)
    }
}

fn side_name(side: Option<Side>) -> &'static str {
    match side {
        None => "all",
        Some(Side::Top) => "top",
        Some(Side::Right) => "right",
        Some(Side::Bottom) => "bottom",
        Some(Side::Left) => "left",
    }
}

fn shadow(s: &ShadowParams) -> String {
    format!(
        "{} offset {} {} spread {} blur {}",
        s.color, s.dx, s.dy, s.spread, s.blur_radius
    )
}

fn dump_node(out: &mut String, node: &RenderNode, depth: usize) {
    if !out.is_empty() {
        out.push('\n');
    }
    for _ in 0..depth {
        out.push_str("  ");
    }
    // Writing to a String cannot fail.
    let _ = match node {
        RenderNode::Container(_) => write!(out, "container"),
        RenderNode::Color { color, bounds } => write!(out, "color {color} {}", rect(bounds)),
        RenderNode::Texture { texture, bounds } => {
            write!(out, "texture {} {}", texture.name, rect(bounds))
        }
        RenderNode::Border {
            outline,
            widths,
            colors,
        } => write!(
            out,
            "border {outline} widths {} colors {}",
            sides(widths),
            sides(colors)
        ),
        RenderNode::Stroke {
            path,
            side,
            line_width,
            dash,
            color,
        } => write!(
            out,
            "stroke {path} side {} width {line_width} dash {dash:?} {color}",
            side_name(*side)
        ),
        RenderNode::Clip { clip, .. } => write!(out, "clip {}", rect(clip)),
        RenderNode::RoundedClip { clip, .. } => write!(out, "rounded-clip {clip}"),
        RenderNode::Repeat {
            bounds,
            child_bounds,
            ..
        } => write!(out, "repeat {} tile {}", rect(bounds), rect(child_bounds)),
        RenderNode::Blend { mode, .. } => write!(out, "blend {mode}"),
        RenderNode::Isolate { .. } => write!(out, "isolate"),
        RenderNode::OutsetShadow { outline, shadow: s } => {
            write!(out, "outset-shadow {outline} {}", shadow(s))
        }
        RenderNode::InsetShadow { outline, shadow: s } => {
            write!(out, "inset-shadow {outline} {}", shadow(s))
        }
    };
    for child in node.children() {
        dump_node(out, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::values::{BlendMode, Rgba};
    use crate::render::rounded_box::{CornerRadius, RoundedBox};
    use crate::render::snapshot::Texture;

    const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn dump_empty() {
        assert_eq!(paint_to_string(|_| {}), "container");
    }

    #[test]
    fn dump_nests_groups() {
        let text = paint_to_string(|s| {
            s.push_blend(BlendMode::Multiply);
            s.push_repeat(Rect::new(0.0, 0.0, 20.0, 10.0), Rect::new(0.0, 0.0, 5.0, 5.0));
            s.append_texture(&Texture::new("tile.png", 5, 5), Rect::new(0.0, 0.0, 5.0, 5.0));
            s.pop();
            s.pop();
            s.append_border(
                &RoundedBox {
                    rect: Rect::new(0.0, 0.0, 20.0, 10.0),
                    corners: [CornerRadius::new(2.0, 2.0); 4],
                },
                Sides::new(1.0, 2.0, 1.0, 2.0),
                Sides::all(RED),
            );
        });
        insta::assert_snapshot!(text, @r"
        container
          blend multiply
            repeat 0 0 20 10 tile 0 0 5 5
              texture tile.png 0 0 5 5
          border 0 0 20 10 / 2 2 2 2 widths 1 2 1 2 colors rgb(255,0,0)
        ");
    }

    #[test]
    fn dump_strokes_and_shadows() {
        let outline = RoundedBox::from_rect(Rect::new(1.0, 1.0, 8.0, 8.0));
        let text = paint_to_string(|s| {
            s.append_stroke(&outline, Some(Side::Left), 2.0, &[0.0, 4.0], RED);
            s.append_inset_shadow(
                &outline,
                ShadowParams {
                    color: RED,
                    dx: 1.0,
                    dy: -1.0,
                    spread: 0.0,
                    blur_radius: 3.0,
                },
            );
        });
        insta::assert_snapshot!(text, @r"
        container
          stroke 1 1 8 8 side left width 2 dash [0.0, 4.0] rgb(255,0,0)
          inset-shadow 1 1 8 8 rgb(255,0,0) offset 1 -1 spread 0 blur 3
        ");
    }
}
