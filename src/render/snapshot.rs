//! Retained scene recording.
//!
//! A [`Snapshot`] records drawing operations into a tree of [`RenderNode`]s.
//! Leaf operations (`append_*`) add a node to the innermost open group;
//! `push_*` opens a group that collects everything until the matching
//! [`Snapshot::pop`]. Coordinates are translated by the current offset,
//! which each push saves and the matching pop restores.

use std::rc::Rc;

use crate::css::values::{BlendMode, Rgba};
use crate::geometry::{Point, Rect, Side, Sides};
use crate::render::rounded_box::RoundedBox;

// ---------------------------------------------------------------------------
// Texture
// ---------------------------------------------------------------------------

/// A decoded image with a pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: Rc<str>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: Rc::from(name),
            width,
            height,
        }
    }
}

// ---------------------------------------------------------------------------
// RenderNode
// ---------------------------------------------------------------------------

/// Parameters shared by both kinds of box shadow.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowParams {
    pub color: Rgba,
    pub dx: f64,
    pub dy: f64,
    pub spread: f64,
    pub blur_radius: f64,
}

/// One node of a recorded scene.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    /// A list of nodes painted in order.
    Container(Vec<RenderNode>),
    /// A solid rectangle.
    Color { color: Rgba, bounds: Rect },
    /// A texture scaled to `bounds`.
    Texture { texture: Texture, bounds: Rect },
    /// The area between `outline` and `outline` shrunk by `widths`, each
    /// side in its own color.
    Border {
        outline: RoundedBox,
        widths: Sides<f64>,
        colors: Sides<Rgba>,
    },
    /// A stroke along `path`, or only along one side of it, with an
    /// optional dash pattern (on, off, on, ...). A zero-length dash is a
    /// round dot.
    Stroke {
        path: RoundedBox,
        side: Option<Side>,
        line_width: f64,
        dash: Vec<f64>,
        color: Rgba,
    },
    Clip { clip: Rect, child: Box<RenderNode> },
    RoundedClip { clip: RoundedBox, child: Box<RenderNode> },
    /// `child`, recorded inside `child_bounds`, tiled to fill `bounds`.
    Repeat {
        bounds: Rect,
        child_bounds: Rect,
        child: Box<RenderNode>,
    },
    /// `child` composited onto what is below it with `mode`.
    Blend { mode: BlendMode, child: Box<RenderNode> },
    /// `child` composited on its own, then painted normally: blends inside
    /// never see what lies below the group.
    Isolate { child: Box<RenderNode> },
    OutsetShadow { outline: RoundedBox, shadow: ShadowParams },
    InsetShadow { outline: RoundedBox, shadow: ShadowParams },
}

impl RenderNode {
    /// Number of nodes in the tree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(|c| c.count()).sum::<usize>()
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Container(children) => children,
            RenderNode::Clip { child, .. }
            | RenderNode::RoundedClip { child, .. }
            | RenderNode::Repeat { child, .. }
            | RenderNode::Blend { child, .. }
            | RenderNode::Isolate { child } => std::slice::from_ref(&**child),
            _ => &[],
        }
    }

    /// Visit every node depth-first, parents first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a RenderNode)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Collect every leaf node, in paint order.
    pub fn leaves(&self) -> Vec<&RenderNode> {
        let mut leaves = Vec::new();
        self.walk(&mut |node| {
            if node.children().is_empty() && !matches!(node, RenderNode::Container(_)) {
                leaves.push(node);
            }
        });
        leaves
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum GroupKind {
    Root,
    Clip(Rect),
    RoundedClip(RoundedBox),
    Repeat { bounds: Rect, child_bounds: Rect },
    Blend(BlendMode),
    Isolate,
}

#[derive(Debug)]
struct Group {
    kind: GroupKind,
    nodes: Vec<RenderNode>,
    saved_offset: Point,
}

impl Group {
    fn into_node(self) -> Option<RenderNode> {
        let mut nodes = self.nodes;
        let child = match nodes.len() {
            0 => return None,
            1 => nodes.pop()?,
            _ => RenderNode::Container(nodes),
        };
        let child = Box::new(child);
        Some(match self.kind {
            GroupKind::Root => *child,
            GroupKind::Clip(clip) => RenderNode::Clip { clip, child },
            GroupKind::RoundedClip(clip) => RenderNode::RoundedClip { clip, child },
            GroupKind::Repeat { bounds, child_bounds } => RenderNode::Repeat {
                bounds,
                child_bounds,
                child,
            },
            GroupKind::Blend(mode) => RenderNode::Blend { mode, child },
            GroupKind::Isolate => RenderNode::Isolate { child },
        })
    }
}

/// Records drawing operations into a [`RenderNode`] tree.
#[derive(Debug)]
pub struct Snapshot {
    stack: Vec<Group>,
    offset: Point,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            stack: vec![Group {
                kind: GroupKind::Root,
                nodes: Vec::new(),
                saved_offset: Point::new(0.0, 0.0),
            }],
            offset: Point::new(0.0, 0.0),
        }
    }

    /// Finish recording. Groups left open are closed.
    pub fn finish(mut self) -> RenderNode {
        if self.stack.len() > 1 {
            log::warn!("snapshot finished with {} open groups", self.stack.len() - 1);
        }
        while self.stack.len() > 1 {
            self.pop();
        }
        match self.stack.pop() {
            Some(root) => RenderNode::Container(root.nodes),
            None => RenderNode::Container(Vec::new()),
        }
    }

    /// Translate everything recorded after this call.
    pub fn offset(&mut self, dx: f64, dy: f64) {
        self.offset = Point::new(self.offset.x + dx, self.offset.y + dy);
    }

    /// The current translation.
    pub fn current_offset(&self) -> Point {
        self.offset
    }

    fn translate(&self, rect: Rect) -> Rect {
        rect.offset(self.offset.x, self.offset.y)
    }

    fn translate_box(&self, rounded: &RoundedBox) -> RoundedBox {
        rounded.offset(self.offset.x, self.offset.y)
    }

    fn append(&mut self, node: RenderNode) {
        if let Some(group) = self.stack.last_mut() {
            group.nodes.push(node);
        }
    }

    fn push(&mut self, kind: GroupKind) {
        self.stack.push(Group {
            kind,
            nodes: Vec::new(),
            saved_offset: self.offset,
        });
    }

    // ── Leaves ──────────────────────────────────────────────────────────

    pub fn append_color(&mut self, color: Rgba, bounds: Rect) {
        if bounds.is_empty() {
            return;
        }
        let bounds = self.translate(bounds);
        self.append(RenderNode::Color { color, bounds });
    }

    pub fn append_texture(&mut self, texture: &Texture, bounds: Rect) {
        if bounds.is_empty() {
            return;
        }
        let bounds = self.translate(bounds);
        self.append(RenderNode::Texture {
            texture: texture.clone(),
            bounds,
        });
    }

    /// Fill the ring between `outline` and `outline` shrunk by `widths`.
    pub fn append_border(&mut self, outline: &RoundedBox, widths: Sides<f64>, colors: Sides<Rgba>) {
        let outline = self.translate_box(outline);
        self.append(RenderNode::Border {
            outline,
            widths,
            colors,
        });
    }

    /// Stroke `path` (or one side of it) with a dash pattern; an empty
    /// pattern strokes solid.
    pub fn append_stroke(
        &mut self,
        path: &RoundedBox,
        side: Option<Side>,
        line_width: f64,
        dash: &[f64],
        color: Rgba,
    ) {
        let path = self.translate_box(path);
        self.append(RenderNode::Stroke {
            path,
            side,
            line_width,
            dash: dash.to_vec(),
            color,
        });
    }

    pub fn append_outset_shadow(&mut self, outline: &RoundedBox, shadow: ShadowParams) {
        let outline = self.translate_box(outline);
        self.append(RenderNode::OutsetShadow { outline, shadow });
    }

    pub fn append_inset_shadow(&mut self, outline: &RoundedBox, shadow: ShadowParams) {
        let outline = self.translate_box(outline);
        self.append(RenderNode::InsetShadow { outline, shadow });
    }

    // ── Groups ──────────────────────────────────────────────────────────

    pub fn push_clip(&mut self, clip: Rect) {
        let clip = self.translate(clip);
        self.push(GroupKind::Clip(clip));
    }

    pub fn push_rounded_clip(&mut self, clip: &RoundedBox) {
        let clip = self.translate_box(clip);
        self.push(GroupKind::RoundedClip(clip));
    }

    /// Tile what is recorded inside `child_bounds` over `bounds`.
    pub fn push_repeat(&mut self, bounds: Rect, child_bounds: Rect) {
        let bounds = self.translate(bounds);
        let child_bounds = self.translate(child_bounds);
        self.push(GroupKind::Repeat {
            bounds,
            child_bounds,
        });
    }

    pub fn push_blend(&mut self, mode: BlendMode) {
        self.push(GroupKind::Blend(mode));
    }

    /// Start a group composited separately from what is already drawn.
    pub fn push_isolate(&mut self) {
        self.push(GroupKind::Isolate);
    }

    /// Close the innermost group. Groups with nothing inside are dropped.
    pub fn pop(&mut self) {
        if self.stack.len() <= 1 {
            log::warn!("snapshot pop without a matching push");
            return;
        }
        let Some(group) = self.stack.pop() else {
            return;
        };
        self.offset = group.saved_offset;
        if let Some(node) = group.into_node() {
            self.append(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);

    #[test]
    fn offset_applies_to_leaves() {
        let mut s = Snapshot::new();
        s.offset(10.0, 5.0);
        s.append_color(RED, Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(
            s.finish(),
            RenderNode::Container(vec![RenderNode::Color {
                color: RED,
                bounds: Rect::new(10.0, 5.0, 4.0, 4.0),
            }])
        );
    }

    #[test]
    fn pop_restores_offset_and_wraps_children() {
        let mut s = Snapshot::new();
        s.push_clip(Rect::new(0.0, 0.0, 8.0, 8.0));
        s.offset(2.0, 2.0);
        s.append_color(RED, Rect::new(0.0, 0.0, 1.0, 1.0));
        s.append_color(RED, Rect::new(1.0, 0.0, 1.0, 1.0));
        s.pop();
        assert_eq!(s.current_offset(), Point::new(0.0, 0.0));
        let node = s.finish();
        let RenderNode::Container(nodes) = &node else {
            panic!("expected a container");
        };
        assert!(matches!(
            &nodes[0],
            RenderNode::Clip { child, .. } if matches!(**child, RenderNode::Container(ref c) if c.len() == 2)
        ));
        assert_eq!(node.count(), 5);
        assert_eq!(node.leaves().len(), 2);
    }

    #[test]
    fn empty_groups_and_empty_rects_vanish() {
        let mut s = Snapshot::new();
        s.push_blend(BlendMode::Multiply);
        s.append_color(RED, Rect::new(0.0, 0.0, 0.0, 10.0));
        s.pop();
        assert_eq!(s.finish(), RenderNode::Container(Vec::new()));
    }

    #[test]
    fn unbalanced_pop_is_ignored_and_finish_closes() {
        let mut s = Snapshot::new();
        s.pop();
        s.push_repeat(Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 0.0, 5.0, 5.0));
        s.append_texture(&Texture::new("t", 5, 5), Rect::new(0.0, 0.0, 5.0, 5.0));
        let node = s.finish();
        assert!(matches!(node.children()[0], RenderNode::Repeat { .. }));
    }
}
