//! The CSS box model around a piece of content.
//!
//! A [`Gadget`] wraps a [`ContentProvider`] in margin, border and padding
//! taken from its computed style. Layout is two-phase: ask for the
//! preferred size in each orientation, then allocate. Allocation stores
//! the margin box and computes the clip the owner must honor for drawing
//! and invalidation.

use std::rc::Rc;

use crate::css::style::ComputedStyle;
use crate::geometry::{Rect, Region, Sides};
use crate::render::snapshot::Snapshot;
use crate::render::{outline_clip, render_background, render_border, render_outline};

// ---------------------------------------------------------------------------
// Sizes
// ---------------------------------------------------------------------------

/// The axis a size request is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn opposite(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Result of a size request. Baselines are only meaningful vertically;
/// `-1` means "no baseline".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferredSize {
    pub minimum: i32,
    pub natural: i32,
    pub minimum_baseline: i32,
    pub natural_baseline: i32,
}

impl PreferredSize {
    /// Zero size, no baseline.
    pub const NONE: PreferredSize = PreferredSize {
        minimum: 0,
        natural: 0,
        minimum_baseline: -1,
        natural_baseline: -1,
    };

    /// A size without baselines.
    pub const fn new(minimum: i32, natural: i32) -> Self {
        Self {
            minimum,
            natural,
            minimum_baseline: -1,
            natural_baseline: -1,
        }
    }

    pub const fn with_baselines(mut self, minimum: i32, natural: i32) -> Self {
        self.minimum_baseline = minimum;
        self.natural_baseline = natural;
        self
    }
}

// ---------------------------------------------------------------------------
// ContentProvider
// ---------------------------------------------------------------------------

/// What sits inside the content box: measures, allocates and draws it.
///
/// All methods have defaults, so an empty box needs no code at all.
pub trait ContentProvider {
    /// Size of the content alone. `for_size` is the content size in the
    /// opposite orientation, or `-1` when unknown.
    fn content_size(&self, orientation: Orientation, for_size: i32) -> PreferredSize {
        let _ = (orientation, for_size);
        PreferredSize::new(0, 0)
    }

    /// Lay out the content in `allocation` and return the area it draws
    /// into. `baseline` is relative to the content box.
    fn allocate_content(&mut self, allocation: Region, baseline: i32) -> Region {
        let _ = (allocation, baseline);
        Region::EMPTY
    }

    /// Draw into the content box `rect`. Returning `true` requests the
    /// outline (focus ring) on top.
    fn draw_content(&self, snapshot: &mut Snapshot, rect: Rect) -> bool {
        let _ = (snapshot, rect);
        false
    }
}

/// Content that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContent;

impl ContentProvider for EmptyContent {}

// ---------------------------------------------------------------------------
// Gadget
// ---------------------------------------------------------------------------

/// Layout uses whole pixels: fractions below one round up so thin
/// borders stay visible, larger values round down.
fn extent(v: f64) -> i32 {
    if v < 1.0 {
        v.ceil() as i32
    } else {
        v.floor() as i32
    }
}

fn extents(sides: Sides<f64>) -> Sides<i32> {
    sides.map(extent)
}

pub struct Gadget {
    style: Rc<ComputedStyle>,
    content: Box<dyn ContentProvider>,
    visible: bool,
    allocated: Region,
    allocated_baseline: i32,
    clip: Region,
    needs_allocation: bool,
}

impl Gadget {
    pub fn new(style: Rc<ComputedStyle>, content: Box<dyn ContentProvider>) -> Self {
        Self {
            style,
            content,
            visible: true,
            allocated: Region::EMPTY,
            allocated_baseline: -1,
            clip: Region::EMPTY,
            needs_allocation: true,
        }
    }

    pub fn style(&self) -> &Rc<ComputedStyle> {
        &self.style
    }

    /// Replace the style. A different style invalidates the allocation.
    pub fn set_style(&mut self, style: Rc<ComputedStyle>) {
        if Rc::ptr_eq(&self.style, &style) || *self.style == *style {
            return;
        }
        self.style = style;
        self.needs_allocation = true;
    }

    pub fn content(&self) -> &dyn ContentProvider {
        &*self.content
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.needs_allocation = true;
        }
    }

    /// Whether the gadget changed since it was last allocated.
    pub fn needs_allocation(&self) -> bool {
        self.needs_allocation
    }

    fn margin(&self) -> Sides<i32> {
        extents(self.style.margin())
    }

    fn border(&self) -> Sides<i32> {
        extents(self.style.border_widths())
    }

    fn padding(&self) -> Sides<i32> {
        extents(self.style.padding())
    }

    fn min_size(&self, orientation: Orientation) -> i32 {
        let min = match orientation {
            Orientation::Horizontal => self.style.min_width(),
            Orientation::Vertical => self.style.min_height(),
        };
        min.ceil() as i32
    }

    // ── Size request ────────────────────────────────────────────────────

    /// Whether `for_size` is smaller than the min-width or min-height it is
    /// measured against. Extents are not added to the minimum.
    fn below_min_for_size(&self, orientation: Orientation, for_size: i32) -> bool {
        for_size < self.min_size(orientation.opposite())
    }

    /// Preferred size of the margin box in `orientation`, `for_size` being
    /// the margin box size in the other orientation (`-1` if unknown).
    pub fn get_preferred_size(&self, orientation: Orientation, for_size: i32) -> PreferredSize {
        if !self.visible {
            return PreferredSize::NONE;
        }

        let extents = self.margin() + self.border() + self.padding();
        let (extra_size, extra_opposite, extra_baseline) = match orientation {
            Orientation::Horizontal => (extents.horizontal(), extents.vertical(), extents.left),
            Orientation::Vertical => (extents.vertical(), extents.horizontal(), extents.top),
        };

        let mut for_size = for_size;
        if for_size > -1 {
            if self.below_min_for_size(orientation, for_size) {
                log::warn!(
                    "{orientation:?} size requested for {for_size}px, below the minimum {}px",
                    self.min_size(orientation.opposite())
                );
            }
            for_size = (for_size - extra_opposite).max(0);
        }

        let raw = self.content.content_size(orientation, for_size);
        let min_size = self.min_size(orientation);
        let minimum = raw.minimum.max(min_size);
        let natural = raw.natural.max(min_size);

        let shift = |baseline: i32, grown: i32| {
            if baseline < 0 {
                -1
            } else {
                (baseline + grown / 2 + extra_baseline).max(0)
            }
        };

        PreferredSize {
            minimum: (minimum + extra_size).max(0),
            natural: (natural + extra_size).max(0),
            minimum_baseline: shift(raw.minimum_baseline, minimum - raw.minimum),
            natural_baseline: shift(raw.natural_baseline, natural - raw.natural),
        }
    }

    // ── Allocation ──────────────────────────────────────────────────────

    /// Assign the margin box and return the clip.
    ///
    /// `baseline` is relative to the margin box, `-1` for none.
    pub fn allocate(&mut self, allocation: Region, baseline: i32) -> Region {
        self.needs_allocation = false;
        if !self.visible {
            self.clip = Region::EMPTY;
            return self.clip;
        }
        self.allocated = allocation;
        self.allocated_baseline = baseline;

        let margin = self.margin();
        let extents = margin + self.border() + self.padding();
        let mut content = Region::new(
            allocation.x + extents.left,
            allocation.y + extents.top,
            allocation.width - extents.horizontal(),
            allocation.height - extents.vertical(),
        );
        if content.width < 0 || content.height < 0 {
            log::warn!(
                "gadget allocated {}x{}, needs at least {}x{}",
                allocation.width,
                allocation.height,
                extents.horizontal(),
                extents.vertical()
            );
            content.width = content.width.max(0);
            content.height = content.height.max(0);
        }
        let content_baseline = if baseline >= 0 {
            baseline - extents.top
        } else {
            -1
        };
        let content_clip = self.content.allocate_content(content, content_baseline);

        let border_box = allocation.shrink(margin);
        let mut clip = self.shadow_clip(border_box);
        if content_clip.has_area() {
            clip = clip.union(content_clip);
        }
        if let Some(outline) = outline_clip(&self.style, border_box.to_rect()) {
            clip = clip.union(outline.to_region());
        }
        self.clip = clip;
        clip
    }

    /// The border box grown by every outset shadow.
    fn shadow_clip(&self, border_box: Region) -> Region {
        let shadows = self.style.box_shadow();
        let reach = shadows
            .shadows()
            .iter()
            .map(|shadow| shadow.extents())
            .fold(Sides::all(0.0_f64), |acc, e| Sides {
                top: acc.top.max(e.top),
                right: acc.right.max(e.right),
                bottom: acc.bottom.max(e.bottom),
                left: acc.left.max(e.left),
            });
        let mut clip = border_box.grow(reach.map(|v| v.ceil() as i32));
        clip.width = clip.width.max(0);
        clip.height = clip.height.max(0);
        clip
    }

    /// The clip computed by the last [`allocate`](Self::allocate).
    pub fn clip(&self) -> Region {
        self.clip
    }

    // ── Boxes ───────────────────────────────────────────────────────────

    fn shrink_box(&self, region: Region, baseline: i32, sides: Sides<i32>) -> (Region, i32) {
        let baseline = if baseline >= 0 {
            baseline - sides.top
        } else {
            -1
        };
        (region.shrink(sides), baseline)
    }

    /// The allocated margin box and baseline.
    pub fn margin_allocation(&self) -> (Region, i32) {
        if !self.visible {
            return (Region::EMPTY, -1);
        }
        (self.allocated, self.allocated_baseline)
    }

    pub fn border_allocation(&self) -> (Region, i32) {
        let (region, baseline) = self.margin_allocation();
        self.shrink_box(region, baseline, self.margin())
    }

    pub fn content_allocation(&self) -> (Region, i32) {
        let (region, baseline) = self.margin_allocation();
        self.shrink_box(region, baseline, self.margin() + self.border() + self.padding())
    }

    pub fn margin_box_contains_point(&self, x: i32, y: i32) -> bool {
        self.margin_allocation().0.contains(x, y)
    }

    pub fn border_box_contains_point(&self, x: i32, y: i32) -> bool {
        self.border_allocation().0.contains(x, y)
    }

    pub fn content_box_contains_point(&self, x: i32, y: i32) -> bool {
        self.content_allocation().0.contains(x, y)
    }

    // ── Drawing ─────────────────────────────────────────────────────────

    /// Paint background, border, content and, if the content asks for it,
    /// the outline.
    pub fn draw(&self, snapshot: &mut Snapshot) {
        if !self.visible {
            return;
        }
        let border_box = self.border_allocation().0.to_rect();
        render_background(&self.style, snapshot, border_box);
        render_border(&self.style, snapshot, border_box);

        let content = self.content_allocation().0;
        let draw_outline = content.has_area() && self.content.draw_content(snapshot, content.to_rect());
        if draw_outline {
            render_outline(&self.style, snapshot, border_box);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::css::provider::StaticProvider;
    use crate::css::tree::DeclarationBlock;
    use crate::css::values::Rgba;
    use crate::render::snapshot::RenderNode;
    use pretty_assertions::assert_eq;

    fn style(css: &str) -> Rc<ComputedStyle> {
        let (block, errors) = DeclarationBlock::parse(css);
        assert!(errors.is_empty(), "{errors:?}");
        Rc::new(ComputedStyle::compute(&block, &StaticProvider::default(), None))
    }

    /// Fixed-size content with an optional baseline that remembers what it
    /// was asked.
    #[derive(Default)]
    struct Fixed {
        width: i32,
        height: i32,
        baseline: i32,
        last_for_size: Rc<Cell<i32>>,
        allocated: Rc<Cell<Region>>,
        focus: bool,
    }

    impl ContentProvider for Fixed {
        fn content_size(&self, orientation: Orientation, for_size: i32) -> PreferredSize {
            self.last_for_size.set(for_size);
            match orientation {
                Orientation::Horizontal => PreferredSize::new(self.width, self.width),
                Orientation::Vertical => PreferredSize::new(self.height, self.height)
                    .with_baselines(self.baseline, self.baseline),
            }
        }

        fn allocate_content(&mut self, allocation: Region, _baseline: i32) -> Region {
            self.allocated.set(allocation);
            allocation
        }

        fn draw_content(&self, snapshot: &mut Snapshot, rect: Rect) -> bool {
            snapshot.append_color(Rgba::BLACK, rect);
            self.focus
        }
    }

    fn fixed(width: i32, height: i32) -> Fixed {
        Fixed {
            width,
            height,
            baseline: -1,
            ..Fixed::default()
        }
    }

    const BOX: &str = "margin: 1px; border: 2px solid red; padding: 3px";

    #[test]
    fn preferred_size_adds_extents() {
        let g = Gadget::new(style(BOX), Box::new(fixed(10, 5)));
        assert_eq!(
            g.get_preferred_size(Orientation::Horizontal, -1),
            PreferredSize::new(22, 22)
        );
        assert_eq!(g.get_preferred_size(Orientation::Vertical, -1).minimum, 17);
    }

    #[test]
    fn for_size_loses_opposite_extents() {
        let content = fixed(10, 5);
        let seen = content.last_for_size.clone();
        let g = Gadget::new(style(BOX), Box::new(content));
        g.get_preferred_size(Orientation::Vertical, 40);
        assert_eq!(seen.get(), 28);
        // Smaller than the extents: clamped, not negative.
        g.get_preferred_size(Orientation::Vertical, 4);
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn for_size_minimum_ignores_extents() {
        let content = fixed(10, 5);
        let seen = content.last_for_size.clone();
        let g = Gadget::new(style("min-width: 20px; padding: 4px"), Box::new(content));
        // 22px covers min-width alone, although not min-width plus padding.
        assert!(!g.below_min_for_size(Orientation::Vertical, 22));
        assert!(g.below_min_for_size(Orientation::Vertical, 19));
        g.get_preferred_size(Orientation::Vertical, 22);
        assert_eq!(seen.get(), 14);
    }

    #[test]
    fn min_size_rounds_up_and_shifts_baseline() {
        let content = Fixed {
            baseline: 4,
            ..fixed(10, 10)
        };
        let g = Gadget::new(
            style("min-width: 29.5px; min-height: 20px; padding-top: 2px"),
            Box::new(content),
        );
        assert_eq!(g.get_preferred_size(Orientation::Horizontal, -1).minimum, 30);
        let v = g.get_preferred_size(Orientation::Vertical, -1);
        assert_eq!(v, PreferredSize::new(22, 22).with_baselines(11, 11));
    }

    #[test]
    fn fractional_extents_round() {
        let g = Gadget::new(style("padding: 0.5px 2.7px"), Box::new(EmptyContent));
        // 0.5 rounds up, 2.7 rounds down.
        assert_eq!(g.get_preferred_size(Orientation::Vertical, -1).minimum, 2);
        assert_eq!(g.get_preferred_size(Orientation::Horizontal, -1).minimum, 4);
    }

    #[test]
    fn invisible_gadget_is_empty() {
        let mut g = Gadget::new(style(BOX), Box::new(fixed(10, 5)));
        g.set_visible(false);
        assert_eq!(g.get_preferred_size(Orientation::Vertical, 100), PreferredSize::NONE);
        assert_eq!(g.allocate(Region::new(0, 0, 50, 50), 10), Region::EMPTY);
        assert_eq!(g.margin_allocation(), (Region::EMPTY, -1));
    }

    #[test]
    fn hidden_allocation_keeps_the_last_visible_one() {
        let mut g = Gadget::new(style(BOX), Box::new(fixed(10, 5)));
        g.allocate(Region::new(5, 5, 40, 30), 12);
        g.set_visible(false);
        assert_eq!(g.allocate(Region::new(0, 0, 1, 1), 0), Region::EMPTY);
        assert!(!g.needs_allocation());
        g.set_visible(true);
        assert_eq!(g.margin_allocation(), (Region::new(5, 5, 40, 30), 12));
    }

    #[test]
    fn allocate_derives_boxes() {
        let content = fixed(10, 5);
        let allocated = content.allocated.clone();
        let mut g = Gadget::new(style(BOX), Box::new(content));
        assert!(g.needs_allocation());
        let clip = g.allocate(Region::new(10, 10, 40, 30), 20);
        assert!(!g.needs_allocation());

        assert_eq!(g.border_allocation(), (Region::new(11, 11, 38, 28), 19));
        assert_eq!(g.content_allocation(), (Region::new(16, 16, 28, 18), 14));
        assert_eq!(allocated.get(), Region::new(16, 16, 28, 18));
        assert_eq!(clip, Region::new(11, 11, 38, 28));

        assert!(g.margin_box_contains_point(10, 10));
        assert!(!g.border_box_contains_point(10, 10));
        assert!(g.content_box_contains_point(16, 16));
        assert!(!g.content_box_contains_point(44, 16));
    }

    #[test]
    fn too_small_allocation_clamps_content() {
        let mut g = Gadget::new(style(BOX), Box::new(EmptyContent));
        let clip = g.allocate(Region::new(0, 0, 0, 0), -1);
        assert!(clip.width >= 0 && clip.height >= 0);
        let (content, baseline) = g.content_allocation();
        assert_eq!((content.width, content.height, baseline), (0, 0, -1));
    }

    #[test]
    fn clip_covers_shadows_and_outline() {
        let mut g = Gadget::new(
            style("box-shadow: 2px 3px red; outline: 1px solid blue"),
            Box::new(EmptyContent),
        );
        let clip = g.allocate(Region::new(0, 0, 10, 10), -1);
        // Outline reaches 1px out on every side, the shadow 2px right and
        // 3px down.
        assert_eq!(clip, Region::new(-1, -1, 13, 14));
        assert_eq!(g.clip(), clip);
    }

    #[test]
    fn style_change_invalidates() {
        let mut g = Gadget::new(style(BOX), Box::new(EmptyContent));
        g.allocate(Region::new(0, 0, 10, 10), -1);
        g.set_style(style(BOX));
        assert!(!g.needs_allocation());
        g.set_style(style("padding: 4px"));
        assert!(g.needs_allocation());
    }

    #[test]
    fn draw_paints_in_box_order() {
        let content = Fixed {
            focus: true,
            ..fixed(4, 4)
        };
        let mut g = Gadget::new(
            style("background-color: white; border: 1px solid red; outline: 1px solid blue"),
            Box::new(content),
        );
        g.allocate(Region::new(0, 0, 10, 10), -1);
        let mut snapshot = Snapshot::new();
        g.draw(&mut snapshot);
        let node = snapshot.finish();
        let kinds: Vec<_> = node
            .children()
            .iter()
            .map(|n| match n {
                RenderNode::Color { bounds, .. } => format!("color {}x{}", bounds.width, bounds.height),
                RenderNode::Border { outline, .. } => format!("border {}", outline.rect.width),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(kinds, vec!["color 10x10", "border 10", "color 8x8", "border 12"]);
    }
}
