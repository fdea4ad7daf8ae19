//! Core geometry types: Point, Rect, Region, Sides.
//!
//! [`Rect`] and [`Point`] carry fractional device pixels and are what the
//! painters work in. [`Region`] is the integer allocation rectangle used by the
//! box-model gadget, and [`Sides`] holds anything that comes in a
//! top/right/bottom/left quadruple (widths, margins, colors, styles).

use std::ops::{Add, Index, IndexMut, Sub};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One edge of a box, in CSS order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All four sides in CSS shorthand order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Index into a `[T; 4]` laid out in CSS order.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }

    /// Whether this side runs horizontally (top or bottom).
    #[inline]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// Four values, one per side (top, right, bottom, left).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on all four sides.
    #[inline]
    pub const fn all(v: T) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    /// Explicit values in CSS order.
    #[inline]
    pub const fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self { top, right, bottom, left }
    }

    /// Build from a `[T; 4]` in CSS order.
    #[inline]
    pub const fn from_array(a: [T; 4]) -> Self {
        Self { top: a[0], right: a[1], bottom: a[2], left: a[3] }
    }

    /// The values as a `[T; 4]` in CSS order.
    #[inline]
    pub const fn to_array(self) -> [T; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    /// Apply `f` to each side.
    pub fn map<U: Copy>(self, mut f: impl FnMut(T) -> U) -> Sides<U> {
        Sides {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }

    /// Whether every side satisfies `f`.
    pub fn all_match(&self, mut f: impl FnMut(&T) -> bool) -> bool {
        f(&self.top) && f(&self.right) && f(&self.bottom) && f(&self.left)
    }
}

impl<T: Copy + PartialEq> Sides<T> {
    /// Whether all four sides hold the same value.
    pub fn is_uniform(&self) -> bool {
        self.top == self.right && self.top == self.bottom && self.top == self.left
    }
}

impl<T: Copy + Add<Output = T>> Sides<T> {
    /// `left + right`.
    #[inline]
    pub fn horizontal(&self) -> T {
        self.left + self.right
    }

    /// `top + bottom`.
    #[inline]
    pub fn vertical(&self) -> T {
        self.top + self.bottom
    }
}

impl<T: Copy + Add<Output = T>> Add for Sides<T> {
    type Output = Sides<T>;
    #[inline]
    fn add(self, rhs: Sides<T>) -> Sides<T> {
        Sides {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

impl<T> Index<Side> for Sides<T> {
    type Output = T;
    fn index(&self, side: Side) -> &T {
        match side {
            Side::Top => &self.top,
            Side::Right => &self.right,
            Side::Bottom => &self.bottom,
            Side::Left => &self.left,
        }
    }
}

impl<T> IndexMut<Side> for Sides<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Top => &mut self.top,
            Side::Right => &mut self.right,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
        }
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D position in device pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    #[inline]
    fn add(self, rhs: Point) -> Point {
        Point { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Point;
    #[inline]
    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// A rectangle in fractional device pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// An empty rectangle at the origin.
    pub const ZERO: Rect = Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Contract inward by `sides`, clamping the size to zero.
    pub fn inset(&self, sides: Sides<f64>) -> Rect {
        Rect {
            x: self.x + sides.left,
            y: self.y + sides.top,
            width: (self.width - sides.horizontal()).max(0.0),
            height: (self.height - sides.vertical()).max(0.0),
        }
    }

    /// Expand outward by `sides`.
    pub fn outset(&self, sides: Sides<f64>) -> Rect {
        Rect {
            x: self.x - sides.left,
            y: self.y - sides.top,
            width: self.width + sides.horizontal(),
            height: self.height + sides.vertical(),
        }
    }

    /// Translate by `(dx, dy)`.
    #[inline]
    pub fn offset(&self, dx: f64, dy: f64) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// The overlapping area, or `None` when the rectangles don't overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            None
        } else {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        }
    }

    /// The smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// The smallest integer region covering this rectangle.
    pub fn to_region(&self) -> Region {
        let x = self.x.floor();
        let y = self.y.floor();
        Region {
            x: x as i32,
            y: y as i32,
            width: (self.right().ceil() - x) as i32,
            height: (self.bottom().ceil() - y) as i32,
        }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// An integer rectangle: what the layout pass allocates to a gadget.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// Whether the region has a positive area.
    #[inline]
    pub const fn has_area(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Whether the point (x, y) lies inside this region.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Bounding box of both regions.
    #[inline]
    pub const fn union(self, other: Region) -> Region {
        let x1 = if self.x < other.x { self.x } else { other.x };
        let y1 = if self.y < other.y { self.y } else { other.y };
        let x2 = if self.right() > other.right() { self.right() } else { other.right() };
        let y2 = if self.bottom() > other.bottom() { self.bottom() } else { other.bottom() };
        Region { x: x1, y: y1, width: x2 - x1, height: y2 - y1 }
    }

    /// Contract inward by `sides`. Width and height clamp to zero.
    #[inline]
    pub const fn shrink(self, sides: Sides<i32>) -> Region {
        let w = self.width - sides.left - sides.right;
        let h = self.height - sides.top - sides.bottom;
        Region {
            x: self.x + sides.left,
            y: self.y + sides.top,
            width: if w > 0 { w } else { 0 },
            height: if h > 0 { h } else { 0 },
        }
    }

    /// Expand outward by `sides`.
    #[inline]
    pub const fn grow(self, sides: Sides<i32>) -> Region {
        Region {
            x: self.x - sides.left,
            y: self.y - sides.top,
            width: self.width + sides.left + sides.right,
            height: self.height + sides.top + sides.bottom,
        }
    }

    /// The same rectangle in fractional pixels.
    #[inline]
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x as f64, self.y as f64, self.width as f64, self.height as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_uniform_and_sums() {
        let s = Sides::new(1, 2, 3, 4);
        assert!(!s.is_uniform());
        assert_eq!(s.horizontal(), 6);
        assert_eq!(s.vertical(), 4);
        assert!(Sides::all(5).is_uniform());
    }

    #[test]
    fn sides_index_by_side() {
        let mut s = Sides::new(1, 2, 3, 4);
        assert_eq!(s[Side::Bottom], 3);
        s[Side::Left] = 9;
        assert_eq!(s.left, 9);
        assert_eq!(Side::Left.index(), 3);
    }

    #[test]
    fn rect_inset_clamps() {
        let r = Rect::new(0.0, 0.0, 10.0, 4.0);
        let inner = r.inset(Sides::all(3.0));
        assert_eq!(inner, Rect::new(3.0, 3.0, 4.0, 0.0));
        assert!(inner.is_empty());
    }

    #[test]
    fn rect_outset_then_inset_round_trips() {
        let r = Rect::new(5.0, 5.0, 10.0, 10.0);
        let s = Sides::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.outset(s).inset(s), r);
    }

    #[test]
    fn rect_intersection_and_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 15.0));
        let far = Rect::new(50.0, 50.0, 1.0, 1.0);
        assert_eq!(a.intersection(&far), None);
    }

    #[test]
    fn rect_to_region_covers() {
        let r = Rect::new(0.5, 0.5, 2.0, 2.0);
        assert_eq!(r.to_region(), Region::new(0, 0, 3, 3));
    }

    #[test]
    fn region_shrink_and_grow() {
        let r = Region::new(0, 0, 10, 10);
        let s = Sides::new(1, 2, 3, 4);
        assert_eq!(r.shrink(s), Region::new(4, 1, 4, 6));
        assert_eq!(r.shrink(s).grow(s), r);
        assert_eq!(r.shrink(Sides::all(6)), Region::new(6, 6, 0, 0));
    }

    #[test]
    fn region_union_and_contains() {
        let a = Region::new(0, 0, 2, 2);
        let b = Region::new(5, 5, 1, 1);
        assert_eq!(a.union(b), Region::new(0, 0, 6, 6));
        assert!(a.contains(1, 1));
        assert!(!a.contains(2, 0));
        assert!(!Region::EMPTY.has_area());
    }
}
