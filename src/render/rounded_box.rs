//! Rectangles with elliptical corners.

use std::f64::consts::PI;
use std::fmt;

use crate::css::style::ComputedStyle;
use crate::css::values::Area;
use crate::geometry::{Rect, Side, Sides};

/// Index of each corner in [`RoundedBox::corners`].
pub const TOP_LEFT: usize = 0;
pub const TOP_RIGHT: usize = 1;
pub const BOTTOM_RIGHT: usize = 2;
pub const BOTTOM_LEFT: usize = 3;

/// Horizontal and vertical radius of one corner.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CornerRadius {
    pub width: f64,
    pub height: f64,
}

impl CornerRadius {
    pub const ZERO: CornerRadius = CornerRadius { width: 0.0, height: 0.0 };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_zero(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Shrink both radii; a corner that loses either radius becomes square.
    fn shrink(self, dx: f64, dy: f64) -> CornerRadius {
        if self.is_zero() {
            return CornerRadius::ZERO;
        }
        let r = CornerRadius::new((self.width - dx).max(0.0), (self.height - dy).max(0.0));
        if r.is_zero() {
            CornerRadius::ZERO
        } else {
            r
        }
    }

    /// Arc length of the quarter ellipse.
    fn quarter_arc(&self) -> f64 {
        if self.is_zero() {
            0.0
        } else {
            PI * (self.width + self.height) / 4.0
        }
    }
}

/// A rectangle plus per-corner radii, corners in CSS order.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RoundedBox {
    pub rect: Rect,
    pub corners: [CornerRadius; 4],
}

impl RoundedBox {
    /// A box with square corners.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            rect,
            corners: [CornerRadius::ZERO; 4],
        }
    }

    /// The border box of `style` laid over `rect`, radii resolved against the
    /// box size and scaled down to fit.
    pub fn from_style(style: &ComputedStyle, rect: Rect) -> Self {
        let corners = style.border_radii().map(|corner| {
            let (width, height) = corner.resolve(rect.width, rect.height);
            CornerRadius::new(width, height)
        });
        let mut rounded = Self { rect, corners };
        rounded.clamp_radii();
        rounded
    }

    /// The box of `area` for `style`, given the border box `rect`.
    pub fn for_area(style: &ComputedStyle, rect: Rect, area: Area) -> Self {
        let border_box = Self::from_style(style, rect);
        match area {
            Area::BorderBox => border_box,
            Area::PaddingBox => border_box.shrink(style.border_widths()),
            Area::ContentBox => border_box.shrink(style.border_widths() + style.padding()),
        }
    }

    /// Scale all radii by the same factor so adjacent corners never overlap.
    pub fn clamp_radii(&mut self) {
        let c = &self.corners;
        let mut factor: f64 = 1.0;
        let mut fit = |length: f64, a: f64, b: f64| {
            if a + b > 0.0 {
                factor = factor.min(length / (a + b));
            }
        };
        fit(self.rect.width, c[TOP_LEFT].width, c[TOP_RIGHT].width);
        fit(self.rect.width, c[BOTTOM_LEFT].width, c[BOTTOM_RIGHT].width);
        fit(self.rect.height, c[TOP_LEFT].height, c[BOTTOM_LEFT].height);
        fit(self.rect.height, c[TOP_RIGHT].height, c[BOTTOM_RIGHT].height);

        if factor < 1.0 {
            let factor = factor.max(0.0);
            for corner in &mut self.corners {
                corner.width *= factor;
                corner.height *= factor;
            }
        }
    }

    /// Move every edge inward by `sides`, shrinking the radii with it.
    ///
    /// An edge that would cross the opposite one stops there.
    pub fn shrink(&self, sides: Sides<f64>) -> RoundedBox {
        let Sides { top, right, bottom, left } = sides;
        let (mut x, mut width) = (self.rect.x + left, self.rect.width - left - right);
        if width < 0.0 {
            x = self.rect.x + left.min(self.rect.width);
            width = 0.0;
        }
        let (mut y, mut height) = (self.rect.y + top, self.rect.height - top - bottom);
        if height < 0.0 {
            y = self.rect.y + top.min(self.rect.height);
            height = 0.0;
        }
        let c = &self.corners;
        RoundedBox {
            rect: Rect::new(x, y, width, height),
            corners: [
                c[TOP_LEFT].shrink(left, top),
                c[TOP_RIGHT].shrink(right, top),
                c[BOTTOM_RIGHT].shrink(right, bottom),
                c[BOTTOM_LEFT].shrink(left, bottom),
            ],
        }
    }

    /// Move every edge outward by `sides`; rounded corners grow with it.
    pub fn grow(&self, sides: Sides<f64>) -> RoundedBox {
        let Sides { top, right, bottom, left } = sides;
        let grow = |r: CornerRadius, dx: f64, dy: f64| {
            if r.is_zero() {
                r
            } else {
                CornerRadius::new(r.width + dx, r.height + dy)
            }
        };
        let c = &self.corners;
        RoundedBox {
            rect: self.rect.outset(sides),
            corners: [
                grow(c[TOP_LEFT], left, top),
                grow(c[TOP_RIGHT], right, top),
                grow(c[BOTTOM_RIGHT], right, bottom),
                grow(c[BOTTOM_LEFT], left, bottom),
            ],
        }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> RoundedBox {
        RoundedBox {
            rect: self.rect.offset(dx, dy),
            corners: self.corners,
        }
    }

    /// Whether every corner is square.
    pub fn is_rect(&self) -> bool {
        self.corners.iter().all(CornerRadius::is_zero)
    }

    /// The two corners at the ends of `side`, start first (clockwise).
    fn side_corners(&self, side: Side) -> (CornerRadius, CornerRadius) {
        let c = &self.corners;
        match side {
            Side::Top => (c[TOP_LEFT], c[TOP_RIGHT]),
            Side::Right => (c[TOP_RIGHT], c[BOTTOM_RIGHT]),
            Side::Bottom => (c[BOTTOM_RIGHT], c[BOTTOM_LEFT]),
            Side::Left => (c[BOTTOM_LEFT], c[TOP_LEFT]),
        }
    }

    /// Length of the path along `side`: the straight edge plus half of each
    /// adjacent corner arc.
    pub fn side_length(&self, side: Side) -> f64 {
        let (start, end) = self.side_corners(side);
        let straight = if side.is_horizontal() {
            self.rect.width - start.width - end.width
        } else {
            self.rect.height - start.height - end.height
        };
        straight.max(0.0) + (start.quarter_arc() + end.quarter_arc()) / 2.0
    }

    /// Length of the whole outline.
    pub fn path_length(&self) -> f64 {
        Side::ALL.iter().map(|&side| self.side_length(side)).sum()
    }

    /// The box shrunk by half of `widths`: the center line of a border
    /// stroked with those widths.
    pub fn stroke_line(&self, widths: Sides<f64>) -> RoundedBox {
        self.shrink(widths.map(|w| w / 2.0))
    }
}

impl fmt::Display for RoundedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.rect;
        write!(f, "{} {} {} {}", r.x, r.y, r.width, r.height)?;
        if !self.is_rect() {
            f.write_str(" /")?;
            for corner in &self.corners {
                if corner.width == corner.height {
                    write!(f, " {}", corner.width)?;
                } else {
                    write!(f, " {}x{}", corner.width, corner.height)?;
                }
            }
        }
        Ok(())
    }
}
