#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All coordinates are display units (`f32`) with the origin at the top-left
//! corner and `y` growing downwards.

use serde::{Deserialize, Serialize};

/// A point in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component along `axis`: `x` for [`Axis::Horizontal`], `y` otherwise.
    #[inline]
    #[must_use]
    pub const fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Manhattan distance to another point.
    #[inline]
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Direction a divider partitions its rectangle along.
///
/// A [`Horizontal`](Axis::Horizontal) split places its children side by side
/// (left, right) with a vertical divider strip between them. A
/// [`Vertical`](Axis::Vertical) split stacks them (top, bottom) with a
/// horizontal strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The other axis.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// An axis-aligned rectangle used for region extents, scissor boxes and hit
/// testing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f32,
    /// Top edge (inclusive).
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Result of partitioning a rectangle with a divider strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectSplit {
    /// Left or top part.
    pub first: Rect,
    /// The divider strip itself.
    pub divider: Rect,
    /// Right or bottom part.
    pub second: Rect,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment test: `[x, x + width) × [y, y + height)`.
    ///
    /// Adjacent rectangles produced by [`split_along`](Self::split_along)
    /// therefore never both contain the same point.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Length of the rectangle along `axis`.
    #[inline]
    #[must_use]
    pub const fn extent_along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Shrink the rectangle by `amount` on every side, never below zero size.
    #[must_use]
    pub fn inset(&self, amount: f32) -> Self {
        let width = (self.width - 2.0 * amount).max(0.0);
        let height = (self.height - 2.0 * amount).max(0.0);
        Self::new(self.x + amount, self.y + amount, width, height)
    }

    /// Compute the intersection with another rectangle.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Self::default();
        }
        Self::new(x, y, right - x, bottom - y)
    }

    /// Partition the rectangle at fractional `position` along `axis`,
    /// reserving a divider strip of `divider_width` centered on the split
    /// point.
    ///
    /// The strip is clamped so it always lies inside the rectangle; the three
    /// parts tile the rectangle exactly.
    #[must_use]
    pub fn split_along(&self, axis: Axis, position: f32, divider_width: f32) -> RectSplit {
        let length = self.extent_along(axis).max(0.0);
        let strip = divider_width.max(0.0).min(length);
        let start = match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        };
        let position = if position.is_nan() { 0.5 } else { position.clamp(0.0, 1.0) };
        let split_point = start + position * length;
        // May round below `start` when the strip fills the rect.
        let hi = (start + length - strip).max(start);
        let strip_start = (split_point - strip / 2.0).max(start).min(hi);
        let first_len = (strip_start - start).max(0.0);
        let second_start = strip_start + strip;
        let second_len = (start + length - second_start).max(0.0);

        match axis {
            Axis::Horizontal => RectSplit {
                first: Self::new(self.x, self.y, first_len, self.height),
                divider: Self::new(strip_start, self.y, strip, self.height),
                second: Self::new(second_start, self.y, second_len, self.height),
            },
            Axis::Vertical => RectSplit {
                first: Self::new(self.x, self.y, self.width, first_len),
                divider: Self::new(self.x, strip_start, self.width, strip),
                second: Self::new(self.x, second_start, self.width, second_len),
            },
        }
    }
}

/// Width in display units of divider strips for a given base width and
/// display scale, rounded to the nearest whole unit.
#[must_use]
pub fn divider_width(base: f32, display_scale: f32) -> f32 {
    (base * display_scale + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 10.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(29.9, 19.9)));
        assert!(!r.contains(Point::new(30.0, 15.0)));
        assert!(!r.contains(Point::new(15.0, 20.0)));
        assert!(!r.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn horizontal_split_places_children_left_and_right() {
        let r = Rect::from_size(100.0, 50.0);
        let split = r.split_along(Axis::Horizontal, 0.5, 2.0);
        assert_eq!(split.first, Rect::new(0.0, 0.0, 49.0, 50.0));
        assert_eq!(split.divider, Rect::new(49.0, 0.0, 2.0, 50.0));
        assert_eq!(split.second, Rect::new(51.0, 0.0, 49.0, 50.0));
    }

    #[test]
    fn vertical_split_places_children_top_and_bottom() {
        let r = Rect::from_size(100.0, 50.0);
        let split = r.split_along(Axis::Vertical, 0.2, 0.0);
        assert_eq!(split.first, Rect::new(0.0, 0.0, 100.0, 10.0));
        assert_eq!(split.divider.height, 0.0);
        assert_eq!(split.second, Rect::new(0.0, 10.0, 100.0, 40.0));
    }

    #[test]
    fn divider_strip_stays_inside_narrow_rect() {
        let r = Rect::new(5.0, 0.0, 3.0, 10.0);
        let split = r.split_along(Axis::Horizontal, 0.99, 6.0);
        assert_eq!(split.divider, Rect::new(5.0, 0.0, 3.0, 10.0));
        assert_eq!(split.first.width, 0.0);
        assert_eq!(split.second.width, 0.0);
    }

    #[test]
    fn strip_wider_than_rect_at_fractional_origin() {
        let cases = [
            (Axis::Horizontal, Rect::new(0.0137, 0.0, 0.0142, 10.0)),
            (Axis::Vertical, Rect::new(0.0, 0.0137, 10.0, 0.0142)),
        ];
        for (axis, r) in cases {
            let split = r.split_along(axis, 0.5, 2.0);
            assert!(split.first.extent_along(axis) >= 0.0);
            assert!(split.second.extent_along(axis) >= 0.0);
            assert_eq!(split.divider.extent_along(axis), r.extent_along(axis));
        }
    }

    #[test]
    fn nan_position_splits_at_middle() {
        let r = Rect::from_size(100.0, 50.0);
        let split = r.split_along(Axis::Horizontal, f32::NAN, 2.0);
        assert_eq!(split.divider, Rect::new(49.0, 0.0, 2.0, 50.0));
    }

    #[test]
    fn divider_width_rounds_scaled_base() {
        assert_eq!(divider_width(2.0, 1.0), 2.0);
        assert_eq!(divider_width(2.0, 1.5), 3.0);
        assert_eq!(divider_width(2.0, 2.0), 4.0);
        assert_eq!(divider_width(2.0, 1.2), 2.0);
    }

    #[test]
    fn intersection_of_disjoint_rects_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersection(&b).is_empty());
        let c = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&c), Rect::new(5.0, 5.0, 5.0, 5.0));
    }

    proptest! {
        #[test]
        fn split_parts_tile_the_rect(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            w in prop_oneof![0.0f32..4.0, 0.0f32..2000.0],
            h in prop_oneof![0.0f32..4.0, 0.0f32..2000.0],
            pos in 0.0f32..=1.0,
            divider in 0.0f32..8.0,
            horizontal in any::<bool>(),
        ) {
            let axis = if horizontal { Axis::Horizontal } else { Axis::Vertical };
            let r = Rect::new(x, y, w, h);
            let s = r.split_along(axis, pos, divider);
            let total = s.first.extent_along(axis)
                + s.divider.extent_along(axis)
                + s.second.extent_along(axis);
            prop_assert!((total - r.extent_along(axis)).abs() < 1e-2);
            prop_assert!(s.first.extent_along(axis) >= 0.0);
            prop_assert!(s.second.extent_along(axis) >= 0.0);
            prop_assert_eq!(s.first.extent_along(axis.flip()), r.extent_along(axis.flip()));
        }
    }
}
