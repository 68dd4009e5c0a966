//! Plane geometry used throughout the pipeline.
//!
//! This module provides:
//! - [`Point`]: a 2D position in screen, world, or tool coordinates
//! - [`Rect`]: an axis-aligned bounding rectangle with an empty state,
//!   used for accumulating draw bounds
//! - [`Affine`]: a 2D affine transform for viewer coordinate conversion

use std::ops::{Add, Mul, Sub};

/// A 2D point with `f64` coordinates.
///
/// The coordinate space (screen, world, tool) is determined by context;
/// the pipeline converts between spaces via [`Affine`] transforms.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Origin point (0, 0).
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Creates a point from coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle used for draw-bounds accumulation.
///
/// Unlike a width/height rectangle, this stores min/max corners so that
/// unions of partial bounds stay cheap. An empty rectangle (`x0 > x1`) is
/// the identity for [`Rect::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// The empty rectangle; union identity.
    pub const EMPTY: Rect = Rect {
        x0: f64::INFINITY,
        y0: f64::INFINITY,
        x1: f64::NEG_INFINITY,
        y1: f64::NEG_INFINITY,
    };

    /// Creates a rectangle from min/max corners.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Returns true if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.x0 > self.x1 || self.y0 > self.y1
    }

    /// Smallest rectangle containing both inputs.
    pub fn union(&self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Expands the rectangle to contain a point.
    pub fn with_point(&self, p: Point) -> Rect {
        self.union(Rect::new(p.x, p.y, p.x, p.y))
    }

    /// Expands the rectangle evenly in all directions by `amount`.
    pub fn inflate(&self, amount: f64) -> Rect {
        if self.is_empty() {
            return *self;
        }
        Rect::new(
            self.x0 - amount,
            self.y0 - amount,
            self.x1 + amount,
            self.y1 + amount,
        )
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::EMPTY
    }
}

/// A 2D affine transform.
///
/// Field layout matches the usual graphics convention (cairo's `Matrix`):
/// a point `(x, y)` maps to `(xx*x + xy*y + x0, yx*x + yy*y + y0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Affine = Affine {
        xx: 1.0,
        yx: 0.0,
        xy: 0.0,
        yy: 1.0,
        x0: 0.0,
        y0: 0.0,
    };

    /// Pure translation.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Affine {
            x0: tx,
            y0: ty,
            ..Affine::IDENTITY
        }
    }

    /// Axis-aligned scale about the origin.
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Affine {
            xx: sx,
            yy: sy,
            ..Affine::IDENTITY
        }
    }

    /// Applies the transform to a point.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.xx * p.x + self.xy * p.y + self.x0,
            self.yx * p.x + self.yy * p.y + self.y0,
        )
    }

    /// Returns the inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.xx * self.yy - self.xy * self.yx;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        let xx = self.yy * inv;
        let xy = -self.xy * inv;
        let yx = -self.yx * inv;
        let yy = self.xx * inv;
        Some(Affine {
            xx,
            yx,
            xy,
            yy,
            x0: -(xx * self.x0 + xy * self.y0),
            y0: -(yx * self.x0 + yy * self.y0),
        })
    }
}

impl Mul for Affine {
    type Output = Affine;

    /// Composition: `(a * b).apply(p) == a.apply(b.apply(p))`.
    fn mul(self, rhs: Affine) -> Affine {
        Affine {
            xx: self.xx * rhs.xx + self.xy * rhs.yx,
            yx: self.yx * rhs.xx + self.yy * rhs.yx,
            xy: self.xx * rhs.xy + self.xy * rhs.yy,
            yy: self.yx * rhs.xy + self.yy * rhs.yy,
            x0: self.xx * rhs.x0 + self.xy * rhs.y0 + self.x0,
            y0: self.yx * rhs.x0 + self.yy * rhs.y0 + self.y0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rect_is_union_identity() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Rect::EMPTY.union(r), r);
        assert_eq!(r.union(Rect::EMPTY), r);
        assert!(Rect::EMPTY.is_empty());
    }

    #[test]
    fn union_covers_both_rects() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(1.0, -1.0, 5.0, 1.0);
        assert_eq!(a.union(b), Rect::new(0.0, -1.0, 5.0, 2.0));
    }

    #[test]
    fn affine_inverse_round_trips() {
        let t = Affine::translation(3.0, -2.0) * Affine::scaling(2.0, 4.0);
        let inv = t.invert().unwrap();
        let p = Point::new(1.5, -7.25);
        let back = inv.apply(t.apply(p));
        assert!(back.distance(p) < 1e-12);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Affine::scaling(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn composition_applies_right_to_left() {
        let scale = Affine::scaling(2.0, 2.0);
        let shift = Affine::translation(1.0, 0.0);
        let p = Point::new(1.0, 1.0);
        // scale-then-shift vs shift-then-scale
        assert_eq!((shift * scale).apply(p), Point::new(3.0, 2.0));
        assert_eq!((scale * shift).apply(p), Point::new(4.0, 2.0));
    }
}
