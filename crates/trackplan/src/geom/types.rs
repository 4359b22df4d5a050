//! Value types: positioned heading, output transform, cardinal bucket.

use nalgebra::Vector2;

use super::cfg::{ANGLE_EPS, TRANSFORM_EPS};
use super::step::{angle_diff, normalize_angle, rotate};

/// Point plus heading (radians in [0, 2π), 0 = +x, counter-clockwise).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub p: Vector2<f64>,
    pub angle: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self::origin()
    }
}

impl Position {
    #[inline]
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self {
            p: Vector2::new(x, y),
            angle: normalize_angle(angle),
        }
    }

    #[inline]
    pub fn origin() -> Self {
        Self {
            p: Vector2::zeros(),
            angle: 0.0,
        }
    }

    /// Unit vector along the heading.
    #[inline]
    pub fn forward(&self) -> Vector2<f64> {
        Vector2::new(self.angle.cos(), self.angle.sin())
    }

    pub fn approx_eq(&self, other: &Position, eps: f64) -> bool {
        (self.p - other.p).norm() <= eps && angle_diff(self.angle, other.angle).abs() <= ANGLE_EPS
    }

    /// Express `other` in the frame where `self` is the origin facing +x.
    pub fn transform_to(&self, other: &Position) -> Transform {
        let d = rotate(other.p - self.p, -self.angle);
        Transform {
            dx: d.x,
            dy: d.y,
            dangle: normalize_angle(other.angle - self.angle),
        }
    }

    /// Position reached by applying `t` in this position's local frame.
    pub fn apply(&self, t: &Transform) -> Position {
        Position {
            p: self.p + rotate(Vector2::new(t.dx, t.dy), self.angle),
            angle: normalize_angle(self.angle + t.dangle),
        }
    }

    #[inline]
    fn into_transform(self) -> Transform {
        Transform {
            dx: self.p.x,
            dy: self.p.y,
            dangle: self.angle,
        }
    }
}

/// Net displacement and heading change of a template, measured in its own
/// starting frame. Two templates are interchangeable iff their transforms match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub dx: f64,
    pub dy: f64,
    pub dangle: f64,
}

impl Transform {
    #[inline]
    pub fn identity() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            dangle: 0.0,
        }
    }

    /// Structural equality up to floating noise.
    pub fn approx_eq(&self, other: &Transform) -> bool {
        (self.dx - other.dx).abs() <= TRANSFORM_EPS
            && (self.dy - other.dy).abs() <= TRANSFORM_EPS
            && angle_diff(self.dangle, other.dangle).abs() <= ANGLE_EPS
    }

    /// `self` followed by `next` (chaining).
    pub fn then(&self, next: &Transform) -> Transform {
        Position::origin().apply(self).apply(next).into_transform()
    }
}

/// Compass bucket of a heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cardinal {
    East,
    North,
    West,
    South,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [
        Cardinal::East,
        Cardinal::North,
        Cardinal::West,
        Cardinal::South,
    ];

    /// Bucket of `angle`, or `None` when it is not (within `ANGLE_EPS`) axis-aligned.
    pub fn of(angle: f64) -> Option<Cardinal> {
        Self::ALL
            .into_iter()
            .find(|c| angle_diff(angle, c.angle()).abs() <= ANGLE_EPS)
    }

    #[inline]
    pub fn angle(self) -> f64 {
        use std::f64::consts::{FRAC_PI_2, PI};
        match self {
            Cardinal::East => 0.0,
            Cardinal::North => FRAC_PI_2,
            Cardinal::West => PI,
            Cardinal::South => 3.0 * FRAC_PI_2,
        }
    }

    #[inline]
    pub fn opposite(self) -> Cardinal {
        match self {
            Cardinal::East => Cardinal::West,
            Cardinal::North => Cardinal::South,
            Cardinal::West => Cardinal::East,
            Cardinal::South => Cardinal::North,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}
