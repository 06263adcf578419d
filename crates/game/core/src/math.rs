//! Minimal 3D vector math for positions, ranges, and projectile paths.

use core::ops::{Add, Mul, Sub};

/// Position or direction in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Linear interpolation; `t = 0` yields `self`, `t = 1` yields `other`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    /// Returns the point `distance` units from `self` towards `other`.
    ///
    /// Stops at `other` when it is closer than `distance`.
    pub fn towards(self, other: Self, distance: f32) -> Self {
        let delta = other - self;
        let len = delta.length();
        if len <= distance || len <= f32::EPSILON {
            return other;
        }
        self + delta * (distance / len)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Normalizes an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let tau = core::f32::consts::TAU;
    let wrapped = angle % tau;
    if wrapped < 0.0 { wrapped + tau } else { wrapped }
}

/// Returns true if `point` lies within the cone of width `arc` centered on
/// `orientation` as seen from `origin` (ground plane only).
pub fn is_in_arc(origin: Vec3, orientation: f32, arc: f32, point: Vec3) -> bool {
    let dx = point.x - origin.x;
    let dy = point.y - origin.y;
    if dx.abs() <= f32::EPSILON && dy.abs() <= f32::EPSILON {
        return true;
    }

    let angle = normalize_angle(dy.atan2(dx) - orientation);
    let half = arc / 2.0;
    let pi = core::f32::consts::PI;
    // `angle` is in [0, 2π); the cone spans [-half, half] around zero.
    angle <= half || angle >= 2.0 * pi - half
}
