//! Point/direction aliases and vector helpers used by the scattering code.

use glam::Vec3;

/// An affine position. Translations apply to it.
pub type Point3 = Vec3;

/// A linear direction. Translations do not apply to it.
pub type Direction3 = Vec3;

/// Per-component magnitude under which a vector counts as zero.
pub const NEAR_ZERO: f32 = 1e-8;

/// Extension trait for Vec3 with the operations light transport needs.
pub trait Vec3Ext {
    /// True if every component is within [`NEAR_ZERO`] of zero.
    fn is_near_zero(self) -> bool;

    /// Mirror this vector about the normal `n`.
    fn mirror(self, n: Vec3) -> Vec3;

    /// Refract this unit vector through a surface with normal `n`.
    ///
    /// `ratio` is eta_incident / eta_transmitted. The caller is responsible
    /// for ruling out total internal reflection first.
    fn refract_through(self, n: Vec3, ratio: f32) -> Vec3;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn is_near_zero(self) -> bool {
        self.x.abs() < NEAR_ZERO && self.y.abs() < NEAR_ZERO && self.z.abs() < NEAR_ZERO
    }

    #[inline]
    fn mirror(self, n: Vec3) -> Vec3 {
        self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn refract_through(self, n: Vec3, ratio: f32) -> Vec3 {
        let cos_theta = (-self).dot(n).min(1.0);
        let r_out_perp = ratio * (self + cos_theta * n);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
        r_out_perp + r_out_parallel
    }
}
