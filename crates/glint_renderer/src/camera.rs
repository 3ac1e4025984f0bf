//! Camera for ray generation.

use glint_math::{Point3, Ray, Vec3};
use rand::RngCore;

use crate::sampling::random_in_unit_disk;

/// Apertures at or below this are treated as a pinhole.
const PINHOLE_APERTURE: f32 = 1e-8;

/// Thin-lens camera mapping normalised image coordinates to rays.
///
/// `u` runs left to right and `v` bottom to top, both over [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // Camera positioning
    origin: Point3,
    target: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f32,           // Vertical field of view in degrees
    aperture: f32,       // Lens aperture, 0 for a pinhole
    focus_distance: f32, // Distance from camera to plane of perfect focus
    aspect_ratio: f32,

    // Cached computed values (set by update())
    lower_left: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Camera {
    /// Create a camera two units down -Z looking at the origin.
    pub fn new(aspect_ratio: f32) -> Self {
        let mut camera = Self {
            origin: Vec3::new(0.0, 0.0, -2.0),
            target: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 70.0,
            aperture: 0.0,
            focus_distance: 2.0,
            aspect_ratio,
            lower_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
        };
        camera.update();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, origin: Point3, target: Point3, vup: Vec3) -> Self {
        self.origin = origin;
        self.target = target;
        self.vup = vup;
        self.update();
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_distance: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture.max(0.0);
        self.focus_distance = focus_distance;
        self.update();
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.update();
        self
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn target(&self) -> Point3 {
        self.target
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Recompute the viewport basis from the public parameters.
    fn update(&mut self) {
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = self.aspect_ratio * viewport_height;

        // Degenerate look directions fall back to the default basis
        self.w = (self.origin - self.target).try_normalize().unwrap_or(Vec3::Z);
        self.u = self.vup.cross(self.w).try_normalize().unwrap_or(Vec3::X);
        self.v = self.w.cross(self.u);

        self.horizontal = self.focus_distance * viewport_width * self.u;
        self.vertical = self.focus_distance * viewport_height * self.v;
        self.lower_left =
            self.origin - self.horizontal * 0.5 - self.vertical * 0.5 - self.focus_distance * self.w;
    }

    /// Generate a ray through normalised image coordinates `(u, v)`.
    ///
    /// With a non-zero aperture the origin is jittered over the lens disk.
    pub fn ray_through(&self, u: f32, v: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.aperture > PINHOLE_APERTURE {
            let disk = self.aperture * 2.0 * random_in_unit_disk(rng);
            self.u * disk.x + self.v * disk.y
        } else {
            Vec3::ZERO
        };

        let origin = self.origin + offset;
        let target = self.lower_left + u * self.horizontal + v * self.vertical;
        Ray::new(origin, target - origin)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_centre_ray_hits_target() {
        let camera = Camera::new(1.0);
        let mut rng = StdRng::seed_from_u64(0);

        let ray = camera.ray_through(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Vec3::new(0.0, 0.0, -2.0));
        assert!((ray.direction() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_corners_span_field_of_view() {
        let camera = Camera::new(2.0).with_lens(90.0, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(0);

        let top = camera.ray_through(0.5, 1.0, &mut rng).direction();
        let bottom = camera.ray_through(0.5, 0.0, &mut rng).direction();
        let angle = top.angle_between(bottom).to_degrees();
        assert!((angle - 90.0).abs() < 1e-3);

        // Looking down +Z with Y up, u = 1 lands on the image's right side
        let right = camera.ray_through(1.0, 0.5, &mut rng).direction();
        assert!(right.x < 0.0);
        assert!(top.y > 0.0);
    }

    #[test]
    fn test_aperture_jitters_origin_but_keeps_focus() {
        let camera = Camera::new(1.0).with_lens(70.0, 0.1, 2.0);
        let mut rng = StdRng::seed_from_u64(7);

        let focus_point = Vec3::ZERO;
        let mut moved = false;
        for _ in 0..32 {
            let ray = camera.ray_through(0.5, 0.5, &mut rng);
            moved |= ray.origin() != camera.origin();
            assert!((ray.origin() - camera.origin()).length() <= 0.2 + 1e-5);

            // Every lens sample converges on the focus plane centre
            let t = (focus_point - ray.origin()).length();
            assert!((ray.at(t) - focus_point).length() < 1e-2);
        }
        assert!(moved);
    }
}
