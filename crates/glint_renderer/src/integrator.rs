//! Path tracing light transport and display conversion.
//!
//! The path loop is iterative so the stack depth stays flat regardless of
//! the bounce budget.

use glint_math::Ray;
use rand::RngCore;

use crate::{Color, RenderSettings, World};

/// Minimum hit distance, to skip self-intersection at the ray origin.
pub const T_MIN: f32 = 0.001;

/// Radiance arriving along `ray`.
pub fn trace(ray: &Ray, world: &World, settings: &RenderSettings, rng: &mut dyn RngCore) -> Color {
    let mut ray = *ray;
    let mut attenuation = Color::ONE;
    let mut emitted = Color::ZERO;
    let mut depth = settings.bounce_depth;

    loop {
        if depth == 0 {
            return emitted + attenuation * settings.depth_limit_color;
        }

        let Some(rec) = world.hit(&ray, T_MIN, f32::INFINITY) else {
            return emitted + attenuation * sky_color(&ray, settings);
        };

        let material = world.materials().get(rec.material);
        emitted += attenuation * material.emitted(rec.u, rec.v, rec.point, world.textures());

        match material.scatter(&ray, &rec, world.textures(), rng) {
            Some(scatter) => {
                attenuation *= scatter.attenuation;
                ray = scatter.scattered;
                depth -= 1;
            }
            None => return emitted,
        }
    }
}

/// Vertical sky gradient, bottom to top, scaled by the sky strength.
pub fn sky_color(ray: &Ray, settings: &RenderSettings) -> Color {
    let t = 0.5 * (ray.direction().normalize_or_zero().y + 1.0);
    settings.sky_bottom_color.lerp(settings.sky_top_color, t) * settings.sky_strength
}

/// Convert linear color component to gamma-corrected (gamma 2).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Tone-map an accumulated colour sum into 8-bit RGB.
pub fn to_display_rgb(sum: Color, samples: u32) -> [u8; 3] {
    let scale = if samples > 0 { 1.0 / samples as f32 } else { 0.0 };
    let c = sum * scale;
    [c.x, c.y, c.z].map(|v| (linear_to_gamma(v) * 255.0).clamp(0.0, 255.0) as u8)
}
