//! Surface scattering models.
//!
//! Materials live in a [`MaterialPool`] owned by the world. Primitives
//! reference them by [`MaterialId`]; slot 0 is always the default diffuse
//! grey, and [`DEFAULT_MATERIAL`] backs any id the pool does not know.

use glint_math::{Point3, Ray, Vec3, Vec3Ext};
use rand::RngCore;

use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector};
use crate::{HitRecord, TextureId, TexturePool};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Handle to a material in a [`MaterialPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub(crate) usize);

impl MaterialId {
    /// The pool's built-in default diffuse material.
    pub const DEFAULT: MaterialId = MaterialId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Fallback for material ids that do not resolve.
pub static DEFAULT_MATERIAL: Material = Material::Diffuse {
    albedo: TextureId::DEFAULT,
};

/// How light interacts with a surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Cosine-weighted diffuse reflection with a textured albedo.
    Diffuse { albedo: TextureId },
    /// Mirror reflection blurred by `roughness` (0 = perfect mirror).
    Reflective { albedo: Color, roughness: f32 },
    /// Glass-like refraction with Fresnel reflection.
    Dielectric { ior: f32 },
    /// Emits `strength` times the `emit` texture and never scatters.
    DiffuseLight { emit: TextureId, strength: f32 },
}

/// A continued light path: the ray leaving the surface and how much of
/// the incoming light survives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    pub attenuation: Color,
    pub scattered: Ray,
}

impl Material {
    /// Create a Reflective material, clamping roughness to [0, 1].
    pub fn reflective(albedo: Color, roughness: f32) -> Self {
        Material::Reflective {
            albedo,
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    /// Create an emitter. Negative strengths are clamped to zero.
    pub fn light(emit: TextureId, strength: f32) -> Self {
        Material::DiffuseLight {
            emit,
            strength: strength.max(0.0),
        }
    }

    /// Create a Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric { ior }
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        textures: &TexturePool,
        rng: &mut dyn RngCore,
    ) -> Option<Scatter> {
        match self {
            Material::Diffuse { albedo } => {
                let mut direction = rec.normal + random_unit_vector(rng);

                // Catch degenerate scatter direction
                if direction.is_near_zero() || direction.dot(rec.normal) <= 0.0 {
                    direction = rec.normal;
                }

                Some(Scatter {
                    attenuation: textures.value_at(*albedo, rec.u, rec.v, rec.point),
                    scattered: Ray::new(rec.point, direction),
                })
            }

            Material::Reflective { albedo, roughness } => {
                let reflected = ray_in.direction().normalize().mirror(rec.normal);
                let direction = reflected + *roughness * random_in_unit_sphere(rng);

                // Blurred reflections that dip below the surface are absorbed
                if direction.dot(rec.normal) <= 0.0 {
                    return None;
                }

                Some(Scatter {
                    attenuation: *albedo,
                    scattered: Ray::new(rec.point, direction),
                })
            }

            Material::Dielectric { ior } => {
                let refraction_ratio = if rec.front_face { 1.0 / ior } else { *ior };
                let unit_direction = ray_in.direction().normalize();

                let direction = if refraction_ratio == 1.0 {
                    // Index-matched interface, nothing to bend or reflect
                    unit_direction
                } else {
                    let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

                    let cannot_refract = refraction_ratio * sin_theta > 1.0;
                    if cannot_refract || reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                        unit_direction.mirror(rec.normal)
                    } else {
                        unit_direction.refract_through(rec.normal, refraction_ratio)
                    }
                };

                Some(Scatter {
                    attenuation: Color::ONE,
                    scattered: Ray::new(rec.point, direction),
                })
            }

            Material::DiffuseLight { .. } => None,
        }
    }

    /// Light emitted at the given UV and point. Black for non-emitters.
    pub fn emitted(&self, u: f32, v: f32, p: Point3, textures: &TexturePool) -> Color {
        match self {
            Material::DiffuseLight { emit, strength } => {
                textures.value_at(*emit, u, v, p) * *strength
            }
            _ => Color::ZERO,
        }
    }
}

/// Schlick's approximation for reflectance
fn reflectance(cosine: f32, ratio: f32) -> f32 {
    let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Storage for every material in a scene.
#[derive(Clone, Debug)]
pub struct MaterialPool {
    materials: Vec<Material>,
}

impl MaterialPool {
    /// Create a pool holding only the default material.
    pub fn new() -> Self {
        Self {
            materials: vec![DEFAULT_MATERIAL.clone()],
        }
    }

    pub fn add(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Resolve an id, falling back to the default material.
    pub fn get(&self, id: MaterialId) -> &Material {
        self.materials.get(id.0).unwrap_or(&DEFAULT_MATERIAL)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialPool {
    fn default() -> Self {
        Self::new()
    }
}
