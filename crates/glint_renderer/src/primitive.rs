//! Scene primitives: a shape, a transform and a material handle.
//!
//! Intersection happens in the shape's local space. The world-space ray is
//! moved through the cached inverse transform, the shape is hit there, and
//! the local point and normal are promoted back out.
//!
//! After changing `transform` or `shape`, call [`Primitive::update`] to
//! refresh the cached world bounds (and, for boxes, the face transforms).
//! A stale cache is a caller error, not something checked at hit time.

use glint_math::{Aabb, Interval, Ray, Transform, Vec3};

use crate::hit::face_normal;
use crate::{Cuboid, CuboidFace, HitRecord, MaterialId, Rectangle, Sphere};

/// Margin added to cached world bounds, relative to the box's largest
/// coordinate. Inclusive shape edges (a rectangle's corners) then always
/// fall strictly inside the box the BVH tests.
pub const BOUNDS_PADDING: f32 = 1e-4;

/// Handle to a primitive in a world's primitive arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub(crate) usize);

impl PrimitiveId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Closed set of geometry kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Rectangle(Rectangle),
    Box(Cuboid),
}

impl Shape {
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Shape::Sphere(sphere) => sphere.local_bounds(),
            Shape::Rectangle(rect) => rect.local_bounds(),
            Shape::Box(cuboid) => cuboid.local_bounds(),
        }
    }

    /// Short kind name used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Sphere(_) => "sphere",
            Shape::Rectangle(_) => "rectangle",
            Shape::Box(_) => "box",
        }
    }
}

/// A positioned, shaded piece of geometry.
#[derive(Debug, Clone)]
pub struct Primitive {
    /// Diagnostic name
    pub name: String,
    pub transform: Transform,
    pub shape: Shape,
    pub material: MaterialId,
    bbox: Aabb,
    faces: Vec<CuboidFace>,
}

impl Primitive {
    /// Create a primitive and compute its cached bounds.
    pub fn new(name: impl Into<String>, shape: Shape, transform: Transform) -> Self {
        let mut primitive = Self {
            name: name.into(),
            transform,
            shape,
            material: MaterialId::DEFAULT,
            bbox: Aabb::EMPTY,
            faces: Vec::new(),
        };
        primitive.update();
        primitive
    }

    pub fn sphere(name: impl Into<String>, center: Vec3, radius: f32) -> Self {
        Self::new(
            name,
            Shape::Sphere(Sphere::new(radius)),
            Transform::from_translation(center),
        )
    }

    pub fn rectangle(name: impl Into<String>, width: f32, height: f32, transform: Transform) -> Self {
        Self::new(name, Shape::Rectangle(Rectangle::new(width, height)), transform)
    }

    pub fn cuboid(name: impl Into<String>, size: Vec3, transform: Transform) -> Self {
        Self::new(name, Shape::Box(Cuboid::new(size)), transform)
    }

    /// Builder-style material assignment.
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = material;
        self
    }

    /// Refresh caches derived from `transform` and `shape`.
    pub fn update(&mut self) {
        let bbox = self.transform.aabb(&self.shape.local_bounds());
        let scale = bbox.min.abs().max(bbox.max.abs()).max_element().max(1.0);
        self.bbox = bbox.padded(BOUNDS_PADDING * scale);
        self.faces = match &self.shape {
            Shape::Box(cuboid) => cuboid.faces().to_vec(),
            _ => Vec::new(),
        };
    }

    /// Cached world-space bounding box.
    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Intersect a world-space ray, reporting the hit against `id`.
    pub fn hit(&self, id: PrimitiveId, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        // The local ray keeps the world direction's scale, so t is shared
        let local_ray = self.transform.to_local(ray);

        let local = match &self.shape {
            Shape::Sphere(sphere) => sphere.hit_local(&local_ray, ray_t),
            Shape::Rectangle(rect) => rect.hit_local(&local_ray, ray_t),
            Shape::Box(_) => Cuboid::hit_faces(&self.faces, &local_ray, ray_t),
        }?;

        let outward_normal = self.transform.normal(local.outward_normal);
        let (front_face, normal) = face_normal(ray, outward_normal);

        Some(HitRecord {
            t: local.t,
            point: self.transform.point(local.point),
            normal,
            front_face,
            u: local.u,
            v: local.v,
            material: self.material,
            primitive: id,
        })
    }
}
