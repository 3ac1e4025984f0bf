//! The scene container.
//!
//! A world owns the primitive arena and the material and texture pools.
//! Queries go through the BVH when it is enabled and current, otherwise
//! through a linear scan over every live primitive. Any add, remove or
//! mutable borrow of a primitive marks the BVH stale; call
//! [`World::rebuild_acceleration`] once edits are done.

use std::time::Instant;

use glint_math::{Interval, Ray};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::{
    Bvh, HitRecord, Material, MaterialId, MaterialPool, Primitive, PrimitiveId, RenderError,
    RenderResult, Texture, TextureId, TexturePool, TraversalStats,
};

/// Seed used for BVH split-axis choices unless overridden.
pub const DEFAULT_WORLD_SEED: u64 = 0x5EED;

#[derive(Debug, Clone)]
pub struct World {
    primitives: Vec<Option<Primitive>>,
    materials: MaterialPool,
    textures: TexturePool,
    bvh: Option<Bvh>,
    use_bvh: bool,
    seed: u64,
}

impl World {
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            materials: MaterialPool::new(),
            textures: TexturePool::new(),
            bvh: None,
            use_bvh: true,
            seed: DEFAULT_WORLD_SEED,
        }
    }

    /// Seed for the BVH builder's split-axis draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Add a primitive, refreshing its caches.
    pub fn add(&mut self, mut primitive: Primitive) -> PrimitiveId {
        primitive.update();
        self.primitives.push(Some(primitive));
        self.bvh = None;
        PrimitiveId(self.primitives.len() - 1)
    }

    /// Remove a primitive. Other handles stay valid.
    pub fn remove(&mut self, id: PrimitiveId) -> RenderResult<Primitive> {
        let primitive = self
            .primitives
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(RenderError::UnknownPrimitive(id))?;
        self.bvh = None;
        Ok(primitive)
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable access for editing. Invalidates the BVH.
    ///
    /// Call [`Primitive::update`] after changing the transform or shape.
    pub fn primitive_mut(&mut self, id: PrimitiveId) -> Option<&mut Primitive> {
        self.bvh = None;
        self.primitives.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live primitives with their handles.
    pub fn primitives(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> {
        self.primitives
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (PrimitiveId(i), p)))
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.add(material)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.add(texture)
    }

    pub fn materials(&self) -> &MaterialPool {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialPool {
        &mut self.materials
    }

    pub fn textures(&self) -> &TexturePool {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TexturePool {
        &mut self.textures
    }

    /// Choose between BVH traversal and the linear scan at runtime.
    pub fn set_use_bvh(&mut self, use_bvh: bool) {
        self.use_bvh = use_bvh;
    }

    pub fn use_bvh(&self) -> bool {
        self.use_bvh
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// Number of live primitives.
    pub fn len(&self) -> usize {
        self.primitives.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild the BVH over every live primitive.
    ///
    /// Must not run while a render reads this world; the scheduler's
    /// `interrupt` joins all readers first.
    pub fn rebuild_acceleration(&mut self) -> RenderResult<()> {
        let start = Instant::now();
        let handles: Vec<_> = self
            .primitives()
            .map(|(id, p)| (id, p.bounding_box()))
            .collect();

        self.bvh = None;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let bvh = Bvh::build(&handles, &mut rng)?;

        log::info!(
            "Built BVH over {} primitives: {} nodes, depth {} in {:.2?}",
            handles.len(),
            bvh.node_count(),
            bvh.depth(),
            start.elapsed()
        );
        self.bvh = Some(bvh);
        Ok(())
    }

    /// Nearest hit within `(t_min, t_max)`.
    pub fn hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let mut stats = TraversalStats::default();
        self.hit_with_stats(ray, t_min, t_max, &mut stats)
    }

    /// Like [`World::hit`], also counting traversal work.
    pub fn hit_with_stats(
        &self,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        stats: &mut TraversalStats,
    ) -> Option<HitRecord> {
        let ray_t = Interval::new(t_min, t_max);
        match (&self.bvh, self.use_bvh) {
            (Some(bvh), true) => bvh.hit_with_stats(&self.primitives, ray, ray_t, stats),
            _ => self.scan(ray, ray_t, stats),
        }
    }

    /// Nearest hit by testing every live primitive.
    pub fn hit_linear(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<HitRecord> {
        let mut stats = TraversalStats::default();
        self.scan(ray, Interval::new(t_min, t_max), &mut stats)
    }

    fn scan(&self, ray: &Ray, ray_t: Interval, stats: &mut TraversalStats) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut interval = ray_t;

        for (id, primitive) in self.primitives() {
            stats.primitives_tested += 1;
            if let Some(rec) = primitive.hit(id, ray, interval) {
                interval = interval.tightened(rec.t);
                closest = Some(rec);
            }
        }

        closest
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
