//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree stored as a flat arena of nodes. Leaves hold primitive
//! handles, never the primitives themselves, so the tree can be thrown
//! away and rebuilt without touching the scene.

use glint_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};

use crate::{HitRecord, Primitive, PrimitiveId, RenderError, RenderResult};

/// Counters collected during a single traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes whose bounding box was tested
    pub nodes_visited: usize,
    /// Primitives whose exact intersection routine ran
    pub primitives_tested: usize,
}

/// BVH node - either a branch with two children or a leaf with one primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BvhNode {
    /// Internal node. Children are indices into the node arena.
    Branch { left: u32, right: u32, bbox: Aabb },
    /// A single primitive and its bounds at build time.
    Leaf { primitive: PrimitiveId, bbox: Aabb },
}

impl BvhNode {
    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }
}

/// Immutable hierarchy over a primitive set.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: u32,
}

impl Bvh {
    /// Build over `primitives`, given as (handle, world bounds) pairs.
    ///
    /// The split axis at every level is drawn uniformly from `rng`.
    pub fn build(primitives: &[(PrimitiveId, Aabb)], rng: &mut dyn RngCore) -> RenderResult<Self> {
        if primitives.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let mut items = primitives.to_vec();
        let mut nodes = Vec::with_capacity(items.len() * 2);
        let root = Self::build_range(&mut nodes, &mut items, rng);

        Ok(Self { nodes, root })
    }

    fn build_range(
        nodes: &mut Vec<BvhNode>,
        items: &mut [(PrimitiveId, Aabb)],
        rng: &mut dyn RngCore,
    ) -> u32 {
        let axis = rng.gen_range(0..3);
        items.sort_unstable_by(|a, b| a.1.min[axis].total_cmp(&b.1.min[axis]));

        match items.len() {
            1 => Self::push_leaf(nodes, items[0]),
            2 => {
                let left = Self::push_leaf(nodes, items[0]);
                let right = Self::push_leaf(nodes, items[1]);
                Self::push_branch(nodes, left, right)
            }
            // Two in one subtree, the last one directly as a leaf
            3 => {
                let (pair, last) = items.split_at_mut(2);
                let left = Self::build_range(nodes, pair, rng);
                let right = Self::push_leaf(nodes, last[0]);
                Self::push_branch(nodes, left, right)
            }
            n => {
                let (lower, upper) = items.split_at_mut(n / 2);
                let left = Self::build_range(nodes, lower, rng);
                let right = Self::build_range(nodes, upper, rng);
                Self::push_branch(nodes, left, right)
            }
        }
    }

    fn push_leaf(nodes: &mut Vec<BvhNode>, (primitive, bbox): (PrimitiveId, Aabb)) -> u32 {
        nodes.push(BvhNode::Leaf { primitive, bbox });
        (nodes.len() - 1) as u32
    }

    fn push_branch(nodes: &mut Vec<BvhNode>, left: u32, right: u32) -> u32 {
        let bbox = Aabb::surrounding(
            &nodes[left as usize].bounding_box(),
            &nodes[right as usize].bounding_box(),
        );
        nodes.push(BvhNode::Branch { left, right, bbox });
        (nodes.len() - 1) as u32
    }

    /// Nearest hit among `primitives` (indexed by [`PrimitiveId`]).
    ///
    /// Removed slots (`None`) are skipped.
    pub fn hit(&self, primitives: &[Option<Primitive>], ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut stats = TraversalStats::default();
        self.hit_with_stats(primitives, ray, ray_t, &mut stats)
    }

    /// Like [`Bvh::hit`], also counting visited nodes and tested primitives.
    pub fn hit_with_stats(
        &self,
        primitives: &[Option<Primitive>],
        ray: &Ray,
        ray_t: Interval,
        stats: &mut TraversalStats,
    ) -> Option<HitRecord> {
        self.hit_node(self.root, primitives, ray, ray_t, stats)
    }

    fn hit_node(
        &self,
        index: u32,
        primitives: &[Option<Primitive>],
        ray: &Ray,
        ray_t: Interval,
        stats: &mut TraversalStats,
    ) -> Option<HitRecord> {
        let node = &self.nodes[index as usize];
        stats.nodes_visited += 1;
        if !node.bounding_box().hit(ray, ray_t.min, ray_t.max) {
            return None;
        }

        match *node {
            BvhNode::Leaf { primitive, .. } => {
                let slot = primitives.get(primitive.index())?.as_ref()?;
                stats.primitives_tested += 1;
                slot.hit(primitive, ray, ray_t)
            }
            BvhNode::Branch { left, right, .. } => {
                let hit_left = self.hit_node(left, primitives, ray, ray_t, stats);

                // Only check right up to closest hit
                let right_t = match &hit_left {
                    Some(rec) => ray_t.tightened(rec.t),
                    None => ray_t,
                };
                let hit_right = self.hit_node(right, primitives, ray, right_t, stats);

                hit_right.or(hit_left)
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        self.nodes[self.root as usize].bounding_box()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Longest root-to-leaf path, counting the root as depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1usize)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let BvhNode::Branch { left, right, .. } = self.nodes[index as usize] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }
}
