//! Glint renderer - progressive CPU path tracing
//!
//! Scenes are arenas of transformed primitives with handle-based material
//! and texture pools, accelerated by a BVH. A scheduler thread drives a
//! fixed worker pool, refining a per-pixel accumulation buffer pass by
//! pass and publishing a double-buffered RGB8 image for display.

mod bvh;
mod camera;
mod cuboid;
mod error;
mod hit;
mod integrator;
mod material;
mod pool;
mod primitive;
mod ranges;
mod rectangle;
pub mod sampling;
mod scheduler;
mod settings;
mod sphere;
mod state;
mod sync;
mod texture;
mod world;

pub use bvh::{Bvh, BvhNode, TraversalStats};
pub use camera::Camera;
pub use cuboid::{Cuboid, CuboidFace};
pub use error::{RenderError, RenderResult};
pub use hit::{face_normal, HitRecord, LocalHit};
pub use integrator::{linear_to_gamma, sky_color, to_display_rgb, trace, T_MIN};
pub use material::{Color, Material, MaterialId, MaterialPool, Scatter, DEFAULT_MATERIAL};
pub use pool::WorkerPool;
pub use primitive::{Primitive, PrimitiveId, Shape, BOUNDS_PADDING};
pub use ranges::{split_ranges, PixelRange};
pub use rectangle::{Rectangle, RECTANGLE_THICKNESS};
pub use scheduler::{render_pass, RenderCommand, RenderScheduler};
pub use settings::{RenderSettings, SchedulerConfig, MAX_DEFAULT_THREADS};
pub use sphere::Sphere;
pub use state::{PixelAccumulator, RenderState, CHANNELS};
pub use texture::{
    ImageTexture, Texture, TextureId, TexturePool, DEFAULT_ALBEDO, MISSING_TEXTURE_COLOR,
};
pub use world::{World, DEFAULT_WORLD_SEED};

/// Re-export common math types from glint_math
pub use glint_math::{Aabb, Interval, Ray, Transform, Vec3};
