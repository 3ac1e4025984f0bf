//! Errors raised while building scenes or starting renders.
//!
//! Numerical degeneracies (near-zero scatter directions, total internal
//! reflection) are not errors; they are resolved where they occur.

use std::path::PathBuf;

use thiserror::Error;

use crate::PrimitiveId;

/// Errors that can occur in the rendering engine.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot build an acceleration structure over an empty scene")]
    EmptyScene,

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("worker pool needs at least one thread")]
    InvalidThreadCount,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn render thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("failed to load texture {}: {source}", path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no primitive with id {0:?}")]
    UnknownPrimitive(PrimitiveId),
}

pub type RenderResult<T> = Result<T, RenderError>;
