//! Mutable state of one in-flight render.
//!
//! A [`RenderState`] is built once per output resolution and shared
//! between the driving thread, the render thread and the workers behind
//! an `Arc`. Workers write only into the accumulators and back buffer of
//! their own pixel range; the completed back buffer is then copied into
//! the front buffer in one step, so readers never see a half-written
//! frame.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use std::time::Duration;

use crate::sync::{lock, read, write};
use crate::{Color, RenderError, RenderResult, RenderSettings};

/// Bytes per pixel in the display buffers.
pub const CHANNELS: usize = 3;

/// Running sum for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelAccumulator {
    /// Offset of this pixel's first byte in the colour buffers
    pub index: usize,
    /// Sample column
    pub x: f32,
    /// Sample row, counted from the bottom of the image
    pub y: f32,
    /// Sum of every sample taken so far
    pub color: Color,
    pub samples: u32,
}

/// Accumulators plus the buffer workers tone-map into.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) pixels: Vec<PixelAccumulator>,
    pub(crate) back: Vec<u8>,
}

#[derive(Debug, Default)]
struct Progress {
    /// Thirds of an iteration completed since the last reset
    thirds: u64,
    last_render_duration: Duration,
}

#[derive(Debug)]
pub struct RenderState {
    width: u32,
    height: u32,
    settings: RwLock<RenderSettings>,
    pristine: Vec<PixelAccumulator>,
    frame: Mutex<Frame>,
    front: RwLock<Vec<u8>>,
    progress: Mutex<Progress>,
}

impl RenderState {
    /// Allocate accumulators and buffers for a `width` x `height` image.
    pub fn new(width: u32, height: u32, settings: RenderSettings) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        let pixel_count = width as usize * height as usize;
        let mut pristine = Vec::with_capacity(pixel_count);
        // Top row first, so buffer row 0 is the top of the image
        for y in (0..height).rev() {
            for x in 0..width {
                pristine.push(PixelAccumulator {
                    index: pristine.len() * CHANNELS,
                    x: x as f32,
                    y: y as f32,
                    color: Color::ZERO,
                    samples: 0,
                });
            }
        }

        Ok(Self {
            width,
            height,
            settings: RwLock::new(settings),
            frame: Mutex::new(Frame {
                pixels: pristine.clone(),
                back: vec![0; pixel_count * CHANNELS],
            }),
            pristine,
            front: RwLock::new(vec![0; pixel_count * CHANNELS]),
            progress: Mutex::new(Progress::default()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pristine.len()
    }

    /// Current iteration, starting at 1 and advancing in thirds.
    pub fn iteration(&self) -> f32 {
        iteration_from_thirds(self.thirds())
    }

    pub(crate) fn thirds(&self) -> u64 {
        lock(&self.progress).thirds
    }

    pub fn target_iteration(&self) -> f32 {
        read(&self.settings).target_iteration
    }

    pub fn set_target_iteration(&self, target: f32) {
        write(&self.settings).target_iteration = target;
    }

    /// Snapshot of the settings the next pass will use.
    pub fn settings(&self) -> RenderSettings {
        read(&self.settings).clone()
    }

    /// Edit settings in place. Takes effect from the next pass.
    pub fn update_settings(&self, f: impl FnOnce(&mut RenderSettings)) {
        f(&mut write(&self.settings));
    }

    pub fn is_complete(&self) -> bool {
        self.iteration() >= self.target_iteration()
    }

    /// Wall time of the most recent pass.
    pub fn last_render_duration(&self) -> Duration {
        lock(&self.progress).last_render_duration
    }

    /// Packed RGB8 image, row-major with the top row first.
    pub fn front_buffer(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        read(&self.front)
    }

    /// Copy of the current accumulators.
    ///
    /// Blocks while a pass is writing them.
    pub fn accumulators(&self) -> Vec<PixelAccumulator> {
        lock(&self.frame).pixels.clone()
    }

    /// The zeroed accumulators a reset restores.
    pub fn pristine(&self) -> &[PixelAccumulator] {
        &self.pristine
    }

    /// Discard all samples and restart at iteration 1.
    ///
    /// The display buffers keep the last image until pixels are resampled.
    pub fn reset(&self) {
        lock(&self.frame).pixels.copy_from_slice(&self.pristine);
        let mut progress = lock(&self.progress);
        progress.thirds = 0;
        progress.last_render_duration = Duration::ZERO;
    }

    pub(crate) fn lock_frame(&self) -> MutexGuard<'_, Frame> {
        lock(&self.frame)
    }

    /// Publish the back buffer and record a finished pass.
    pub(crate) fn finish_pass(&self, back: &[u8], thirds: u64, duration: Duration) {
        write(&self.front).copy_from_slice(back);
        let mut progress = lock(&self.progress);
        progress.thirds += thirds;
        progress.last_render_duration = duration;
    }
}

pub(crate) fn iteration_from_thirds(thirds: u64) -> f32 {
    1.0 + thirds as f32 / 3.0
}
