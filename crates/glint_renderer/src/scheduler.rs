//! Render scheduling: a pausable coordination thread over a worker pool.
//!
//! Calling [`RenderScheduler::request_render`] once per displayed frame is
//! the intended use. A render state already in the queue is not queued
//! twice, so repeated requests are cheap. The coordination thread takes
//! the front command, runs one pass over every pixel range, and puts the
//! command back until its state reaches the target iteration.
//!
//! States: idle (no thread, or thread exited) and rendering. The thread
//! exits when the queue drains, or when [`RenderScheduler::pause`] or
//! [`RenderScheduler::interrupt`] clears the liveness flag; both are
//! observed between passes, never mid-pass.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::integrator::{to_display_rgb, trace};
use crate::ranges::split_ranges;
use crate::sampling::gen_f32;
use crate::state::{iteration_from_thirds, CHANNELS};
use crate::sync::{lock, read};
use crate::{
    Camera, PixelAccumulator, RenderError, RenderResult, RenderState, SchedulerConfig, World,
    WorkerPool,
};

/// Progressive passes are used while `iteration - PROGRESSIVE_ITERATIONS`
/// stays at or below `PROGRESSIVE_SLACK`.
const PROGRESSIVE_ITERATIONS: f32 = 10.0;
const PROGRESSIVE_SLACK: f32 = 0.2;

/// Pixels skipped between samples in a progressive pass.
const PROGRESSIVE_STRIDE: usize = 3;

/// Mixes the pass number into worker seeds.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Everything a pass needs: what to look through, what to look at, and
/// where to accumulate.
#[derive(Clone)]
pub struct RenderCommand {
    pub camera: Arc<RwLock<Camera>>,
    pub world: Arc<RwLock<World>>,
    pub state: Arc<RenderState>,
}

struct Shared {
    commands: Mutex<VecDeque<RenderCommand>>,
    alive: AtomicBool,
    paused: AtomicBool,
    pool: WorkerPool,
}

pub struct RenderScheduler {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl RenderScheduler {
    /// Build the worker pool. No thread runs until the first request.
    pub fn new(config: &SchedulerConfig) -> RenderResult<Self> {
        let pool = WorkerPool::new(config.thread_count)?;
        Ok(Self {
            shared: Arc::new(Shared {
                commands: Mutex::new(VecDeque::new()),
                alive: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                pool,
            }),
            thread: None,
        })
    }

    /// Queue a render of `state`, starting the render thread if needed.
    ///
    /// A command for the same state (compared by identity) already in the
    /// queue is refreshed with the new camera and world handles instead.
    /// While paused the command is queued but the thread stays stopped.
    pub fn request_render(
        &mut self,
        camera: &Arc<RwLock<Camera>>,
        world: &Arc<RwLock<World>>,
        state: &Arc<RenderState>,
    ) -> RenderResult<()> {
        {
            let mut commands = lock(&self.shared.commands);
            match commands.iter_mut().find(|c| Arc::ptr_eq(&c.state, state)) {
                Some(existing) => {
                    existing.camera = Arc::clone(camera);
                    existing.world = Arc::clone(world);
                }
                None => commands.push_back(RenderCommand {
                    camera: Arc::clone(camera),
                    world: Arc::clone(world),
                    state: Arc::clone(state),
                }),
            }
        }

        if !self.is_rendering() && !self.shared.paused.load(Ordering::Acquire) {
            self.start_thread()?;
        }
        Ok(())
    }

    /// Stop after the current pass. Accumulated samples are kept.
    pub fn pause(&mut self) {
        self.shared.paused.store(true, Ordering::Release);
        self.shared.alive.store(false, Ordering::Release);
    }

    /// Restart the render thread if commands are still queued.
    pub fn resume(&mut self) -> RenderResult<()> {
        self.shared.paused.store(false, Ordering::Release);
        if !self.is_rendering() && self.pending_commands() > 0 {
            self.start_thread()?;
        }
        Ok(())
    }

    /// Stop and join the render thread, then drain the pool.
    ///
    /// On return no worker reads the world, so it is safe to edit it and
    /// rebuild its BVH. Queued commands stay queued.
    pub fn interrupt(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
        self.join_thread();
        self.shared.pool.wait();
    }

    /// Interrupt, then reset `state` to its pristine accumulators.
    pub fn signal_scene_change(&mut self, state: &RenderState) {
        self.interrupt();
        state.reset();
        log::debug!("Scene changed, render restarted from iteration 1");
    }

    /// Stop rendering and drop every queued command.
    pub fn clear(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
        lock(&self.shared.commands).clear();
        self.join_thread();
        self.shared.pool.wait();
    }

    /// Block until the queue drains or the thread is stopped.
    pub fn wait(&mut self) {
        while self.is_rendering() {
            thread::yield_now();
        }
        self.join_thread();
    }

    pub fn is_rendering(&self) -> bool {
        self.shared.alive.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    pub fn pending_commands(&self) -> usize {
        lock(&self.shared.commands).len()
    }

    pub fn thread_count(&self) -> usize {
        self.shared.pool.thread_count()
    }

    fn start_thread(&mut self) -> RenderResult<()> {
        // A previous loop may still be finishing its last pass
        self.join_thread();

        self.shared.alive.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("glint-render".into())
            .spawn(move || render_loop(&shared));

        match spawned {
            Ok(handle) => {
                self.thread = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.shared.alive.store(false, Ordering::Release);
                Err(RenderError::ThreadSpawn(err))
            }
        }
    }

    fn join_thread(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Render thread panicked");
                self.shared.alive.store(false, Ordering::Release);
            }
        }
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("rendering", &self.is_rendering())
            .field("paused", &self.is_paused())
            .field("pending_commands", &self.pending_commands())
            .field("pool", &self.shared.pool)
            .finish()
    }
}

/// Clears the liveness flag when the render loop ends, including by panic.
struct AliveGuard<'a>(&'a AtomicBool);

impl Drop for AliveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn render_loop(shared: &Shared) {
    let _alive = AliveGuard(&shared.alive);
    log::info!("Render thread started");

    loop {
        let command = {
            let mut commands = lock(&shared.commands);
            // Decide to exit under the queue lock so a concurrent request
            // either lands before this check or sees the thread as stopped
            if !shared.alive.load(Ordering::Acquire) || commands.is_empty() {
                shared.alive.store(false, Ordering::Release);
                break;
            }
            commands.pop_front()
        };
        let Some(command) = command else { continue };

        if command.state.is_complete() {
            continue;
        }

        if !render_pass(&command, &shared.pool) {
            let mut commands = lock(&shared.commands);
            // A request made mid-pass already queued a fresher command
            if !commands.iter().any(|c| Arc::ptr_eq(&c.state, &command.state)) {
                commands.push_back(command);
            }
        }
    }

    log::info!("Render thread stopped");
}

/// Run one pass for `command` on `pool`. Returns true once the target
/// iteration is reached.
pub fn render_pass(command: &RenderCommand, pool: &WorkerPool) -> bool {
    let start = Instant::now();
    let state = &command.state;
    let settings = state.settings();
    let camera = read(&command.camera);
    let world = read(&command.world);

    let thirds = state.thirds();
    let iteration = iteration_from_thirds(thirds);
    let progressive =
        settings.extra_progressive && iteration - PROGRESSIVE_ITERATIONS <= PROGRESSIVE_SLACK;
    let (stride, offset, advance) = if progressive {
        let stride = PROGRESSIVE_STRIDE;
        (stride, (thirds % stride as u64) as usize, 1)
    } else {
        (1, 0, 3)
    };

    let inv_width = inverse_span(state.width());
    let inv_height = inverse_span(state.height());

    let mut frame = state.lock_frame();
    let frame = &mut *frame;

    // Carve disjoint accumulator and byte slices for each range
    let ranges = split_ranges(frame.pixels.len(), pool.thread_count());
    let mut tasks: Vec<(u64, &mut [PixelAccumulator], &mut [u8])> = Vec::with_capacity(ranges.len());
    let mut pixels_rest: &mut [PixelAccumulator] = &mut frame.pixels;
    let mut bytes_rest: &mut [u8] = &mut frame.back;
    for range in &ranges {
        let (pixels, pixels_tail) = std::mem::take(&mut pixels_rest).split_at_mut(range.len());
        let (bytes, bytes_tail) = std::mem::take(&mut bytes_rest).split_at_mut(range.len() * CHANNELS);
        pixels_rest = pixels_tail;
        bytes_rest = bytes_tail;

        let seed = settings.seed ^ thirds.wrapping_mul(SEED_MIX) ^ range.index as u64;
        tasks.push((seed, pixels, bytes));
    }

    let failed = pool.run_batch(tasks, |(seed, pixels, bytes)| {
        let mut rng = SmallRng::seed_from_u64(seed);
        let Some(base) = pixels.first().map(|p| p.index) else {
            return;
        };

        for pixel in pixels.iter_mut().skip(offset).step_by(stride) {
            let u = (pixel.x + gen_f32(&mut rng)) * inv_width;
            let v = (pixel.y + gen_f32(&mut rng)) * inv_height;
            let ray = camera.ray_through(u, v, &mut rng);

            pixel.color += trace(&ray, &world, &settings, &mut rng);
            pixel.samples += 1;

            let byte = pixel.index - base;
            bytes[byte..byte + CHANNELS].copy_from_slice(&to_display_rgb(pixel.color, pixel.samples));
        }
    });
    if failed > 0 {
        log::warn!("{} of {} pixel ranges failed this pass", failed, ranges.len());
    }

    state.finish_pass(&frame.back, advance, start.elapsed());
    let iteration = state.iteration();
    log::debug!(
        "Pass finished: iteration {:.2} in {:.2?}{}",
        iteration,
        start.elapsed(),
        if progressive { " (progressive)" } else { "" }
    );

    iteration >= settings.target_iteration
}

/// `1 / (n - 1)`, so the last pixel maps to coordinate 1.
fn inverse_span(n: u32) -> f32 {
    if n > 1 {
        1.0 / (n - 1) as f32
    } else {
        1.0
    }
}
