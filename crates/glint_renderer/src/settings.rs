//! Render and scheduler configuration.
//!
//! Both structs deserialize from partial JSON: missing fields take their
//! defaults.

use serde::{Deserialize, Serialize};

use crate::Color;

/// Upper bound on the default worker count.
pub const MAX_DEFAULT_THREADS: usize = 8;

/// Per-render settings, readable by workers while a pass runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Maximum scatter events per path
    pub bounce_depth: u32,
    /// Returned (times attenuation) when a path runs out of bounces
    pub depth_limit_color: Color,
    /// Sky colour looking straight down
    pub sky_bottom_color: Color,
    /// Sky colour looking straight up
    pub sky_top_color: Color,
    pub sky_strength: f32,
    /// Iteration at which the render counts as done
    pub target_iteration: f32,
    /// Sample every third pixel for the first iterations
    pub extra_progressive: bool,
    /// Base seed for per-pass worker RNGs
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            bounce_depth: 12,
            depth_limit_color: Color::ZERO,
            sky_bottom_color: Color::ONE,
            sky_top_color: Color::new(0.5, 0.7, 1.0),
            sky_strength: 1.0,
            target_iteration: 1000.0,
            extra_progressive: true,
            seed: 0,
        }
    }
}

impl RenderSettings {
    pub fn with_bounce_depth(mut self, depth: u32) -> Self {
        self.bounce_depth = depth;
        self
    }

    /// Set sky gradient colours and strength.
    pub fn with_sky(mut self, bottom: Color, top: Color, strength: f32) -> Self {
        self.sky_bottom_color = bottom;
        self.sky_top_color = top;
        self.sky_strength = strength;
        self
    }

    pub fn with_depth_limit_color(mut self, color: Color) -> Self {
        self.depth_limit_color = color;
        self
    }

    pub fn with_target_iteration(mut self, target: f32) -> Self {
        self.target_iteration = target;
        self
    }

    pub fn with_extra_progressive(mut self, enabled: bool) -> Self {
        self.extra_progressive = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Scheduler construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Worker threads, and the number of pixel ranges per pass
    pub thread_count: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            thread_count: available.min(MAX_DEFAULT_THREADS),
        }
    }
}

impl SchedulerConfig {
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert_eq!(settings.bounce_depth, 12);
        assert_eq!(settings.target_iteration, 1000.0);
        assert!(settings.extra_progressive);

        let config = SchedulerConfig::default();
        assert!(config.thread_count >= 1 && config.thread_count <= MAX_DEFAULT_THREADS);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{ "bounce_depth": 4, "sky_top_color": [0.0, 0.0, 1.0] }"#).unwrap();
        assert_eq!(settings.bounce_depth, 4);
        assert_eq!(settings.sky_top_color, Color::new(0.0, 0.0, 1.0));
        assert_eq!(settings.sky_bottom_color, Color::ONE);
        assert_eq!(settings.sky_strength, 1.0);
    }

    #[test]
    fn test_builders() {
        let settings = RenderSettings::default()
            .with_bounce_depth(3)
            .with_sky(Color::ZERO, Color::ONE, 2.0)
            .with_extra_progressive(false);
        assert_eq!(settings.bounce_depth, 3);
        assert_eq!(settings.sky_strength, 2.0);
        assert!(!settings.extra_progressive);
    }
}
