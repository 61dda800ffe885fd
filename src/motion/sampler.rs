// src/motion/sampler.rs
//! Controller movement smoothing.
//!
//! Each tick the distance a controller moved is turned into a speed, pushed into
//! that controller's cache, and the cache is reduced to a single value. Tracking
//! jitter shows up as one abnormally high sample, which is why
//! [`SmoothingMode::AverageMinusHighest`] is the default.

use glam::Vec3;

use crate::config::{SmoothingConfig, SmoothingMode};
use crate::ring::RingBuffer;

/// Bounded cache of per-tick controller speeds for one controller.
#[derive(Debug, Clone)]
pub struct SmoothingCache {
    samples: RingBuffer<f32>,
}

impl SmoothingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: RingBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, value: f32) {
        self.samples.push(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn resize(&mut self, capacity: usize) {
        self.samples.resize(capacity);
    }

    /// Reduce the cache to one value. An empty cache reduces to zero.
    pub fn reduce(&self, mode: SmoothingMode) -> f32 {
        let n = self.samples.len();
        if n == 0 {
            return 0.0;
        }
        match mode {
            SmoothingMode::Lowest => self.samples.iter().fold(f32::INFINITY, f32::min),
            SmoothingMode::Average => self.samples.iter().sum::<f32>() / n as f32,
            SmoothingMode::AverageMinusHighest => {
                if n == 1 {
                    return self.samples.latest().unwrap_or(0.0);
                }
                let sum: f32 = self.samples.iter().sum();
                let highest = self.samples.iter().fold(f32::NEG_INFINITY, f32::max);
                (sum - highest) / (n - 1) as f32
            }
        }
    }
}

/// Smoothed controller speeds for one tick, in local units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothedMovement {
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone)]
pub struct ControllerSampler {
    left_cache: SmoothingCache,
    right_cache: SmoothingCache,
    previous: Option<(Vec3, Vec3)>,
}

impl ControllerSampler {
    pub fn new(config: &SmoothingConfig) -> Self {
        Self {
            left_cache: SmoothingCache::new(config.cache_size()),
            right_cache: SmoothingCache::new(config.cache_size()),
            previous: None,
        }
    }

    /// Feed this tick's controller positions. The first call only records positions.
    pub fn sample(
        &mut self,
        config: &SmoothingConfig,
        left: Vec3,
        right: Vec3,
        dt: f32,
    ) -> SmoothedMovement {
        let (prev_left, prev_right) = self.previous.unwrap_or((left, right));
        self.previous = Some((left, right));

        let (left_speed, right_speed) = if dt > 0.0 {
            (left.distance(prev_left) / dt, right.distance(prev_right) / dt)
        } else {
            (0.0, 0.0)
        };

        if !config.enabled {
            return SmoothedMovement {
                left: left_speed,
                right: right_speed,
            };
        }

        if self.left_cache.samples.capacity() != config.cache_size() {
            self.left_cache.resize(config.cache_size());
            self.right_cache.resize(config.cache_size());
        }
        self.left_cache.push(left_speed);
        self.right_cache.push(right_speed);

        SmoothedMovement {
            left: self.left_cache.reduce(config.mode),
            right: self.right_cache.reduce(config.mode),
        }
    }

    /// Forget cached samples and the previous positions.
    pub fn reset(&mut self) {
        self.left_cache.clear();
        self.right_cache.clear();
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(values: &[f32]) -> SmoothingCache {
        let mut cache = SmoothingCache::new(values.len().max(1));
        for &v in values {
            cache.push(v);
        }
        cache
    }

    #[test]
    fn test_average_minus_highest_drops_spike() {
        let cache = cache_with(&[0.1, 0.9, 0.2]);
        assert!((cache.reduce(SmoothingMode::AverageMinusHighest) - 0.15).abs() < 1e-6);
        assert!((cache.reduce(SmoothingMode::Average) - 0.4).abs() < 1e-6);
        assert!((cache.reduce(SmoothingMode::Lowest) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_single_sample_is_identical_across_modes() {
        let mut cache = SmoothingCache::new(3);
        cache.push(0.42);
        for mode in [
            SmoothingMode::Lowest,
            SmoothingMode::Average,
            SmoothingMode::AverageMinusHighest,
        ] {
            assert_eq!(cache.reduce(mode), 0.42);
        }
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let mut cache = cache_with(&[5.0, 1.0, 1.0]);
        cache.push(1.0);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.reduce(SmoothingMode::Average), 1.0);
    }

    #[test]
    fn test_sampler_first_tick_reports_no_movement() {
        let config = SmoothingConfig::default();
        let mut sampler = ControllerSampler::new(&config);
        let out = sampler.sample(&config, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, 0.1);
        assert_eq!(out, SmoothedMovement { left: 0.0, right: 0.0 });
        let out = sampler.sample(&config, Vec3::new(1.1, 0.0, 0.0), Vec3::ZERO, 0.1);
        // cache holds [0.0, 1.0]; average minus highest keeps the 0.0
        assert!(out.left.abs() < 1e-6);
    }

    #[test]
    fn test_sampler_without_smoothing_returns_raw_speed() {
        let mut config = SmoothingConfig::default();
        config.enabled = false;
        let mut sampler = ControllerSampler::new(&config);
        sampler.sample(&config, Vec3::ZERO, Vec3::ZERO, 0.1);
        let out = sampler.sample(&config, Vec3::new(0.0, 0.0, 0.2), Vec3::new(0.1, 0.0, 0.0), 0.1);
        assert!((out.left - 2.0).abs() < 1e-5);
        assert!((out.right - 1.0).abs() < 1e-5);
    }
}
