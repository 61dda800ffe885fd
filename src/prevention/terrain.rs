// src/prevention/terrain.rs
// Play-space height tracking from downward ground queries under the headset.

use glam::Vec3;

use crate::collaborators::{GroundHit, GroundQuery};
use crate::config::LocomotionConfig;
use crate::ring::RingBuffer;

#[derive(Debug, Clone)]
pub struct TerrainHeightTracker {
    heights: RingBuffer<f32>,
    was_paused: bool,
    last_hit_while_swinging: Option<GroundHit>,
}

impl TerrainHeightTracker {
    pub fn new(config: &LocomotionConfig) -> Self {
        Self {
            heights: RingBuffer::new(config.raycast.average_height_cache_size()),
            was_paused: false,
            last_hit_while_swinging: None,
        }
    }

    /// Cast straight down from the headset.
    pub fn query(&self, config: &LocomotionConfig, ground: &dyn GroundQuery, headset: Vec3) -> Option<GroundHit> {
        ground.cast_down(headset, config.raycast_max_length(), config.raycast.ground_layers)
    }

    /// Most recent hit seen while the player was arm swinging.
    pub fn last_hit_while_swinging(&self) -> Option<GroundHit> {
        self.last_hit_while_swinging
    }

    /// Fold an accepted ground hit into the cache and return the play-space
    /// height to use, or `None` when height adjustment is off for this tick.
    pub fn adjust(&mut self, config: &LocomotionConfig, hit: Option<GroundHit>, swinging: bool) -> Option<f32> {
        if config.policy.play_area_height_adjustment_paused {
            self.was_paused = true;
            return None;
        }
        if self.was_paused {
            tracing::debug!("Height adjustment resumed, snapping play area to ground");
            self.heights.clear();
            self.was_paused = false;
        }

        let hit = hit?;
        if swinging {
            self.last_hit_while_swinging = Some(hit);
        }
        if config.raycast.only_height_adjust_while_arm_swinging && !swinging {
            return None;
        }

        let capacity = config.raycast.average_height_cache_size();
        if self.heights.capacity() != capacity {
            self.heights.resize(capacity);
        }
        self.heights.push(hit.point.y);
        Some(self.heights.iter().sum::<f32>() / self.heights.len() as f32)
    }

    pub fn reset(&mut self) {
        self.heights.clear();
        self.last_hit_while_swinging = None;
    }
}
