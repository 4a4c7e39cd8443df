//! Tunable simulation constants.
//!
//! Every distance and speed here is expressed at the reference canvas width
//! and multiplied by the current world scale at use.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the simulation.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Canvas width the constants were tuned for.
    pub reference_width: f32,
    /// Spatial grid cell size in pixels (not scaled).
    pub cell_size: f32,

    /// Multiplier from unit speed to pixels per tick.
    pub move_multiplier: f32,
    /// Vertical pursuit weight relative to horizontal.
    pub vertical_damping: f32,
    /// Fraction of the velocity error removed each tick.
    pub acceleration: f32,
    /// Lane pull strength, as a fraction of scaled unit speed.
    pub lane_weight: f32,
    /// Vertical offset from lane centre tolerated before the lane pull applies.
    pub lane_threshold: f32,
    /// Radius within which friendlies push each other apart.
    pub separation_radius: f32,
    /// Separation strength.
    pub separation_weight: f32,

    /// Extra reach when a unit targets a base.
    pub base_range_buffer: f32,
    /// Inset from the left and top canvas edges.
    pub edge_margin: f32,
    /// Additional inset on the right and bottom edges for the sprite body.
    pub sprite_margin: f32,
    /// Distance of each base from its canvas edge.
    pub base_inset: f32,

    /// Last playable wave. Clearing it wins the encounter.
    pub max_wave: u32,
    /// Enemy base health, restored at every wave start.
    pub enemy_base_health: f32,
    /// Flat gold granted when a wave is cleared.
    pub wave_clear_gold: u32,
    /// Extra wave-clear gold per wave number.
    pub wave_clear_gold_per_wave: f32,
    /// Diamonds granted when a wave is cleared.
    pub wave_clear_diamonds: u32,
    /// Passive gold per second before upgrades.
    pub base_gold_per_second: f32,

    /// Upper bound on the frame delta, so a stalled host does not dump income.
    pub max_frame_delta_ms: f64,
    /// Seed for spawn jitter.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            reference_width: 800.0,
            cell_size: 50.0,
            move_multiplier: 0.35,
            vertical_damping: 0.7,
            acceleration: 0.06,
            lane_weight: 0.15,
            lane_threshold: 5.0,
            separation_radius: 20.0,
            separation_weight: 0.5,
            base_range_buffer: 40.0,
            edge_margin: 10.0,
            sprite_margin: 20.0,
            base_inset: 50.0,
            max_wave: 20,
            enemy_base_health: 150.0,
            wave_clear_gold: 20,
            wave_clear_gold_per_wave: 2.0,
            wave_clear_diamonds: 1,
            base_gold_per_second: 1.0,
            max_frame_delta_ms: 250.0,
            seed: 0x5eed,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Gold granted for clearing into `new_wave`.
    pub fn wave_clear_reward(&self, new_wave: u32) -> u32 {
        self.wave_clear_gold + (new_wave as f32 * self.wave_clear_gold_per_wave).floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{ "max_wave": 5, "acceleration": 0.1 }"#).unwrap();
        assert_eq!(config.max_wave, 5);
        assert!((config.acceleration - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.cell_size, 50.0);
    }

    #[test]
    fn test_wave_clear_reward() {
        let config = SimConfig::default();
        assert_eq!(config.wave_clear_reward(2), 24);
        assert_eq!(config.wave_clear_reward(7), 34);
    }
}
