//! Encounter state machine and per-tick bookkeeping resources.

use bevy_ecs::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// How a terminated encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Defeat,
}

/// ```text
/// Idle --start--> Active <--toggle--> Paused
///                   |
///                   +--base lost / last wave cleared--> Terminated --reset--> Idle
/// ```
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterState {
    #[default]
    Idle,
    Active,
    Paused,
    Terminated(Outcome),
}

impl EncounterState {
    pub fn is_active(self) -> bool {
        self == EncounterState::Active
    }
}

/// Wave counter. `current` runs from 1 to `max`; passing `max` is victory.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveState {
    pub current: u32,
    pub max: u32,
}

impl Default for WaveState {
    fn default() -> Self {
        Self { current: 1, max: 20 }
    }
}

/// Host wall clock for the current tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    pub now_ms: f64,
    /// Active time since the previous tick.
    pub delta_ms: f64,
}

/// Rewards collected by the death sweep, paid out once per tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingRewards {
    pub gold: u32,
    pub diamonds: u32,
}

/// Set when a unit destroys the player base mid-tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefeatSignal(pub bool);

/// Deterministic RNG for spawn jitter.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Allocator for [`crate::components::UnitId`] and the ally spawn lane cursor.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct Roster {
    next_id: u32,
    next_ally_lane: u8,
}

impl Roster {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn next_ally_lane(&mut self) -> u8 {
        let lane = self.next_ally_lane;
        self.next_ally_lane = (lane + 1) % crate::components::LANE_COUNT;
        lane
    }
}
