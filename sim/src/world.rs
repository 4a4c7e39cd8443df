//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the simulation state
//! that the rendering collaborator reads between ticks.

use crate::components::*;
use crate::economy::Economy;
use crate::field::{Base, Bases};
use crate::state::{EncounterState, WaveState};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single unit's state for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: u32,
    pub side: Side,
    pub archetype: Archetype,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub health: f32,
    pub health_max: f32,
    pub lane: u8,
    pub spawned_at_ms: f64,
}

/// Snapshot of one base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseSnapshot {
    pub health: f32,
    pub health_max: f32,
    pub defense_percent: u32,
}

impl From<&Base> for BaseSnapshot {
    fn from(base: &Base) -> Self {
        Self {
            health: base.health.current,
            health_max: base.health.max,
            defense_percent: base.defense_percent,
        }
    }
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks run since the simulation was created.
    pub tick: u64,
    pub state: EncounterState,
    pub wave: u32,
    pub max_wave: u32,
    pub gold: u32,
    pub diamonds: u32,
    pub player_base: BaseSnapshot,
    pub enemy_base: BaseSnapshot,
    /// Units in roster order, allies first.
    pub units: Vec<UnitSnapshot>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64) -> Self {
        let mut query = world.query::<(
            &UnitId,
            &Side,
            &Archetype,
            &Position,
            &Velocity,
            &Health,
            &Lane,
            &SpawnedAt,
        )>();

        let mut units: Vec<UnitSnapshot> = query
            .iter(world)
            .map(|(id, side, archetype, pos, vel, health, lane, spawned)| UnitSnapshot {
                id: id.0,
                side: *side,
                archetype: *archetype,
                x: pos.x,
                y: pos.y,
                vx: vel.vx,
                vy: vel.vy,
                health: health.current,
                health_max: health.max,
                lane: lane.0,
                spawned_at_ms: spawned.0,
            })
            .collect();
        units.sort_by_key(|u| (u.side.turn_order(), u.id));

        let state = *world.resource::<EncounterState>();
        let waves = *world.resource::<WaveState>();
        let bases = *world.resource::<Bases>();
        let economy = world.resource::<Economy>();

        Self {
            tick,
            state,
            wave: waves.current,
            max_wave: waves.max,
            gold: economy.gold,
            diamonds: economy.diamonds,
            player_base: (&bases.player).into(),
            enemy_base: (&bases.enemy).into(),
            units,
        }
    }

    pub fn count(&self, side: Side) -> usize {
        self.units.iter().filter(|u| u.side == side).count()
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
