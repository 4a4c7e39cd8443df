//! Bastion Lanes - Simulation Core
//!
//! A deterministic, frame-driven ECS simulation of a lane-based wave defence
//! battle: two bases, three lanes, allied units bought by the player and enemy
//! waves that scale with the wave number.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod bridge;
pub mod components;
pub mod config;
pub mod economy;
pub mod error;
pub mod events;
pub mod field;
pub mod scheduler;
pub mod spatial;
pub mod state;
pub mod stats;
pub mod systems;
pub mod world;

pub use api::SimWorld;
pub use bridge::{AudioSink, Renderer};
pub use components::*;
pub use config::SimConfig;
pub use economy::{Economy, UpgradeKind, UpgradeLevels};
pub use error::SimError;
pub use events::{DamageTarget, SimEvent, SoundCue};
pub use field::{Base, Bases, Battlefield};
pub use scheduler::{FrameScheduler, StopHandle};
pub use spatial::{SpatialEntry, SpatialGrid};
pub use state::{EncounterState, Outcome, WaveState};
pub use systems::SaveData;
pub use world::Snapshot;
