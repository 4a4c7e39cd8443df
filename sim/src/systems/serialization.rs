//! Serialization utilities for simulation state.
//!
//! Snapshots go to the renderer; `SaveData` goes to whatever durable storage
//! the host provides. Both are plain JSON with no versioning of their own.

use crate::components::Archetype;
use crate::economy::UpgradeLevels;
use crate::error::SimError;
use crate::world::Snapshot;
use serde::{Deserialize, Serialize};

/// Fields persisted between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub wave: u32,
    pub gold: u32,
    pub diamonds: u32,
    pub player_base_health: f32,
    pub enemy_base_health: f32,
    pub selected_archetype: Archetype,
    #[serde(default)]
    pub upgrades: UpgradeLevels,
}

impl SaveData {
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Serialize a snapshot to JSON bytes.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(snapshot)
}

/// Deserialize a snapshot from JSON bytes.
pub fn snapshot_from_json(data: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(data)
}
