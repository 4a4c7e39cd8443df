//! Side effects emitted for the rendering and audio collaborators.
//!
//! Events accumulate in [`SimEvents`] during a tick and are drained by the
//! host between ticks. Nothing in the simulation reads them back.

use crate::components::Side;
use crate::state::Outcome;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Discrete audio cues. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    AttackLanded,
    UnitSpawned,
    BaseHit,
    Victory,
    Defeat,
}

/// What a damage number is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageTarget {
    Unit(u32),
    Base(Side),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A landed attack, for floating damage numbers.
    Damage {
        target: DamageTarget,
        x: f32,
        y: f32,
        amount: f32,
    },
    Sound(SoundCue),
    /// Transient user-visible message.
    Notice(String),
    /// The enemy base fell and `wave` is next.
    WaveCleared { wave: u32 },
    EncounterEnded(Outcome),
}

#[derive(Resource, Debug, Default)]
pub struct SimEvents {
    queue: Vec<SimEvent>,
}

impl SimEvents {
    pub fn push(&mut self, event: SimEvent) {
        self.queue.push(event);
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.queue.push(SimEvent::Sound(cue));
    }

    pub fn notice(&mut self, message: impl Into<String>) {
        self.queue.push(SimEvent::Notice(message.into()));
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
