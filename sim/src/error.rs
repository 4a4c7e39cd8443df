//! Errors returned by player-facing simulation calls.
//!
//! None of these are fatal: a rejected call leaves state untouched and the
//! caller surfaces the message as a notice.

use crate::components::Archetype;
use crate::economy::UpgradeKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("no encounter is running")]
    NotActive,
    #[error("reset the current encounter first")]
    NotIdle,
    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u32, available: u32 },
    #[error("not enough diamonds: need {needed}, have {available}")]
    InsufficientDiamonds { needed: u32, available: u32 },
    #[error("{} is locked", .0.name())]
    Locked(Archetype),
    #[error("{0:?} is already at max level")]
    MaxLevel(UpgradeKind),
    #[error("already unlocked")]
    AlreadyUnlocked,
    #[error("save data could not be read: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{collaborator} failed: {reason}")]
    Collaborator {
        collaborator: &'static str,
        reason: String,
    },
}

