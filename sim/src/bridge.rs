//! Host Integration Bridge
//!
//! The simulation never draws or plays anything itself. After a tick the host
//! hands a [`Renderer`] and an [`AudioSink`] to [`present`], which replays the
//! snapshot and the drained events through them. Either collaborator may be
//! missing or may fail; the simulation is unaffected and the failure is logged.
//!
//! # Flat Buffer Layout
//!
//! Canvas hosts that prefer a typed array can use [`snapshot_to_flatbuffer`]:
//!
//! ```text
//! [0] unit_count   [1] wave   [2] player_base_health   [3] enemy_base_health
//! then for each unit i (offset = HEADER_SIZE + i * UNIT_STRIDE):
//!   [+0] id  [+1] x  [+2] y  [+3] vx  [+4] vy  [+5] side (0=ally, 1=enemy)
//!   [+6] archetype (0..=3)  [+7] health  [+8] health_max  [+9] lane
//!   [+10] is_alive
//! ```
//!
//! Units appear in snapshot order (allies first, then by id).

use crate::components::{Archetype, Side};
use crate::error::SimError;
use crate::events::{SimEvent, SoundCue};
use crate::world::{BaseSnapshot, Snapshot, UnitSnapshot};
use tracing::warn;

// ============================================================================
// COLLABORATORS
// ============================================================================

/// Drawing surface. Receives literal values only and never feeds back.
pub trait Renderer {
    fn draw_unit(&mut self, unit: &UnitSnapshot) -> Result<(), SimError>;
    fn draw_base(&mut self, side: Side, base: &BaseSnapshot) -> Result<(), SimError>;
    fn show_damage_number(&mut self, x: f32, y: f32, amount: f32) -> Result<(), SimError>;

    /// Transient message. Hosts without a notice area can ignore it.
    fn show_notice(&mut self, _message: &str) -> Result<(), SimError> {
        Ok(())
    }
}

/// Fire-and-forget sound output.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue) -> Result<(), SimError>;
}

/// Replay one frame through the collaborators.
///
/// A renderer error stops drawing for the rest of the frame. Audio errors are
/// logged per cue.
pub fn present(
    snapshot: &Snapshot,
    events: &[SimEvent],
    renderer: Option<&mut dyn Renderer>,
    audio: Option<&mut dyn AudioSink>,
) {
    match renderer {
        Some(renderer) => {
            if let Err(err) = draw_frame(snapshot, events, renderer) {
                warn!(error = %err, "renderer failed, frame skipped");
            }
        }
        None => warn!("no renderer attached, frame skipped"),
    }

    let cues = events.iter().filter_map(|event| match event {
        SimEvent::Sound(cue) => Some(*cue),
        _ => None,
    });
    match audio {
        Some(audio) => {
            for cue in cues {
                if let Err(err) = audio.play(cue) {
                    warn!(?cue, error = %err, "audio cue dropped");
                }
            }
        }
        None => {
            let dropped = cues.count();
            if dropped > 0 {
                warn!(dropped, "no audio sink attached");
            }
        }
    }
}

fn draw_frame(
    snapshot: &Snapshot,
    events: &[SimEvent],
    renderer: &mut dyn Renderer,
) -> Result<(), SimError> {
    renderer.draw_base(Side::Ally, &snapshot.player_base)?;
    renderer.draw_base(Side::Enemy, &snapshot.enemy_base)?;
    for unit in &snapshot.units {
        renderer.draw_unit(unit)?;
    }
    for event in events {
        match event {
            SimEvent::Damage { x, y, amount, .. } => renderer.show_damage_number(*x, *y, *amount)?,
            SimEvent::Notice(message) => renderer.show_notice(message)?,
            _ => {}
        }
    }
    Ok(())
}

// ============================================================================
// FLAT BUFFER
// ============================================================================

/// Number of f32 values per unit in the flat buffer.
pub const UNIT_STRIDE: usize = 11;

/// Number of f32 values in the buffer header.
pub const HEADER_SIZE: usize = 4;

pub const FIELD_ID: usize = 0;
pub const FIELD_X: usize = 1;
pub const FIELD_Y: usize = 2;
pub const FIELD_VX: usize = 3;
pub const FIELD_VY: usize = 4;
pub const FIELD_SIDE: usize = 5;
pub const FIELD_ARCHETYPE: usize = 6;
pub const FIELD_HEALTH: usize = 7;
pub const FIELD_HEALTH_MAX: usize = 8;
pub const FIELD_LANE: usize = 9;
pub const FIELD_IS_ALIVE: usize = 10;

#[inline]
fn side_to_id(side: Side) -> f32 {
    match side {
        Side::Ally => 0.0,
        Side::Enemy => 1.0,
    }
}

#[inline]
fn archetype_to_id(archetype: Archetype) -> f32 {
    match archetype {
        Archetype::Barbarian => 0.0,
        Archetype::Archer => 1.0,
        Archetype::Horse => 2.0,
        Archetype::Knight => 3.0,
    }
}

/// Convert a snapshot to a flat buffer. Deterministic for a given snapshot.
pub fn snapshot_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let size = calculate_buffer_size(snapshot.units.len());
    let mut buffer = Vec::with_capacity(size);

    buffer.push(snapshot.units.len() as f32);
    buffer.push(snapshot.wave as f32);
    buffer.push(snapshot.player_base.health);
    buffer.push(snapshot.enemy_base.health);

    for unit in &snapshot.units {
        buffer.push(unit.id as f32);
        buffer.push(unit.x);
        buffer.push(unit.y);
        buffer.push(unit.vx);
        buffer.push(unit.vy);
        buffer.push(side_to_id(unit.side));
        buffer.push(archetype_to_id(unit.archetype));
        buffer.push(unit.health);
        buffer.push(unit.health_max);
        buffer.push(unit.lane as f32);
        buffer.push(if unit.health > 0.0 { 1.0 } else { 0.0 });
    }

    debug_assert_eq!(buffer.len(), size, "Buffer size mismatch");
    buffer
}

#[inline]
pub fn calculate_buffer_size(unit_count: usize) -> usize {
    HEADER_SIZE + unit_count * UNIT_STRIDE
}

#[inline]
pub const fn unit_offset(unit_index: usize) -> usize {
    HEADER_SIZE + unit_index * UNIT_STRIDE
}
