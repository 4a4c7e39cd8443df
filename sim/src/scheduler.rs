//! Host-side frame scheduling.
//!
//! The host calls [`FrameScheduler::frame`] from its repaint callback and
//! schedules the next callback only while it returns `true`. Stopping takes
//! effect at the top of the next frame; a tick already running always
//! completes.

use crate::api::SimWorld;
use crate::state::EncounterState;
use std::cell::Cell;
use std::rc::Rc;

/// Shared stop flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    stop: StopHandle,
    frames: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Frames that ran a tick.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame. Returns whether the host should schedule another.
    pub fn frame(&mut self, sim: &mut SimWorld, now_ms: f64) -> bool {
        if self.stop.is_stopped() {
            return false;
        }
        sim.tick(now_ms);
        self.frames += 1;
        !matches!(sim.state(), EncounterState::Terminated(_))
    }
}
