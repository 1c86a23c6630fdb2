//! # Sensor wait tasks
//!
//! Leaves which wait on a sensor condition. The bounded ones count cycles without the condition
//! and request cancellation once the bound is reached, so a missing sensor never stalls a routine.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};

use super::{Task, TaskContext};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Waits until the game piece sensor reads `present`, cancels after `max_cycles` updates.
pub struct WaitForGamePieceTask {
    present: bool,
    max_cycles: u64,
    cycles: u64,
    done: bool,
}

/// Waits until a target is seen, cancels after `max_misses` consecutive cycles without one.
pub struct WaitForTargetTask {
    max_misses: u64,
    misses: u64,
    offset_deg: Option<f64>,
}

/// Waits until the flywheel is within `tol_rpm` of `rpm`.
///
/// This does not drive the flywheel, run it alongside a task holding the velocity setpoint.
pub struct WaitForFlywheelTask {
    rpm: f64,
    tol_rpm: f64,
    at_speed: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WaitForGamePieceTask {
    pub fn new(present: bool, max_cycles: u64) -> Self {
        Self {
            present,
            max_cycles,
            cycles: 0,
            done: false,
        }
    }
}

impl Task for WaitForGamePieceTask {
    fn name(&self) -> &str {
        if self.present {
            "wait_for_game_piece"
        } else {
            "wait_for_no_game_piece"
        }
    }

    fn begin(&mut self, _ctx: &mut TaskContext) {
        self.cycles = 0;
        self.done = false;
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        if self.done {
            return;
        }

        self.cycles += 1;
        self.done = ctx.game_piece.has_game_piece() == self.present;

        if !self.done && self.cycles >= self.max_cycles {
            warn!(
                "{}: gave up after {} cycles",
                self.name(),
                self.cycles
            );
        }
    }

    fn end(&mut self, _ctx: &mut TaskContext) {}

    fn has_completed(&self) -> bool {
        self.done
    }

    fn should_cancel(&self) -> bool {
        !self.done && self.cycles >= self.max_cycles
    }
}

impl WaitForTargetTask {
    pub fn new(max_misses: u64) -> Self {
        Self {
            max_misses,
            misses: 0,
            offset_deg: None,
        }
    }

    /// Offset of the target when it was found.
    pub fn offset_deg(&self) -> Option<f64> {
        self.offset_deg
    }
}

impl Task for WaitForTargetTask {
    fn name(&self) -> &str {
        "wait_for_target"
    }

    fn begin(&mut self, _ctx: &mut TaskContext) {
        self.misses = 0;
        self.offset_deg = None;
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        if self.offset_deg.is_some() {
            return;
        }

        match ctx.target.target_offset_deg() {
            Some(offset) => {
                debug!("Target found at {:.2} deg", offset);
                self.offset_deg = Some(offset);
            }
            None => {
                self.misses += 1;
                if self.misses == self.max_misses {
                    warn!("No target seen for {} cycles", self.misses);
                }
            }
        }
    }

    fn end(&mut self, _ctx: &mut TaskContext) {}

    fn has_completed(&self) -> bool {
        self.offset_deg.is_some()
    }

    fn should_cancel(&self) -> bool {
        self.offset_deg.is_none() && self.misses >= self.max_misses
    }
}

impl WaitForFlywheelTask {
    pub fn new(rpm: f64, tol_rpm: f64) -> Self {
        Self {
            rpm,
            tol_rpm,
            at_speed: false,
        }
    }
}

impl Task for WaitForFlywheelTask {
    fn name(&self) -> &str {
        "wait_for_flywheel"
    }

    fn begin(&mut self, _ctx: &mut TaskContext) {
        self.at_speed = false;
    }

    /// Latches once at speed, a later dip does not undo completion.
    fn update(&mut self, ctx: &mut TaskContext) {
        self.at_speed |= (ctx.flywheel.flywheel_velocity_rpm() - self.rpm).abs() <= self.tol_rpm;
    }

    fn end(&mut self, _ctx: &mut TaskContext) {}

    fn has_completed(&self) -> bool {
        self.at_speed
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
