//! # Mechanism simulation
//!
//! A simple stand-in for the robot's mechanisms, used when running the executable without
//! hardware. Reads the operation table each cycle and produces the sensing the tasks see.
//!
//! - The arm joints slew towards their setpoints at fixed rates, and hold when there is no
//!   setpoint.
//! - The intake acquires a game piece once it has been run for long enough, and loses it once the
//!   shooter feed or a reversed intake has been run for long enough.
//! - The flywheel follows its setpoint with a first order lag.
//! - The target becomes visible at a fixed session time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::{Deserialize, Serialize};

use robot_if::{
    mech::MechSens,
    ops::{AnalogOperation, DigitalOperation, OperationState},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the mechanism simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechSimParams {
    /// Units: degrees/second
    pub shoulder_rate_dps: f64,

    /// Units: degrees/second
    pub wrist_rate_dps: f64,

    pub start_theta1_deg: f64,
    pub start_theta2_deg: f64,

    /// Start with a game piece loaded.
    pub preloaded: bool,

    /// Units: seconds
    pub intake_acquire_time_s: f64,

    /// Units: seconds
    pub outtake_release_time_s: f64,

    /// Units: seconds
    pub flywheel_time_const_s: f64,

    /// Session time the target becomes visible at, negative for never.
    ///
    /// Units: seconds
    pub target_visible_after_s: f64,

    pub target_offset_deg: f64,
}

pub struct ArmSim {
    params: MechSimParams,
    sens: MechSens,

    /// Time the intake has been run inwards without a piece.
    intake_run_s: f64,

    /// Time a piece has been pushed outwards.
    outtake_run_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmSim {
    pub fn new(params: MechSimParams) -> Self {
        let mut sens = MechSens::with_arm(params.start_theta1_deg, params.start_theta2_deg);
        sens.has_game_piece = params.preloaded;

        Self {
            params,
            sens,
            intake_run_s: 0.0,
            outtake_run_s: 0.0,
        }
    }

    /// Sensing at the end of the last step.
    pub fn sens(&self) -> &MechSens {
        &self.sens
    }

    /// Advance the simulation by `dt_s` seconds, ending at session time `time_s`.
    pub fn step(&mut self, ops: &OperationState, dt_s: f64, time_s: f64) {
        // ---- ARM ----

        if let Some(sp) = ops.analog(AnalogOperation::ArmShoulderPositionSetpoint) {
            self.sens.theta1_deg =
                slew(self.sens.theta1_deg, sp, self.params.shoulder_rate_dps * dt_s);
        }
        if let Some(sp) = ops.analog(AnalogOperation::ArmWristPositionSetpoint) {
            self.sens.theta2_deg = slew(self.sens.theta2_deg, sp, self.params.wrist_rate_dps * dt_s);
        }

        // ---- GAME PIECE ----

        let intake_power = ops.analog(AnalogOperation::IntakePower).unwrap_or(0.0);
        let feeding = ops.digital(DigitalOperation::ShooterFeed).unwrap_or(false);

        if self.sens.has_game_piece {
            self.intake_run_s = 0.0;

            if feeding || intake_power < 0.0 {
                self.outtake_run_s += dt_s;
            } else {
                self.outtake_run_s = 0.0;
            }

            if self.outtake_run_s >= self.params.outtake_release_time_s {
                debug!("Sim: game piece released at {:.2} s", time_s);
                self.sens.has_game_piece = false;
                self.outtake_run_s = 0.0;
            }
        } else {
            self.outtake_run_s = 0.0;

            if intake_power > 0.0 {
                self.intake_run_s += dt_s;
            } else {
                self.intake_run_s = 0.0;
            }

            if self.intake_run_s >= self.params.intake_acquire_time_s {
                debug!("Sim: game piece acquired at {:.2} s", time_s);
                self.sens.has_game_piece = true;
                self.intake_run_s = 0.0;
            }
        }

        // ---- FLYWHEEL ----

        let flywheel_sp = ops
            .analog(AnalogOperation::FlywheelVelocitySetpoint)
            .unwrap_or(0.0);
        let alpha = util::maths::clamp(&(dt_s / self.params.flywheel_time_const_s), &0.0, &1.0);
        self.sens.flywheel_velocity_rpm += (flywheel_sp - self.sens.flywheel_velocity_rpm) * alpha;

        // ---- TARGET ----

        self.sens.target_offset_deg = if self.params.target_visible_after_s >= 0.0
            && time_s >= self.params.target_visible_after_s
        {
            Some(self.params.target_offset_deg)
        } else {
            None
        };
    }
}

/// Move `current` towards `target` by no more than `max_step`.
fn slew(current: f64, target: f64, max_step: f64) -> f64 {
    current + util::maths::clamp(&(target - current), &-max_step, &max_step)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
