//! # Mechanism sensing interfaces
//!
//! Tasks read the state of the robot through these traits so that they do not depend on whether
//! the data comes from real hardware or from the simulation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Two-joint arm (shoulder and wrist).
pub trait ArmMech {
    /// Shoulder absolute angle from the forward horizontal, degrees.
    fn theta1_deg(&self) -> f64;

    /// Wrist angle relative to the arm, degrees.
    fn theta2_deg(&self) -> f64;
}

/// Beam-break style game piece sensor.
pub trait GamePieceSens {
    fn has_game_piece(&self) -> bool;
}

/// Scoring target sensor.
pub trait TargetSens {
    /// Horizontal offset to the target in degrees, or `None` if no valid target is seen this cycle.
    fn target_offset_deg(&self) -> Option<f64>;
}

/// Shooter flywheel.
pub trait FlywheelMech {
    fn flywheel_velocity_rpm(&self) -> f64;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of all mechanism sensor data for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MechSens {
    /// Shoulder absolute angle, degrees.
    pub theta1_deg: f64,

    /// Wrist relative angle, degrees.
    pub theta2_deg: f64,

    pub has_game_piece: bool,

    /// Offset to the target if one is visible, degrees.
    pub target_offset_deg: Option<f64>,

    pub flywheel_velocity_rpm: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MechSens {
    /// Snapshot with the arm at the given angles and every other sensor idle.
    pub fn with_arm(theta1_deg: f64, theta2_deg: f64) -> Self {
        Self {
            theta1_deg,
            theta2_deg,
            ..Default::default()
        }
    }
}

impl ArmMech for MechSens {
    fn theta1_deg(&self) -> f64 {
        self.theta1_deg
    }

    fn theta2_deg(&self) -> f64 {
        self.theta2_deg
    }
}

impl GamePieceSens for MechSens {
    fn has_game_piece(&self) -> bool {
        self.has_game_piece
    }
}

impl TargetSens for MechSens {
    fn target_offset_deg(&self) -> Option<f64> {
        self.target_offset_deg
    }
}

impl FlywheelMech for MechSens {
    fn flywheel_velocity_rpm(&self) -> f64 {
        self.flywheel_velocity_rpm
    }
}
