//! # Operation-state table
//!
//! Tasks never drive actuators directly. Instead they write the setpoints they want into an
//! [`OperationState`], which the mechanism layer reads once per cycle. An operation that nobody has
//! written has "no opinion", and the mechanism is free to do its own default behaviour (usually
//! hold position or stop).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Sentinel reported for an analog operation with no opinion, for consumers that need a raw number.
pub const NO_OPINION: f64 = std::f64::NAN;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Operations which take a continuous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnalogOperation {
    /// Shoulder joint absolute angle.
    ///
    /// Units: degrees
    ArmShoulderPositionSetpoint,

    /// Wrist joint angle relative to the arm.
    ///
    /// Units: degrees
    ArmWristPositionSetpoint,

    /// Shooter flywheel speed.
    ///
    /// Units: rpm
    FlywheelVelocitySetpoint,

    /// Intake roller power, -1 to 1.
    IntakePower,

    /// Feeder roller power, -1 to 1.
    FeederPower,
}

/// Operations which are either on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DigitalOperation {
    IntakeDeploy,
    ShooterFeed,
    AmpFlap,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The table of operation setpoints for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationState {
    analog: BTreeMap<AnalogOperation, f64>,
    digital: BTreeMap<DigitalOperation, bool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OperationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an analog operation. Writing a NaN value is the same as clearing it.
    pub fn set_analog(&mut self, op: AnalogOperation, value: f64) {
        if value.is_nan() {
            self.clear_analog(op);
        } else {
            self.analog.insert(op, value);
        }
    }

    pub fn set_digital(&mut self, op: DigitalOperation, value: bool) {
        self.digital.insert(op, value);
    }

    /// Return an analog operation to "no opinion".
    pub fn clear_analog(&mut self, op: AnalogOperation) {
        self.analog.remove(&op);
    }

    /// Return a digital operation to "no opinion".
    pub fn clear_digital(&mut self, op: DigitalOperation) {
        self.digital.remove(&op);
    }

    /// Clear every operation in the table.
    pub fn clear_all(&mut self) {
        self.analog.clear();
        self.digital.clear();
    }

    /// Get the value of an analog operation, or `None` if there is no opinion.
    pub fn analog(&self, op: AnalogOperation) -> Option<f64> {
        self.analog.get(&op).copied()
    }

    /// Get the value of an analog operation, or [`NO_OPINION`] if there is no opinion.
    pub fn analog_or_sentinel(&self, op: AnalogOperation) -> f64 {
        self.analog(op).unwrap_or(NO_OPINION)
    }

    /// Get the value of a digital operation, or `None` if there is no opinion.
    pub fn digital(&self, op: DigitalOperation) -> Option<bool> {
        self.digital.get(&op).copied()
    }

    /// Returns true if no operation has an opinion.
    pub fn is_empty(&self) -> bool {
        self.analog.is_empty() && self.digital.is_empty()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
