//! # Arm control module
//!
//! Planning and legality checking for the two joint (shoulder and wrist) arm.
//!
//! - [`graph`] - generic weighted graph with cached shortest paths.
//! - [`config_space`] - the named arm configurations and the links between them.
//! - [`kinematics`] - forward kinematics, legality classification and wrist corrections.
//! - [`planner`] - the task which moves the arm along a graph path.
//! - [`position`] - the task which moves the arm directly to a nearby configuration.
//!
//! The graph, configuration space and kinematics are bundled into an [`ArmModel`], which is built
//! once at startup and only read afterwards.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod config_space;
pub mod graph;
pub mod kinematics;
mod params;
pub mod planner;
pub mod position;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;

// Internal
pub use config_space::{build_config_space, ArmConfigSpace, ArmNode};
pub use kinematics::{ArmConfig, ArmKinematics, ExtensionType, JointAngles};
pub use params::*;
pub use planner::{ArmGraphTask, ArmTarget, PlannerState};
pub use position::ArmPositionTask;

use robot_if::ops::{AnalogOperation, OperationState};
use util::maths::ang_dist_deg;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The arm planning model: parameters, kinematics and configuration space.
pub struct ArmModel {
    params: ArmCtrlParams,
    kinematics: ArmKinematics,
    space: ArmConfigSpace,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur in arm control.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Failed to load ArmCtrlParams: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Configuration node {0} is not legal ({1})")]
    IllegalNode(ArmNode, ExtensionType),

    #[error("Configuration node {0} is not in the configuration space")]
    UnknownNode(ArmNode),

    #[error("The configuration space has no nodes")]
    EmptyConfigSpace,

    #[error("Arm angles {0} are not finite")]
    NonFiniteAngles(JointAngles),
}

/// Outcome of checking a requested arm configuration before commanding it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedGoal {
    /// The configuration is legal as requested.
    Legal(JointAngles),

    /// The configuration was illegal, the wrist has been corrected.
    Corrected(JointAngles, ExtensionType),

    /// The configuration is illegal and cannot be corrected.
    Stuck(ExtensionType),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl ArmModel {
    /// Build the model from a set of parameters.
    pub fn new(params: ArmCtrlParams) -> Result<Self, ArmCtrlError> {
        let kinematics = ArmKinematics::new(params.geometry.clone());
        let space = build_config_space(&params, &kinematics)?;

        Ok(Self {
            params,
            kinematics,
            space,
        })
    }

    /// Load the parameters at the given path (relative to the params directory) and build the
    /// model.
    pub fn load(params_path: &str) -> Result<Self, ArmCtrlError> {
        let params: ArmCtrlParams =
            util::params::load(params_path).map_err(ArmCtrlError::ParamLoadError)?;

        let model = Self::new(params)?;

        info!(
            "ArmModel built with {} configuration nodes",
            model.space.graph().num_nodes()
        );

        Ok(model)
    }

    pub fn params(&self) -> &ArmCtrlParams {
        &self.params
    }

    pub fn kinematics(&self) -> &ArmKinematics {
        &self.kinematics
    }

    pub fn space(&self) -> &ArmConfigSpace {
        &self.space
    }

    /// Returns true if both joints of `actual` are within tolerance of `target`.
    pub fn within_tolerance(&self, actual: &JointAngles, target: &JointAngles) -> bool {
        (actual.theta1_deg - target.theta1_deg).abs() <= self.params.shoulder_tol_deg
            && ang_dist_deg(actual.theta2_deg, target.theta2_deg).abs() <= self.params.wrist_tol_deg
    }

    /// Check a requested configuration, applying the wrist correction if there is one.
    pub fn resolve_goal(&self, goal: JointAngles) -> ResolvedGoal {
        let cfg = self.kinematics.classify(goal);

        if cfg.is_legal() {
            ResolvedGoal::Legal(goal)
        } else if cfg.is_corrected() {
            ResolvedGoal::Corrected(cfg.corrected, cfg.extension)
        } else {
            ResolvedGoal::Stuck(cfg.extension)
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Write arm joint setpoints into the operation table.
pub fn command_angles(ops: &mut OperationState, angles: &JointAngles) {
    ops.set_analog(AnalogOperation::ArmShoulderPositionSetpoint, angles.theta1_deg);
    ops.set_analog(AnalogOperation::ArmWristPositionSetpoint, angles.theta2_deg);
}

/// Read the arm joint setpoints back from the operation table, if both are set.
pub fn commanded_angles(ops: &OperationState) -> Option<JointAngles> {
    Some(JointAngles::new(
        ops.analog(AnalogOperation::ArmShoulderPositionSetpoint)?,
        ops.analog(AnalogOperation::ArmWristPositionSetpoint)?,
    ))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

/// Model built from the checked in parameter file, shared by the tests in this crate.
#[cfg(test)]
pub(crate) fn test_model() -> ArmModel {
    let params: ArmCtrlParams =
        util::params::parse(include_str!("../../../params/arm_ctrl.toml")).unwrap();
    ArmModel::new(params).unwrap()
}
