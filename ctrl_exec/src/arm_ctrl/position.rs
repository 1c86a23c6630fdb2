//! # Arm position task
//!
//! Commands a configuration directly, without going through the graph. Only safe for small moves
//! between nearby configurations, such as trimming the wrist angle at a shot position.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};

use super::{command_angles, JointAngles, ResolvedGoal};
use crate::task::{Task, TaskContext};
use robot_if::ops::AnalogOperation;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ArmPositionTask {
    name: String,
    goal: JointAngles,
    setpoint: Option<JointAngles>,
    arrived: bool,
    cancelled: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmPositionTask {
    pub fn new(goal: JointAngles) -> Self {
        Self {
            name: format!("arm_position({})", goal),
            goal,
            setpoint: None,
            arrived: false,
            cancelled: false,
        }
    }

    /// The angles actually commanded, after legality correction.
    pub fn setpoint(&self) -> Option<JointAngles> {
        self.setpoint
    }
}

impl Task for ArmPositionTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext) {
        self.arrived = false;
        self.cancelled = false;

        self.setpoint = match ctx.model.resolve_goal(self.goal) {
            ResolvedGoal::Legal(angles) => Some(angles),
            ResolvedGoal::Corrected(angles, ext) => {
                info!("{}: goal is {}, corrected to {}", self.name, ext, angles);
                Some(angles)
            }
            ResolvedGoal::Stuck(ext) => {
                warn!("{}: goal is {} and cannot be corrected", self.name, ext);
                self.cancelled = true;
                None
            }
        };
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        if let Some(setpoint) = self.setpoint {
            command_angles(ctx.ops, &setpoint);
            self.arrived = ctx.model.within_tolerance(&ctx.arm_angles(), &setpoint);
        }
    }

    /// Unlike the graph planner this leaves no hold, both joints go back to no opinion.
    fn end(&mut self, ctx: &mut TaskContext) {
        ctx.ops.clear_analog(AnalogOperation::ArmShoulderPositionSetpoint);
        ctx.ops.clear_analog(AnalogOperation::ArmWristPositionSetpoint);
    }

    fn has_completed(&self) -> bool {
        self.arrived
    }

    fn should_cancel(&self) -> bool {
        self.cancelled
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
