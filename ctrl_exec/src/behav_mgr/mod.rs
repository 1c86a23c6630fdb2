//! # Behaviour manager module
//!
//! Turns behaviour commands into running task trees. The manager owns the [`TaskScheduler`] and the
//! operation table, and is stepped once per cycle through [`util::module::State`].
//!
//! [`TaskScheduler`]: crate::task::TaskScheduler

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod macros;
mod params;
mod routines;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use routines::AutoRoutine;
pub use state::*;

use crate::arm_ctrl::{ArmCtrlError, JointAngles};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during BehavMgr operation.
#[derive(Debug, thiserror::Error)]
pub enum BehavMgrError {
    #[error("Failed to load BehavMgrParams: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Failed to build the arm model: {0}")]
    ArmModelError(ArmCtrlError),

    #[error("BehavMgr has not been initialised")]
    NotInitialised,

    #[error("No routine called \"{0}\"")]
    UnknownRoutine(String),

    #[error("No macro called \"{0}\"")]
    UnknownMacro(String),

    #[error("Arm target {0} is not finite")]
    NonFiniteArmTarget(JointAngles),
}
