//! # Control library.
//!
//! This library allows the executable, the benchmarks and other crates in the workspace to access
//! the items defined inside the control crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control - configuration graph, kinematic legality and the arm motion tasks
pub mod arm_ctrl;

/// Behaviour manager - turns behaviour commands into running task trees
pub mod behav_mgr;

/// Global data store for the executable
pub mod data_store;

/// Mechanism simulation - stands in for the robot hardware
pub mod mech_sim;

/// Executable parameters
pub mod params;

/// Task framework - the task trait, composites, leaves and the scheduler
pub mod task;
