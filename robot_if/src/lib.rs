//! # Robot interface crate.
//!
//! Provides the interfaces between the behaviour software and the rest of the robot: the operation
//! table written by tasks, the sensing traits read by tasks and the commands which start
//! behaviours.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Behaviour commands (routines, macros, direct arm moves)
pub mod cmd;

/// Mechanism sensing interfaces
pub mod mech;

/// Operation-state table
pub mod ops;
