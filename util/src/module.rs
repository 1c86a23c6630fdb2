//! # Cyclic module interface
//!
//! `ctrl_exec` drives the behaviour manager through [`State`]: `init` once with the names of the
//! parameter files, then `proc` every control cycle with that cycle's command and mechanism
//! sensing. `proc` returns the operation table to apply and a status report for the session log.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A module stepped by the control loop.
pub trait State {
    /// Parameter file names, relative to the params directory.
    type InitData;
    type InitError;

    /// Everything the module needs for one cycle.
    type InputData;
    /// Demands produced for the mechanisms.
    type OutputData;
    type StatusReport;
    type ProcError;

    /// Load parameters and build any static models. Called once before the first cycle.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one control cycle.
    ///
    /// An error means the cycle's input was rejected, the module stays usable for the next cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
