//! # Control Executable Parameters
//!
//! This module provides parameters for the control executable's cycle loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtrlExecParams {
    /// Target period of one cycle
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Number of consecutive cycle overruns tolerated before the executable aborts
    pub max_consec_cycle_overruns: u64,

    /// Number of idle cycles to keep running for once a script has finished
    pub script_end_idle_cycles: u64,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_params() -> Result<(), util::params::LoadError> {
        let params: CtrlExecParams =
            util::params::parse(include_str!("../../params/ctrl_exec.toml"))?;

        assert_eq!(params.cycle_period_s, 0.02);
        assert!(params.max_consec_cycle_overruns > 0);

        Ok(())
    }
}
