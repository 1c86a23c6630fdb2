//! Parameters structure for BehavMgr

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Timings and setpoints used by routines and macros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehavMgrParams {
    // ---- SHOOTER ----
    /// Units: rpm
    pub subwoofer_shot_rpm: f64,

    /// Units: rpm
    pub podium_shot_rpm: f64,

    /// Flywheel speed tolerance before a shot is fed.
    ///
    /// Units: rpm
    pub flywheel_tol_rpm: f64,

    /// Maximum time the flywheel is spun for while waiting for the shot sequence to finish.
    ///
    /// Units: seconds
    pub flywheel_race_timeout_s: f64,

    /// Units: seconds
    pub shot_feed_time_s: f64,

    // ---- INTAKE ----
    /// Intake power when collecting, -1 to 1.
    pub intake_power: f64,

    /// Intake power when scoring in the amp, -1 to 1.
    pub outtake_power: f64,

    /// Units: seconds
    pub amp_outtake_time_s: f64,

    /// Cycles to wait for a game piece before giving up.
    pub intake_max_cycles: u64,

    // ---- TARGETING ----
    /// Consecutive cycles without a valid target before giving up.
    pub target_max_misses: u64,

    // ---- ROUTINES ----
    /// Pause between routine steps.
    ///
    /// Units: seconds
    pub settle_time_s: f64,
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_params() -> Result<(), util::params::LoadError> {
        let params: BehavMgrParams =
            util::params::parse(include_str!("../../../params/behav_mgr.toml"))?;

        assert!(params.podium_shot_rpm > params.subwoofer_shot_rpm);
        assert!(params.outtake_power < 0.0);
        assert_eq!(params.intake_max_cycles, 150);

        Ok(())
    }
}
