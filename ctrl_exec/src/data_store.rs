//! # Data Store

use log::info;

use crate::behav_mgr::{self, BehavMgr};
use robot_if::ops::OperationState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of this cycle
    pub time_s: f64,

    // BehavMgr
    pub behav_mgr: BehavMgr,
    pub behav_mgr_input: behav_mgr::InputData,
    pub behav_mgr_output: OperationState,
    pub behav_mgr_status_rpt: behav_mgr::StatusReport,

    /// Set once a command script has run out of commands
    pub script_ended: bool,

    /// Number of consecutive cycles run with the script ended and nothing running
    pub num_idle_cycles: u64,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the command from the last cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_s = (cycle_frequency_hz as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.time_s = util::session::get_elapsed_seconds();

        self.behav_mgr_input.cmd = None;
        self.behav_mgr_input.time_s = self.time_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        if self.is_idle() {
            self.num_idle_cycles += 1;
        } else {
            self.num_idle_cycles = 0;
        }

        self.num_cycles += 1;
    }

    /// True once the script has ended and the behaviour manager has nothing left to run.
    pub fn is_idle(&self) -> bool {
        self.script_ended && !self.behav_mgr.is_active()
    }

    /// Log a one line summary of the behaviour state.
    pub fn log_status(&self) {
        let rpt = &self.behav_mgr_status_rpt;

        info!(
            "[{:.2} s] task: {} ({}), arm setpoint: {}",
            self.time_s,
            rpt.task_name.as_deref().unwrap_or("none"),
            rpt.task_state
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into()),
            rpt.arm_setpoint
                .map(|a| a.to_string())
                .unwrap_or_else(|| "none".into())
        );
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
