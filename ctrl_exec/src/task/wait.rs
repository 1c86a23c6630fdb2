//! # Wait tasks
//!
//! Leaves which drive nothing and complete after a fixed time or number of cycles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{Task, TaskContext};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Completes once the given duration has elapsed since it began.
pub struct WaitTask {
    duration_s: f64,
    start_time_s: Option<f64>,
    elapsed_s: f64,
}

/// Completes after the given number of updates.
pub struct WaitCyclesTask {
    num_cycles: u64,
    count: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WaitTask {
    pub fn new(duration_s: f64) -> Self {
        Self {
            duration_s,
            start_time_s: None,
            elapsed_s: 0.0,
        }
    }
}

impl Task for WaitTask {
    fn name(&self) -> &str {
        "wait"
    }

    fn begin(&mut self, ctx: &mut TaskContext) {
        self.start_time_s = Some(ctx.time_s);
        self.elapsed_s = 0.0;
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        if let Some(start) = self.start_time_s {
            self.elapsed_s = ctx.time_s - start;
        }
    }

    fn end(&mut self, _ctx: &mut TaskContext) {}

    fn has_completed(&self) -> bool {
        self.start_time_s.is_some() && self.elapsed_s >= self.duration_s
    }
}

impl WaitCyclesTask {
    pub fn new(num_cycles: u64) -> Self {
        Self {
            num_cycles,
            count: 0,
        }
    }
}

impl Task for WaitCyclesTask {
    fn name(&self) -> &str {
        "wait_cycles"
    }

    fn begin(&mut self, _ctx: &mut TaskContext) {
        self.count = 0;
    }

    fn update(&mut self, _ctx: &mut TaskContext) {
        self.count += 1;
    }

    fn end(&mut self, _ctx: &mut TaskContext) {}

    fn has_completed(&self) -> bool {
        self.count >= self.num_cycles
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::task::{mock::Harness, TaskState};

    #[test]
    fn test_wait() {
        let mut h = Harness::new();
        h.time_s = 10.0;

        let mut wait = WaitTask::new(0.05);
        assert!(!wait.has_completed());

        wait.begin(&mut h.ctx());

        h.time_s = 10.02;
        assert_eq!(h.cycle(&mut wait), None);
        h.time_s = 10.04;
        assert_eq!(h.cycle(&mut wait), None);
        h.time_s = 10.06;
        assert_eq!(h.cycle(&mut wait), Some(TaskState::Completed));
    }

    #[test]
    fn test_wait_cycles() {
        let mut h = Harness::new();

        let mut wait = WaitCyclesTask::new(3);
        wait.begin(&mut h.ctx());

        assert_eq!(h.cycle(&mut wait), None);
        assert_eq!(h.cycle(&mut wait), None);
        assert_eq!(h.cycle(&mut wait), Some(TaskState::Completed));
    }
}
