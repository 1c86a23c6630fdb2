//! # Operation tasks
//!
//! Leaves which drive a single operation to a fixed value. A `hold` task never completes by
//! itself and is expected to be ended by its parent (usually as one branch of a concurrent task),
//! a `timed` task completes after a fixed duration. Both return the operation to "no opinion" when
//! ended.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use robot_if::ops::{AnalogOperation, DigitalOperation};

use super::{Task, TaskContext};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct AnalogOperationTask {
    name: String,
    op: AnalogOperation,
    value: f64,
    timer: OpTimer,
}

pub struct DigitalOperationTask {
    name: String,
    op: DigitalOperation,
    value: bool,
    timer: OpTimer,
}

/// Optional duration tracking shared by the operation tasks.
struct OpTimer {
    duration_s: Option<f64>,
    start_time_s: f64,
    elapsed_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OpTimer {
    fn new(duration_s: Option<f64>) -> Self {
        Self {
            duration_s,
            start_time_s: 0.0,
            elapsed_s: 0.0,
        }
    }

    fn start(&mut self, time_s: f64) {
        self.start_time_s = time_s;
        self.elapsed_s = 0.0;
    }

    fn tick(&mut self, time_s: f64) {
        self.elapsed_s = time_s - self.start_time_s;
    }

    fn expired(&self) -> bool {
        match self.duration_s {
            Some(d) => self.elapsed_s >= d,
            None => false,
        }
    }
}

impl AnalogOperationTask {
    pub fn new(op: AnalogOperation, value: f64, duration_s: Option<f64>) -> Self {
        Self {
            name: format!("{:?}", op),
            op,
            value,
            timer: OpTimer::new(duration_s),
        }
    }

    /// Drive the operation until ended.
    pub fn hold(op: AnalogOperation, value: f64) -> Self {
        Self::new(op, value, None)
    }

    /// Drive the operation for `duration_s` seconds.
    pub fn timed(op: AnalogOperation, value: f64, duration_s: f64) -> Self {
        Self::new(op, value, Some(duration_s))
    }
}

impl Task for AnalogOperationTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext) {
        self.timer.start(ctx.time_s);
        ctx.ops.set_analog(self.op, self.value);
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        self.timer.tick(ctx.time_s);
        ctx.ops.set_analog(self.op, self.value);
    }

    fn end(&mut self, ctx: &mut TaskContext) {
        ctx.ops.clear_analog(self.op);
    }

    fn has_completed(&self) -> bool {
        self.timer.expired()
    }
}

impl DigitalOperationTask {
    pub fn new(op: DigitalOperation, value: bool, duration_s: Option<f64>) -> Self {
        Self {
            name: format!("{:?}", op),
            op,
            value,
            timer: OpTimer::new(duration_s),
        }
    }

    /// Drive the operation until ended.
    pub fn hold(op: DigitalOperation, value: bool) -> Self {
        Self::new(op, value, None)
    }

    /// Drive the operation for `duration_s` seconds.
    pub fn timed(op: DigitalOperation, value: bool, duration_s: f64) -> Self {
        Self::new(op, value, Some(duration_s))
    }
}

impl Task for DigitalOperationTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext) {
        self.timer.start(ctx.time_s);
        ctx.ops.set_digital(self.op, self.value);
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        self.timer.tick(ctx.time_s);
        ctx.ops.set_digital(self.op, self.value);
    }

    fn end(&mut self, ctx: &mut TaskContext) {
        ctx.ops.clear_digital(self.op);
    }

    fn has_completed(&self) -> bool {
        self.timer.expired()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
