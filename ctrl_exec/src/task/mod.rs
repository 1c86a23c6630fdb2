//! # Task module
//!
//! Cooperative, run to completion units of work. Every autonomous routine and every multi-step
//! macro is a tree of [`Task`]s, built from the leaf tasks in this module (and the arm tasks in
//! [`crate::arm_ctrl`]) using the composites:
//!
//! - [`SequentialTask`] - children run one after another.
//! - [`ConcurrentTask::all`] - children run together, finishes when all of them have finished.
//! - [`ConcurrentTask::any`] - children run together, finishes as soon as one of them finishes.
//! - [`DecisionTask`] - picks one child at begin time from the state of the robot.
//!
//! The root of a tree is driven by the [`TaskScheduler`], which calls `begin`, `update` and `end`
//! on it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod concurrent;
mod decision;
mod operation;
mod scheduler;
mod sensor;
mod sequential;
mod wait;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use serde::Serialize;

use robot_if::{
    mech::{ArmMech, FlywheelMech, GamePieceSens, MechSens, TargetSens},
    ops::OperationState,
};

use crate::arm_ctrl::{ArmModel, JointAngles};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use concurrent::{ConcurrentMode, ConcurrentTask};
pub use decision::DecisionTask;
pub use operation::{AnalogOperationTask, DigitalOperationTask};
pub use scheduler::TaskScheduler;
pub use sensor::{WaitForFlywheelTask, WaitForGamePieceTask, WaitForTargetTask};
pub use sequential::SequentialTask;
pub use wait::{WaitCyclesTask, WaitTask};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A unit of work run cooperatively by the scheduler.
///
/// The lifecycle is always `begin`, then zero or more `update`s, then exactly one `end`. A task is
/// finished when either [`Task::has_completed`] or [`Task::should_cancel`] returns true, after which
/// it receives its `end` and is never updated again.
pub trait Task {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Called once when the task becomes active.
    fn begin(&mut self, ctx: &mut TaskContext);

    /// Called once per cycle while the task is active.
    fn update(&mut self, ctx: &mut TaskContext);

    /// Called once when the task stops, whether it completed or was cancelled.
    ///
    /// Any operation the task drove must be returned to "no opinion" here, unless the task
    /// documents that it leaves a hold in place.
    fn end(&mut self, ctx: &mut TaskContext);

    /// True once the task has done its job.
    fn has_completed(&self) -> bool;

    /// True if the task cannot continue and should be stopped early.
    fn should_cancel(&self) -> bool {
        false
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Everything a task may read or write during one lifecycle call.
pub struct TaskContext<'a> {
    pub arm: &'a dyn ArmMech,
    pub game_piece: &'a dyn GamePieceSens,
    pub target: &'a dyn TargetSens,
    pub flywheel: &'a dyn FlywheelMech,

    /// Operation table the tasks write their outputs into.
    pub ops: &'a mut OperationState,

    /// Time since the start of the session.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Read-only arm model.
    pub model: &'a ArmModel,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Lifecycle state of a task, as tracked by whatever is driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<'a> TaskContext<'a> {
    /// Build a context which reads all sensing from one snapshot.
    pub fn new(
        sens: &'a MechSens,
        ops: &'a mut OperationState,
        time_s: f64,
        model: &'a ArmModel,
    ) -> Self {
        Self {
            arm: sens,
            game_piece: sens,
            target: sens,
            flywheel: sens,
            ops,
            time_s,
            model,
        }
    }

    /// Current arm joint angles.
    pub fn arm_angles(&self) -> JointAngles {
        JointAngles::new(self.arm.theta1_deg(), self.arm.theta2_deg())
    }
}

impl TaskState {
    /// State reached by a task which has just finished.
    ///
    /// Cancellation takes priority over completion.
    pub fn finished(task: &dyn Task) -> Option<Self> {
        if task.should_cancel() {
            Some(TaskState::Cancelled)
        } else if task.has_completed() {
            Some(TaskState::Completed)
        } else {
            None
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Cancelled)
    }
}

impl Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ------------------------------------------------------------------------------------------------
// TEST UTILITIES
// ------------------------------------------------------------------------------------------------

/// Scriptable task which records every lifecycle call it receives.
#[cfg(test)]
pub(crate) mod mock {
    use std::{cell::RefCell, rc::Rc};

    use robot_if::ops::AnalogOperation;

    use super::*;

    /// Lifecycle calls seen by a [`MockTask`].
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Calls {
        pub begins: usize,
        pub updates: usize,
        pub ends: usize,

        /// Number of updates seen when `end` was called.
        pub updates_at_end: Option<usize>,
    }

    pub type CallLog = Rc<RefCell<Calls>>;

    /// Completes (or cancels) after a given number of updates.
    pub struct MockTask {
        name: String,
        finish_after: Option<usize>,
        cancel: bool,
        output: Option<(AnalogOperation, f64)>,
        updates: usize,
        log: CallLog,
    }

    impl MockTask {
        /// Task which completes after `n` updates, `None` to never complete.
        pub fn completes_after(name: &str, n: Option<usize>) -> (Self, CallLog) {
            let log = CallLog::default();
            (
                Self {
                    name: name.into(),
                    finish_after: n,
                    cancel: false,
                    output: None,
                    updates: 0,
                    log: log.clone(),
                },
                log,
            )
        }

        /// Task which cancels after `n` updates.
        pub fn cancels_after(name: &str, n: usize) -> (Self, CallLog) {
            let (mut task, log) = Self::completes_after(name, Some(n));
            task.cancel = true;
            (task, log)
        }

        /// Write the given value to an analog operation on every update.
        pub fn with_output(mut self, op: AnalogOperation, value: f64) -> Self {
            self.output = Some((op, value));
            self
        }

        fn reached(&self) -> bool {
            matches!(self.finish_after, Some(n) if self.updates >= n)
        }
    }

    impl Task for MockTask {
        fn name(&self) -> &str {
            &self.name
        }

        fn begin(&mut self, _ctx: &mut TaskContext) {
            self.log.borrow_mut().begins += 1;
        }

        fn update(&mut self, ctx: &mut TaskContext) {
            self.updates += 1;
            self.log.borrow_mut().updates += 1;

            if let Some((op, value)) = self.output {
                ctx.ops.set_analog(op, value);
            }
        }

        fn end(&mut self, ctx: &mut TaskContext) {
            let mut log = self.log.borrow_mut();
            log.ends += 1;
            log.updates_at_end = Some(self.updates);

            if let Some((op, _)) = self.output {
                ctx.ops.clear_analog(op);
            }
        }

        fn has_completed(&self) -> bool {
            !self.cancel && self.reached()
        }

        fn should_cancel(&self) -> bool {
            self.cancel && self.reached()
        }
    }

    /// Sensing, operation table and model to build [`TaskContext`]s from in tests.
    pub struct Harness {
        pub sens: MechSens,
        pub ops: OperationState,
        pub time_s: f64,
        pub model: ArmModel,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                sens: MechSens::default(),
                ops: OperationState::new(),
                time_s: 0.0,
                model: crate::arm_ctrl::test_model(),
            }
        }

        pub fn ctx(&mut self) -> TaskContext<'_> {
            TaskContext::new(&self.sens, &mut self.ops, self.time_s, &self.model)
        }

        /// Run one full cycle of a task which has already begun, returns its finish state if it
        /// finished this cycle. The task is ended when it finishes.
        pub fn cycle(&mut self, task: &mut dyn Task) -> Option<TaskState> {
            let mut ctx = self.ctx();
            task.update(&mut ctx);
            let state = TaskState::finished(task);
            if state.is_some() {
                task.end(&mut ctx);
            }
            state
        }
    }
}
