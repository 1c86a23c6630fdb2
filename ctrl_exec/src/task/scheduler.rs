//! # Task scheduler
//!
//! Drives the root of one task tree. The scheduler owns at most one tree at a time, begins it,
//! updates it once per cycle and ends it exactly once when it finishes or is replaced.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};

use super::{Task, TaskContext, TaskState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct TaskScheduler {
    root: Option<Box<dyn Task>>,
    state: TaskState,

    /// Name of the last tree run, kept after it is dropped for status reporting.
    last_name: Option<String>,

    /// Number of cycles the current tree has been updated for.
    num_cycles: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TaskScheduler {
    pub fn new() -> Self {
        Self {
            root: None,
            state: TaskState::NotStarted,
            last_name: None,
            num_cycles: 0,
        }
    }

    /// Set the tree to run, ending the current one first if it is still active.
    ///
    /// The new tree is begun on the next call to [`TaskScheduler::step`].
    pub fn start(&mut self, task: Box<dyn Task>, ctx: &mut TaskContext) {
        self.cancel(ctx);

        info!("Scheduling task \"{}\"", task.name());

        self.last_name = Some(task.name().to_string());
        self.root = Some(task);
        self.state = TaskState::NotStarted;
        self.num_cycles = 0;
    }

    /// End the current tree immediately if there is one.
    pub fn cancel(&mut self, ctx: &mut TaskContext) {
        if let Some(mut root) = self.root.take() {
            if self.state == TaskState::Running {
                root.end(ctx);
            }
            info!(
                "Task \"{}\" cancelled after {} cycles",
                root.name(),
                self.num_cycles
            );
            self.state = TaskState::Cancelled;
        }
    }

    /// Advance the current tree by one cycle.
    ///
    /// A tree is begun and first updated in the same cycle. If it finishes during the cycle it is
    /// ended and dropped before returning. Returns the state of the tree after the step.
    pub fn step(&mut self, ctx: &mut TaskContext) -> TaskState {
        let root = match self.root.as_mut() {
            Some(r) => r,
            None => return self.state,
        };

        if self.state == TaskState::NotStarted {
            debug!("Beginning task \"{}\"", root.name());
            root.begin(ctx);
            self.state = TaskState::Running;
        }

        root.update(ctx);
        self.num_cycles += 1;

        if let Some(finished) = TaskState::finished(&**root) {
            root.end(ctx);
            info!(
                "Task \"{}\" state change to: {} after {} cycles",
                root.name(),
                finished,
                self.num_cycles
            );
            self.state = finished;
            self.root = None;
        }

        self.state
    }

    /// True if a tree is scheduled or running.
    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Name of the current tree, or of the last one run if it has finished.
    pub fn task_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
