//! # Decision task
//!
//! Chooses one branch when it begins, based on the state of the robot at that moment, and runs
//! it to the end.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;

use super::{Task, TaskContext};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Closure choosing the branch to run.
type Chooser = Box<dyn FnOnce(&TaskContext) -> Box<dyn Task>>;

pub struct DecisionTask {
    name: String,
    chooser: Option<Chooser>,
    branch: Option<Box<dyn Task>>,
    branch_active: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DecisionTask {
    pub fn new<F>(name: &str, chooser: F) -> Self
    where
        F: FnOnce(&TaskContext) -> Box<dyn Task> + 'static,
    {
        Self {
            name: name.to_string(),
            chooser: Some(Box::new(chooser)),
            branch: None,
            branch_active: false,
        }
    }

    /// Run `if_true` if `pred` holds at begin time, otherwise `if_false`.
    pub fn cond<P>(name: &str, pred: P, if_true: Box<dyn Task>, if_false: Box<dyn Task>) -> Self
    where
        P: FnOnce(&TaskContext) -> bool + 'static,
    {
        Self::new(name, move |ctx| if pred(ctx) { if_true } else { if_false })
    }

    /// Name of the chosen branch, once begun.
    pub fn chosen(&self) -> Option<&str> {
        self.branch.as_ref().map(|b| b.name())
    }
}

impl Task for DecisionTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext) {
        if let Some(chooser) = self.chooser.take() {
            let mut branch = chooser(&*ctx);
            debug!("{}: chose branch \"{}\"", self.name, branch.name());

            branch.begin(ctx);
            self.branch = Some(branch);
            self.branch_active = true;
        }
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        if let Some(branch) = self.branch.as_mut() {
            if self.branch_active {
                branch.update(ctx);
            }
        }
    }

    fn end(&mut self, ctx: &mut TaskContext) {
        if let Some(branch) = self.branch.as_mut() {
            if self.branch_active {
                branch.end(ctx);
                self.branch_active = false;
            }
        }
    }

    fn has_completed(&self) -> bool {
        self.branch.as_ref().map_or(false, |b| b.has_completed())
    }

    fn should_cancel(&self) -> bool {
        self.branch.as_ref().map_or(false, |b| b.should_cancel())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
