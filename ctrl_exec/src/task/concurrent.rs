//! # Concurrent task
//!
//! Runs all children together. In [`ConcurrentMode::All`] the task finishes once every child has
//! finished, in [`ConcurrentMode::Any`] it finishes as soon as one child does.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;

use super::{Task, TaskContext, TaskState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ConcurrentTask {
    name: String,
    mode: ConcurrentMode,
    children: Vec<Child>,
    state: TaskState,
}

struct Child {
    task: Box<dyn Task>,
    state: TaskState,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrentMode {
    /// Finish once every child has finished. Cancelled if any child cancelled.
    All,

    /// Finish as soon as one child finishes, ending all the others. The result is that of the
    /// first child (in list order) to finish.
    Any,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ConcurrentTask {
    pub fn new(name: &str, mode: ConcurrentMode, children: Vec<Box<dyn Task>>) -> Self {
        Self {
            name: name.to_string(),
            mode,
            children: children
                .into_iter()
                .map(|task| Child {
                    task,
                    state: TaskState::NotStarted,
                })
                .collect(),
            state: TaskState::NotStarted,
        }
    }

    pub fn all(name: &str, children: Vec<Box<dyn Task>>) -> Self {
        Self::new(name, ConcurrentMode::All, children)
    }

    pub fn any(name: &str, children: Vec<Box<dyn Task>>) -> Self {
        Self::new(name, ConcurrentMode::Any, children)
    }

    /// End every child which is still running.
    fn end_running(&mut self, ctx: &mut TaskContext) {
        for child in self.children.iter_mut() {
            if child.state == TaskState::Running {
                child.task.end(ctx);
                child.state = TaskState::Cancelled;
            }
        }
    }
}

impl Task for ConcurrentTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext) {
        for child in self.children.iter_mut() {
            child.task.begin(ctx);
            child.state = TaskState::Running;
        }

        self.state = TaskState::Running;

        if self.children.is_empty() {
            self.state = TaskState::Completed;
        }
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        if self.state != TaskState::Running {
            return;
        }

        let mut first_finished: Option<TaskState> = None;

        for child in self.children.iter_mut() {
            if child.state != TaskState::Running {
                continue;
            }

            child.task.update(ctx);

            if let Some(finished) = TaskState::finished(&*child.task) {
                child.task.end(ctx);
                child.state = finished;

                debug!(
                    "{}: child \"{}\" state change to: {}",
                    self.name,
                    child.task.name(),
                    finished
                );

                first_finished.get_or_insert(finished);
            }
        }

        match self.mode {
            ConcurrentMode::All => {
                if self.children.iter().all(|c| c.state.is_finished()) {
                    self.state = if self
                        .children
                        .iter()
                        .any(|c| c.state == TaskState::Cancelled)
                    {
                        TaskState::Cancelled
                    } else {
                        TaskState::Completed
                    };
                }
            }
            ConcurrentMode::Any => {
                if let Some(finished) = first_finished {
                    self.end_running(ctx);
                    self.state = finished;
                }
            }
        }
    }

    fn end(&mut self, ctx: &mut TaskContext) {
        self.end_running(ctx);
    }

    fn has_completed(&self) -> bool {
        self.state == TaskState::Completed
    }

    fn should_cancel(&self) -> bool {
        self.state == TaskState::Cancelled
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::task::mock::{Harness, MockTask};
    use robot_if::ops::AnalogOperation;

    #[test]
    fn test_any_ends_every_child_once() {
        let mut h = Harness::new();

        let (c1, log1) = MockTask::completes_after("c1", None);
        let (c2, log2) = MockTask::completes_after("c2", Some(3));
        let (c3, log3) = MockTask::completes_after("c3", None);
        let mut any = ConcurrentTask::any("any", vec![Box::new(c1), Box::new(c2), Box::new(c3)]);

        any.begin(&mut h.ctx());
        for log in [&log1, &log2, &log3].iter() {
            assert_eq!(log.borrow().begins, 1);
        }

        assert_eq!(h.cycle(&mut any), None);
        assert_eq!(h.cycle(&mut any), None);
        assert_eq!(h.cycle(&mut any), Some(TaskState::Completed));

        // The scheduler would not update a finished task, but make sure a stray cycle changes
        // nothing either
        any.update(&mut h.ctx());
        any.end(&mut h.ctx());

        for log in [&log1, &log2, &log3].iter() {
            let log = log.borrow();
            assert_eq!(log.ends, 1);
            assert_eq!(log.updates, 3);
            assert_eq!(log.updates_at_end, Some(3));
        }
    }

    #[test]
    fn test_any_follows_first_finished() {
        let mut h = Harness::new();

        let (c1, _) = MockTask::cancels_after("c1", 2);
        let (c2, _) = MockTask::completes_after("c2", Some(2));
        let mut any = ConcurrentTask::any("any", vec![Box::new(c1), Box::new(c2)]);

        any.begin(&mut h.ctx());
        assert_eq!(h.cycle(&mut any), None);
        assert_eq!(h.cycle(&mut any), Some(TaskState::Cancelled));
    }

    #[test]
    fn test_all_waits_for_every_child() {
        let mut h = Harness::new();

        let (c1, log1) = MockTask::completes_after("c1", Some(1));
        let (c2, log2) = MockTask::completes_after("c2", Some(3));
        let mut all = ConcurrentTask::all("all", vec![Box::new(c1), Box::new(c2)]);

        all.begin(&mut h.ctx());

        assert_eq!(h.cycle(&mut all), None);
        // c1 is ended straight away and never updated again
        assert_eq!(log1.borrow().ends, 1);

        assert_eq!(h.cycle(&mut all), None);
        assert_eq!(h.cycle(&mut all), Some(TaskState::Completed));

        assert_eq!(log1.borrow().updates, 1);
        assert_eq!(log1.borrow().ends, 1);
        assert_eq!(log2.borrow().updates, 3);
        assert_eq!(log2.borrow().ends, 1);
    }

    #[test]
    fn test_all_with_cancelled_child() {
        let mut h = Harness::new();

        let (c1, _) = MockTask::cancels_after("c1", 1);
        let (c2, _) = MockTask::completes_after("c2", Some(2));
        let mut all = ConcurrentTask::all("all", vec![Box::new(c1), Box::new(c2)]);

        all.begin(&mut h.ctx());
        assert_eq!(h.cycle(&mut all), None);
        assert_eq!(h.cycle(&mut all), Some(TaskState::Cancelled));
    }

    #[test]
    fn test_last_write_wins() {
        let mut h = Harness::new();

        let (c1, _) = MockTask::completes_after("c1", None);
        let (c2, _) = MockTask::completes_after("c2", None);
        let mut all = ConcurrentTask::all(
            "all",
            vec![
                Box::new(c1.with_output(AnalogOperation::IntakePower, 0.5)),
                Box::new(c2.with_output(AnalogOperation::IntakePower, -0.5)),
            ],
        );

        all.begin(&mut h.ctx());
        h.cycle(&mut all);
        assert_eq!(h.ops.analog(AnalogOperation::IntakePower), Some(-0.5));

        all.end(&mut h.ctx());
        assert_eq!(h.ops.analog(AnalogOperation::IntakePower), None);
    }
}
