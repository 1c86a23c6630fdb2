//! # Sequential task
//!
//! Runs its children one after the other, in list order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;

use super::{Task, TaskContext, TaskState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Runs children one at a time.
///
/// When a child completes it is ended and the next child begun. The next child gets its first
/// update on the following cycle. If a child cancels the remaining children are skipped and the
/// sequence reports itself cancelled.
pub struct SequentialTask {
    name: String,
    children: Vec<Box<dyn Task>>,

    /// Index of the active child, equal to the number of children once all have run.
    current: usize,

    /// True while `children[current]` has been begun but not ended.
    child_active: bool,

    state: TaskState,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SequentialTask {
    pub fn new(name: &str, children: Vec<Box<dyn Task>>) -> Self {
        Self {
            name: name.to_string(),
            children,
            current: 0,
            child_active: false,
            state: TaskState::NotStarted,
        }
    }

    fn begin_current(&mut self, ctx: &mut TaskContext) {
        match self.children.get_mut(self.current) {
            Some(child) => {
                debug!("{}: beginning child \"{}\"", self.name, child.name());
                child.begin(ctx);
                self.child_active = true;
            }
            None => self.state = TaskState::Completed,
        }
    }
}

impl Task for SequentialTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext) {
        self.current = 0;
        self.state = TaskState::Running;
        self.begin_current(ctx);
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        if self.state != TaskState::Running || !self.child_active {
            return;
        }

        let child = &mut self.children[self.current];
        child.update(ctx);

        if let Some(finished) = TaskState::finished(&**child) {
            child.end(ctx);
            self.child_active = false;

            debug!(
                "{}: child \"{}\" state change to: {}",
                self.name,
                child.name(),
                finished
            );

            match finished {
                TaskState::Cancelled => self.state = TaskState::Cancelled,
                _ => {
                    self.current += 1;
                    self.begin_current(ctx);
                }
            }
        }
    }

    fn end(&mut self, ctx: &mut TaskContext) {
        if self.child_active {
            self.children[self.current].end(ctx);
            self.child_active = false;
        }
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

    #[test]
    fn test_runs_in_order() {
        let mut h = Harness::new();

        let (a, a_log) = MockTask::completes_after("a", Some(2));
        let (b, b_log) = MockTask::completes_after("b", Some(1));
        let mut seq = SequentialTask::new("seq", vec![Box::new(a), Box::new(b)]);

        seq.begin(&mut h.ctx());
        assert_eq!(a_log.borrow().begins, 1);
        assert_eq!(b_log.borrow().begins, 0);

        assert_eq!(h.cycle(&mut seq), None);
        // a completes, b is begun but not yet updated
        assert_eq!(h.cycle(&mut seq), None);
        assert_eq!(a_log.borrow().ends, 1);
        assert_eq!(b_log.borrow().begins, 1);
        assert_eq!(b_log.borrow().updates, 0);

        assert_eq!(h.cycle(&mut seq), Some(TaskState::Completed));
        assert_eq!(b_log.borrow().updates, 1);
        assert_eq!(b_log.borrow().ends, 1);
        assert_eq!(a_log.borrow().updates, 2);
    }

    #[test]
    fn test_cancel_short_circuits() {
        let mut h = Harness::new();

        let (a, a_log) = MockTask::cancels_after("a", 1);
        let (b, b_log) = MockTask::completes_after("b", Some(1));
        let mut seq = SequentialTask::new("seq", vec![Box::new(a), Box::new(b)]);

        seq.begin(&mut h.ctx());
        assert_eq!(h.cycle(&mut seq), Some(TaskState::Cancelled));

        assert_eq!(a_log.borrow().ends, 1);
        assert_eq!(*b_log.borrow(), Default::default());
    }

    #[test]
    fn test_end_while_running() {
        let mut h = Harness::new();

        let (a, a_log) = MockTask::completes_after("a", None);
        let mut seq = SequentialTask::new("seq", vec![Box::new(a)]);

        seq.begin(&mut h.ctx());
        h.cycle(&mut seq);
        seq.end(&mut h.ctx());
        seq.end(&mut h.ctx());

        assert_eq!(a_log.borrow().ends, 1);
    }

    #[test]
    fn test_empty() {
        let mut h = Harness::new();
        let mut seq = SequentialTask::new("empty", Vec::new());

        seq.begin(&mut h.ctx());
        assert!(seq.has_completed());
    }
}
