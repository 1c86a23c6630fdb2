//! # Autonomous routines
//!
//! Routines selectable for the autonomous period, built from the button macros.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{macros, BehavMgrParams};
use crate::task::{SequentialTask, Task, WaitTask};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoRoutine {
    DoNothing,

    /// Shoot the preloaded piece from the subwoofer and stow.
    ShootPreload,

    /// Shoot the preload, pick up the piece behind it and shoot that from the podium.
    TwoPiece,

    /// Score the preload in the amp.
    AmpScore,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl AutoRoutine {
    pub fn all() -> [AutoRoutine; 4] {
        [
            AutoRoutine::DoNothing,
            AutoRoutine::ShootPreload,
            AutoRoutine::TwoPiece,
            AutoRoutine::AmpScore,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AutoRoutine::DoNothing => "do_nothing",
            AutoRoutine::ShootPreload => "shoot_preload",
            AutoRoutine::TwoPiece => "two_piece",
            AutoRoutine::AmpScore => "amp_score",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|r| r.name() == name)
    }

    /// Build a fresh task tree for this routine.
    pub fn build(&self, params: &BehavMgrParams) -> Box<dyn Task> {
        let steps: Vec<Box<dyn Task>> = match self {
            AutoRoutine::DoNothing => Vec::new(),
            AutoRoutine::ShootPreload => vec![macros::shoot_subwoofer(params), macros::stow()],
            AutoRoutine::TwoPiece => vec![
                macros::shoot_subwoofer(params),
                Box::new(WaitTask::new(params.settle_time_s)),
                macros::intake(params),
                macros::shoot_podium(params),
                macros::stow(),
            ],
            AutoRoutine::AmpScore => vec![macros::score_amp(params)],
        };

        Box::new(SequentialTask::new(self.name(), steps))
    }
}

impl Display for AutoRoutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_names() {
        for routine in AutoRoutine::all().iter() {
            assert_eq!(AutoRoutine::from_name(routine.name()), Some(*routine));
        }

        assert_eq!(AutoRoutine::from_name("three_piece"), None);
    }

    #[test]
    fn test_build() {
        let params = BehavMgrParams::default();

        for routine in AutoRoutine::all().iter() {
            assert_eq!(routine.build(&params).name(), routine.name());
        }
    }
}
