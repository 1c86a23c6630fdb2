//! # Button macros
//!
//! Task trees bound to single driver buttons. Each builder returns a fresh tree, trees are never
//! reused between presses.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use robot_if::ops::{AnalogOperation, DigitalOperation};

use super::BehavMgrParams;
use crate::{
    arm_ctrl::{ArmGraphTask, ArmNode},
    task::{
        AnalogOperationTask, ConcurrentTask, DecisionTask, DigitalOperationTask, SequentialTask,
        Task, WaitForFlywheelTask, WaitForGamePieceTask, WaitForTargetTask, WaitTask,
    },
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Names accepted by [`build_macro`].
pub const MACRO_NAMES: [&str; 6] = [
    "intake",
    "shoot_subwoofer",
    "shoot_podium",
    "score_amp",
    "stow",
    "source_intake",
];

/// Feeder power while feeding a shot.
const FEED_POWER: f64 = 1.0;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the macro with the given name.
pub fn build_macro(name: &str, params: &BehavMgrParams) -> Option<Box<dyn Task>> {
    let task = match name {
        "intake" => intake(params),
        "shoot_subwoofer" => shoot_subwoofer(params),
        "shoot_podium" => shoot_podium(params),
        "score_amp" => score_amp(params),
        "stow" => stow(),
        "source_intake" => source_intake(params),
        _ => return None,
    };

    Some(task)
}

/// Lower the arm and run the intake until a game piece is collected, then stow.
///
/// Cancels with the arm down if no piece arrives within the cycle bound.
pub fn intake(params: &BehavMgrParams) -> Box<dyn Task> {
    Box::new(SequentialTask::new(
        "intake",
        vec![
            Box::new(ArmGraphTask::to_node(ArmNode::GroundPickup)),
            Box::new(ConcurrentTask::any(
                "run_intake",
                vec![
                    Box::new(DigitalOperationTask::hold(
                        DigitalOperation::IntakeDeploy,
                        true,
                    )),
                    Box::new(AnalogOperationTask::hold(
                        AnalogOperation::IntakePower,
                        params.intake_power,
                    )),
                    Box::new(WaitForGamePieceTask::new(true, params.intake_max_cycles)),
                ],
            )),
            stow(),
        ],
    ))
}

/// Collect a game piece from the human player station, then stow.
pub fn source_intake(params: &BehavMgrParams) -> Box<dyn Task> {
    Box::new(SequentialTask::new(
        "source_intake",
        vec![
            Box::new(ArmGraphTask::to_node(ArmNode::SourcePickup)),
            Box::new(ConcurrentTask::any(
                "run_source_intake",
                vec![
                    Box::new(AnalogOperationTask::hold(
                        AnalogOperation::IntakePower,
                        params.intake_power,
                    )),
                    Box::new(WaitForGamePieceTask::new(true, params.intake_max_cycles)),
                ],
            )),
            stow(),
        ],
    ))
}

/// Shoot from against the subwoofer, if there is anything to shoot.
pub fn shoot_subwoofer(params: &BehavMgrParams) -> Box<dyn Task> {
    Box::new(DecisionTask::cond(
        "shoot_subwoofer",
        |ctx| ctx.game_piece.has_game_piece(),
        Box::new(SequentialTask::new(
            "subwoofer_shot",
            vec![
                Box::new(ArmGraphTask::to_node(ArmNode::SubwooferShot)),
                spin_and_shoot(params, params.subwoofer_shot_rpm),
            ],
        )),
        nothing_to_shoot(),
    ))
}

/// Shoot from the podium once the target has been found.
pub fn shoot_podium(params: &BehavMgrParams) -> Box<dyn Task> {
    Box::new(DecisionTask::cond(
        "shoot_podium",
        |ctx| ctx.game_piece.has_game_piece(),
        Box::new(SequentialTask::new(
            "podium_shot",
            vec![
                Box::new(ArmGraphTask::to_node(ArmNode::PodiumShot)),
                Box::new(WaitForTargetTask::new(params.target_max_misses)),
                spin_and_shoot(params, params.podium_shot_rpm),
            ],
        )),
        nothing_to_shoot(),
    ))
}

/// Score in the amp and stow.
pub fn score_amp(params: &BehavMgrParams) -> Box<dyn Task> {
    Box::new(SequentialTask::new(
        "score_amp",
        vec![
            Box::new(ArmGraphTask::to_node(ArmNode::AmpOuttake)),
            Box::new(ConcurrentTask::all(
                "amp_outtake",
                vec![
                    Box::new(DigitalOperationTask::timed(
                        DigitalOperation::AmpFlap,
                        true,
                        params.amp_outtake_time_s,
                    )),
                    Box::new(AnalogOperationTask::timed(
                        AnalogOperation::IntakePower,
                        params.outtake_power,
                        params.amp_outtake_time_s,
                    )),
                ],
            )),
            stow(),
        ],
    ))
}

pub fn stow() -> Box<dyn Task> {
    Box::new(ArmGraphTask::to_node(ArmNode::Stowed).with_name("stow"))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Spin the flywheel up and feed the piece into it.
///
/// The flywheel is spun for at most `flywheel_race_timeout_s`, or until the shot has been fed,
/// whichever comes first.
fn spin_and_shoot(params: &BehavMgrParams, rpm: f64) -> Box<dyn Task> {
    Box::new(ConcurrentTask::any(
        "spin_and_shoot",
        vec![
            Box::new(AnalogOperationTask::hold(
                AnalogOperation::FlywheelVelocitySetpoint,
                rpm,
            )),
            Box::new(WaitTask::new(params.flywheel_race_timeout_s)),
            Box::new(SequentialTask::new(
                "feed_shot",
                vec![
                    Box::new(WaitForFlywheelTask::new(rpm, params.flywheel_tol_rpm)),
                    Box::new(ConcurrentTask::all(
                        "feed",
                        vec![
                            Box::new(DigitalOperationTask::timed(
                                DigitalOperation::ShooterFeed,
                                true,
                                params.shot_feed_time_s,
                            )),
                            Box::new(AnalogOperationTask::timed(
                                AnalogOperation::FeederPower,
                                FEED_POWER,
                                params.shot_feed_time_s,
                            )),
                        ],
                    )),
                ],
            )),
        ],
    ))
}

fn nothing_to_shoot() -> Box<dyn Task> {
    Box::new(SequentialTask::new("nothing_to_shoot", Vec::new()))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::task::{mock::Harness, TaskState};

    fn params() -> BehavMgrParams {
        util::params::parse(include_str!("../../../params/behav_mgr.toml")).unwrap()
    }

    #[test]
    fn test_build_all() {
        let params = params();

        for name in MACRO_NAMES.iter() {
            let task = build_macro(name, &params).unwrap();
            assert_eq!(task.name(), *name);
        }

        assert!(build_macro("dance", &params).is_none());
    }

    #[test]
    fn test_nothing_to_shoot() {
        let mut h = Harness::new();
        h.sens.has_game_piece = false;

        let mut task = shoot_subwoofer(&params());
        task.begin(&mut h.ctx());

        assert_eq!(h.cycle(task.as_mut()), Some(TaskState::Completed));
        assert!(h.ops.is_empty());
    }

    #[test]
    fn test_spin_and_shoot() {
        let params = params();
        let mut h = Harness::new();

        let mut task = spin_and_shoot(&params, params.subwoofer_shot_rpm);
        task.begin(&mut h.ctx());
        assert_eq!(
            h.ops.analog(AnalogOperation::FlywheelVelocitySetpoint),
            Some(params.subwoofer_shot_rpm)
        );

        // Flywheel below speed, nothing is fed
        h.time_s = 0.02;
        assert_eq!(h.cycle(task.as_mut()), None);
        assert_eq!(h.ops.digital(DigitalOperation::ShooterFeed), None);

        // At speed, the feed begins straight away
        h.sens.flywheel_velocity_rpm = params.subwoofer_shot_rpm;
        h.time_s = 0.04;
        assert_eq!(h.cycle(task.as_mut()), None);
        assert_eq!(h.ops.digital(DigitalOperation::ShooterFeed), Some(true));

        h.time_s = 0.04 + params.shot_feed_time_s;
        assert_eq!(h.cycle(task.as_mut()), Some(TaskState::Completed));

        // Everything the shot drove is released
        assert!(h.ops.is_empty());
    }

    #[test]
    fn test_flywheel_timeout() {
        let params = params();
        let mut h = Harness::new();

        let mut task = spin_and_shoot(&params, params.podium_shot_rpm);
        task.begin(&mut h.ctx());

        h.time_s = params.flywheel_race_timeout_s;
        assert_eq!(h.cycle(task.as_mut()), Some(TaskState::Completed));
        assert_eq!(
            h.ops.analog(AnalogOperation::FlywheelVelocitySetpoint),
            None
        );
    }
}
