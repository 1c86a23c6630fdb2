//! Implementations for the BehavMgr state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use super::{macros, AutoRoutine, BehavMgrError, BehavMgrParams};
use crate::{
    arm_ctrl::{commanded_angles, ArmGraphTask, ArmModel, JointAngles},
    task::{Task, TaskContext, TaskScheduler, TaskState},
};
use robot_if::{cmd::BehavCmd, mech::MechSens, ops::OperationState};
use util::{module::State, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Behaviour manager module state
#[derive(Default)]
pub struct BehavMgr {
    pub(crate) params: BehavMgrParams,

    /// The arm model, built during init.
    model: Option<ArmModel>,

    scheduler: TaskScheduler,

    /// Operation table, persists between cycles so that holds left by finished tasks stay in
    /// place.
    ops: OperationState,
}

/// Parameter files needed to initialise the manager, relative to the params directory.
pub struct InitData {
    pub behav_mgr_params: &'static str,
    pub arm_ctrl_params: &'static str,
}

/// Input data to the behaviour manager.
#[derive(Debug, Default, Clone)]
pub struct InputData {
    /// New command for this cycle, if any.
    pub cmd: Option<BehavCmd>,

    /// Mechanism sensing for this cycle.
    pub sens: MechSens,

    /// Units: seconds
    pub time_s: f64,
}

/// Status report for BehavMgr processing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Name of the current (or last) task tree.
    pub task_name: Option<String>,

    pub task_state: Option<TaskState>,

    /// Number of cycles the current tree has run for.
    pub task_cycles: u64,

    /// True if a tree is running.
    pub active: bool,

    /// Arm setpoint in the operation table.
    pub arm_setpoint: Option<JointAngles>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BehavMgr {
    /// Create a manager from already loaded parameters and model.
    pub fn new(params: BehavMgrParams, model: ArmModel) -> Self {
        Self {
            params,
            model: Some(model),
            scheduler: TaskScheduler::new(),
            ops: OperationState::new(),
        }
    }

    /// True if a task tree is running.
    pub fn is_active(&self) -> bool {
        self.scheduler.is_active()
    }

    pub fn model(&self) -> Option<&ArmModel> {
        self.model.as_ref()
    }

    /// Build the task tree for a command, `None` for commands which do not start a tree.
    fn build_tree(&self, cmd: &BehavCmd) -> Result<Option<Box<dyn Task>>, BehavMgrError> {
        match cmd {
            BehavCmd::Routine { name } => AutoRoutine::from_name(name)
                .map(|r| Some(r.build(&self.params)))
                .ok_or_else(|| BehavMgrError::UnknownRoutine(name.clone())),
            BehavCmd::Macro { name } => macros::build_macro(name, &self.params)
                .map(Some)
                .ok_or_else(|| BehavMgrError::UnknownMacro(name.clone())),
            BehavCmd::ArmTo {
                theta1_deg,
                theta2_deg,
            } => {
                // Commands from the command line skip the JSON parser's check
                let goal = JointAngles::new(*theta1_deg, *theta2_deg);
                if !goal.is_finite() {
                    return Err(BehavMgrError::NonFiniteArmTarget(goal));
                }
                Ok(Some(Box::new(ArmGraphTask::new(goal))))
            }
            BehavCmd::Cancel => Ok(None),
        }
    }
}

impl State for BehavMgr {
    type InitData = InitData;
    type InitError = BehavMgrError;

    type InputData = InputData;
    type OutputData = OperationState;
    type StatusReport = StatusReport;
    type ProcError = BehavMgrError;

    /// Initialise the BehavMgr module.
    ///
    /// Loads the behaviour and arm parameters and builds the arm model.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = util::params::load(init_data.behav_mgr_params)
            .map_err(BehavMgrError::ParamLoadError)?;

        self.model = Some(
            ArmModel::load(init_data.arm_ctrl_params).map_err(BehavMgrError::ArmModelError)?,
        );

        Ok(())
    }

    /// Perform cyclic processing of the behaviour manager.
    ///
    /// An invalid command is reported as an error before anything is stepped, the running tree is
    /// left untouched.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let tree = match &input_data.cmd {
            Some(cmd) => {
                info!("BehavMgr command: {:?}", cmd);
                self.build_tree(cmd)?
            }
            None => None,
        };

        let model = self.model.as_ref().ok_or(BehavMgrError::NotInitialised)?;
        let mut ctx = TaskContext::new(&input_data.sens, &mut self.ops, input_data.time_s, model);

        match tree {
            Some(tree) => self.scheduler.start(tree, &mut ctx),
            None => {
                if let Some(BehavCmd::Cancel) = input_data.cmd {
                    if !self.scheduler.is_active() {
                        warn!("Cancel requested with nothing running");
                    }
                    self.scheduler.cancel(&mut ctx);
                }
            }
        }

        self.scheduler.step(&mut ctx);

        let report = StatusReport {
            task_name: self.scheduler.task_name().map(String::from),
            task_state: self.scheduler.task_name().map(|_| self.scheduler.state()),
            task_cycles: self.scheduler.num_cycles(),
            active: self.scheduler.is_active(),
            arm_setpoint: commanded_angles(&self.ops),
        };

        Ok((self.ops.clone(), report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::arm_ctrl::test_model;

    fn behav_mgr() -> BehavMgr {
        let params: BehavMgrParams =
            util::params::parse(include_str!("../../../params/behav_mgr.toml")).unwrap();
        BehavMgr::new(params, test_model())
    }

    fn input(cmd: Option<BehavCmd>, sens: &MechSens) -> InputData {
        InputData {
            cmd,
            sens: sens.clone(),
            time_s: 0.0,
        }
    }

    #[test]
    fn test_not_initialised() {
        let mut mgr = BehavMgr::default();

        match mgr.proc(&InputData::default()) {
            Err(BehavMgrError::NotInitialised) => (),
            r => panic!("Expected NotInitialised, got {:?}", r.map(|(_, s)| s)),
        }
    }

    #[test]
    fn test_unknown_names() {
        let mut mgr = behav_mgr();
        let sens = MechSens::with_arm(50.0, -50.0);

        let cmd = BehavCmd::Routine {
            name: "three_piece".into(),
        };
        assert!(matches!(
            mgr.proc(&input(Some(cmd), &sens)),
            Err(BehavMgrError::UnknownRoutine(_))
        ));

        let cmd = BehavCmd::Macro {
            name: "dance".into(),
        };
        assert!(matches!(
            mgr.proc(&input(Some(cmd), &sens)),
            Err(BehavMgrError::UnknownMacro(_))
        ));
    }

    #[test]
    fn test_non_finite_arm_to() {
        let mut mgr = behav_mgr();
        let sens = MechSens::with_arm(-25.0, -35.0);

        let cmd = BehavCmd::Macro {
            name: "intake".into(),
        };
        mgr.proc(&input(Some(cmd), &sens)).unwrap();
        assert!(mgr.is_active());

        let cmd = BehavCmd::ArmTo {
            theta1_deg: f64::NAN,
            theta2_deg: -20.0,
        };
        assert!(matches!(
            mgr.proc(&input(Some(cmd), &sens)),
            Err(BehavMgrError::NonFiniteArmTarget(_))
        ));

        // The running tree is untouched
        let (_, report) = mgr.proc(&input(None, &sens)).unwrap();
        assert_eq!(report.task_name.as_deref(), Some("intake"));
        assert_eq!(report.task_cycles, 2);
    }

    #[test]
    fn test_arm_to_and_cancel() {
        let mut mgr = behav_mgr();
        let sens = MechSens::with_arm(-25.0, -35.0);

        let cmd = BehavCmd::ArmTo {
            theta1_deg: 90.0,
            theta2_deg: -90.0,
        };
        let (ops, report) = mgr.proc(&input(Some(cmd), &sens)).unwrap();

        assert!(report.active);
        assert_eq!(report.task_state, Some(TaskState::Running));
        assert_eq!(report.arm_setpoint, Some(JointAngles::new(0.0, -80.0)));
        assert_eq!(commanded_angles(&ops), report.arm_setpoint);

        let (_, report) = mgr.proc(&input(None, &sens)).unwrap();
        assert_eq!(report.task_cycles, 2);

        let (_, report) = mgr
            .proc(&input(Some(BehavCmd::Cancel), &sens))
            .unwrap();
        assert!(!report.active);
        assert_eq!(report.task_state, Some(TaskState::Cancelled));
    }

    #[test]
    fn test_replace_running_tree() {
        let mut mgr = behav_mgr();
        let sens = MechSens::with_arm(-25.0, -35.0);

        let cmd = BehavCmd::Macro {
            name: "intake".into(),
        };
        mgr.proc(&input(Some(cmd), &sens)).unwrap();
        assert!(mgr.is_active());

        let cmd = BehavCmd::Macro {
            name: "stow".into(),
        };
        let (_, report) = mgr.proc(&input(Some(cmd), &sens)).unwrap();
        assert_eq!(report.task_name.as_deref(), Some("stow"));
        assert_eq!(report.task_cycles, 1);
    }

    /// Run the two piece routine against the mechanism simulation until it finishes.
    #[test]
    fn test_two_piece_closed_loop() {
        use crate::mech_sim::{ArmSim, MechSimParams};

        let sim_params: MechSimParams =
            util::params::parse(include_str!("../../../params/mech_sim.toml")).unwrap();
        let mut sim = ArmSim::new(sim_params);
        let mut mgr = behav_mgr();

        let dt_s = 0.02;
        let mut cmd = Some(BehavCmd::Routine {
            name: "two_piece".into(),
        });
        let mut report = StatusReport::default();

        for i in 0..5000 {
            let time_s = i as f64 * dt_s;
            let input = InputData {
                cmd: cmd.take(),
                sens: sim.sens().clone(),
                time_s,
            };

            let (ops, r) = mgr.proc(&input).unwrap();
            report = r;

            if !report.active {
                break;
            }

            sim.step(&ops, dt_s, time_s + dt_s);
        }

        assert_eq!(report.task_name.as_deref(), Some("two_piece"));
        assert_eq!(report.task_state, Some(TaskState::Completed));
        assert!(!sim.sens().has_game_piece);

        let stowed = mgr
            .model()
            .unwrap()
            .space()
            .angles(crate::arm_ctrl::ArmNode::Stowed)
            .unwrap();
        let sens = sim.sens();
        let actual = JointAngles::new(sens.theta1_deg, sens.theta2_deg);
        assert!(mgr.model().unwrap().within_tolerance(&actual, &stowed));
    }
}
