//! # Arm graph planner task
//!
//! Moves the arm to a goal configuration by following the optimal path through the configuration
//! space graph. The current and goal angles are snapped to their nearest nodes, and the arm is
//! commanded through the angles of each node on the path in turn. Only once the last node has been
//! reached is the goal itself commanded.
//!
//! ```text
//! Planning --(path found)--> Traversing --(last node reached)--> Arrived
//!     |
//!     +--(start and goal on the same node)--> Arrived
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use log::{debug, error, info, warn};
use serde::Serialize;

use super::{
    command_angles, graph::GraphError, ArmModel, ArmNode, JointAngles, ResolvedGoal,
};
use crate::task::{Task, TaskContext};
use util::raise_error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Task moving the arm along the configuration graph.
pub struct ArmGraphTask {
    name: String,

    target: ArmTarget,

    /// The goal as requested, known once the task has begun.
    goal: Option<JointAngles>,

    /// The goal which will actually be commanded once the path is complete, after legality
    /// correction.
    resolved_goal: Option<JointAngles>,

    path: Vec<ArmNode>,

    /// Index into `path` of the node the arm is moving towards.
    waypoint: usize,

    state: PlannerState,

    /// Set if planning failed, nothing is commanded after this.
    cancelled: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Where an arm task is going.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ArmTarget {
    Angles(JointAngles),

    /// The angles of a configuration node, looked up when the task begins.
    Node(ArmNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlannerState {
    Planning,
    Traversing,
    Arrived,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmGraphTask {
    pub fn new(goal: JointAngles) -> Self {
        Self::with_target(ArmTarget::Angles(goal))
    }

    /// Task moving to the angles of a configuration node.
    pub fn to_node(node: ArmNode) -> Self {
        Self::with_target(ArmTarget::Node(node))
    }

    pub fn with_target(target: ArmTarget) -> Self {
        Self {
            name: format!("arm_to({})", target),
            target,
            goal: None,
            resolved_goal: None,
            path: Vec::new(),
            waypoint: 0,
            state: PlannerState::Planning,
            cancelled: false,
        }
    }

    /// Replace the default log name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    /// The planned path, empty until the task has begun.
    pub fn path(&self) -> &[ArmNode] {
        &self.path
    }

    /// The node currently being moved towards.
    pub fn current_waypoint(&self) -> Option<ArmNode> {
        self.path.get(self.waypoint).copied()
    }

    /// Pick the angles to command at the end of the path.
    ///
    /// A correctable goal is replaced by its correction, a goal which cannot be corrected is
    /// replaced by the angles of the goal node.
    fn resolve_goal(
        &self,
        model: &ArmModel,
        goal: JointAngles,
        goal_node: ArmNode,
    ) -> Option<JointAngles> {
        match model.resolve_goal(goal) {
            ResolvedGoal::Legal(goal) => Some(goal),
            ResolvedGoal::Corrected(corrected, ext) => {
                info!(
                    "{}: goal {} is {}, corrected to {}",
                    self.name, goal, ext, corrected
                );
                Some(corrected)
            }
            ResolvedGoal::Stuck(ext) => {
                warn!(
                    "{}: goal {} is {} and cannot be corrected, using {} instead",
                    self.name, goal, ext, goal_node
                );
                model.space().angles(goal_node).ok()
            }
        }
    }

    /// Apply the result of the path search.
    fn apply_plan(&mut self, model: &ArmModel, plan: Result<Vec<ArmNode>, GraphError>) {
        match plan {
            Ok(path) => {
                info!(
                    "{}: planned path {}",
                    self.name,
                    path.iter()
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(" -> ")
                );

                self.state = if path.len() <= 1 {
                    PlannerState::Arrived
                } else {
                    PlannerState::Traversing
                };
                self.path = path;
                self.waypoint = 0;
            }
            Err(e @ GraphError::PathInvariant { .. }) => {
                if model.params().strict_invariants {
                    raise_error!("{}: {}", self.name, e);
                }
                self.cancel(&e);
            }
            Err(e) => self.cancel(&e),
        }
    }

    fn cancel(&mut self, reason: &dyn Display) {
        error!("{}: cancelling arm move, {}", self.name, reason);
        self.cancelled = true;
        self.path.clear();
    }

    /// Move the waypoint on past every node the arm is already at, switching to `Arrived` once the
    /// last one is reached.
    fn advance(&mut self, model: &ArmModel, actual: &JointAngles) {
        while let Some(node) = self.current_waypoint() {
            let reached = model
                .space()
                .angles(node)
                .map(|target| model.within_tolerance(actual, &target))
                .unwrap_or(false);

            if !reached {
                break;
            }

            if self.waypoint + 1 >= self.path.len() {
                info!("{}: state change to: {}", self.name, PlannerState::Arrived);
                self.state = PlannerState::Arrived;
                break;
            }

            self.waypoint += 1;
            debug!("{}: next waypoint {}", self.name, self.path[self.waypoint]);
        }
    }
}

impl Task for ArmGraphTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin(&mut self, ctx: &mut TaskContext) {
        self.state = PlannerState::Planning;
        self.cancelled = false;

        let model = ctx.model;
        let space = model.space();

        let goal = match self.target {
            ArmTarget::Angles(angles) => Ok(angles),
            ArmTarget::Node(node) => space.angles(node),
        };

        let (goal, start, goal_node) = match goal.and_then(|g| {
            Ok((
                g,
                space.nearest_node(&ctx.arm_angles())?,
                space.nearest_node(&g)?,
            ))
        }) {
            Ok(r) => r,
            Err(e) => {
                self.cancel(&e);
                return;
            }
        };

        debug!(
            "{}: snapped {} to {} and goal {} to {}",
            self.name,
            ctx.arm_angles(),
            start,
            goal,
            goal_node
        );

        self.goal = Some(goal);
        self.resolved_goal = self.resolve_goal(model, goal, goal_node);
        self.apply_plan(model, space.optimal_path(start, goal_node));
    }

    fn update(&mut self, ctx: &mut TaskContext) {
        if self.cancelled {
            return;
        }

        if self.state == PlannerState::Traversing {
            self.advance(ctx.model, &ctx.arm_angles());
        }

        match self.state {
            PlannerState::Traversing => {
                if let Some(Ok(target)) = self.current_waypoint().map(|n| ctx.model.space().angles(n))
                {
                    command_angles(ctx.ops, &target);
                }
            }
            PlannerState::Arrived => {
                if let Some(goal) = self.resolved_goal {
                    command_angles(ctx.ops, &goal);
                }
            }
            PlannerState::Planning => (),
        }
    }

    /// Command the goal, leaving it in place as a hold for whatever runs next.
    fn end(&mut self, ctx: &mut TaskContext) {
        if self.cancelled {
            return;
        }

        if let Some(goal) = self.resolved_goal {
            command_angles(ctx.ops, &goal);
        }
    }

    fn has_completed(&self) -> bool {
        self.state == PlannerState::Arrived
    }

    fn should_cancel(&self) -> bool {
        self.cancelled
    }
}

impl Display for ArmTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArmTarget::Angles(a) => write!(f, "{}", a),
            ArmTarget::Node(n) => write!(f, "{}", n),
        }
    }
}

impl Display for PlannerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
