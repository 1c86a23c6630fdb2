//! # Arm configuration space
//!
//! The named arm configurations used by game tasks, and the graph of preferred transitions
//! between them. Every node is a legal configuration, and the straight line (in joint space) between
//! two linked nodes stays legal, so commanding one node after another along a graph path never
//! drives the arm through an illegal pose.
//!
//! Link weights are hand tuned costs. They encode how fast and safe a transition is judged to be,
//! not the distance moved.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{collections::HashMap, fmt::Display};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    graph::{GraphError, WeightedGraph, DEFAULT_LINK_WEIGHT},
    ArmCtrlError, ArmCtrlParams, ArmKinematics, JointAngles,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Node angles as `(node, theta1_deg, theta2_deg)`. The order is the node insertion order, which
/// decides ties when snapping to the nearest node.
static NODE_ANGLES: [(ArmNode, f64, f64); 9] = [
    (ArmNode::GroundPickup, -25.0, -35.0),
    (ArmNode::TransitLow, 0.0, -80.0),
    (ArmNode::Stowed, 50.0, -50.0),
    (ArmNode::Tucked, 92.0, -92.0),
    (ArmNode::TransitHigh, 80.0, -80.0),
    (ArmNode::SubwooferShot, 45.0, -20.0),
    (ArmNode::PodiumShot, 55.0, -30.0),
    (ArmNode::AmpOuttake, 105.0, -135.0),
    (ArmNode::SourcePickup, 75.0, -105.0),
];

/// Links as `(a, b, weight a to b, weight b to a)`.
static LINKS: [(ArmNode, ArmNode, f64, Option<f64>); 12] = [
    (ArmNode::GroundPickup, ArmNode::TransitLow, DEFAULT_LINK_WEIGHT, None),
    (ArmNode::TransitLow, ArmNode::Stowed, DEFAULT_LINK_WEIGHT, None),
    (ArmNode::Stowed, ArmNode::Tucked, DEFAULT_LINK_WEIGHT, None),
    (ArmNode::Stowed, ArmNode::SubwooferShot, DEFAULT_LINK_WEIGHT, None),
    (ArmNode::Stowed, ArmNode::PodiumShot, DEFAULT_LINK_WEIGHT, None),
    (ArmNode::SubwooferShot, ArmNode::PodiumShot, 0.5, None),
    (ArmNode::Stowed, ArmNode::TransitHigh, DEFAULT_LINK_WEIGHT, None),
    (ArmNode::TransitHigh, ArmNode::Tucked, DEFAULT_LINK_WEIGHT, None),
    (ArmNode::TransitHigh, ArmNode::AmpOuttake, DEFAULT_LINK_WEIGHT, None),
    (ArmNode::TransitHigh, ArmNode::SourcePickup, DEFAULT_LINK_WEIGHT, None),
    // Dropping straight from the shot to the low transit is allowed but discouraged, climbing back
    // up the same way even more so.
    (ArmNode::SubwooferShot, ArmNode::TransitLow, 2.5, Some(4.0)),
    (ArmNode::Tucked, ArmNode::AmpOuttake, 2.0, None),
];

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Named arm configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArmNode {
    /// Intake on the floor in front of the bumper.
    GroundPickup,
    TransitLow,
    /// Default driving position.
    Stowed,
    /// Fully folded, used under low obstacles.
    Tucked,
    TransitHigh,
    SubwooferShot,
    PodiumShot,
    AmpOuttake,
    SourcePickup,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The arm configuration graph. Immutable once built.
pub struct ArmConfigSpace {
    graph: WeightedGraph<ArmNode>,
    angles: HashMap<ArmNode, JointAngles>,

    shoulder_weight: f64,
    wrist_weight: f64,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the arm configuration space.
///
/// Every node is checked against the kinematic model, an illegal node is an error in the node table
/// or the geometry parameters.
pub fn build_config_space(
    params: &ArmCtrlParams,
    kinematics: &ArmKinematics,
) -> Result<ArmConfigSpace, ArmCtrlError> {
    let mut graph = WeightedGraph::new();
    let mut angles = HashMap::new();

    for &(node, theta1_deg, theta2_deg) in NODE_ANGLES.iter() {
        let node_angles = JointAngles::new(theta1_deg, theta2_deg);

        let cfg = kinematics.classify(node_angles);
        if !cfg.is_legal() {
            return Err(ArmCtrlError::IllegalNode(node, cfg.extension));
        }

        graph.add_node(node);
        angles.insert(node, node_angles);
    }

    for &(a, b, weight, weight_b_to_a) in LINKS.iter() {
        graph.connect_bidirectional(a, b, weight, weight_b_to_a);
    }

    debug!(
        "Arm configuration space built with {} nodes",
        graph.num_nodes()
    );

    Ok(ArmConfigSpace {
        graph,
        angles,
        shoulder_weight: params.shoulder_snap_weight,
        wrist_weight: params.wrist_snap_weight,
    })
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmNode {
    /// All nodes, in insertion order.
    pub fn all() -> impl Iterator<Item = ArmNode> {
        NODE_ANGLES.iter().map(|(n, _, _)| *n)
    }
}

impl Display for ArmNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ArmConfigSpace {
    pub fn graph(&self) -> &WeightedGraph<ArmNode> {
        &self.graph
    }

    /// Joint angles of a node.
    pub fn angles(&self, node: ArmNode) -> Result<JointAngles, ArmCtrlError> {
        self.angles
            .get(&node)
            .copied()
            .ok_or(ArmCtrlError::UnknownNode(node))
    }

    /// Weighted Manhattan distance between two configurations.
    pub fn snap_distance(&self, a: &JointAngles, b: &JointAngles) -> f64 {
        (a.theta1_deg - b.theta1_deg).abs() * self.shoulder_weight
            + (a.theta2_deg - b.theta2_deg).abs() * self.wrist_weight
    }

    /// Find the node nearest to the given angles.
    ///
    /// Nodes are searched in insertion order and only a strictly smaller distance replaces the
    /// current best, so ties always go to the earliest node. Non-finite angles have no nearest
    /// node.
    pub fn nearest_node(&self, angles: &JointAngles) -> Result<ArmNode, ArmCtrlError> {
        if !angles.is_finite() {
            return Err(ArmCtrlError::NonFiniteAngles(*angles));
        }

        let mut best: Option<(ArmNode, f64)> = None;

        for node in self.graph.nodes() {
            let dist = self.snap_distance(angles, &self.angles(*node)?);

            match best {
                Some((_, best_dist)) if dist >= best_dist => (),
                _ => best = Some((*node, dist)),
            }
        }

        best.map(|(n, _)| n).ok_or(ArmCtrlError::EmptyConfigSpace)
    }

    /// Optimal path of nodes between two nodes.
    pub fn optimal_path(&self, from: ArmNode, to: ArmNode) -> Result<Vec<ArmNode>, GraphError> {
        self.graph.optimal_path(from, to)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
