//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for arm control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmCtrlParams {
    // ---- PLANNING ----
    /// Weight of shoulder angle difference when snapping to the nearest graph node.
    pub shoulder_snap_weight: f64,

    /// Weight of wrist angle difference when snapping to the nearest graph node.
    pub wrist_snap_weight: f64,

    /// Shoulder tolerance for a waypoint to be reached.
    ///
    /// Units: degrees
    pub shoulder_tol_deg: f64,

    /// Wrist tolerance for a waypoint to be reached.
    ///
    /// Units: degrees
    pub wrist_tol_deg: f64,

    /// Raise an unrecoverable error on a broken path invariant instead of cancelling the move.
    pub strict_invariants: bool,

    // ---- GEOMETRY ----
    pub geometry: ArmGeometry,
}

/// Physical layout of the arm and the envelope it must stay within.
///
/// Positions are in the robot frame, x forward and z up, origin on the ground under the robot
/// centre. End effector points are `[along, perp]` offsets from the wrist joint, where `along`
/// points out of the intake side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmGeometry {
    /// Position of the shoulder pivot, `[x, z]`.
    ///
    /// Units: inches
    pub shoulder_pivot_in: [f64; 2],

    /// Distance from the shoulder pivot to the wrist joint.
    ///
    /// Units: inches
    pub arm_length_in: f64,

    pub intake_top_in: [f64; 2],
    pub intake_bottom_in: [f64; 2],
    pub shooter_top_in: [f64; 2],
    pub shooter_bottom_in: [f64; 2],

    /// Half of the chassis length, the footprint is `|x| <= frame_half_length_in`.
    ///
    /// Units: inches
    pub frame_half_length_in: f64,

    /// How far past the frame perimeter the arm may reach, front and back.
    ///
    /// Units: inches
    pub max_extension_in: f64,

    /// Maximum height of any part of the robot.
    ///
    /// Units: inches
    pub ceiling_in: f64,

    /// Height above the ceiling beyond which a configuration is too far out to correct.
    ///
    /// Units: inches
    pub ceiling_margin_in: f64,

    /// Height of the robot body, points below this inside the footprint hit the robot.
    ///
    /// Units: inches
    pub robot_height_in: f64,

    /// Units: inches
    pub ground_height_in: f64,

    /// Tolerance used in every boundary comparison.
    ///
    /// Units: inches
    pub boundary_tol_in: f64,
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_params() -> Result<(), util::params::LoadError> {
        let params: ArmCtrlParams =
            util::params::parse(include_str!("../../../params/arm_ctrl.toml"))?;

        assert_eq!(params.geometry.shoulder_pivot_in, [-6.0, 19.0]);
        assert_eq!(params.geometry.arm_length_in, 24.0);
        assert!(params.shoulder_snap_weight > params.wrist_snap_weight);
        assert!(!params.strict_invariants);

        Ok(())
    }
}
