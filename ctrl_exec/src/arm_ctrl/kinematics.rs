//! # Arm kinematics and legality
//!
//! Forward kinematics of the two joint arm, and the classification of a configuration against the
//! robot's envelope. The envelope is made of the frame extension limits front and back, the height
//! ceiling, the robot body and the ground.
//!
//! Some violations can be fixed by moving only the wrist. In these cases the wrist angle which puts
//! the offending end effector point exactly on the boundary is solved in closed form, and returned
//! as the corrected configuration. A solution which breaks another boundary is not a correction,
//! the configuration is then stuck. The shoulder is never corrected.
//!
//! Checks are performed in a fixed order and the first match is returned:
//!
//! 1. `Back` - a point is behind the rear extension limit.
//! 2. `TopCrazy` - a point is above the ceiling by more than the ceiling margin.
//! 3. `Robot` - a point is inside the robot body.
//! 4. `Ground` - a point is below the ground.
//! 5. `Top*` - a point is above the ceiling.
//! 6. `Front*` - a point is past the front extension limit.
//! 7. `None` - the configuration is legal.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use super::ArmGeometry;
use util::maths::wrap_deg_180;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pair of arm joint angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointAngles {
    /// Shoulder absolute angle from the forward horizontal.
    ///
    /// Units: degrees
    pub theta1_deg: f64,

    /// Wrist angle relative to the arm.
    ///
    /// Units: degrees
    pub theta2_deg: f64,
}

/// Absolute positions of the four end effector extremities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectorPoints {
    pub intake_top: Point2<f64>,
    pub intake_bottom: Point2<f64>,
    pub shooter_top: Point2<f64>,
    pub shooter_bottom: Point2<f64>,
}

/// A classified arm configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmConfig {
    /// The angles which were classified.
    pub angles: JointAngles,

    /// Absolute position of the wrist joint.
    pub wrist: Point2<f64>,

    /// Absolute positions of the end effector extremities.
    pub points: EffectorPoints,

    pub extension: ExtensionType,

    /// The configuration is illegal and cannot be corrected.
    pub stuck: bool,

    /// The configuration puts the end effector into the robot body.
    pub hit: bool,

    /// The configuration to command instead. Equal to `angles` unless a correction was found.
    pub corrected: JointAngles,
}

/// Arm kinematics model.
#[derive(Debug, Clone)]
pub struct ArmKinematics {
    geom: ArmGeometry,

    intake_top: TipPoint,
    intake_bottom: TipPoint,
    shooter_top: TipPoint,
    shooter_bottom: TipPoint,
}

/// End effector point in polar form about the wrist, used by the inverse kinematics.
#[derive(Debug, Clone, Copy)]
struct TipPoint {
    radius_in: f64,

    /// Angle of the point from the wrist's along axis.
    offset_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Classification of an arm configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtensionType {
    /// Legal
    None,
    Back,
    TopCrazy,
    Robot,
    Ground,
    TopBoth,
    TopIntakeSide,
    TopShooterSide,
    TopNone,
    FrontBoth,
    FrontIntakeTop,
    FrontIntakeBottom,
    FrontNone,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointAngles {
    pub fn new(theta1_deg: f64, theta2_deg: f64) -> Self {
        Self {
            theta1_deg,
            theta2_deg,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.theta1_deg.is_finite() && self.theta2_deg.is_finite()
    }
}

impl Display for JointAngles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.theta1_deg, self.theta2_deg)
    }
}

impl EffectorPoints {
    pub fn all(&self) -> [Point2<f64>; 4] {
        [
            self.intake_top,
            self.intake_bottom,
            self.shooter_top,
            self.shooter_bottom,
        ]
    }
}

impl ArmConfig {
    /// True if the configuration can be commanded as is.
    pub fn is_legal(&self) -> bool {
        self.extension == ExtensionType::None
    }

    /// True if the configuration was illegal but a wrist correction was found.
    pub fn is_corrected(&self) -> bool {
        self.extension.is_correctable()
    }
}

impl ExtensionType {
    /// True for the classifications which have no correction.
    pub fn is_stuck(&self) -> bool {
        !matches!(self, ExtensionType::None) && !self.is_correctable()
    }

    /// True for the classifications which have a wrist correction.
    pub fn is_correctable(&self) -> bool {
        matches!(
            self,
            ExtensionType::TopIntakeSide
                | ExtensionType::TopShooterSide
                | ExtensionType::FrontIntakeTop
                | ExtensionType::FrontIntakeBottom
        )
    }
}

impl Display for ExtensionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TipPoint {
    fn from_offset(offset_in: [f64; 2]) -> Self {
        Self {
            radius_in: offset_in[0].hypot(offset_in[1]),
            offset_rad: offset_in[1].atan2(offset_in[0]),
        }
    }
}

impl ArmKinematics {
    pub fn new(geom: ArmGeometry) -> Self {
        Self {
            intake_top: TipPoint::from_offset(geom.intake_top_in),
            intake_bottom: TipPoint::from_offset(geom.intake_bottom_in),
            shooter_top: TipPoint::from_offset(geom.shooter_top_in),
            shooter_bottom: TipPoint::from_offset(geom.shooter_bottom_in),
            geom,
        }
    }

    pub fn geometry(&self) -> &ArmGeometry {
        &self.geom
    }

    /// x position of the front extension limit.
    pub fn front_limit_in(&self) -> f64 {
        self.geom.frame_half_length_in + self.geom.max_extension_in
    }

    /// x position of the rear extension limit.
    pub fn back_limit_in(&self) -> f64 {
        -self.front_limit_in()
    }

    /// Absolute position of the wrist joint for the given shoulder angle.
    pub fn wrist_position(&self, theta1_deg: f64) -> Point2<f64> {
        let [x, z] = self.geom.shoulder_pivot_in;

        Point2::new(x, z)
            + Rotation2::new(theta1_deg.to_radians()) * Vector2::new(self.geom.arm_length_in, 0.0)
    }

    /// Absolute positions of the end effector points for a wrist at `wrist` with absolute angle
    /// `phi_deg` (shoulder plus wrist angle).
    pub fn effector_points(&self, wrist: &Point2<f64>, phi_deg: f64) -> EffectorPoints {
        let rot = Rotation2::new(phi_deg.to_radians());
        let place = |offset: [f64; 2]| *wrist + rot * Vector2::new(offset[0], offset[1]);

        EffectorPoints {
            intake_top: place(self.geom.intake_top_in),
            intake_bottom: place(self.geom.intake_bottom_in),
            shooter_top: place(self.geom.shooter_top_in),
            shooter_bottom: place(self.geom.shooter_bottom_in),
        }
    }

    /// Classify a configuration.
    ///
    /// This is a pure function of the angles and the geometry.
    pub fn classify(&self, angles: JointAngles) -> ArmConfig {
        let wrist = self.wrist_position(angles.theta1_deg);
        let points = self.effector_points(&wrist, angles.theta1_deg + angles.theta2_deg);

        let (extension, corrected_theta2_deg) =
            self.extension(angles.theta1_deg, &wrist, &points, true);

        let corrected = match corrected_theta2_deg {
            Some(theta2_deg) => JointAngles::new(angles.theta1_deg, theta2_deg),
            None => angles,
        };

        ArmConfig {
            angles,
            wrist,
            points,
            extension,
            stuck: extension.is_stuck(),
            hit: extension == ExtensionType::Robot,
            corrected,
        }
    }

    /// Find the extension type, and the corrected relative wrist angle if there is one.
    ///
    /// With `solve` false no corrections are searched for, correctable classes are returned
    /// without an angle.
    fn extension(
        &self,
        theta1_deg: f64,
        wrist: &Point2<f64>,
        points: &EffectorPoints,
        solve: bool,
    ) -> (ExtensionType, Option<f64>) {
        let g = &self.geom;
        let tol = g.boundary_tol_in;
        let all = points.all();

        // ---- STRUCTURAL ----

        if all.iter().any(|p| p.x < self.back_limit_in() - tol) {
            return (ExtensionType::Back, None);
        }

        if all
            .iter()
            .any(|p| p.y > g.ceiling_in + g.ceiling_margin_in + tol)
        {
            return (ExtensionType::TopCrazy, None);
        }

        if all
            .iter()
            .any(|p| p.y < g.robot_height_in - tol && p.x.abs() <= g.frame_half_length_in + tol)
        {
            return (ExtensionType::Robot, None);
        }

        if all.iter().any(|p| p.y < g.ground_height_in - tol) {
            return (ExtensionType::Ground, None);
        }

        // ---- CEILING ----

        let above = |p: &Point2<f64>| p.y > g.ceiling_in + tol;

        let intake_over: Vec<(Point2<f64>, TipPoint)> =
            vec![
                (points.intake_top, self.intake_top),
                (points.intake_bottom, self.intake_bottom),
            ]
            .into_iter()
            .filter(|(p, _)| above(p))
            .collect();
        let shooter_over: Vec<(Point2<f64>, TipPoint)> = vec![
            (points.shooter_top, self.shooter_top),
            (points.shooter_bottom, self.shooter_bottom),
        ]
        .into_iter()
        .filter(|(p, _)| above(p))
        .collect();

        if !intake_over.is_empty() && !shooter_over.is_empty() {
            return (ExtensionType::TopBoth, None);
        }

        if !intake_over.is_empty() || !shooter_over.is_empty() {
            let (side, violators, side_points) = if !intake_over.is_empty() {
                (
                    ExtensionType::TopIntakeSide,
                    intake_over,
                    [
                        (points.intake_top, self.intake_top),
                        (points.intake_bottom, self.intake_bottom),
                    ],
                )
            } else {
                (
                    ExtensionType::TopShooterSide,
                    shooter_over,
                    [
                        (points.shooter_top, self.shooter_top),
                        (points.shooter_bottom, self.shooter_bottom),
                    ],
                )
            };

            // Highest violating point, the first one listed on a tie
            let mut highest = violators[0];
            for v in violators.iter().skip(1) {
                if v.0.y > highest.0.y {
                    highest = *v;
                }
            }

            if highest.0.x <= wrist.x + tol {
                return (ExtensionType::TopNone, None);
            }

            if !solve {
                return (side, None);
            }

            // Put the highest point on the ceiling. If that lifts the other point on the same side
            // over, put the other point on the ceiling instead.
            let candidates = if side_points[0].0.y >= side_points[1].0.y {
                [side_points[0].1, side_points[1].1]
            } else {
                [side_points[1].1, side_points[0].1]
            };

            for tip in candidates.iter() {
                // z = wrist_z + r sin(phi + offset) = ceiling
                let s = (g.ceiling_in - wrist.y) / tip.radius_in;
                if s.abs() > 1.0 {
                    continue;
                }

                if let Some(theta2_deg) = self.clear_correction(theta1_deg, s.asin() - tip.offset_rad)
                {
                    return (side, Some(theta2_deg));
                }
            }

            return (ExtensionType::TopNone, None);
        }

        // ---- FRONT ----

        let front = self.front_limit_in();
        let past_front = |p: &Point2<f64>| p.x > front + tol;

        let intake_top_over = past_front(&points.intake_top);
        let intake_bottom_over = past_front(&points.intake_bottom);
        let shooter_over = past_front(&points.shooter_top) || past_front(&points.shooter_bottom);

        if (intake_top_over && intake_bottom_over)
            || (shooter_over && (intake_top_over || intake_bottom_over))
        {
            return (ExtensionType::FrontBoth, None);
        }

        // x = wrist_x + r cos(phi + offset) = front
        if intake_top_over {
            if points.intake_top.y < wrist.y - tol {
                return (ExtensionType::FrontNone, None);
            }

            if !solve {
                return (ExtensionType::FrontIntakeTop, None);
            }

            let c = (front - wrist.x) / self.intake_top.radius_in;
            if c.abs() > 1.0 {
                return (ExtensionType::FrontNone, None);
            }

            return match self.clear_correction(theta1_deg, c.acos() - self.intake_top.offset_rad) {
                Some(theta2_deg) => (ExtensionType::FrontIntakeTop, Some(theta2_deg)),
                None => (ExtensionType::FrontNone, None),
            };
        }

        if intake_bottom_over {
            if points.intake_bottom.y > wrist.y + tol {
                return (ExtensionType::FrontNone, None);
            }

            if !solve {
                return (ExtensionType::FrontIntakeBottom, None);
            }

            let c = (front - wrist.x) / self.intake_bottom.radius_in;
            if c.abs() > 1.0 {
                return (ExtensionType::FrontNone, None);
            }

            return match self.clear_correction(theta1_deg, -c.acos() - self.intake_bottom.offset_rad)
            {
                Some(theta2_deg) => (ExtensionType::FrontIntakeBottom, Some(theta2_deg)),
                None => (ExtensionType::FrontNone, None),
            };
        }

        if shooter_over {
            return (ExtensionType::FrontNone, None);
        }

        (ExtensionType::None, None)
    }

    /// Relative wrist angle for the absolute wrist angle `phi_rad`, if the configuration it gives
    /// is legal.
    ///
    /// The check repeats the arithmetic of [`ArmKinematics::classify`] on the wrapped angle, so a
    /// returned correction always classifies as legal.
    fn clear_correction(&self, theta1_deg: f64, phi_rad: f64) -> Option<f64> {
        let theta2_deg = wrap_deg_180(phi_rad.to_degrees() - theta1_deg);

        let wrist = self.wrist_position(theta1_deg);
        let points = self.effector_points(&wrist, theta1_deg + theta2_deg);

        match self.extension(theta1_deg, &wrist, &points, false) {
            (ExtensionType::None, _) => Some(theta2_deg),
            _ => None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::arm_ctrl::ArmCtrlParams;

    fn kinematics() -> ArmKinematics {
        let params: ArmCtrlParams =
            util::params::parse(include_str!("../../../params/arm_ctrl.toml")).unwrap();
        ArmKinematics::new(params.geometry)
    }

    fn assert_point(p: Point2<f64>, x: f64, z: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - z).abs() < 1e-9,
            "expected ({}, {}), got ({}, {})",
            x,
            z,
            p.x,
            p.y
        );
    }

    /// Check a correction and that the corrected configuration is legal.
    fn assert_corrected(kin: &ArmKinematics, angles: JointAngles, ext: ExtensionType, theta2: f64) {
        let cfg = kin.classify(angles);

        assert_eq!(cfg.extension, ext);
        assert!(!cfg.stuck);
        assert!(cfg.is_corrected());
        assert_eq!(cfg.corrected.theta1_deg, angles.theta1_deg);
        assert!(
            (cfg.corrected.theta2_deg - theta2).abs() < 1e-6,
            "expected corrected wrist {}, got {}",
            theta2,
            cfg.corrected.theta2_deg
        );

        assert_eq!(kin.classify(cfg.corrected).extension, ExtensionType::None);
    }

    #[test]
    fn test_forward_kinematics() {
        let kin = kinematics();

        let cfg = kin.classify(JointAngles::new(0.0, 0.0));
        assert_point(cfg.wrist, 18.0, 19.0);
        assert_point(cfg.points.intake_top, 26.0, 22.0);
        assert_point(cfg.points.intake_bottom, 26.0, 16.0);
        assert_point(cfg.points.shooter_top, 12.0, 22.0);
        assert_point(cfg.points.shooter_bottom, 12.0, 16.0);

        // Arm vertical, end effector pointing up
        let cfg = kin.classify(JointAngles::new(90.0, 0.0));
        assert_point(cfg.wrist, -6.0, 43.0);
        assert_point(cfg.points.intake_top, -9.0, 51.0);
        assert_point(cfg.points.shooter_bottom, -3.0, 37.0);

        assert_eq!(kin.front_limit_in(), 26.0);
        assert_eq!(kin.back_limit_in(), -26.0);
    }

    #[test]
    fn test_stuck_classes() {
        let kin = kinematics();

        let cases = [
            ((170.0, 0.0), ExtensionType::Back),
            ((90.0, 0.0), ExtensionType::TopCrazy),
            ((-45.0, 80.0), ExtensionType::Robot),
            ((-40.0, -60.0), ExtensionType::Robot),
            ((-32.0, -10.0), ExtensionType::Ground),
            ((90.0, -126.0), ExtensionType::TopNone),
            ((0.0, 22.0), ExtensionType::FrontNone),
        ];

        for ((t1, t2), ext) in cases.iter() {
            let angles = JointAngles::new(*t1, *t2);
            let cfg = kin.classify(angles);

            assert_eq!(cfg.extension, *ext, "classifying {}", angles);
            assert!(cfg.stuck);
            assert_eq!(cfg.hit, *ext == ExtensionType::Robot);
            assert_eq!(cfg.corrected, angles);
        }
    }

    #[test]
    fn test_legal() {
        let kin = kinematics();

        let cfg = kin.classify(JointAngles::new(50.0, -50.0));
        assert!(cfg.is_legal());
        assert!(!cfg.stuck);
        assert!(!cfg.hit);
        assert_eq!(cfg.corrected, cfg.angles);
    }

    #[test]
    fn test_top_corrections() {
        let kin = kinematics();

        assert_corrected(
            &kin,
            JointAngles::new(64.0, 0.0),
            ExtensionType::TopIntakeSide,
            -24.156385244852125,
        );
        assert_corrected(
            &kin,
            JointAngles::new(70.0, -148.0),
            ExtensionType::TopShooterSide,
            -149.4647432318867,
        );
    }

    #[test]
    fn test_front_corrections() {
        let kin = kinematics();

        assert_corrected(
            &kin,
            JointAngles::new(10.0, -20.0),
            ExtensionType::FrontIntakeTop,
            -18.79438520107355,
        );
        assert_corrected(
            &kin,
            JointAngles::new(-10.0, 20.0),
            ExtensionType::FrontIntakeBottom,
            18.79438520107355,
        );
    }

    #[test]
    fn test_both_sides() {
        // These need a longer arm than the real one to reach
        let mut geom = kinematics().geometry().clone();
        geom.arm_length_in = 30.0;
        let kin = ArmKinematics::new(geom);

        let cfg = kin.classify(JointAngles::new(62.0, -62.0));
        assert_eq!(cfg.extension, ExtensionType::TopBoth);
        assert!(cfg.stuck);

        let cfg = kin.classify(JointAngles::new(-20.0, 15.0));
        assert_eq!(cfg.extension, ExtensionType::FrontBoth);
        assert!(cfg.stuck);
    }

    #[test]
    fn test_classify_pure() {
        let kin = kinematics();

        for t1 in (-60..=180).step_by(7) {
            for t2 in (-180..=180).step_by(11) {
                let angles = JointAngles::new(t1 as f64, t2 as f64);
                let first = kin.classify(angles);
                let second = kin.classify(angles);

                assert_eq!(first, second);

                // Only the wrist is ever corrected, and always into range
                assert_eq!(first.corrected.theta1_deg, angles.theta1_deg);
                if first.is_corrected() {
                    assert!(first.corrected.theta2_deg > -180.0);
                    assert!(first.corrected.theta2_deg <= 180.0);
                }

                assert_eq!(first.stuck, first.extension.is_stuck());
            }
        }
    }

    #[test]
    fn test_corrections_are_legal() {
        let kin = kinematics();
        let mut num_corrected = 0;

        for t1 in -60..=180 {
            for t2 in -180..=180 {
                let angles = JointAngles::new(t1 as f64, t2 as f64);
                let cfg = kin.classify(angles);

                if cfg.is_corrected() {
                    num_corrected += 1;
                    let recheck = kin.classify(cfg.corrected);
                    assert!(
                        recheck.is_legal(),
                        "{} ({}) corrected to {} which is {}",
                        angles,
                        cfg.extension,
                        cfg.corrected,
                        recheck.extension
                    );
                } else {
                    assert_eq!(cfg.corrected, angles);
                }
            }
        }

        assert!(num_corrected > 0);
    }

    #[test]
    fn test_top_correction_clears_both_points() {
        let kin = kinematics();

        // Putting the lower intake point on the ceiling would lift the upper one over it
        let cfg = kin.classify(JointAngles::new(62.0, 29.0));
        if cfg.is_corrected() {
            let corrected = kin.classify(cfg.corrected);
            assert!(corrected.is_legal());

            let ceiling = kin.geometry().ceiling_in + kin.geometry().boundary_tol_in;
            assert!(corrected.points.intake_top.y <= ceiling);
            assert!(corrected.points.intake_bottom.y <= ceiling);
        } else {
            assert_eq!(cfg.extension, ExtensionType::TopNone);
            assert!(cfg.stuck);
        }
    }
}
