//! # Behaviour commands
//!
//! Commands which start or stop a behaviour. They can come from the command line, from a timed
//! command script, or from the driver station mapping layer.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command to the behaviour manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
pub enum BehavCmd {
    /// Run an autonomous routine.
    ///
    /// Any behaviour already running is ended first.
    #[structopt(name = "routine")]
    Routine {
        /// Name of the routine, for example `two_piece`.
        name: String,
    },

    /// Run a button macro.
    #[structopt(name = "macro")]
    Macro {
        /// Name of the macro, for example `intake`.
        name: String,
    },

    /// Move the arm to the given joint angles using the configuration graph.
    #[structopt(name = "arm-to")]
    ArmTo {
        /// Shoulder absolute angle in degrees.
        #[structopt(allow_hyphen_values = true)]
        theta1_deg: f64,

        /// Wrist relative angle in degrees.
        #[structopt(allow_hyphen_values = true)]
        theta2_deg: f64,
    },

    /// Cancel the running behaviour.
    #[structopt(name = "cancel")]
    Cancel,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum CmdParseError {
    #[error("Command contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Command contains a non-finite arm angle")]
    NonFiniteAngle,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BehavCmd {
    /// Parse a command from JSON, for example `{"Routine": {"name": "two_piece"}}` or `"Cancel"`.
    pub fn from_json(json_str: &str) -> Result<Self, CmdParseError> {
        let cmd: BehavCmd = serde_json::from_str(json_str).map_err(CmdParseError::InvalidJson)?;

        if let BehavCmd::ArmTo {
            theta1_deg,
            theta2_deg,
        } = cmd
        {
            if !theta1_deg.is_finite() || !theta2_deg.is_finite() {
                return Err(CmdParseError::NonFiniteAngle);
            }
        }

        Ok(cmd)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_json() -> Result<(), CmdParseError> {
        assert_eq!(
            BehavCmd::from_json(r#"{"Routine": {"name": "two_piece"}}"#)?,
            BehavCmd::Routine {
                name: String::from("two_piece")
            }
        );
        assert_eq!(BehavCmd::from_json(r#""Cancel""#)?, BehavCmd::Cancel);
        assert_eq!(
            BehavCmd::from_json(r#"{"ArmTo": {"theta1_deg": 50.0, "theta2_deg": -50.0}}"#)?,
            BehavCmd::ArmTo {
                theta1_deg: 50.0,
                theta2_deg: -50.0
            }
        );
        Ok(())
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            BehavCmd::from_json(r#"{"Dance": {}}"#),
            Err(CmdParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_from_args() {
        let cmd = BehavCmd::from_iter_safe(&["cmd", "arm-to", "45", "20"]);
        assert_eq!(
            cmd.ok(),
            Some(BehavCmd::ArmTo {
                theta1_deg: 45.0,
                theta2_deg: 20.0
            })
        );
    }
}
