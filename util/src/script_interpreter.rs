//! # Command script interpreter module
//!
//! This module provides an interpreter for timed behaviour command scripts, so the executable can
//! be driven without an operator. A script is a list of entries of the form
//!
//! ```text
//! 0.5: {"Routine": {"name": "two_piece"}};
//! 12.0: "Cancel";
//! ```
//!
//! where the number is the session time in seconds at which the JSON [`BehavCmd`] is issued.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use robot_if::cmd::{BehavCmd, CmdParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
#[derive(Debug)]
pub struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The command to run
    cmd: BehavCmd
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_cmds` to
/// acquire a list of commands that need executing.
#[derive(Debug)]
pub struct ScriptInterpreter {
    script_path: Option<PathBuf>,
    cmds: VecDeque<Command>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, CmdParseError)
}

#[derive(Debug, PartialEq)]
pub enum PendingCmds {
    None,
    Some(Vec<BehavCmd>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script_str(&script)?;
        si.script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {

        let mut cmd_queue: VecDeque<Command> = VecDeque::new();

        // Each entry is `<time>: <json>;`, one per line
        let re = match RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
        {
            Ok(r) => r,
            Err(e) => return Err(ScriptError::InvalidTimestamp(format!("{}", e)))
        };

        for cap in re.captures_iter(script) {
            let (time_str, json_str) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(j)) => (t.as_str(), j.as_str()),
                _ => continue
            };

            // Parse the exec time
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Parse the command from the payload. The scripts contain JSON only.
            let cmd = BehavCmd::from_json(json_str)
                .map_err(|e| ScriptError::InvalidCmd(exec_time_s, e))?;

            cmd_queue.push_back(Command {
                exec_time_s,
                cmd
            });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        // Entries may be written out of order, run them in time order
        cmd_queue
            .make_contiguous()
            .sort_by(|a, b| a.exec_time_s.total_cmp(&b.exec_time_s));

        Ok(ScriptInterpreter {
            script_path: None,
            cmds: cmd_queue
        })
    }

    /// Return the commands which are due at `current_time_s`, removing them from the script.
    pub fn get_pending_cmds(&mut self, current_time_s: f64) -> PendingCmds {

        // If the queue is empty the script is over
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript
        }

        let mut cmd_vec: Vec<BehavCmd> = vec![];

        while let Some(front) = self.cmds.front() {
            if front.exec_time_s > current_time_s {
                break;
            }

            if let Some(c) = self.cmds.pop_front() {
                cmd_vec.push(c.cmd);
            }
        }

        if cmd_vec.is_empty() {
            PendingCmds::None
        }
        else {
            PendingCmds::Some(cmd_vec)
        }
    }

    /// Get the number of commands left in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }

    /// Path the script was loaded from, if it came from a file.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        // comments and blank lines are skipped
        2.0: "Cancel";
        0.5: {"Routine": {"name": "two_piece"}};
        0.5: {"Macro": {"name": "intake"}};
    "#;

    #[test]
    fn test_pending_cmds() -> Result<(), ScriptError> {
        let mut si = ScriptInterpreter::from_script_str(SCRIPT)?;

        assert_eq!(si.get_num_cmds(), 3);
        assert_eq!(si.get_duration(), 2.0);

        assert_eq!(si.get_pending_cmds(0.1), PendingCmds::None);
        assert_eq!(
            si.get_pending_cmds(0.5),
            PendingCmds::Some(vec![
                BehavCmd::Routine { name: String::from("two_piece") },
                BehavCmd::Macro { name: String::from("intake") },
            ])
        );
        assert_eq!(si.get_pending_cmds(1.0), PendingCmds::None);
        assert_eq!(
            si.get_pending_cmds(3.0),
            PendingCmds::Some(vec![BehavCmd::Cancel])
        );
        assert_eq!(si.get_pending_cmds(4.0), PendingCmds::EndOfScript);

        Ok(())
    }

    #[test]
    fn test_script_errors() {
        assert!(matches!(
            ScriptInterpreter::from_script_str("nothing to see here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_script_str("1.0: {\"Fly\": 2};"),
            Err(ScriptError::InvalidCmd(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::new("/definitely/not/a/script.txt"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
