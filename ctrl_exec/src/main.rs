//! Main robot-side control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Mechanism sensing acquisition (from the simulation)
//!         - Behaviour command processing (from a script or the command line)
//!         - Behaviour manager processing:
//!             - Task scheduling
//!             - Arm motion planning
//!         - Mechanism simulation
//!
//! # Modules
//!
//! All modules (e.g. `behav_mgr`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use ctrl_lib::{
    behav_mgr,
    data_store::DataStore,
    mech_sim::{ArmSim, MechSimParams},
    params::CtrlExecParams,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use robot_if::cmd::BehavCmd;
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "ctrl_exec", about = "Robot behaviour control executable")]
struct Opts {
    /// Timed command script to run.
    #[structopt(long, parse(from_os_str))]
    script: Option<PathBuf>,

    /// Autonomous routine to start on the first cycle.
    #[structopt(long)]
    routine: Option<String>,

    /// Stop after this many cycles.
    #[structopt(long)]
    max_cycles: Option<u128>,

    /// A single command to run on the first cycle, after the routine if one is given.
    #[structopt(subcommand)]
    cmd: Option<BehavCmd>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Robot Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let exec_params: CtrlExecParams =
        util::params::load("ctrl_exec.toml").wrap_err("Could not load ctrl_exec params")?;
    let sim_params: MechSimParams =
        util::params::load("mech_sim.toml").wrap_err("Could not load mech_sim params")?;

    info!("Exec parameters loaded");

    let cycle_frequency_hz = 1.0 / exec_params.cycle_period_s;

    // ---- INITIALISE COMMAND SOURCES ----

    let mut pending: VecDeque<BehavCmd> = VecDeque::new();

    if let Some(name) = opts.routine {
        pending.push_back(BehavCmd::Routine { name });
    }
    if let Some(cmd) = opts.cmd {
        pending.push_back(cmd);
    }

    let mut script = match opts.script {
        Some(path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(&path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} commands\n",
                si.get_duration(),
                si.get_num_cmds()
            );

            Some(si)
        }
        None => None,
    };

    if script.is_none() && pending.is_empty() {
        return Err(eyre!(
            "Nothing to run, provide a script, a routine or a command"
        ));
    }

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // With no script the executable stops once the command line behaviours finish
    ds.script_ended = script.is_none();

    // ---- INITIALISE MODULES ----

    ds.behav_mgr
        .init(
            behav_mgr::InitData {
                behav_mgr_params: "behav_mgr.toml",
                arm_ctrl_params: "arm_ctrl.toml",
            },
            &session,
        )
        .wrap_err("Failed to initialise BehavMgr")?;
    info!("BehavMgr init complete");

    let mut sim = ArmSim::new(sim_params);
    info!("ArmSim init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz);

        // ---- DATA INPUT ----

        ds.behav_mgr_input.sens = sim.sens().clone();

        // ---- COMMAND PROCESSING ----

        if let Some(ref mut si) = script {
            match si.get_pending_cmds(ds.time_s) {
                PendingCmds::None => (),
                PendingCmds::Some(cmds) => pending.extend(cmds),
                PendingCmds::EndOfScript => {
                    if !ds.script_ended {
                        info!("End of command script reached");
                        ds.script_ended = true;
                    }
                }
            }
        }

        // One command per cycle
        ds.behav_mgr_input.cmd = pending.pop_front();

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.behav_mgr.proc(&ds.behav_mgr_input) {
            Ok((o, r)) => {
                ds.behav_mgr_output = o;
                ds.behav_mgr_status_rpt = r;
            }
            Err(e) => {
                // Errors here mean a bad command, the running behaviour is unaffected
                warn!("Error during BehavMgr processing: {}", e)
            }
        };

        // ---- MECHANISMS ----

        sim.step(&ds.behav_mgr_output, exec_params.cycle_period_s, ds.time_s);

        if ds.is_1_hz_cycle {
            ds.log_status();
        }

        // ---- EXIT CONDITIONS ----

        if ds.is_idle() && ds.num_idle_cycles >= exec_params.script_end_idle_cycles {
            info!("Nothing left to run, stopping");
            break;
        }

        if let Some(max) = opts.max_cycles {
            if ds.num_cycles + 1 >= max {
                info!("Maximum number of cycles ({}) reached, stopping", max);
                break;
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;

                // If number of overruns greater than the limit exit
                if ds.num_consec_cycle_overruns > exec_params.max_consec_cycle_overruns {
                    return Err(eyre!(
                        "More than {} consecutive cycle overruns",
                        exec_params.max_consec_cycle_overruns
                    ));
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    ds.log_status();

    let mut status_path = session.session_root.clone();
    status_path.push("final_status.json");
    std::fs::write(
        &status_path,
        serde_json::to_string_pretty(&ds.behav_mgr_status_rpt)
            .wrap_err("Failed to serialise the final status")?,
    )
    .wrap_err("Failed to write the final status")?;

    info!("End of execution");

    Ok(())
}
