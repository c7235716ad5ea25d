//! Stepped tutorial runner
//!
//! Evaluates the current step's predicate; if it fails the step body runs,
//! otherwise the step is announced and the runner moves on. Satisfied steps
//! are skipped, which lets a user resume after editing files by hand.

use eyre::{Result, WrapErr};
use tracing::{debug, info, warn};

use super::{StepFlow, Tutorial};
use crate::input::is_cancelled;
use crate::session::Session;

/// How a tutorial run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every step's predicate held
    Completed,
    /// The user left early, or a step failed
    Incomplete,
}

/// Drive `tutorial` until every step is satisfied or the user leaves
///
/// Errors raised by a step never escape: they are shown to the user and the
/// run counts as incomplete.
pub fn run_tutorial(tutorial: &mut dyn Tutorial, session: &mut Session) -> Outcome {
    let name = tutorial.name();
    info!(%name, steps = tutorial.total_steps(), "Starting tutorial");

    match drive(tutorial, session) {
        Ok(Outcome::Completed) => {
            info!(%name, "Tutorial completed");
            let msg = session.format("runner.completed", &[("name", name)]);
            session.display.success(&msg);
            Outcome::Completed
        }
        Ok(Outcome::Incomplete) => {
            info!(%name, "Tutorial left early");
            let msg = session.format("runner.incomplete", &[("name", name)]);
            session.display.instruct(&msg);
            Outcome::Incomplete
        }
        Err(e) if is_cancelled(&e) => {
            info!(%name, "Tutorial cancelled by user");
            let msg = session.text("runner.cancelled");
            session.display.warn(&msg);
            Outcome::Incomplete
        }
        Err(e) => {
            warn!(%name, error = ?e, "Tutorial step failed");
            let detail = format!("{:#}", e);
            let msg = session.format("runner.error", &[("name", name), ("error", &detail)]);
            session.display.error(&msg);
            Outcome::Incomplete
        }
    }
}

fn drive(tutorial: &mut dyn Tutorial, session: &mut Session) -> Result<Outcome> {
    let total = tutorial.total_steps();
    let mut step = 1;

    while step <= total {
        let workspace = session.workspace.clone();
        let satisfied = tutorial
            .check(step, &workspace)
            .wrap_err_with(|| format!("checking step {}", step))?;
        debug!(step, satisfied, "drive: checked step");

        if satisfied {
            let msg = session.format("runner.step_done", &[("step", &step.to_string()), ("total", &total.to_string())]);
            session.display.success(&msg);
            let prompt = session.text("runner.press_key");
            session.input.pause(&prompt)?;
            step += 1;
            continue;
        }

        match tutorial
            .run_step(step, session)
            .wrap_err_with(|| format!("running step {}", step))?
        {
            StepFlow::Continue => debug!(step, "drive: step body returned, re-checking"),
            StepFlow::Abandon => return Ok(Outcome::Incomplete),
        }
    }

    Ok(Outcome::Completed)
}
