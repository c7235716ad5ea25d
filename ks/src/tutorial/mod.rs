//! Tutorial capability contract, catalog and stepped runner
//!
//! A tutorial is an ordered list of steps. Each step has a body that teaches
//! something (`run_step`) and a predicate over files in the workspace that says
//! whether the step is already satisfied (`check`). The runner only advances
//! when the predicate holds.

mod catalog;
pub mod helpers;
mod runner;
mod workspace;

pub use catalog::{Catalog, CatalogError, TutorialDescriptor, TutorialFactory};
pub use runner::{Outcome, run_tutorial};
pub use workspace::Workspace;

use eyre::Result;

use crate::session::Session;

/// What a step body wants the runner to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFlow {
    /// Re-check the step and carry on
    Continue,
    /// The user chose to leave the tutorial
    Abandon,
}

/// One unit of the curriculum
pub trait Tutorial {
    /// Globally unique identifier, also the persistence key
    fn name(&self) -> &'static str;

    /// Human readable summary (English; translations live in the string tables)
    fn description(&self) -> &'static str;

    /// Number of steps, numbered from 1
    fn total_steps(&self) -> usize {
        1
    }

    /// Whether `step` is satisfied
    ///
    /// Must depend only on observable state such as file contents, so repeated
    /// calls without intervening changes agree.
    fn check(&self, step: usize, workspace: &Workspace) -> Result<bool>;

    /// Teach `step` and let the user act on it
    fn run_step(&mut self, step: usize, session: &mut Session) -> Result<StepFlow>;
}
