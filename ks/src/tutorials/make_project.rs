//! MakeProject: scaffold the weather server project with hatch

use eyre::Result;

use crate::session::Session;
use crate::tutorial::helpers::{expect_command, run_in_workspace};
use crate::tutorial::{StepFlow, Tutorial, Workspace};

use super::{PROJECT_DIR, PYPROJECT};

const COMMAND: &str = "hatch new mcp-weather";

#[derive(Debug, Default)]
pub struct MakeProject;

impl MakeProject {
    pub fn boxed() -> Box<dyn Tutorial> {
        Box::new(Self)
    }
}

impl Tutorial for MakeProject {
    fn name(&self) -> &'static str {
        "MakeProject"
    }

    fn description(&self) -> &'static str {
        "Create a new project with hatch"
    }

    fn check(&self, _step: usize, workspace: &Workspace) -> Result<bool> {
        Ok(workspace.exists(PYPROJECT))
    }

    fn run_step(&mut self, _step: usize, session: &mut Session) -> Result<StepFlow> {
        session.display.clear();
        let title = session.text("make_project.title");
        session.display.title_box(&title);
        let instruct = session.text("make_project.instruct");
        session.display.instruct(&instruct);
        session.display.emphasize(&format!("➤ {}", COMMAND));

        expect_command(session, COMMAND)?;

        if session.workspace.exists(PROJECT_DIR) {
            // hatch refuses to overwrite; let the check report what is missing
            return Ok(StepFlow::Continue);
        }
        if run_in_workspace(session, ".", "hatch", &["new", "mcp-weather"], &[])? {
            Ok(StepFlow::Continue)
        } else {
            Ok(StepFlow::Abandon)
        }
    }
}
