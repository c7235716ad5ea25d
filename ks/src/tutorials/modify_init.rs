//! ModifyInit: give the package a main function and run it

use eyre::Result;

use crate::session::Session;
use crate::tutorial::helpers::{capture, editor_options, require_file, run_in_workspace};
use crate::tutorial::{StepFlow, Tutorial, Workspace};

use super::{INIT_PY, PROJECT_DIR};

const EXPECTED_OUTPUT: &str = "hello, world";

/// Imports the package from `src/` and calls its `main`
const RUN_MAIN: &str = "import mcp_weather; mcp_weather.main()";
const RUN_ENV: [(&str, &str); 1] = [("PYTHONPATH", "src")];

const MAIN_SNIPPET: &str = r#"def main():
    print("hello, world")

if __name__ == "__main__":
    main()"#;

#[derive(Debug)]
pub struct ModifyInit {
    /// Interpreter program plus any leading arguments
    python: Vec<String>,
}

impl Default for ModifyInit {
    fn default() -> Self {
        Self {
            python: vec!["python".to_string()],
        }
    }
}

impl ModifyInit {
    pub fn boxed() -> Box<dyn Tutorial> {
        Box::new(Self::default())
    }

    /// Call `mcp_weather.main()` from the project and compare its output
    fn prints_greeting(python: &[String], workspace: &Workspace) -> Result<bool> {
        if !workspace.exists(INIT_PY) {
            return Ok(false);
        }
        let (program, args) = main_command(python);
        let out = capture(workspace, PROJECT_DIR, program, &args, &RUN_ENV)?;
        Ok(out.success && out.stdout.trim() == EXPECTED_OUTPUT)
    }
}

fn main_command(python: &[String]) -> (&str, Vec<&str>) {
    let program = python.first().map(String::as_str).unwrap_or("python");
    let args = python
        .iter()
        .skip(1)
        .map(String::as_str)
        .chain(["-c", RUN_MAIN])
        .collect();
    (program, args)
}

impl Tutorial for ModifyInit {
    fn name(&self) -> &'static str {
        "ModifyInit"
    }

    fn description(&self) -> &'static str {
        "Add a main function to __init__.py"
    }

    fn check(&self, _step: usize, workspace: &Workspace) -> Result<bool> {
        Self::prints_greeting(&self.python, workspace)
    }

    fn run_step(&mut self, _step: usize, session: &mut Session) -> Result<StepFlow> {
        if !require_file(session, INIT_PY) {
            let hint = session.text("helpers.previous_first");
            session.display.instruct(&hint);
            return Ok(StepFlow::Abandon);
        }

        session.display.clear();
        let title = session.text("modify_init.title");
        session.display.title_box(&title);
        let instruct = session.text("modify_init.instruct");
        session.display.instruct(&instruct);
        let add_code = session.text("modify_init.add_code");
        session.display.instruct(&add_code);
        session.display.snippet(MAIN_SNIPPET);

        let file = session.workspace.path(INIT_PY);
        let python = self.python.clone();
        let flow = editor_options(session, &file, |ws| Self::prints_greeting(&python, ws))?;
        if flow == StepFlow::Continue {
            let (program, args) = main_command(&python);
            run_in_workspace(session, PROJECT_DIR, program, &args, &RUN_ENV)?;
        }
        Ok(flow)
    }
}
