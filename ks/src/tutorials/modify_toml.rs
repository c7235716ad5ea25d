//! ModifyToml: register the console script in pyproject.toml

use eyre::Result;
use tracing::debug;

use crate::session::Session;
use crate::tutorial::helpers::editor_options;
use crate::tutorial::{StepFlow, Tutorial, Workspace};

use super::{PROJECT_DIR, PYPROJECT};

const SCRIPT_NAME: &str = "mcp-weather";
const ENTRY_POINT: &str = "mcp_weather:main";

#[derive(Debug, Default)]
pub struct ModifyToml;

impl ModifyToml {
    pub fn boxed() -> Box<dyn Tutorial> {
        Box::new(Self)
    }
}

/// True when `[project.scripts]` maps the script to the entry point
fn has_script_entry(workspace: &Workspace) -> Result<bool> {
    let Some(raw) = workspace.read(PYPROJECT)? else {
        return Ok(false);
    };
    // Half-edited files are common while the user works; treat them as unfinished
    let doc: toml::Table = match raw.parse() {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "has_script_entry: pyproject.toml does not parse");
            return Ok(false);
        }
    };
    let entry = doc
        .get("project")
        .and_then(|p| p.get("scripts"))
        .and_then(|s| s.get(SCRIPT_NAME))
        .and_then(|v| v.as_str());
    Ok(entry == Some(ENTRY_POINT))
}

impl Tutorial for ModifyToml {
    fn name(&self) -> &'static str {
        "ModifyToml"
    }

    fn description(&self) -> &'static str {
        "Add a script entry to pyproject.toml"
    }

    fn check(&self, _step: usize, workspace: &Workspace) -> Result<bool> {
        has_script_entry(workspace)
    }

    fn run_step(&mut self, _step: usize, session: &mut Session) -> Result<StepFlow> {
        session.display.clear();
        let title = session.text("modify_toml.title");
        session.display.title_box(&title);

        if !session.workspace.exists(PROJECT_DIR) || !session.workspace.exists(PYPROJECT) {
            let missing = session.text("modify_toml.missing_project");
            session.display.error(&missing);
            let hint = session.text("helpers.previous_first");
            session.display.instruct(&hint);
            return Ok(StepFlow::Abandon);
        }

        let instruct = session.text("modify_toml.instruct");
        session.display.instruct(&instruct);
        session.display.snippet(&format!("[project.scripts]\n{} = \"{}\"", SCRIPT_NAME, ENTRY_POINT));

        let file = session.workspace.path(PYPROJECT);
        editor_options(session, &file, has_script_entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryDisplay;
    use crate::editor::EditorLauncher;
    use crate::i18n::Translator;
    use crate::input::ScriptedInput;
    use std::fs;
    use tempfile::TempDir;

    fn workspace_with(pyproject: Option<&str>) -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        if let Some(content) = pyproject {
            fs::create_dir(temp.path().join(PROJECT_DIR)).unwrap();
            fs::write(temp.path().join(PYPROJECT), content).unwrap();
        }
        let ws = Workspace::new(temp.path());
        (temp, ws)
    }

    #[test]
    fn test_check_requires_exact_entry() {
        let (_t, ws) = workspace_with(None);
        assert!(!ModifyToml.check(1, &ws).unwrap());

        let (_t, ws) = workspace_with(Some("[project]\nname = \"mcp-weather\"\n"));
        assert!(!ModifyToml.check(1, &ws).unwrap());

        let (_t, ws) = workspace_with(Some("[project.scripts]\nmcp-weather = \"mcp_weather:run\"\n"));
        assert!(!ModifyToml.check(1, &ws).unwrap());

        let (_t, ws) = workspace_with(Some(
            "[project]\nname = \"mcp-weather\"\n\n[project.scripts]\nmcp-weather = \"mcp_weather:main\"\n",
        ));
        assert!(ModifyToml.check(1, &ws).unwrap());
    }

    #[test]
    fn test_check_tolerates_broken_toml() {
        let (_t, ws) = workspace_with(Some("[project.scripts\nmcp-weather = "));
        assert!(!ModifyToml.check(1, &ws).unwrap());
    }

    #[test]
    fn test_run_step_without_project_abandons() {
        let temp = TempDir::new().unwrap();
        let display = MemoryDisplay::new();
        let mut session = Session::new(
            Box::new(display.clone()),
            Box::new(ScriptedInput::default()),
            Translator::english(),
            EditorLauncher::default(),
            Workspace::new(temp.path()),
        );

        assert_eq!(ModifyToml.run_step(1, &mut session).unwrap(), StepFlow::Abandon);
        assert!(display.contains("Project directory not found."));
    }
}
