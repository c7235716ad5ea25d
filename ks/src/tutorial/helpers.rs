//! Interaction building blocks shared by tutorial bodies

use std::path::Path;
use std::process::Command;

use eyre::{Context, Result};
use tracing::{debug, info, warn};

use super::{StepFlow, Workspace};
use crate::editor::KNOWN_EDITORS;
use crate::session::Session;

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Open / Check / Change editor / Exit loop around a file the user edits
///
/// Returns `Continue` when the user answers `y` at the continue prompt and
/// `Abandon` when they pick Exit or answer anything else there.
pub fn editor_options(
    session: &mut Session,
    file: &Path,
    check: impl Fn(&Workspace) -> Result<bool>,
) -> Result<StepFlow> {
    debug!(file = %file.display(), "editor_options: called");
    loop {
        session.display.clear();
        let title = session.text("editor.options_title");
        session.display.title_box(&title);
        for key in ["editor.open", "editor.check", "editor.change", "editor.exit"] {
            let line = session.text(key);
            session.display.instruct(&line);
        }

        let prompt = session.text("editor.choice");
        let choice = session.input.read_line(&prompt)?;
        debug!(%choice, "editor_options: choice");

        match choice.as_str() {
            "1" => {
                if !open_in_editor(session, file) {
                    continue;
                }
            }
            "2" => {
                let workspace = session.workspace.clone();
                if check(&workspace)? {
                    let msg = session.text("editor.check_ok");
                    session.display.success(&msg);
                } else {
                    let msg = session.text("editor.check_failed");
                    session.display.error(&msg);
                }
            }
            "3" => {
                choose_editor(session)?;
                if !open_in_editor(session, file) {
                    continue;
                }
            }
            "4" => return Ok(StepFlow::Abandon),
            _ => {
                let msg = session.text("editor.invalid_choice");
                session.display.error(&msg);
                continue;
            }
        }

        let prompt = session.text("editor.continue");
        let answer = session.input.read_line(&prompt)?;
        debug!(%answer, "editor_options: continue answer");
        return Ok(if answer.eq_ignore_ascii_case("y") {
            StepFlow::Continue
        } else {
            StepFlow::Abandon
        });
    }
}

/// Open `file` with the session's editor; failures are shown, not raised
pub fn open_in_editor(session: &mut Session, file: &Path) -> bool {
    let editor = session.editor.resolve();
    let path = file.display().to_string();
    let msg = session.format("editor.opening", &[("file", &path), ("editor", &editor)]);
    session.display.instruct(&msg);

    match session.editor.open(file) {
        Ok(()) => {
            let msg = session.text("editor.opened");
            session.display.instruct(&msg);
            true
        }
        Err(e) => {
            warn!(%editor, error = %e, "Failed to open editor");
            let msg = session.format("editor.open_failed", &[("error", &e.to_string())]);
            session.display.error(&msg);
            false
        }
    }
}

/// Let the user pick one of the known editors for the rest of the session
pub fn choose_editor(session: &mut Session) -> Result<()> {
    let count = KNOWN_EDITORS.len().to_string();
    loop {
        session.display.clear();
        let title = session.text("editor.select_title");
        session.display.title_box(&title);
        let heading = session.text("editor.available");
        session.display.instruct(&heading);
        for (i, editor) in KNOWN_EDITORS.iter().enumerate() {
            session.display.instruct(&format!("{}. {}", i + 1, editor.label));
        }

        let prompt = session.format("editor.select_prompt", &[("count", &count)]);
        let answer = session.input.read_line(&prompt)?;
        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| KNOWN_EDITORS.get(i));

        match picked {
            Some(editor) => {
                session.editor.select(editor.command);
                return Ok(());
            }
            None => {
                let msg = session.text("editor.invalid_choice");
                session.display.error(&msg);
            }
        }
    }
}

/// Keep prompting until the user types `expected` (whitespace-insensitive)
pub fn expect_command(session: &mut Session, expected: &str) -> Result<()> {
    let want = normalize(expected);
    loop {
        let prompt = session.text("helpers.enter_command");
        let typed = session.input.read_line(&prompt)?;
        if normalize(&typed) == want {
            debug!(command = %want, "expect_command: matched");
            return Ok(());
        }
        let msg = session.text("helpers.invalid_command");
        session.display.error(&msg);
    }
}

fn normalize(command: &str) -> String {
    command.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Run a program inside the workspace and capture its output
///
/// `dir` is relative to the workspace root. A program that cannot be started
/// is an error; a program that runs and fails is not.
pub fn capture(
    workspace: &Workspace,
    dir: impl AsRef<Path>,
    program: &str,
    args: &[&str],
    envs: &[(&str, &str)],
) -> Result<CommandOutput> {
    let cwd = workspace.path(dir);
    debug!(%program, ?args, cwd = %cwd.display(), "capture: called");

    let output = Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .current_dir(&cwd)
        .output()
        .context(format!("Failed to run {}", program))?;

    Ok(CommandOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Run a command for the user and show what it printed
///
/// Returns whether it succeeded. Launch failures are shown like any other
/// failure so the step can be retried.
pub fn run_in_workspace(
    session: &mut Session,
    dir: &str,
    program: &str,
    args: &[&str],
    envs: &[(&str, &str)],
) -> Result<bool> {
    let line = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
    let msg = session.format("helpers.running", &[("command", &line)]);
    session.display.instruct(&msg);

    let workspace = session.workspace.clone();
    match capture(&workspace, dir, program, args, envs) {
        Ok(out) => {
            if !out.stdout.trim().is_empty() {
                session.display.snippet(out.stdout.trim_end());
            }
            if out.success {
                info!(command = %line, "Command succeeded");
            } else {
                let detail = out.stderr.trim().to_string();
                let msg = session.format("helpers.command_failed", &[("error", &detail)]);
                session.display.error(&msg);
            }
            Ok(out.success)
        }
        Err(e) => {
            warn!(command = %line, error = ?e, "Command could not start");
            let msg = session.format("helpers.command_failed", &[("error", &format!("{:#}", e))]);
            session.display.error(&msg);
            Ok(false)
        }
    }
}

/// True when `rel` exists; otherwise tell the user which file is missing
pub fn require_file(session: &mut Session, rel: &str) -> bool {
    if session.workspace.exists(rel) {
        return true;
    }
    let path = session.workspace.path(rel).display().to_string();
    let msg = session.format("helpers.file_missing", &[("path", &path)]);
    session.display.error(&msg);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{LineKind, MemoryDisplay};
    use crate::editor::EditorLauncher;
    use crate::i18n::Translator;
    use crate::input::{InputError, ScriptedInput};
    use tempfile::TempDir;

    fn session_in(root: &Path, answers: &[&str], editor: Option<&str>) -> (Session, MemoryDisplay) {
        let display = MemoryDisplay::new();
        let session = Session::new(
            Box::new(display.clone()),
            Box::new(ScriptedInput::new(answers.iter().copied())),
            Translator::english(),
            EditorLauncher::new(editor.map(String::from)),
            Workspace::new(root),
        );
        (session, display)
    }

    #[test]
    fn test_editor_options_exit() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session_in(temp.path(), &["4"], None);

        let flow = editor_options(&mut session, Path::new("x.py"), |_| Ok(true)).unwrap();
        assert_eq!(flow, StepFlow::Abandon);
    }

    #[test]
    fn test_editor_options_check_then_continue() {
        let temp = TempDir::new().unwrap();
        let (mut session, display) = session_in(temp.path(), &["2", "y"], None);

        let flow = editor_options(&mut session, Path::new("x.py"), |_| Ok(true)).unwrap();
        assert_eq!(flow, StepFlow::Continue);
        assert!(display.contains("Changes look good!"));
    }

    #[test]
    fn test_editor_options_invalid_choice_then_decline_leaves() {
        let temp = TempDir::new().unwrap();
        let (mut session, display) = session_in(temp.path(), &["9", "2", "n", "unused"], None);

        let flow = editor_options(&mut session, Path::new("x.py"), |_| Ok(false)).unwrap();
        assert_eq!(flow, StepFlow::Abandon);
        let errors = display.of_kind(LineKind::Error);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Invalid choice"));
        assert!(errors[1].contains("not correct"));
        // Declining ends the loop without another menu round
        assert_eq!(display.of_kind(LineKind::Title).len(), 2);
    }

    #[test]
    fn test_editor_options_check_error_propagates() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session_in(temp.path(), &["2"], None);

        let result = editor_options(&mut session, Path::new("x.py"), |_| Err(eyre::eyre!("broken toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_editor_options_cancel() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session_in(temp.path(), &[], None);

        let err = editor_options(&mut session, Path::new("x.py"), |_| Ok(true)).unwrap_err();
        assert!(crate::input::is_cancelled(&err));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_failure_returns_to_options() {
        let temp = TempDir::new().unwrap();
        let (mut session, display) = session_in(temp.path(), &["1", "4"], Some("definitely-not-an-editor-xyz"));

        let flow = editor_options(&mut session, Path::new("x.py"), |_| Ok(true)).unwrap();
        assert_eq!(flow, StepFlow::Abandon);
        assert!(display.contains("Failed to open the editor"));
    }

    #[cfg(unix)]
    #[test]
    fn test_open_success_asks_to_continue() {
        let temp = TempDir::new().unwrap();
        let (mut session, display) = session_in(temp.path(), &["1", "Y"], Some("true"));

        let flow = editor_options(&mut session, Path::new("x.py"), |_| Ok(true)).unwrap();
        assert_eq!(flow, StepFlow::Continue);
        assert!(display.contains("Opening x.py in true..."));
    }

    #[test]
    fn test_choose_editor_retries_until_valid() {
        let temp = TempDir::new().unwrap();
        let (mut session, display) = session_in(temp.path(), &["0", "six", "3"], None);

        choose_editor(&mut session).unwrap();
        assert_eq!(session.editor.selected(), Some("vim"));
        assert_eq!(display.of_kind(LineKind::Error).len(), 2);
        assert!(display.contains("5. Emacs"));
    }

    #[test]
    fn test_expect_command_ignores_extra_spaces() {
        let temp = TempDir::new().unwrap();
        let (mut session, display) = session_in(temp.path(), &["hatch init", "  hatch   new mcp-weather "], None);

        expect_command(&mut session, "hatch new mcp-weather").unwrap();
        assert_eq!(display.of_kind(LineKind::Error).len(), 1);
    }

    #[test]
    fn test_expect_command_cancel() {
        let temp = TempDir::new().unwrap();
        let (mut session, _) = session_in(temp.path(), &["nope"], None);

        let err = expect_command(&mut session, "hatch new mcp-weather").unwrap_err();
        assert!(matches!(err.downcast_ref::<InputError>(), Some(InputError::Cancelled)));
    }

    #[test]
    fn test_require_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("here.txt"), "").unwrap();
        let (mut session, display) = session_in(temp.path(), &[], None);

        assert!(require_file(&mut session, "here.txt"));
        assert!(!require_file(&mut session, "gone.txt"));
        assert!(display.contains("File not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_uses_workspace_dir_and_env() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("proj")).unwrap();
        let ws = Workspace::new(temp.path());

        let out = capture(&ws, "proj", "sh", &["-c", "basename \"$PWD\"; echo $GREETING"], &[("GREETING", "hi")]).unwrap();
        assert!(out.success);
        assert_eq!(out.stdout, "proj\nhi\n");

        assert!(capture(&ws, "proj", "definitely-not-a-program-xyz", &[], &[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_in_workspace_reports_failures() {
        let temp = TempDir::new().unwrap();
        let (mut session, display) = session_in(temp.path(), &[], None);

        assert!(run_in_workspace(&mut session, ".", "sh", &["-c", "echo made it"], &[]).unwrap());
        assert_eq!(display.of_kind(LineKind::Snippet), vec!["made it"]);

        assert!(!run_in_workspace(&mut session, ".", "sh", &["-c", "echo oops >&2; exit 3"], &[]).unwrap());
        assert!(display.contains("Command failed: oops"));

        assert!(!run_in_workspace(&mut session, ".", "definitely-not-a-program-xyz", &[], &[]).unwrap());

        let envs = [("GREETING", "from env")];
        assert!(run_in_workspace(&mut session, ".", "sh", &["-c", "echo \"$GREETING\""], &envs).unwrap());
        assert!(display.of_kind(LineKind::Snippet).contains(&"from env".to_string()));
    }
}
