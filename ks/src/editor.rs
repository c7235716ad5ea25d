//! External editor launching
//!
//! Terminal editors block until the user quits them. GUI editors are spawned
//! detached so the tutorial can keep prompting while the file is open.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

/// An editor offered in the selection menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownEditor {
    pub label: &'static str,
    pub command: &'static str,
}

/// Editors offered when the user asks to change editor
pub const KNOWN_EDITORS: &[KnownEditor] = &[
    KnownEditor {
        label: "VS Code",
        command: "code",
    },
    KnownEditor {
        label: "Sublime Text",
        command: "subl",
    },
    KnownEditor {
        label: "Vim",
        command: "vim",
    },
    KnownEditor {
        label: "Nano",
        command: "nano",
    },
    KnownEditor {
        label: "Emacs",
        command: "emacs",
    },
];

/// Editors that return immediately and keep running in their own window
const GUI_EDITORS: &[&str] = &["code", "subl"];

/// Last resort when nothing else is configured or installed
const FALLBACK_EDITOR: &str = "nano";

/// Errors from launching an editor
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Editor command is empty")]
    Empty,

    #[error("Failed to launch {editor}: {source}. Please make sure it's installed.")]
    Launch {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{editor} exited with {status}")]
    Exited { editor: String, status: std::process::ExitStatus },
}

/// Remembers the user's editor choice for the session
#[derive(Debug, Clone, Default)]
pub struct EditorLauncher {
    selected: Option<String>,
}

impl EditorLauncher {
    /// Start with an explicitly configured editor, if any
    pub fn new(configured: Option<String>) -> Self {
        Self {
            selected: configured.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Explicitly chosen editor
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Use `command` from now on
    pub fn select(&mut self, command: impl Into<String>) {
        let command = command.into();
        info!(%command, "Editor selected");
        self.selected = Some(command);
    }

    /// Editor command that `open` will run
    pub fn resolve(&self) -> String {
        match &self.selected {
            Some(cmd) => cmd.clone(),
            None => default_editor(|key| std::env::var(key).ok(), find_in_path),
        }
    }

    /// Open `path` in the resolved editor
    pub fn open(&self, path: &Path) -> Result<(), EditorError> {
        let command = self.resolve();
        debug!(%command, path = %path.display(), "EditorLauncher::open: called");

        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or(EditorError::Empty)?;
        let args: Vec<&str> = parts.collect();

        let mut cmd = Command::new(program);
        cmd.args(&args).arg(path);

        if is_gui(program) {
            cmd.spawn().map_err(|source| EditorError::Launch {
                editor: command.clone(),
                source,
            })?;
            debug!(%command, "EditorLauncher::open: spawned detached");
            return Ok(());
        }

        let status = cmd.status().map_err(|source| EditorError::Launch {
            editor: command.clone(),
            source,
        })?;
        if !status.success() {
            return Err(EditorError::Exited { editor: command, status });
        }
        Ok(())
    }
}

fn is_gui(program: &str) -> bool {
    let stem = Path::new(program)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    GUI_EDITORS.contains(&stem.as_str())
}

/// `$VISUAL`, then `$EDITOR`, then an installed GUI editor, then nano
fn default_editor(env: impl Fn(&str) -> Option<String>, which: impl Fn(&str) -> Option<PathBuf>) -> String {
    for key in ["VISUAL", "EDITOR"] {
        if let Some(value) = env(key).filter(|v| !v.trim().is_empty()) {
            debug!(%key, %value, "default_editor: from environment");
            return value;
        }
    }
    for candidate in GUI_EDITORS {
        if which(candidate).is_some() {
            debug!(%candidate, "default_editor: found installed editor");
            return candidate.to_string();
        }
    }
    FALLBACK_EDITOR.to_string()
}

/// Locate an executable on `$PATH`
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
