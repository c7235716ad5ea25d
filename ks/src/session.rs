//! Per-run context handed to the selector, the runner and tutorial bodies

use crate::display::DisplaySurface;
use crate::editor::EditorLauncher;
use crate::i18n::Translator;
use crate::input::LineInput;
use crate::tutorial::Workspace;

/// Everything a tutorial step may touch besides the progress store
pub struct Session {
    /// Where instructions and status lines go
    pub display: Box<dyn DisplaySurface>,
    /// Where typed answers come from
    pub input: Box<dyn LineInput>,
    /// String tables for the selected language
    pub i18n: Translator,
    /// Editor choice for this run
    pub editor: EditorLauncher,
    /// Directory tutorials create and check files in
    pub workspace: Workspace,
}

impl Session {
    pub fn new(
        display: Box<dyn DisplaySurface>,
        input: Box<dyn LineInput>,
        i18n: Translator,
        editor: EditorLauncher,
        workspace: Workspace,
    ) -> Self {
        Self {
            display,
            input,
            i18n,
            editor,
            workspace,
        }
    }

    /// Translated text for `key`
    pub fn text(&self, key: &str) -> String {
        self.i18n.text(key).to_string()
    }

    /// Translated text with placeholders filled in
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.i18n.format(key, args)
    }
}
