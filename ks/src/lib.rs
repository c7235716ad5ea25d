//! Kickstart - terminal tutorials with saved progress
//!
//! A small curriculum of hands-on tutorials, browsed from a grouped menu.
//! Each tutorial is a sequence of steps; a step is done when a check against
//! the user's working directory passes, so progress is judged by what is on
//! disk rather than by what was typed.
//!
//! # Core Concepts
//!
//! - **Progress store**: completed tutorials and the last menu position live in
//!   one JSON document (see the `progressstore` crate)
//! - **Selector**: a key-driven cursor over groups and tutorials
//! - **Runner**: checks each step and hands unfinished ones to the tutorial
//!
//! # Modules
//!
//! - [`selector`] - Menu navigation, key decoding and the browse loop
//! - [`tutorial`] - Tutorial trait, step runner and shared step helpers
//! - [`tutorials`] - The built-in curriculum
//! - [`tui`] - Full-screen and plain menu screens
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod display;
pub mod editor;
pub mod i18n;
pub mod input;
pub mod selector;
pub mod session;
pub mod tui;
pub mod tutorial;
pub mod tutorials;

// Re-export commonly used types
pub use config::Config;
pub use display::{ConsoleDisplay, DisplaySurface, MemoryDisplay};
pub use editor::EditorLauncher;
pub use i18n::Translator;
pub use input::{LineInput, ReadlineInput, ScriptedInput, StdinInput};
pub use selector::{AfterTutorial, Selector, SelectorExit};
pub use session::Session;
pub use tutorial::{Catalog, Outcome, StepFlow, Tutorial, Workspace, run_tutorial};
