//! ProgressStore - durable tutorial progress
//!
//! Keeps the record of which tutorials are complete, which one was last active,
//! and where the menu cursor was when the user left. The state lives in a single
//! human-readable JSON document that is rewritten atomically on every mutation.
//!
//! # Layout
//!
//! ```text
//! ~/.local/share/kickstart/
//! ├── state.json                      # current progress
//! └── state.json.bak-20250101T120000Z # created only by an explicit reset
//! ```
//!
//! # Example
//!
//! ```ignore
//! use progressstore::{ProgressStore, TutorialGroup};
//!
//! let groups = vec![TutorialGroup::new("basic", "Basics", "", ["MakeProject"])];
//! let mut store = ProgressStore::load(progressstore::default_state_path(), groups)?;
//! store.mark_completed("MakeProject")?;
//! assert_eq!(store.total_progress(), 1.0);
//! ```

mod error;
mod state;
mod store;

pub use error::{ProgressError, ProgressResult};
pub use state::{ProgressState, TutorialGroup, ratio};
pub use store::{ProgressStore, backup_path};

use std::path::PathBuf;

/// Application directory name under the per-user data directory
pub const APP_DIR: &str = "kickstart";

/// File name of the progress document
pub const STATE_FILE: &str = "state.json";

/// Default location of the progress document
pub fn default_state_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(STATE_FILE)
}
