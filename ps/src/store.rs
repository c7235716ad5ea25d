//! Core ProgressStore implementation

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{ProgressError, ProgressResult};
use crate::state::{ProgressState, TutorialGroup};

/// Single-writer handle on the progress document
#[derive(Debug)]
pub struct ProgressStore {
    /// Location of the JSON document
    path: PathBuf,
    /// In-memory copy, always equal to what was last written
    state: ProgressState,
}

impl ProgressStore {
    /// Load the document at `path`, bootstrapping it when absent
    ///
    /// The configured groups are authoritative: if the document carries a
    /// different curriculum it is rewritten with `groups`. Completed entries are
    /// kept as they are. An unparsable document fails with `StateCorruption` and
    /// is left untouched on disk.
    pub fn load(path: impl AsRef<Path>, groups: Vec<TutorialGroup>) -> ProgressResult<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), group_count = groups.len(), "ProgressStore::load: called");

        if !path.exists() {
            info!(path = %path.display(), "No progress state found, creating a new one");
            return Self::bootstrap(path, groups);
        }

        let content = fs::read_to_string(&path).map_err(|source| ProgressError::Io {
            path: path.clone(),
            source,
        })?;
        let state: ProgressState = serde_json::from_str(&content).map_err(|source| {
            warn!(path = %path.display(), error = %source, "Progress state is corrupt");
            ProgressError::StateCorruption {
                path: path.clone(),
                source,
            }
        })?;

        let mut store = Self { path, state };
        if store.state.groups != groups {
            info!("Curriculum changed since last run, updating stored groups");
            let mut next = store.state.clone();
            next.groups = groups;
            store.commit(next)?;
        }

        debug!(completed = store.state.completed.len(), "ProgressStore::load: loaded");
        Ok(store)
    }

    /// Move the existing document aside and start over
    ///
    /// Only meant to be called on explicit user request. The previous file,
    /// readable or not, is kept next to the new one as a timestamped backup.
    pub fn reset(path: impl AsRef<Path>, groups: Vec<TutorialGroup>) -> ProgressResult<(Self, Option<PathBuf>)> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "ProgressStore::reset: called");

        let backup = if path.exists() {
            let backup = backup_path(&path);
            fs::rename(&path, &backup).map_err(|source| ProgressError::Io {
                path: path.clone(),
                source,
            })?;
            info!(backup = %backup.display(), "Moved previous progress state aside");
            Some(backup)
        } else {
            None
        };

        Ok((Self::bootstrap(path, groups)?, backup))
    }

    fn bootstrap(path: PathBuf, groups: Vec<TutorialGroup>) -> ProgressResult<Self> {
        let mut store = Self {
            path,
            state: ProgressState::new(groups),
        };
        store.save()?;
        Ok(store)
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of the current state
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Curriculum groups in declaration order
    pub fn groups(&self) -> &[TutorialGroup] {
        &self.state.groups
    }

    /// Look up a group by key
    pub fn group(&self, key: &str) -> Option<&TutorialGroup> {
        self.state.group(key)
    }

    /// Write the full state back to disk
    ///
    /// The document is written to a temporary file in the same directory and
    /// renamed over the original, so an interruption never leaves a truncated file.
    pub fn save(&mut self) -> ProgressResult<()> {
        debug!(path = %self.path.display(), "ProgressStore::save: called");
        self.commit(self.state.clone())
    }

    /// Persist `next` and adopt it only once the write went through
    fn commit(&mut self, mut next: ProgressState) -> ProgressResult<()> {
        next.updated_at = Some(Utc::now());
        write_atomic(&self.path, &next)?;
        self.state = next;
        Ok(())
    }

    /// True when the tutorial is marked done
    pub fn is_completed(&self, name: &str) -> bool {
        self.state.is_completed(name)
    }

    /// Mark a tutorial done and persist
    ///
    /// Returns false when it was already complete, in which case nothing is written.
    pub fn mark_completed(&mut self, name: &str) -> ProgressResult<bool> {
        debug!(%name, "ProgressStore::mark_completed: called");
        if !self.state.knows_tutorial(name) {
            return Err(ProgressError::UnknownTutorial(name.to_string()));
        }
        if self.state.is_completed(name) {
            debug!(%name, "ProgressStore::mark_completed: already complete");
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.completed.insert(name.to_string());
        self.commit(next)?;
        info!(%name, "Tutorial marked complete");
        Ok(true)
    }

    /// Record the last tutorial the user started
    pub fn set_current(&mut self, name: &str) -> ProgressResult<()> {
        debug!(%name, "ProgressStore::set_current: called");
        if !self.state.knows_tutorial(name) {
            return Err(ProgressError::UnknownTutorial(name.to_string()));
        }
        if self.state.current_tutorial.as_deref() == Some(name) {
            return Ok(());
        }
        let mut next = self.state.clone();
        next.current_tutorial = Some(name.to_string());
        self.commit(next)
    }

    /// Record the cursor index within the last viewed group
    pub fn set_last_position(&mut self, position: usize) -> ProgressResult<()> {
        debug!(position, "ProgressStore::set_last_position: called");
        if let Some(key) = self.state.last_group.clone() {
            self.check_position(&key, position)?;
        }
        if self.state.last_position == Some(position) {
            return Ok(());
        }
        let mut next = self.state.clone();
        next.last_position = Some(position);
        self.commit(next)
    }

    /// Record the last viewed group
    pub fn set_last_group(&mut self, key: &str) -> ProgressResult<()> {
        debug!(%key, "ProgressStore::set_last_group: called");
        if self.state.group(key).is_none() {
            return Err(ProgressError::UnknownGroup(key.to_string()));
        }
        if self.state.last_group.as_deref() == Some(key) {
            return Ok(());
        }
        let mut next = self.state.clone();
        next.last_group = Some(key.to_string());
        self.commit(next)
    }

    /// Record group and cursor together with a single write
    pub fn set_last_view(&mut self, key: &str, position: usize) -> ProgressResult<()> {
        debug!(%key, position, "ProgressStore::set_last_view: called");
        self.check_position(key, position)?;
        if self.state.last_group.as_deref() == Some(key) && self.state.last_position == Some(position) {
            return Ok(());
        }
        let mut next = self.state.clone();
        next.last_group = Some(key.to_string());
        next.last_position = Some(position);
        self.commit(next)
    }

    fn check_position(&self, key: &str, position: usize) -> ProgressResult<()> {
        let group = self
            .state
            .group(key)
            .ok_or_else(|| ProgressError::UnknownGroup(key.to_string()))?;
        // An empty group can only ever hold the cursor at 0
        if position >= group.len().max(1) {
            return Err(ProgressError::PositionOutOfRange {
                group: key.to_string(),
                position,
                len: group.len(),
            });
        }
        Ok(())
    }

    /// Fraction of a group that is done
    pub fn group_progress(&self, key: &str) -> f64 {
        self.state.group_progress(key)
    }

    /// Fraction of the whole curriculum that is done
    pub fn total_progress(&self) -> f64 {
        self.state.total_progress()
    }
}

/// Backup location used by `reset`
pub fn backup_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::STATE_FILE.to_string());
    path.with_file_name(format!("{}.bak-{}", file_name, stamp))
}

fn write_atomic(path: &Path, state: &ProgressState) -> ProgressResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_err = |source| ProgressError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(&dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
    serde_json::to_writer_pretty(&mut tmp, state)?;
    tmp.write_all(b"\n").map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), "write_atomic: replaced");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn groups() -> Vec<TutorialGroup> {
        vec![
            TutorialGroup::new("basic", "Basics", "", ["MakeProject", "ModifyToml", "ModifyInit"]),
            TutorialGroup::new("server", "Server", "", ["MakeServer"]),
        ]
    }

    #[test]
    fn test_fresh_install_bootstraps_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("state.json");

        let store = ProgressStore::load(&path, groups()).unwrap();

        assert!(path.exists());
        assert_eq!(store.total_progress(), 0.0);
        assert!(store.state().completed.is_empty());
        assert!(store.state().last_position.is_none());
        assert_eq!(store.groups().len(), 2);
    }

    #[test]
    fn test_completion_survives_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        let mut store = ProgressStore::load(&path, groups()).unwrap();
        assert!(store.mark_completed("MakeProject").unwrap());
        assert_eq!(store.total_progress(), 0.25);

        let reloaded = ProgressStore::load(&path, groups()).unwrap();
        assert!(reloaded.is_completed("MakeProject"));
        assert_eq!(reloaded.total_progress(), 0.25);
    }

    #[test]
    fn test_mark_completed_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut store = ProgressStore::load(temp.path().join("state.json"), groups()).unwrap();

        assert!(store.mark_completed("MakeServer").unwrap());
        let before = store.state().completed.clone();
        assert!(!store.mark_completed("MakeServer").unwrap());
        assert_eq!(store.state().completed, before);
    }

    #[test]
    fn test_mark_unknown_tutorial_rejected() {
        let temp = TempDir::new().unwrap();
        let mut store = ProgressStore::load(temp.path().join("state.json"), groups()).unwrap();

        let err = store.mark_completed("Nope").unwrap_err();
        assert!(matches!(err, ProgressError::UnknownTutorial(_)));
        assert!(store.state().completed.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        let truncated = r#"{"groups": [{"key": "basic", "name": "Basics", "tutorials": ["MakeProject"]}], "completed": ["MakePro"#;
        fs::write(&path, truncated).unwrap();

        let err = ProgressStore::load(&path, groups()).unwrap_err();

        assert!(err.is_corruption());
        assert_eq!(fs::read_to_string(&path).unwrap(), truncated);
    }

    #[test]
    fn test_reset_keeps_backup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        fs::write(&path, "not json").unwrap();

        let (store, backup) = ProgressStore::reset(&path, groups()).unwrap();

        let backup = backup.expect("backup should exist");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "not json");
        assert!(store.state().completed.is_empty());
        assert!(ProgressStore::load(&path, groups()).is_ok());
    }

    #[test]
    fn test_last_view_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        let mut store = ProgressStore::load(&path, groups()).unwrap();
        store.set_last_view("basic", 2).unwrap();

        let reloaded = ProgressStore::load(&path, groups()).unwrap();
        assert_eq!(reloaded.state().last_group.as_deref(), Some("basic"));
        assert_eq!(reloaded.state().last_position, Some(2));
    }

    #[test]
    fn test_last_view_validates_position() {
        let temp = TempDir::new().unwrap();
        let mut store = ProgressStore::load(temp.path().join("state.json"), groups()).unwrap();

        assert!(matches!(
            store.set_last_view("server", 1),
            Err(ProgressError::PositionOutOfRange { len: 1, .. })
        ));
        assert!(matches!(
            store.set_last_group("missing"),
            Err(ProgressError::UnknownGroup(_))
        ));

        store.set_last_group("server").unwrap();
        assert!(store.set_last_position(3).is_err());
        store.set_last_position(0).unwrap();
        assert_eq!(store.state().last_position, Some(0));
    }

    #[test]
    fn test_changed_curriculum_replaces_groups_and_keeps_completions() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        let mut store = ProgressStore::load(&path, groups()).unwrap();
        store.mark_completed("MakeServer").unwrap();

        let smaller = vec![TutorialGroup::new("basic", "Basics", "", ["MakeProject"])];
        let reloaded = ProgressStore::load(&path, smaller.clone()).unwrap();

        assert_eq!(reloaded.groups(), smaller.as_slice());
        assert!(reloaded.is_completed("MakeServer"));
        assert_eq!(reloaded.total_progress(), 0.0);
    }

    #[test]
    fn test_set_current_records_name() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        let mut store = ProgressStore::load(&path, groups()).unwrap();
        store.set_current("ModifyToml").unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"current_tutorial\": \"ModifyToml\""));
        assert!(store.set_current("Unknown").is_err());
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("progress");
        let path = dir.join("state.json");
        let mut store = ProgressStore::load(&path, groups()).unwrap();

        // A plain file where the directory was makes every write fail
        fs::remove_dir_all(&dir).unwrap();
        fs::write(&dir, "blocker").unwrap();

        assert!(matches!(store.mark_completed("MakeProject"), Err(ProgressError::Io { .. })));
        assert!(!store.is_completed("MakeProject"));
        assert!(store.set_current("ModifyToml").is_err());
        assert!(store.state().current_tutorial.is_none());
        assert!(store.set_last_view("basic", 1).is_err());
        assert!(store.state().last_position.is_none());

        // Once writes work again the retry really persists
        fs::remove_file(&dir).unwrap();
        fs::create_dir_all(&dir).unwrap();
        assert!(store.mark_completed("MakeProject").unwrap());
        store.set_current("ModifyToml").unwrap();

        let reloaded = ProgressStore::load(&path, groups()).unwrap();
        assert!(reloaded.is_completed("MakeProject"));
        assert_eq!(reloaded.state().current_tutorial.as_deref(), Some("ModifyToml"));
    }

    #[test]
    fn test_backup_path_keeps_file_name() {
        let backup = backup_path(Path::new("/data/state.json"));
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("state.json.bak-"));
        assert_eq!(backup.parent(), Some(Path::new("/data")));
    }
}
