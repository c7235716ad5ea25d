//! Directory that tutorials build in

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use regex::Regex;
use tracing::trace;

/// Root directory plus file checks used by step predicates
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a workspace-relative file
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    /// True when the relative path exists
    pub fn exists(&self, rel: impl AsRef<Path>) -> bool {
        self.path(rel).exists()
    }

    /// Contents of a file, or None when it does not exist
    pub fn read(&self, rel: impl AsRef<Path>) -> Result<Option<String>> {
        let path = self.path(rel);
        trace!(path = %path.display(), "Workspace::read: called");
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    /// True when the file exists and contains every needle
    pub fn contains_all(&self, rel: impl AsRef<Path>, needles: &[&str]) -> Result<bool> {
        Ok(self
            .read(rel)?
            .is_some_and(|content| needles.iter().all(|n| content.contains(n))))
    }

    /// True when the file exists and matches every pattern
    pub fn matches_all(&self, rel: impl AsRef<Path>, patterns: &[&str]) -> Result<bool> {
        let Some(content) = self.read(rel)? else {
            return Ok(false);
        };
        for pattern in patterns {
            let re = Regex::new(pattern).context(format!("Invalid pattern: {}", pattern))?;
            if !re.is_match(&content) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
