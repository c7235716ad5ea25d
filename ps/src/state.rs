//! Persisted progress document and the values derived from it

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, ordered bucket of tutorials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialGroup {
    /// Machine key, stable across runs
    pub key: String,

    /// Display label
    pub name: String,

    /// Short explanatory text
    #[serde(default)]
    pub description: String,

    /// Tutorial identifiers in menu order
    pub tutorials: Vec<String>,
}

impl TutorialGroup {
    /// Create a group from its parts
    pub fn new<I, S>(key: impl Into<String>, name: impl Into<String>, description: impl Into<String>, tutorials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
            tutorials: tutorials.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of tutorials in the group
    pub fn len(&self) -> usize {
        self.tutorials.len()
    }

    /// True when the group has no tutorials
    pub fn is_empty(&self) -> bool {
        self.tutorials.is_empty()
    }

    /// True when the group lists the given tutorial
    pub fn contains(&self, name: &str) -> bool {
        self.tutorials.iter().any(|t| t == name)
    }

    /// Tutorial identifier at a menu position
    pub fn tutorial_at(&self, position: usize) -> Option<&str> {
        self.tutorials.get(position).map(String::as_str)
    }
}

/// The persisted progress record
///
/// `groups` keeps declaration order, which is also display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Curriculum groups in declaration order
    pub groups: Vec<TutorialGroup>,

    /// Tutorials marked done
    ///
    /// May still hold names that a later curriculum dropped; progress figures
    /// only count names present in `groups`.
    #[serde(default)]
    pub completed: BTreeSet<String>,

    /// Last tutorial the user started
    #[serde(default)]
    pub current_tutorial: Option<String>,

    /// Cursor index within `last_group`
    #[serde(default)]
    pub last_position: Option<usize>,

    /// Key of the last viewed group
    #[serde(default)]
    pub last_group: Option<String>,

    /// When the document was last written
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressState {
    /// Fresh state for the given curriculum
    pub fn new(groups: Vec<TutorialGroup>) -> Self {
        Self {
            groups,
            ..Default::default()
        }
    }

    /// Look up a group by key
    pub fn group(&self, key: &str) -> Option<&TutorialGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    /// Declaration index of a group
    pub fn group_index(&self, key: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.key == key)
    }

    /// True when any group lists the tutorial
    pub fn knows_tutorial(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.contains(name))
    }

    /// Every tutorial identifier across all groups, deduplicated
    pub fn all_tutorials(&self) -> BTreeSet<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.tutorials.iter().map(String::as_str))
            .collect()
    }

    /// True when the tutorial is marked done
    pub fn is_completed(&self, name: &str) -> bool {
        self.completed.contains(name)
    }

    /// Fraction of a group's tutorials that are done; 0.0 for unknown or empty groups
    pub fn group_progress(&self, key: &str) -> f64 {
        match self.group(key) {
            Some(group) => {
                let done = group.tutorials.iter().filter(|t| self.completed.contains(*t)).count();
                ratio(done, group.len())
            }
            None => 0.0,
        }
    }

    /// Fraction of all tutorials that are done
    pub fn total_progress(&self) -> f64 {
        let all = self.all_tutorials();
        let done = all.iter().filter(|t| self.completed.contains(**t)).count();
        ratio(done, all.len())
    }
}

/// `done / total`, defined as 0.0 when `total` is zero
pub fn ratio(done: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { done as f64 / total as f64 }
}
