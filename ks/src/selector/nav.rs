//! Cursor state machine over (group, position)

use progressstore::TutorialGroup;
use tracing::debug;

use super::keys::LogicalKey;

/// Result of applying one key to the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Group or position changed (or was re-affirmed by a wrap in a one-row group)
    Moved,
    /// Confirm on a resolvable row
    Run(String),
    Quit,
    Ignored,
}

/// Menu cursor; holds indices only, the groups are passed in on every call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    group: usize,
    position: usize,
}

impl Navigator {
    /// Cursor from the last saved view, or the first group at position 0
    pub fn restore(groups: &[TutorialGroup], last_group: Option<&str>, last_position: Option<usize>) -> Self {
        let restored = last_group
            .and_then(|key| groups.iter().position(|g| g.key == key))
            .and_then(|group| {
                let position = last_position.unwrap_or(0);
                (position < groups[group].len().max(1)).then_some(Self { group, position })
            });
        debug!(?last_group, ?last_position, ?restored, "Navigator::restore: called");
        restored.unwrap_or_default()
    }

    pub fn group_index(&self) -> usize {
        self.group
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Group under the cursor
    pub fn current_group<'a>(&self, groups: &'a [TutorialGroup]) -> Option<&'a TutorialGroup> {
        groups.get(self.group)
    }

    /// Tutorial under the cursor
    pub fn current_tutorial<'a>(&self, groups: &'a [TutorialGroup]) -> Option<&'a str> {
        self.current_group(groups).and_then(|g| g.tutorial_at(self.position))
    }

    pub fn apply(&mut self, key: LogicalKey, groups: &[TutorialGroup]) -> NavAction {
        let len = self.current_group(groups).map_or(0, TutorialGroup::len);
        let action = match key {
            LogicalKey::Up | LogicalKey::Down if len == 0 => NavAction::Ignored,
            LogicalKey::Up => {
                self.position = (self.position.min(len - 1) + len - 1) % len;
                NavAction::Moved
            }
            LogicalKey::Down => {
                self.position = (self.position.min(len - 1) + 1) % len;
                NavAction::Moved
            }
            LogicalKey::Left | LogicalKey::Right if groups.is_empty() => NavAction::Ignored,
            LogicalKey::Left => {
                let count = groups.len();
                self.group = (self.group.min(count - 1) + count - 1) % count;
                self.position = 0;
                NavAction::Moved
            }
            LogicalKey::Right => {
                let count = groups.len();
                self.group = (self.group.min(count - 1) + 1) % count;
                self.position = 0;
                NavAction::Moved
            }
            LogicalKey::Confirm => match self.current_tutorial(groups) {
                Some(name) => NavAction::Run(name.to_string()),
                None => NavAction::Ignored,
            },
            LogicalKey::Quit | LogicalKey::Cancel => NavAction::Quit,
            LogicalKey::Char(_) => NavAction::Ignored,
        };
        debug!(?key, group = self.group, position = self.position, ?action, "Navigator::apply: called");
        action
    }
}
