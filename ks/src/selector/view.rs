//! Menu projection, computed fresh from state and cursor on every draw

use progressstore::ProgressState;

use super::nav::Navigator;
use crate::i18n::Translator;
use crate::tutorial::Catalog;

/// One tutorial row of the selected group
#[derive(Debug, Clone, PartialEq)]
pub struct TutorialRow {
    pub name: String,
    pub description: String,
    pub completed: bool,
    pub cursor: bool,
}

/// One group line; rows are filled only for the selected group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: String,
    pub label: String,
    pub description: String,
    pub progress: f64,
    pub selected: bool,
    pub tutorials: Vec<TutorialRow>,
}

/// Everything a screen needs to draw the menu
#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub title: String,
    pub total_label: String,
    pub total_progress: f64,
    pub groups: Vec<GroupRow>,
    pub hint: String,
    /// Shown when the selected group has nothing to browse
    pub empty: Option<String>,
    /// One-line status such as a save failure or a completion notice
    pub notice: Option<String>,
}

impl MenuView {
    pub fn build(
        state: &ProgressState,
        catalog: &Catalog,
        nav: &Navigator,
        i18n: &Translator,
        notice: Option<&str>,
    ) -> Self {
        let groups: Vec<GroupRow> = state
            .groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let selected = index == nav.group_index();
                let tutorials = if selected {
                    group
                        .tutorials
                        .iter()
                        .enumerate()
                        .map(|(pos, name)| TutorialRow {
                            name: name.clone(),
                            description: tutorial_description(name, catalog, i18n),
                            completed: state.is_completed(name),
                            cursor: pos == nav.position(),
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                GroupRow {
                    key: group.key.clone(),
                    label: translated_or(i18n, &format!("group.{}.name", group.key), &group.name),
                    description: translated_or(i18n, &format!("group.{}.description", group.key), &group.description),
                    progress: state.group_progress(&group.key),
                    selected,
                    tutorials,
                }
            })
            .collect();

        let empty = groups
            .iter()
            .find(|g| g.selected)
            .is_none_or(|g| g.tutorials.is_empty())
            .then(|| i18n.text("menu.empty").to_string());

        Self {
            title: i18n.text("menu.title").to_string(),
            total_label: i18n.text("menu.total").to_string(),
            total_progress: state.total_progress(),
            groups,
            hint: i18n.text("menu.hint").to_string(),
            empty,
            notice: notice.map(str::to_string),
        }
    }

    /// The selected group, if any
    pub fn selected(&self) -> Option<&GroupRow> {
        self.groups.iter().find(|g| g.selected)
    }
}

fn translated_or(i18n: &Translator, key: &str, fallback: &str) -> String {
    i18n.get(key).unwrap_or(fallback).to_string()
}

fn tutorial_description(name: &str, catalog: &Catalog, i18n: &Translator) -> String {
    let fallback = catalog.get(name).map_or("", |d| d.description);
    translated_or(i18n, &format!("tutorial.{}.description", name), fallback)
}
