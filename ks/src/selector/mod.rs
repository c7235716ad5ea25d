//! Navigation selector
//!
//! Browsing loop over the grouped menu: draw the view, read one key, move the
//! cursor or run the tutorial under it. Cursor moves are persisted as they
//! happen so an interrupted session resumes where it stopped. A tutorial is
//! marked complete only when its runner reports `Completed`.

pub mod keys;
mod nav;
mod view;

pub use keys::{ByteKeys, KeyDecoder, KeySource, LogicalKey, TerminalKeys, decode_all, from_key_event};
pub use nav::{NavAction, Navigator};
pub use view::{GroupRow, MenuView, TutorialRow};

use eyre::Result;
use progressstore::{ProgressError, ProgressStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::session::Session;
use crate::tui::MenuScreen;
use crate::tutorial::{Catalog, Outcome, run_tutorial};

/// What the selector does once a tutorial returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AfterTutorial {
    /// Go back to browsing
    #[default]
    Menu,
    /// Leave the selector with the tutorial's outcome
    Exit,
}

/// How the selector loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorExit {
    /// The user quit without (further) selection
    Quit,
    /// A tutorial ran and the caller asked to stop afterwards
    Ran { name: String, outcome: Outcome },
}

/// Browsing/Running state machine over the progress store
pub struct Selector {
    store: ProgressStore,
    catalog: Catalog,
    session: Session,
    keys: Box<dyn KeySource>,
    screen: Box<dyn MenuScreen>,
    after: AfterTutorial,
    nav: Navigator,
    notice: Option<String>,
}

impl Selector {
    /// Build a selector; fails when a configured group names an unknown tutorial
    pub fn new(
        store: ProgressStore,
        catalog: Catalog,
        session: Session,
        keys: Box<dyn KeySource>,
        screen: Box<dyn MenuScreen>,
    ) -> Result<Self> {
        catalog.validate_groups(store.groups())?;
        let state = store.state();
        let nav = Navigator::restore(&state.groups, state.last_group.as_deref(), state.last_position);
        debug!(group = nav.group_index(), position = nav.position(), "Selector::new: restored cursor");
        Ok(Self {
            store,
            catalog,
            session,
            keys,
            screen,
            after: AfterTutorial::default(),
            nav,
            notice: None,
        })
    }

    /// Set the post-tutorial policy
    pub fn with_after(mut self, after: AfterTutorial) -> Self {
        self.after = after;
        self
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn navigator(&self) -> Navigator {
        self.nav
    }

    /// Hand the store back, e.g. to print a summary
    pub fn into_store(self) -> ProgressStore {
        self.store
    }

    /// Current menu projection
    pub fn view(&self) -> MenuView {
        MenuView::build(
            self.store.state(),
            &self.catalog,
            &self.nav,
            &self.session.i18n,
            self.notice.as_deref(),
        )
    }

    /// Browse until the user quits (or a tutorial ends, under `AfterTutorial::Exit`)
    pub fn run(&mut self) -> Result<SelectorExit> {
        info!("Selector started");
        loop {
            let view = self.view();
            self.screen.draw(&view)?;

            let key = self.keys.next_key()?;
            match self.nav.apply(key, self.store.groups()) {
                NavAction::Moved => {
                    self.notice = None;
                    self.persist_view();
                }
                NavAction::Run(name) => {
                    let outcome = self.run_selected(&name)?;
                    if self.after == AfterTutorial::Exit {
                        return Ok(SelectorExit::Ran { name, outcome });
                    }
                }
                NavAction::Quit => {
                    info!("Selector quit");
                    return Ok(SelectorExit::Quit);
                }
                NavAction::Ignored => {}
            }
        }
    }

    fn persist_view(&mut self) {
        let Some(key) = self.nav.current_group(self.store.groups()).map(|g| g.key.clone()) else {
            return;
        };
        if let Err(e) = self.store.set_last_view(&key, self.nav.position()) {
            self.save_failed(e);
        }
    }

    fn save_failed(&mut self, err: ProgressError) {
        warn!(error = %err, "Failed to persist progress");
        self.notice = Some(self.session.format("selector.save_failed", &[("error", &err.to_string())]));
    }

    /// Running state: the tutorial owns the terminal until it returns
    fn run_selected(&mut self, name: &str) -> Result<Outcome> {
        info!(%name, "Running tutorial from menu");
        self.notice = None;
        if let Err(e) = self.store.set_current(name) {
            self.save_failed(e);
        }

        self.screen.suspend()?;
        let outcome = match self.catalog.instantiate(name) {
            Some(mut tutorial) => run_tutorial(tutorial.as_mut(), &mut self.session),
            None => {
                let msg = self.session.format("selector.unknown_tutorial", &[("name", name)]);
                self.session.display.error(&msg);
                Outcome::Incomplete
            }
        };

        if outcome == Outcome::Completed {
            match self.store.mark_completed(name) {
                Ok(_) => {
                    self.notice = Some(self.session.format("selector.marked_complete", &[("name", name)]));
                }
                Err(e) => self.save_failed(e),
            }
        }

        if self.after == AfterTutorial::Menu {
            let prompt = self.session.text("runner.press_key");
            if self.session.input.pause(&prompt).is_err() {
                debug!("Selector::run_selected: acknowledgement cancelled");
            }
        }
        self.screen.resume()?;
        debug!(%name, ?outcome, "Selector::run_selected: returning to menu");
        Ok(outcome)
    }
}
