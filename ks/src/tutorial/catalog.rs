//! Static tutorial registry
//!
//! Tutorials are registered explicitly with a factory function. Group
//! membership comes from configuration and is validated against the registry
//! up front, so a typo in a curriculum fails at startup instead of silently
//! dropping a tutorial from the menu.

use std::collections::HashSet;

use progressstore::TutorialGroup;
use thiserror::Error;
use tracing::debug;

use super::Tutorial;

/// Builds a fresh tutorial instance
pub type TutorialFactory = fn() -> Box<dyn Tutorial>;

/// Errors in the catalog or in a curriculum that references it
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Tutorial {0} is registered more than once")]
    DuplicateRegistration(String),

    #[error("Group {group} references unknown tutorial {tutorial}")]
    UnknownTutorial { group: String, tutorial: String },

    #[error("Group {group} lists tutorial {tutorial} more than once")]
    DuplicateTutorial { group: String, tutorial: String },

    #[error("Group key {0} is declared more than once")]
    DuplicateGroup(String),
}

/// Identity of one registered tutorial
#[derive(Debug, Clone)]
pub struct TutorialDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    factory: TutorialFactory,
}

impl TutorialDescriptor {
    /// Describe a tutorial by asking a throwaway instance for its identity
    pub fn new(factory: TutorialFactory) -> Self {
        let sample = factory();
        Self {
            name: sample.name(),
            description: sample.description(),
            factory,
        }
    }

    /// Fresh instance, starting at step 1
    pub fn instantiate(&self) -> Box<dyn Tutorial> {
        (self.factory)()
    }
}

/// Ordered set of registered tutorials
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<TutorialDescriptor>,
}

impl Catalog {
    /// Register factories in order
    pub fn new(factories: &[TutorialFactory]) -> Result<Self, CatalogError> {
        let mut entries: Vec<TutorialDescriptor> = Vec::with_capacity(factories.len());
        for factory in factories {
            let descriptor = TutorialDescriptor::new(*factory);
            if entries.iter().any(|e| e.name == descriptor.name) {
                return Err(CatalogError::DuplicateRegistration(descriptor.name.to_string()));
            }
            entries.push(descriptor);
        }
        debug!(count = entries.len(), "Catalog::new: registered tutorials");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TutorialDescriptor> {
        self.entries.iter()
    }

    /// Registered names in order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn get(&self, name: &str) -> Option<&TutorialDescriptor> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Fresh instance of a registered tutorial
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Tutorial>> {
        self.get(name).map(TutorialDescriptor::instantiate)
    }

    /// Fail fast on groups that cannot be shown faithfully
    pub fn validate_groups(&self, groups: &[TutorialGroup]) -> Result<(), CatalogError> {
        let mut keys = HashSet::new();
        for group in groups {
            if !keys.insert(group.key.as_str()) {
                return Err(CatalogError::DuplicateGroup(group.key.clone()));
            }
            let mut seen = HashSet::new();
            for tutorial in &group.tutorials {
                if self.get(tutorial).is_none() {
                    return Err(CatalogError::UnknownTutorial {
                        group: group.key.clone(),
                        tutorial: tutorial.clone(),
                    });
                }
                if !seen.insert(tutorial.as_str()) {
                    return Err(CatalogError::DuplicateTutorial {
                        group: group.key.clone(),
                        tutorial: tutorial.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
