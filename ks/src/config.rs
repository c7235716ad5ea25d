//! Kickstart configuration types and loading

use eyre::{Context, Result};
use progressstore::TutorialGroup;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::i18n::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};
use crate::selector::AfterTutorial;

/// Main Kickstart configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// UI language code
    pub language: String,

    /// Preferred editor command; falls back to $VISUAL/$EDITOR detection
    pub editor: Option<String>,

    /// Progress document location
    #[serde(rename = "state-file")]
    pub state_file: Option<PathBuf>,

    /// Directory the tutorials create files in
    pub workspace: Option<PathBuf>,

    /// Log level used when none is given on the command line
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Whether the menu comes back after a tutorial
    #[serde(rename = "after-tutorial")]
    pub after_tutorial: AfterTutorial,

    /// Menu groups in display order
    pub groups: Vec<TutorialGroup>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            editor: None,
            state_file: None,
            workspace: None,
            log_level: None,
            after_tutorial: AfterTutorial::default(),
            groups: default_groups(),
        }
    }
}

/// Built-in curriculum layout
pub fn default_groups() -> Vec<TutorialGroup> {
    vec![
        TutorialGroup::new(
            "basic",
            "Getting Started",
            "Create a project and make it runnable",
            ["MakeProject", "ModifyToml", "ModifyInit"],
        ),
        TutorialGroup::new(
            "server",
            "Building a Server",
            "Write an MCP weather server step by step",
            ["MakeServer"],
        ),
        TutorialGroup::new(
            "client",
            "Building a Client",
            "Connect to MCP servers from your own client",
            ["FastMcpClient"],
        ),
    ]
}

impl Config {
    /// Validate configuration before use
    ///
    /// Catches problems that deserialization alone lets through: an unknown
    /// language and duplicate group keys.
    pub fn validate(&self) -> Result<()> {
        let language = self.language.trim().to_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return Err(eyre::eyre!(
                "Unsupported language '{}'. Available: {}",
                self.language,
                SUPPORTED_LANGUAGES.join(", ")
            ));
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.key.trim().is_empty() {
                return Err(eyre::eyre!("Group '{}' has an empty key", group.name));
            }
            if !seen.insert(group.key.as_str()) {
                return Err(eyre::eyre!("Duplicate group key '{}'", group.key));
            }
        }
        Ok(())
    }

    /// Progress document path, configured or default
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(progressstore::default_state_path)
    }

    /// Workspace root, configured or the current directory
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .kickstart.yml
        let local_config = PathBuf::from(".kickstart.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/kickstart/kickstart.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Peek at the configured log level before logging is set up
    ///
    /// Errors are swallowed here; `load` reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => std::iter::once(PathBuf::from(".kickstart.yml"))
                .chain(user_config_path())
                .collect(),
        };
        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(p).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kickstart").join("kickstart.yml"))
}
