// Configuration loaded from YAML

use crate::jsonl::JsonlSlot;
use crate::slot::{MemorySlot, Slot};
use crate::sqlite::SqliteSlot;
use crate::store::{State, TodoStore};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const APP_DIR: &str = "todostore";
const CONFIG_FILE: &str = "config.yaml";

/// Where the store's snapshot is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Nothing survives the process; for tests and demos only
    Memory,
    #[default]
    Jsonl,
    Sqlite,
}

impl Backend {
    /// Open a slot of this kind rooted at `data_dir`
    pub fn open(self, data_dir: &Path) -> Result<Box<dyn Slot>> {
        debug!(backend = ?self, data_dir = ?data_dir, "Opening slot");
        Ok(match self {
            Backend::Memory => Box::new(MemorySlot::new()),
            Backend::Jsonl => Box::new(JsonlSlot::open(data_dir)?),
            Backend::Sqlite => Box::new(SqliteSlot::open(data_dir)?),
        })
    }
}

impl FromStr for Backend {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "jsonl" => Ok(Backend::Jsonl),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(eyre!("Unknown backend: {} (expected memory, jsonl or sqlite)", other)),
        }
    }
}

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Start with the demo tasks when nothing is persisted yet
    pub seed_demo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
            seed_demo: true,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default config file is
    /// read when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = ?path, ?config, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document means all defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse YAML config")
    }

    /// Open and initialize the durable store this config describes
    ///
    /// Each CLI command runs in its own process, so the memory backend is
    /// refused here: every change would be lost on exit.
    pub fn open_store(&self) -> Result<TodoStore<Box<dyn Slot>>> {
        if self.backend == Backend::Memory {
            return Err(eyre!(
                "The memory backend keeps nothing between commands; use jsonl or sqlite"
            ));
        }

        let slot = self.backend.open(&self.data_dir)?;
        let mut store = if self.seed_demo {
            TodoStore::new(slot)
        } else {
            TodoStore::with_state(slot, State::default())
        };
        store.initialize()?;
        Ok(store)
    }
}

/// `<local data dir>/todostore`, or `./.todostore` when the platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".todostore"))
}

/// `<config dir>/todostore/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
