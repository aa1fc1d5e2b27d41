// Durable key-value slot the store persists into

use eyre::{Result, eyre};
use std::collections::HashMap;

/// Well-known key the store writes its snapshot under
pub const STATE_KEY: &str = "state";

/// A flat key-value slot holding text blobs
///
/// `load` returns `Ok(None)` for a key that was never written. Writes replace
/// the whole value; there are no partial writes.
pub trait Slot {
    /// Read the value stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: Slot + ?Sized> Slot for Box<S> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }
}

/// In-process slot; nothing survives the process
///
/// Counts writes so callers can check whether an operation persisted.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`, without counting a write
    pub fn with_entry(key: &str, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), value.into());
        Self { entries, writes: 0 }
    }

    /// Number of successful `save` calls
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Slot for MemorySlot {
    fn load(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Keys double as file names for the journal backend
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Slot key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Slot key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid slot key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}
