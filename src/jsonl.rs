// Append-only JSONL journal slot

use crate::slot::{Slot, validate_key};
use crate::store::now_ms;
use eyre::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One journal line: a full value written under a key at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JournalEntry {
    key: String,
    value: String,
    updated_at: i64,
}

/// Result of scanning a journal file
#[derive(Debug, Default)]
struct Journal {
    latest: Option<JournalEntry>,
    entries: usize,
}

/// Slot backed by one `{key}.jsonl` journal per key
///
/// Every save appends a line; load returns the last line written. Older lines stay
/// until `compact` drops them.
#[derive(Debug)]
pub struct JsonlSlot {
    base_path: PathBuf,
}

impl JsonlSlot {
    /// Open or create a journal directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create journal directory")?;
        debug!(path = ?base_path, "Opened JSONL slot");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn journal_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", key))
    }

    /// Lock file guarding a key's journal; kept apart from the journal so
    /// compaction can replace the journal file underneath it
    fn lock_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl.lock", key))
    }

    /// Rewrite a journal so it holds only its newest entry
    ///
    /// Returns the number of superseded entries dropped.
    pub fn compact(&mut self, key: &str) -> Result<usize> {
        validate_key(key)?;
        let path = self.journal_path(key);
        if !path.exists() {
            return Ok(0);
        }

        let _lock = lock_exclusive(&self.lock_path(key))?;

        let journal = read_journal(&path)?;
        let Some(latest) = journal.latest else {
            return Ok(0);
        };

        let tmp_path = path.with_extension("jsonl.tmp");
        {
            let mut tmp = File::create(&tmp_path).context("Failed to create compacted journal")?;
            writeln!(tmp, "{}", serde_json::to_string(&latest)?)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &path).context("Failed to replace journal with compacted copy")?;

        let dropped = journal.entries.saturating_sub(1);
        info!(key, dropped, "Compacted JSONL journal");
        Ok(dropped)
    }
}

impl Slot for JsonlSlot {
    fn load(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let journal = read_journal(&self.journal_path(key))?;
        Ok(journal.latest.map(|entry| entry.value))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let entry = JournalEntry {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: now_ms(),
        };
        let _lock = lock_exclusive(&self.lock_path(key))?;
        append_entry(&self.journal_path(key), &entry)
    }
}

/// Take an exclusive lock on `path`, creating it if needed
///
/// The lock is released when the returned file is dropped.
fn lock_exclusive(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .context("Failed to open journal lock file")?;
    file.lock_exclusive().context("Failed to acquire file lock")?;
    Ok(file)
}

/// Append one entry and flush it to disk; callers hold the journal lock
fn append_entry(path: &Path, entry: &JournalEntry) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open JSONL journal for appending")?;

    let json = serde_json::to_string(entry)?;
    writeln!(file, "{}", json)?;
    file.sync_all()?;

    Ok(())
}

/// Scan a journal, keeping the last entry written
///
/// Line order is authoritative; `updated_at` is informational only.
/// Unreadable or malformed lines are skipped.
fn read_journal(path: &Path) -> Result<Journal> {
    if !path.exists() {
        return Ok(Journal::default());
    }

    let file = File::open(path).context("Failed to open JSONL journal")?;
    let reader = BufReader::new(file);
    let mut journal = Journal::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let entry: JournalEntry = match serde_json::from_str(&line) {
            Ok(e) => e,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
                continue;
            }
        };

        journal.entries += 1;
        journal.latest = Some(entry);
    }

    debug!(file = ?path, entries = journal.entries, "Scanned JSONL journal");
    Ok(journal)
}
