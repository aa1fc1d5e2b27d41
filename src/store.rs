// Task store: in-memory task list persisted to a key-value slot

use crate::error::StoreError;
use crate::filter::Filter;
use crate::slot::{STATE_KEY, Slot};
use crate::task::Task;
use eyre::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

/// Demo tasks every fresh store starts with
pub const SEED_DESCRIPTIONS: [&str; 5] = [
    "Soul Stone",
    "Infinity Stone",
    "Time Stone",
    "Power Stone",
    "Reality Stone",
];

/// Everything the store persists: the task list and the active filter
///
/// Missing fields deserialize to an empty list and `Filter::All`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "lenient_filter")]
    pub filter: Filter,
}

impl State {
    /// The five demo tasks with the filter on All
    pub fn seeded() -> Self {
        Self {
            tasks: SEED_DESCRIPTIONS.into_iter().map(Task::new).collect(),
            filter: Filter::All,
        }
    }
}

/// Unrecognized stored filters fall back to All instead of failing the restore
fn lenient_filter<'de, D>(deserializer: D) -> std::result::Result<Filter, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw {
        None => Filter::All,
        Some(name) => name.parse().unwrap_or_else(|e| {
            warn!(filter = %name, error = %e, "Unrecognized stored filter, using all");
            Filter::All
        }),
    })
}

/// Single source of truth for tasks and the active filter
///
/// Every mutation writes the full state to the slot before returning.
pub struct TodoStore<S: Slot> {
    slot: S,
    state: State,
}

impl<S: Slot> TodoStore<S> {
    /// Create a store holding the seeded demo tasks
    ///
    /// Nothing is read from the slot until `initialize` or `restore` runs.
    pub fn new(slot: S) -> Self {
        Self::with_state(slot, State::seeded())
    }

    /// Create a store starting from an explicit state
    pub fn with_state(slot: S, state: State) -> Self {
        Self { slot, state }
    }

    /// Restore any persisted snapshot and log the startup state
    ///
    /// With no snapshot, the current (seeded) state is written out so the
    /// ids it hands out stay valid in later processes.
    pub fn initialize(&mut self) -> Result<()> {
        let restored = self.restore()?;
        if !restored {
            self.persist()?;
        }
        info!(
            restored,
            tasks = self.state.tasks.len(),
            filter = %self.state.filter,
            "Store initialized"
        );
        Ok(())
    }

    /// Replace the in-memory state with the persisted snapshot, if one exists
    ///
    /// Returns false (and changes nothing) when the slot holds no snapshot.
    pub fn restore(&mut self) -> Result<bool> {
        let Some(json) = self.slot.load(STATE_KEY)? else {
            debug!("No persisted snapshot, keeping current state");
            return Ok(false);
        };

        let snapshot: State = serde_json::from_str(&json).context("Failed to deserialize persisted state")?;
        self.state = snapshot;

        debug!(tasks = self.state.tasks.len(), filter = %self.state.filter, "Restored snapshot");
        Ok(true)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Copy of the tasks that pass `filter`, in insertion order
    pub fn list_tasks(&self, filter: Filter) -> Vec<Task> {
        self.state.tasks.iter().filter(|task| filter.matches(task)).cloned().collect()
    }

    /// Tasks that pass the active filter
    pub fn visible_tasks(&self) -> Vec<Task> {
        self.list_tasks(self.state.filter)
    }

    pub fn current_filter(&self) -> Filter {
        self.state.filter
    }

    /// Number of tasks not yet done, regardless of the active filter
    pub fn pending_count(&self) -> usize {
        self.state.tasks.iter().filter(|task| !task.done).count()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut S {
        &mut self.slot
    }

    /// Give up the store, keeping its persistence slot
    pub fn into_slot(self) -> S {
        self.slot
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new pending task
    ///
    /// An empty or whitespace-only description is an `InvalidArgument` and
    /// leaves both state and slot untouched.
    pub fn add_task(&mut self, description: &str) -> Result<()> {
        Self::validate_description(description)?;

        let task = Task::new(description);
        debug!(id = %task.id, "add_task: appending");
        self.state.tasks.push(task);

        self.persist()
    }

    /// Flip the done flag of the task with this id
    ///
    /// An unknown id is not an error. Returns whether a task matched.
    pub fn toggle_task(&mut self, id: &str) -> Result<bool> {
        let found = match self.state.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.toggle();
                debug!(id, done = task.done, "toggle_task: toggled");
                true
            }
            None => {
                debug!(id, "toggle_task: no matching task");
                false
            }
        };

        self.persist()?;
        Ok(found)
    }

    /// Remove the task with this id, keeping the order of the rest
    ///
    /// An unknown id is not an error. Returns whether a task was removed.
    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        let before = self.state.tasks.len();
        self.state.tasks.retain(|task| task.id != id);
        let removed = self.state.tasks.len() < before;
        debug!(id, removed, "delete_task");

        self.persist()?;
        Ok(removed)
    }

    /// Remove every done task; returns how many were removed
    pub fn delete_completed(&mut self) -> Result<usize> {
        let before = self.state.tasks.len();
        self.state.tasks.retain(|task| !task.done);
        let removed = before - self.state.tasks.len();
        debug!(removed, "delete_completed");

        self.persist()?;
        Ok(removed)
    }

    /// Make `filter` the active filter
    ///
    /// Textual input goes through `Filter::from_str`, which rejects unknown
    /// names before this is ever called.
    pub fn set_filter(&mut self, filter: Filter) -> Result<()> {
        self.state.filter = filter;
        debug!(filter = %filter, "set_filter");
        self.persist()
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.state).context("Failed to serialize state")?;
        self.slot.save(STATE_KEY, &json).context("Failed to persist state")?;
        Ok(())
    }

    fn validate_description(description: &str) -> Result<()> {
        if description.trim().is_empty() {
            return Err(StoreError::invalid_argument("Description is required").into());
        }
        Ok(())
    }
}

// Helper function for timestamps
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_invalid_argument;
    use crate::jsonl::JsonlSlot;
    use crate::slot::MemorySlot;
    use crate::sqlite::SqliteSlot;
    use tempfile::TempDir;

    /// Store whose tasks have the given done flags, in order
    fn store_with(done_flags: &[bool]) -> TodoStore<MemorySlot> {
        let tasks = done_flags
            .iter()
            .enumerate()
            .map(|(i, done)| {
                let mut task = Task::new(format!("task {}", i));
                task.done = *done;
                task
            })
            .collect();
        TodoStore::with_state(
            MemorySlot::new(),
            State {
                tasks,
                filter: Filter::All,
            },
        )
    }

    fn tasks_json<S: Slot>(store: &TodoStore<S>) -> String {
        serde_json::to_string(store.tasks()).unwrap()
    }

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_new_store_is_seeded() {
        let store = TodoStore::new(MemorySlot::new());

        assert_eq!(store.tasks().len(), 5);
        assert_eq!(store.current_filter(), Filter::All);
        assert!(store.tasks().iter().all(|t| !t.done));
        let descriptions: Vec<&str> = store.tasks().iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, SEED_DESCRIPTIONS);
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn test_list_tasks_filters() {
        let store = store_with(&[true, false, true, false, false]);

        let all = store.list_tasks(Filter::All);
        assert_eq!(all.len(), 5);

        let completed = store.list_tasks(Filter::Completed);
        assert_eq!(completed.len(), 2);
        assert!(completed.iter().all(|t| t.done));

        let pending = store.list_tasks(Filter::Pending);
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().all(|t| !t.done));

        // Order is preserved within each filter
        assert_eq!(completed[0].description, "task 0");
        assert_eq!(completed[1].description, "task 2");
    }

    #[test]
    fn test_list_tasks_returns_copy() {
        let store = store_with(&[false]);

        let mut listed = store.list_tasks(Filter::All);
        listed[0].done = true;
        listed.clear();

        assert_eq!(store.tasks().len(), 1);
        assert!(!store.tasks()[0].done);
    }

    #[test]
    fn test_add_task_appends_pending_task() {
        let mut store = TodoStore::new(MemorySlot::new());
        let before = store.list_tasks(Filter::All);

        store.add_task("buy milk").unwrap();

        let after = store.list_tasks(Filter::All);
        assert_eq!(after.len(), before.len() + 1);

        let added = after.last().unwrap();
        assert_eq!(added.description, "buy milk");
        assert!(!added.done);
        assert!(before.iter().all(|t| t.id != added.id));
        assert_eq!(store.slot().writes(), 1);
    }

    #[test]
    fn test_add_task_rejects_empty_description() {
        let mut store = TodoStore::new(MemorySlot::new());
        let before = tasks_json(&store);

        for description in ["", "   "] {
            let err = store.add_task(description).unwrap_err();
            assert!(is_invalid_argument(&err));
        }

        assert_eq!(tasks_json(&store), before);
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn test_toggle_twice_restores_flag() {
        let mut store = store_with(&[false, true]);
        let id = store.tasks()[0].id.clone();

        assert!(store.toggle_task(&id).unwrap());
        assert!(store.tasks()[0].done);

        assert!(store.toggle_task(&id).unwrap());
        assert!(!store.tasks()[0].done);

        // The other task is untouched
        assert!(store.tasks()[1].done);
        assert_eq!(store.slot().writes(), 2);
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let mut store = store_with(&[false, true, false]);
        let before = tasks_json(&store);

        let found = store.toggle_task("nonexistent").unwrap();

        assert!(!found);
        assert_eq!(tasks_json(&store), before);
        // Still persists
        assert_eq!(store.slot().writes(), 1);
    }

    #[test]
    fn test_delete_task_preserves_order() {
        let mut store = store_with(&[false, false, false]);
        let ids: Vec<String> = store.tasks().iter().map(|t| t.id.clone()).collect();

        assert!(store.delete_task(&ids[1]).unwrap());

        let remaining: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str()]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = store_with(&[false, true]);
        let before = tasks_json(&store);

        assert!(!store.delete_task("nonexistent").unwrap());
        assert_eq!(tasks_json(&store), before);
        assert_eq!(store.slot().writes(), 1);
    }

    #[test]
    fn test_delete_completed() {
        let mut store = store_with(&[true, false, true]);
        let pending_id = store.tasks()[1].id.clone();

        let removed = store.delete_completed().unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].id, pending_id);
        assert!(!store.tasks()[0].done);
    }

    #[test]
    fn test_delete_completed_none_done() {
        let mut store = store_with(&[false, false]);

        assert_eq!(store.delete_completed().unwrap(), 0);
        assert_eq!(store.tasks().len(), 2);
    }

    #[test]
    fn test_set_filter() {
        let mut store = store_with(&[true, false]);

        store.set_filter(Filter::Completed).unwrap();
        assert_eq!(store.current_filter(), Filter::Completed);
        assert_eq!(store.visible_tasks().len(), 1);
        assert!(store.visible_tasks()[0].done);

        let persisted = store.slot().get(STATE_KEY).unwrap();
        assert!(persisted.contains("\"filter\":\"Completed\""));
    }

    #[test]
    fn test_invalid_filter_name_leaves_filter_unchanged() {
        let mut store = store_with(&[false]);
        store.set_filter(Filter::Pending).unwrap();
        let writes = store.slot().writes();

        let result = "bogus".parse::<Filter>().map_err(eyre::Report::from).and_then(|f| store.set_filter(f));

        let err = result.unwrap_err();
        assert!(is_invalid_argument(&err));
        assert!(err.to_string().contains("bogus"));
        assert_eq!(store.current_filter(), Filter::Pending);
        assert_eq!(store.slot().writes(), writes);
    }

    #[test]
    fn test_pending_count_ignores_filter() {
        let mut store = store_with(&[true, false, false]);
        store.set_filter(Filter::Completed).unwrap();

        assert_eq!(store.pending_count(), 2);
    }

    #[test]
    fn test_persisted_snapshot_shape() {
        let mut store = store_with(&[]);
        store.add_task("shape check").unwrap();

        let json = store.slot().get(STATE_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();

        assert_eq!(value["filter"], "all");
        let task = &value["tasks"][0];
        assert_eq!(task["description"], "shape check");
        assert_eq!(task["done"], false);
        assert!(task["id"].is_string());
        assert!(task["createdAt"].is_string());
    }

    #[test]
    fn test_restore_absent_snapshot_keeps_seed() {
        let mut store = TodoStore::new(MemorySlot::new());
        let before = tasks_json(&store);

        assert!(!store.restore().unwrap());
        store.initialize().unwrap();

        assert_eq!(tasks_json(&store), before);
        assert_eq!(store.current_filter(), Filter::All);
    }

    #[test]
    fn test_initialize_persists_seed_once() {
        let mut store = TodoStore::new(MemorySlot::new());
        store.initialize().unwrap();
        assert_eq!(store.slot().writes(), 1);
        let seeded = store.state().clone();

        // A second process sees the same ids instead of a fresh seed
        let mut next = TodoStore::new(store.into_slot());
        next.initialize().unwrap();
        assert_eq!(next.state(), &seeded);
        assert_eq!(next.slot().writes(), 1);

        let id = seeded.tasks[0].id.clone();
        assert!(next.toggle_task(&id).unwrap());
    }

    #[test]
    fn test_restore_defaults_missing_fields() {
        let mut store = TodoStore::new(MemorySlot::with_entry(STATE_KEY, "{}"));
        assert!(store.restore().unwrap());
        assert!(store.tasks().is_empty());
        assert_eq!(store.current_filter(), Filter::All);

        let mut store = TodoStore::new(MemorySlot::with_entry(STATE_KEY, r#"{"filter":"Pending"}"#));
        store.restore().unwrap();
        assert!(store.tasks().is_empty());
        assert_eq!(store.current_filter(), Filter::Pending);
    }

    #[test]
    fn test_restore_unknown_filter_falls_back_to_all() {
        let mut store = TodoStore::new(MemorySlot::with_entry(STATE_KEY, r#"{"tasks":[],"filter":"bogus"}"#));
        store.restore().unwrap();
        assert_eq!(store.current_filter(), Filter::All);

        // Names are case-sensitive on the wire
        let mut store = TodoStore::new(MemorySlot::with_entry(STATE_KEY, r#"{"tasks":[],"filter":"completed"}"#));
        store.restore().unwrap();
        assert_eq!(store.current_filter(), Filter::All);
    }

    #[test]
    fn test_restore_malformed_snapshot_fails() {
        let mut store = TodoStore::new(MemorySlot::with_entry(STATE_KEY, "{not json"));
        let before = tasks_json(&store);

        assert!(store.initialize().is_err());
        assert_eq!(tasks_json(&store), before);
    }

    #[test]
    fn test_round_trip_memory() {
        let mut store = TodoStore::new(MemorySlot::new());
        store.add_task("buy milk").unwrap();
        let first = store.tasks()[0].id.clone();
        let second = store.tasks()[1].id.clone();
        store.toggle_task(&first).unwrap();
        store.delete_task(&second).unwrap();
        store.set_filter(Filter::Pending).unwrap();
        let expected = store.state().clone();

        let mut fresh = TodoStore::with_state(store.into_slot(), State::default());
        fresh.initialize().unwrap();

        assert_eq!(fresh.state(), &expected);
    }

    #[test]
    fn test_round_trip_jsonl() {
        let temp = TempDir::new().unwrap();
        let expected = {
            let mut store = TodoStore::new(JsonlSlot::open(temp.path()).unwrap());
            store.add_task("journal me").unwrap();
            let id = store.tasks()[2].id.clone();
            store.toggle_task(&id).unwrap();
            store.set_filter(Filter::Completed).unwrap();
            store.state().clone()
        };

        let mut fresh = TodoStore::new(JsonlSlot::open(temp.path()).unwrap());
        fresh.initialize().unwrap();

        assert_eq!(fresh.state(), &expected);
        assert_eq!(fresh.visible_tasks().len(), 1);
    }

    #[test]
    fn test_round_trip_sqlite() {
        let temp = TempDir::new().unwrap();
        let expected = {
            let mut store = TodoStore::new(SqliteSlot::open(temp.path()).unwrap());
            let id = store.tasks()[0].id.clone();
            store.toggle_task(&id).unwrap();
            store.delete_completed().unwrap();
            store.add_task("after clearing").unwrap();
            store.state().clone()
        };

        let mut fresh = TodoStore::new(SqliteSlot::open(temp.path()).unwrap());
        fresh.initialize().unwrap();

        assert_eq!(fresh.state(), &expected);
        assert_eq!(fresh.tasks().len(), 5);
        assert_eq!(fresh.tasks()[4].description, "after clearing");
    }

    #[test]
    fn test_validate_description() {
        assert!(TodoStore::<MemorySlot>::validate_description("ok").is_ok());
        assert!(TodoStore::<MemorySlot>::validate_description("").is_err());
        assert!(TodoStore::<MemorySlot>::validate_description("\t\n").is_err());
    }
}
