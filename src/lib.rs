// TodoStore - Task list state with filtering, persisted to a key-value slot

pub mod config;
pub mod error;
pub mod filter;
pub mod jsonl;
pub mod logging;
pub mod slot;
pub mod sqlite;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use error::StoreError;
pub use filter::Filter;
pub use jsonl::JsonlSlot;
pub use slot::{MemorySlot, STATE_KEY, Slot};
pub use sqlite::SqliteSlot;
pub use store::{State, TodoStore, now_ms};
pub use task::Task;
