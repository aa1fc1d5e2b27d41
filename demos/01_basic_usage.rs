//! Example 01: Basic Usage
//!
//! This example walks through adding, toggling and deleting tasks, and
//! shows that every mutation is persisted to the slot.
//!
//! Run with: cargo run --example 01_basic_usage

use eyre::Result;
use todostore::{Filter, JsonlSlot, State, TodoStore};

fn main() -> Result<()> {
    // Create a temporary directory for this example
    let temp_dir = tempfile::tempdir()?;
    let store_path = temp_dir.path().to_path_buf();

    println!("TodoStore Basic Usage Example");
    println!("=============================\n");
    println!("Store path: {}\n", store_path.display());

    // Start from an empty list instead of the demo seed
    let mut store = TodoStore::with_state(JsonlSlot::open(&store_path)?, State::default());
    store.initialize()?;
    println!("Store initialized with {} task(s).\n", store.tasks().len());

    // ADD
    println!("1. ADD - Adding three tasks...");
    store.add_task("Buy milk")?;
    store.add_task("Walk the dog")?;
    store.add_task("Write report")?;
    for task in store.list_tasks(Filter::All) {
        println!("   - [{}] {} ({})", if task.done { "x" } else { " " }, task.description, task.id);
    }
    println!();

    // TOGGLE
    println!("2. TOGGLE - Marking the first task as done...");
    let first_id = store.tasks()[0].id.clone();
    store.toggle_task(&first_id)?;
    println!("   Done: {}\n", store.tasks()[0].done);

    // EMPTY DESCRIPTION
    println!("3. VALIDATION - Adding an empty task...");
    match store.add_task("") {
        Ok(()) => println!("   Unexpectedly accepted!"),
        Err(e) => println!("   Rejected: {}", e),
    }
    println!("   Task count is still {}\n", store.tasks().len());

    // DELETE
    println!("4. DELETE - Removing the second task...");
    let second_id = store.tasks()[1].id.clone();
    let removed = store.delete_task(&second_id)?;
    println!("   Removed: {}", removed);
    println!("   Removing it again: {}\n", store.delete_task(&second_id)?);

    // RESTORE
    println!("5. RESTORE - Opening a fresh store on the same directory...");
    let mut reopened = TodoStore::with_state(JsonlSlot::open(&store_path)?, State::default());
    reopened.initialize()?;
    for task in reopened.list_tasks(Filter::All) {
        println!("   - [{}] {}", if task.done { "x" } else { " " }, task.description);
    }
    println!();

    println!("Example complete!");
    Ok(())
}
