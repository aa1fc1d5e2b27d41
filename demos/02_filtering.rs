//! Example 02: Filtering
//!
//! This example demonstrates listing tasks by completion state, switching
//! the active filter, and how unknown filter names are rejected.
//!
//! Run with: cargo run --example 02_filtering

use eyre::Result;
use todostore::{Filter, MemorySlot, TodoStore};

fn main() -> Result<()> {
    println!("TodoStore Filtering Example");
    println!("===========================\n");

    // The seeded store starts with five pending demo tasks
    let mut store = TodoStore::new(MemorySlot::new());
    store.initialize()?;

    // Complete every other task
    let ids: Vec<String> = store.tasks().iter().map(|t| t.id.clone()).collect();
    for id in ids.iter().step_by(2) {
        store.toggle_task(id)?;
    }

    for filter in Filter::VARIANTS {
        let tasks = store.list_tasks(filter);
        println!("{} ({} task(s)):", filter, tasks.len());
        for task in &tasks {
            println!("   - [{}] {}", if task.done { "x" } else { " " }, task.description);
        }
        println!();
    }

    println!("Pending count: {}\n", store.pending_count());

    // Switch the active filter
    store.set_filter("Pending".parse()?)?;
    println!("Active filter is now {}", store.current_filter());
    println!("Visible tasks: {}\n", store.visible_tasks().len());

    // Unknown names never reach the store
    match "bogus".parse::<Filter>() {
        Ok(f) => println!("Unexpectedly parsed {}", f),
        Err(e) => println!("Rejected: {}", e),
    }
    println!("Active filter is still {}\n", store.current_filter());

    // Clear out the completed ones
    let removed = store.delete_completed()?;
    println!("Deleted {} completed task(s), {} left", removed, store.tasks().len());
    println!("Slot writes so far: {}", store.slot().writes());

    println!("\nExample complete!");
    Ok(())
}
