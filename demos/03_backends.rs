//! Example 03: Storage Backends
//!
//! This example runs the same sequence of mutations against each backend
//! and restores the result into a fresh store.
//!
//! Run with: cargo run --example 03_backends

use eyre::Result;
use todostore::{Backend, Filter, State, TodoStore};

fn main() -> Result<()> {
    println!("TodoStore Backends Example");
    println!("==========================\n");

    for backend in [Backend::Jsonl, Backend::Sqlite] {
        let temp_dir = tempfile::tempdir()?;

        let expected = {
            let mut store = TodoStore::new(backend.open(temp_dir.path())?);
            store.initialize()?;
            store.add_task("Learn the storage layer")?;
            let id = store.tasks()[0].id.clone();
            store.toggle_task(&id)?;
            store.set_filter(Filter::Completed)?;
            store.state().clone()
        };

        let mut fresh = TodoStore::with_state(backend.open(temp_dir.path())?, State::default());
        fresh.initialize()?;

        println!("{:?}:", backend);
        println!("   tasks restored: {}", fresh.tasks().len());
        println!("   filter restored: {}", fresh.current_filter());
        println!("   identical: {}\n", fresh.state() == &expected);
    }

    println!("Example complete!");
    Ok(())
}
