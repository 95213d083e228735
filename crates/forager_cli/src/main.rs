//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `forager_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use forager_core::{ForageableRepository, ForageableStore};

fn main() {
    println!("forager_core version={}", forager_core::core_version());

    match smoke() {
        Ok(count) => println!("forager_core smoke=ok records={count}"),
        Err(err) => {
            eprintln!("forager_core smoke=error error={err}");
            std::process::exit(1);
        }
    }
}

/// Runs one insert + list roundtrip against a throwaway in-memory store.
fn smoke() -> Result<usize, forager_core::RepoError> {
    let store = ForageableStore::open_in_memory()?;

    let sample = forager_core::Forageable::new(
        "Chanterelle patch",
        "North ridge trail, marker 7",
        true,
        "Under the old spruce stand",
    );
    store.upsert_forageable(&sample)?;

    Ok(store.list_forageables()?.len())
}
