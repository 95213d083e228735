//! Forageable presentation adapter.
//!
//! # Responsibility
//! - Expose catalogue reads as observable state that follows table changes.
//! - Dispatch mutations to background execution, fire-and-forget.
//!
//! # Invariants
//! - Observable reads never surface storage errors; on a failed re-query the
//!   last published value stays in place and an error event is logged.
//! - Mutation entry points return immediately; there is no completion signal
//!   and no error propagation path back to the caller.

use crate::model::forageable::{Forageable, ForageableId};
use crate::repo::forageable_repo::{ForageableRepository, RepoResult};
use crate::repo::store::ForageableStore;
use log::{debug, error};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task;

/// Use-case adapter between a UI layer and the forageables store.
///
/// Created with the runtime handle that background work is scheduled on, so
/// mutation entry points stay synchronous and callable from non-async code.
pub struct ForageableService {
    store: ForageableStore,
    runtime: Handle,
}

impl ForageableService {
    /// Creates a service over the shared store.
    ///
    /// `runtime` is where observer tasks and background writes run; pass
    /// `Handle::current()` when constructing inside an async context.
    pub fn new(store: ForageableStore, runtime: Handle) -> Self {
        Self { store, runtime }
    }

    /// Observable list of every catalogued forageable, in insertion order.
    ///
    /// The receiver is seeded with the current table contents and re-emits
    /// whenever a mutation commits. Rapid write bursts may coalesce; the
    /// stream always converges on the latest state.
    pub fn forageables(&self) -> watch::Receiver<Vec<Forageable>> {
        self.observe("list_forageables", |store| store.list_forageables())
    }

    /// Observable single-record lookup by id.
    ///
    /// An absent id yields a `None` value rather than an error, and the
    /// stream transitions back to `None` if the record is deleted later.
    pub fn get_forageable(&self, id: ForageableId) -> watch::Receiver<Option<Forageable>> {
        self.observe("get_forageable", move |store| store.get_forageable(id))
    }

    /// Observable exact-name lookup; empty when nothing matches.
    pub fn find_forageables_by_name(
        &self,
        name: impl Into<String>,
    ) -> watch::Receiver<Vec<Forageable>> {
        let name = name.into();
        self.observe("get_forageables_by_name", move |store| {
            store.get_forageables_by_name(&name)
        })
    }

    /// Schedules insertion of a new record; the store assigns the id.
    pub fn add_forageable(
        &self,
        name: impl Into<String>,
        address: impl Into<String>,
        in_season: bool,
        notes: impl Into<String>,
    ) {
        let forageable = Forageable::new(name, address, in_season, notes);
        self.schedule_write("forageable_add", move |store| {
            store.upsert_forageable(&forageable).map(|_| ())
        });
    }

    /// Schedules full-record replacement of the record with the given id.
    pub fn update_forageable(
        &self,
        id: ForageableId,
        name: impl Into<String>,
        address: impl Into<String>,
        in_season: bool,
        notes: impl Into<String>,
    ) {
        let forageable = Forageable::with_id(id, name, address, in_season, notes);
        self.schedule_write("forageable_update", move |store| {
            store.upsert_forageable(&forageable).map(|_| ())
        });
    }

    /// Schedules removal of the given record. No-op when it was never saved
    /// or is already gone.
    pub fn delete_forageable(&self, forageable: Forageable) {
        self.schedule_write("forageable_delete", move |store| {
            store.delete_forageable(&forageable)
        });
    }

    /// Pure entry validation: both name and address must contain
    /// non-whitespace content. Touches no persisted state.
    pub fn is_valid_entry(&self, name: &str, address: &str) -> bool {
        !name.trim().is_empty() && !address.trim().is_empty()
    }

    /// Builds an observable query: seeds a watch channel with the current
    /// result, then re-runs the query on every store revision change.
    ///
    /// The revision subscription is taken before the seed read so a write
    /// landing between the two still triggers a re-query. The observer task
    /// exits when the store or every receiver is gone.
    fn observe<T, F>(&self, query_name: &'static str, query: F) -> watch::Receiver<T>
    where
        T: Default + PartialEq + Send + Sync + 'static,
        F: Fn(&ForageableStore) -> RepoResult<T> + Send + Sync + 'static,
    {
        let store = self.store.clone();
        let mut revision = store.revision();

        let initial = query(&store).unwrap_or_else(|err| {
            error!(
                "event=observe_seed module=service status=error query={query_name} error={err}"
            );
            T::default()
        });

        let (tx, rx) = watch::channel(initial);
        let query = Arc::new(query);

        self.runtime.spawn(async move {
            loop {
                tokio::select! {
                    changed = revision.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tx.closed() => break,
                }

                let store = store.clone();
                let query = Arc::clone(&query);
                match task::spawn_blocking(move || (*query)(&store)).await {
                    Ok(Ok(value)) => {
                        tx.send_if_modified(|current| {
                            if *current == value {
                                false
                            } else {
                                *current = value;
                                true
                            }
                        });
                    }
                    Ok(Err(err)) => {
                        error!(
                            "event=observe_requery module=service status=error query={query_name} error={err}"
                        );
                    }
                    Err(err) => {
                        error!(
                            "event=observe_requery module=service status=error query={query_name} error_code=join_failed error={err}"
                        );
                    }
                }
            }
            debug!("event=observe_stop module=service status=ok query={query_name}");
        });

        rx
    }

    fn schedule_write<F>(&self, event: &'static str, write: F)
    where
        F: FnOnce(&ForageableStore) -> RepoResult<()> + Send + 'static,
    {
        let store = self.store.clone();
        self.runtime.spawn_blocking(move || match write(&store) {
            Ok(()) => debug!("event={event} module=service status=ok"),
            Err(err) => error!("event={event} module=service status=error error={err}"),
        });
    }
}
