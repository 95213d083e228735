//! Shared, change-notifying store handle over one SQLite connection.
//!
//! # Responsibility
//! - Make repository operations callable from multiple threads.
//! - Publish a monotonically increasing revision after every committed
//!   mutation so observers know the table changed.
//!
//! # Invariants
//! - The revision only advances after the mutation has been applied.
//! - Readiness checks run once at open; the store holds the only handle to
//!   the connection afterwards.

use crate::db::{open_db, open_db_in_memory};
use crate::model::forageable::{Forageable, ForageableId};
use crate::repo::forageable_repo::{
    ForageableRepository, RepoResult, SqliteForageableRepository,
};
use log::debug;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

struct StoreInner {
    conn: Mutex<Connection>,
    revision: watch::Sender<u64>,
}

/// Cloneable handle to the forageables catalogue.
///
/// All clones share one connection and one revision channel. Mutations made
/// through any clone are visible to observers of every clone.
#[derive(Clone)]
pub struct ForageableStore {
    inner: Arc<StoreInner>,
}

impl ForageableStore {
    /// Opens a file-backed store, applying pending migrations.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens an in-memory store, mainly for tests and smoke probes.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    fn from_connection(conn: Connection) -> RepoResult<Self> {
        SqliteForageableRepository::try_new(&conn)?;

        let (revision, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                revision,
            }),
        })
    }

    /// Subscribes to table-change notifications.
    ///
    /// The carried value is an opaque revision counter; observers re-run
    /// their query whenever it advances. Bursts of writes may coalesce into
    /// one notification.
    pub fn revision(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn with_repo<T>(
        &self,
        op: impl FnOnce(&SqliteForageableRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self
            .inner
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let repo = SqliteForageableRepository::try_new(&conn)?;
        op(&repo)
    }

    fn publish_change(&self) {
        self.inner.revision.send_modify(|revision| *revision += 1);
    }
}

impl ForageableRepository for ForageableStore {
    fn list_forageables(&self) -> RepoResult<Vec<Forageable>> {
        self.with_repo(|repo| repo.list_forageables())
    }

    fn get_forageable(&self, id: ForageableId) -> RepoResult<Option<Forageable>> {
        self.with_repo(|repo| repo.get_forageable(id))
    }

    fn get_forageables_by_name(&self, name: &str) -> RepoResult<Vec<Forageable>> {
        self.with_repo(|repo| repo.get_forageables_by_name(name))
    }

    fn upsert_forageable(&self, forageable: &Forageable) -> RepoResult<ForageableId> {
        let id = self.with_repo(|repo| repo.upsert_forageable(forageable))?;
        self.publish_change();
        debug!("event=forageable_upsert module=store status=ok id={id}");
        Ok(id)
    }

    fn delete_forageable(&self, forageable: &Forageable) -> RepoResult<()> {
        self.with_repo(|repo| repo.delete_forageable(forageable))?;
        if let Some(id) = forageable.id {
            self.publish_change();
            debug!("event=forageable_delete module=store status=ok id={id}");
        }
        Ok(())
    }
}
