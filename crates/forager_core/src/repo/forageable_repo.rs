//! Forageable repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable single-table query APIs over `forageables` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `upsert_forageable` assigns a fresh id when the record carries none and
//!   replaces the whole row when it does.
//! - `delete_forageable` is a no-op for absent or never-persisted records.

use crate::db::DbError;
use crate::model::forageable::{Forageable, ForageableId};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const FORAGEABLE_SELECT_SQL: &str = "SELECT
    id,
    name,
    address,
    in_season,
    notes
FROM forageables";

const REQUIRED_TABLE: &str = "forageables";
const REQUIRED_COLUMNS: &[&str] = &["id", "name", "address", "in_season", "notes"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for forageable persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
            Self::InvalidData(message) => {
                write!(f, "invalid persisted forageable data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the five catalogue operations.
///
/// Reads are snapshots; the continuously-updated view is built on top by
/// [`crate::repo::store::ForageableStore`] revision notifications.
pub trait ForageableRepository {
    /// Lists every record in insertion (id) order.
    fn list_forageables(&self) -> RepoResult<Vec<Forageable>>;
    /// Gets one record by id. Absent rows are `None`, never an error.
    fn get_forageable(&self, id: ForageableId) -> RepoResult<Option<Forageable>>;
    /// Lists records whose name exactly equals the query.
    fn get_forageables_by_name(&self, name: &str) -> RepoResult<Vec<Forageable>>;
    /// Inserts a new record (no id) or replaces the row sharing the same id.
    /// Returns the assigned id.
    fn upsert_forageable(&self, forageable: &Forageable) -> RepoResult<ForageableId>;
    /// Removes the row keyed by the record's id. No-op when absent.
    fn delete_forageable(&self, forageable: &Forageable) -> RepoResult<()>;
}

/// SQLite-backed forageable repository.
pub struct SqliteForageableRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteForageableRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ForageableRepository for SqliteForageableRepository<'_> {
    fn list_forageables(&self) -> RepoResult<Vec<Forageable>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FORAGEABLE_SELECT_SQL} ORDER BY id;"))?;

        let mut rows = stmt.query([])?;
        let mut forageables = Vec::new();
        while let Some(row) = rows.next()? {
            forageables.push(parse_forageable_row(row)?);
        }

        Ok(forageables)
    }

    fn get_forageable(&self, id: ForageableId) -> RepoResult<Option<Forageable>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FORAGEABLE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_forageable_row(row)?));
        }

        Ok(None)
    }

    fn get_forageables_by_name(&self, name: &str) -> RepoResult<Vec<Forageable>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FORAGEABLE_SELECT_SQL} WHERE name = ?1 ORDER BY id;"))?;

        let mut rows = stmt.query([name])?;
        let mut forageables = Vec::new();
        while let Some(row) = rows.next()? {
            forageables.push(parse_forageable_row(row)?);
        }

        Ok(forageables)
    }

    fn upsert_forageable(&self, forageable: &Forageable) -> RepoResult<ForageableId> {
        match forageable.id {
            Some(id) => {
                self.conn.execute(
                    "INSERT OR REPLACE INTO forageables (id, name, address, in_season, notes)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        id,
                        forageable.name.as_str(),
                        forageable.address.as_str(),
                        bool_to_int(forageable.in_season),
                        forageable.notes.as_str(),
                    ],
                )?;
                Ok(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO forageables (name, address, in_season, notes)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        forageable.name.as_str(),
                        forageable.address.as_str(),
                        bool_to_int(forageable.in_season),
                        forageable.notes.as_str(),
                    ],
                )?;
                Ok(self.conn.last_insert_rowid())
            }
        }
    }

    fn delete_forageable(&self, forageable: &Forageable) -> RepoResult<()> {
        let Some(id) = forageable.id else {
            return Ok(());
        };

        self.conn
            .execute("DELETE FROM forageables WHERE id = ?1;", [id])?;
        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = crate::db::migrations::latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [REQUIRED_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(REQUIRED_TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([REQUIRED_TABLE])?;
    let mut present = HashSet::new();
    while let Some(row) = rows.next()? {
        present.insert(row.get::<_, String>(0)?);
    }

    for column in REQUIRED_COLUMNS.iter().copied() {
        if !present.contains(column) {
            return Err(RepoError::MissingRequiredColumn {
                table: REQUIRED_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_forageable_row(row: &Row<'_>) -> RepoResult<Forageable> {
    let in_season = match row.get::<_, i64>("in_season")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid in_season value `{other}` in forageables.in_season"
            )));
        }
    };

    Ok(Forageable {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        address: row.get("address")?,
        in_season,
        notes: row.get("notes")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
