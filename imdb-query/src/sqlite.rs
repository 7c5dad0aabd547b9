use std::fmt;
use std::path::Path;

use rusqlite::{params_from_iter, Connection, OpenFlags};

use crate::error::{Error, Result};
use crate::sql::SqlQuery;
use crate::store::{Row, Store};

/// A store backed by a SQLite database.
///
/// SQLite has no trigram similarity, so names are always matched exactly,
/// or with `LIKE` when they contain wildcards, and results never carry a
/// similarity score.
pub struct SqliteStore {
    conn: Connection,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteStore {
    /// Open an existing database at the given path for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SqliteStore> {
        let path = path.as_ref();
        log::debug!("opening sqlite database {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(Error::storage)?;
        Ok(SqliteStore { conn })
    }

    /// Open a new empty in-memory database.
    ///
    /// This is mostly useful for tests, which can populate it through
    /// [`connection`](#method.connection).
    pub fn open_in_memory() -> Result<SqliteStore> {
        let conn = Connection::open_in_memory().map_err(Error::storage)?;
        Ok(SqliteStore { conn })
    }

    /// Use an existing connection as a store.
    pub fn from_connection(conn: Connection) -> SqliteStore {
        SqliteStore { conn }
    }

    /// Return the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for SqliteStore {
    fn fuzzy_enabled(&self) -> bool {
        false
    }

    fn execute(&self, query: &SqlQuery) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(query.sql()).map_err(Error::storage)?;
        let rows = stmt
            .query_map(params_from_iter(query.params()), |row| {
                Ok(Row {
                    entity: row.get(0)?,
                    atom_id: row.get(1)?,
                    name: row.get(2)?,
                    year: row.get(3)?,
                    similarity: row.get(4)?,
                    attrs: row.get(5)?,
                    votes: row.get(6)?,
                    rank: row.get(7)?,
                    credit_actor_id: row.get(8)?,
                    credit_media_id: row.get(9)?,
                    credit_character: row.get(10)?,
                    credit_position: row.get(11)?,
                    credit_attrs: row.get(12)?,
                })
            })
            .map_err(Error::storage)?;
        let rows = rows
            .collect::<rusqlite::Result<Vec<Row>>>()
            .map_err(Error::storage)?;
        Ok(rows)
    }
}
