/*!
This crate provides a small query language for searching a relational IMDb
database, along with a compiler that turns a query into a single SQL
statement.

A query is a free-form name mixed with directives written in curly braces.
For example, `{show:supernatural} {s:1} {sort:episode}` finds every episode
in the first season of the TV show named "supernatural," in order. Directives
may themselves contain complete queries, called sub-searches, which are run
and resolved to a single entity before the query containing them. When a
sub-search is ambiguous, a caller supplied chooser picks the entity.

Queries are executed through a [`Store`](trait.Store.html). A SQLite store is
provided when the `sqlite` feature is enabled, which it is by default.
*/

#![deny(missing_docs)]

pub use crate::error::{ChooserError, Error, ErrorKind, Result};
pub use crate::query::{
    directives, Dimension, Direction, Directive, Query, Range, Role, SortOrder,
};
pub use crate::record::{Atom, Credit, EntityKind, Rating, SearchResult};
pub use crate::search::{Chooser, Searcher};
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteStore;
pub use crate::sql::SqlQuery;
pub use crate::store::{Row, Store};

// A macro that creates an error that represents a bug.
//
// This is typically used when reading rows from a store. Since the contents
// of the database are outside our control, we return an error using this
// macro instead of panicking (or worse, silently misinterpreting data).
macro_rules! bug {
    ($($tt:tt)*) => {{
        return Err($crate::error::Error::bug(format!($($tt)*)));
    }}
}

mod error;
mod query;
mod record;
mod search;
mod sql;
#[cfg(feature = "sqlite")]
mod sqlite;
mod store;
