use crate::error::Result;
use crate::sql::SqlQuery;

/// The storage layer that compiled searches are executed against.
///
/// A store owns a connection (or session) to a relational database that
/// contains the `name`, `atom`, `movie`, `tvshow`, `episode`, `actor`,
/// `credit` and `rating` tables. This crate never creates, populates or
/// otherwise modifies those tables.
///
/// Searches are executed sequentially through a single store, so
/// implementations need not be safe for concurrent use.
pub trait Store {
    /// Returns true if and only if the store supports trigram similarity,
    /// i.e., the `similarity(text, text)` function and the `%` operator.
    ///
    /// When this returns false, name queries are matched exactly (or by
    /// `LIKE` when they contain wildcards) and no similarity scores are
    /// computed.
    fn fuzzy_enabled(&self) -> bool;

    /// Execute the given compiled query and return every row it produces.
    ///
    /// Parameters are positional: the first parameter binds to `$1`.
    /// Failures should be reported as an error; they are passed through to
    /// the caller of the search unchanged.
    fn execute(&self, query: &SqlQuery) -> Result<Vec<Row>>;
}

impl<'a, S: Store + ?Sized> Store for &'a S {
    fn fuzzy_enabled(&self) -> bool {
        (**self).fuzzy_enabled()
    }

    fn execute(&self, query: &SqlQuery) -> Result<Vec<Row>> {
        (**self).execute(query)
    }
}

/// A single raw row produced by a compiled query.
///
/// The fields are in the same order as the columns selected by every
/// compiled query, so a store can scan them positionally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    /// One of `movie`, `tvshow`, `episode` or `actor`.
    pub entity: String,
    /// The atom of the entity.
    pub atom_id: i64,
    /// The name of the entity.
    pub name: String,
    /// The year, or `0`.
    pub year: i64,
    /// The similarity with the query's name, or `-1`.
    pub similarity: f64,
    /// Entity specific attributes.
    pub attrs: String,
    /// The number of votes of the entity's rating, or `0`.
    pub votes: i64,
    /// The rank of the entity's rating, or `0`.
    pub rank: i64,
    /// The actor of the joined credit, or `0`.
    pub credit_actor_id: i64,
    /// The media entity of the joined credit, or `0`.
    pub credit_media_id: i64,
    /// The character of the joined credit, or empty.
    pub credit_character: String,
    /// The billing position of the joined credit, or `0`.
    pub credit_position: i64,
    /// The attributes of the joined credit, or empty.
    pub credit_attrs: String,
}
