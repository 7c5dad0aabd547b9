use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::Row;

/// A stable identifier shared by every entity and relation in the database.
///
/// Atoms are the join key for everything: names, movies, TV shows, episodes,
/// actors, credits and ratings all refer to one another by atom. This crate
/// treats them as opaque.
///
/// Note that one should not rely on an atom always corresponding to the same
/// entity across database rebuilds.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq,
    PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct Atom(pub i64);

impl Atom {
    /// Return this atom as a raw integer.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The kind of an entity. These form a partitioning of all atoms that have
/// a name, where every such atom has exactly one kind.
///
/// This type has a `FromStr` implementation that recognizes the same names
/// used by the query language's entity directives, e.g., `tvshow`.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum EntityKind {
    Movie,
    Tvshow,
    Episode,
    Actor,
}

impl EntityKind {
    /// Return a string representation of this entity kind.
    ///
    /// This is the same string the compiled SQL derives for each row, and
    /// the same string used to name the kind in a query.
    pub fn as_str(&self) -> &'static str {
        match *self {
            EntityKind::Movie => "movie",
            EntityKind::Tvshow => "tvshow",
            EntityKind::Episode => "episode",
            EntityKind::Actor => "actor",
        }
    }

    /// Returns true if and only if this kind is a media kind, i.e., anything
    /// that can have actors credited in it.
    pub fn is_media(&self) -> bool {
        match *self {
            EntityKind::Movie | EntityKind::Tvshow | EntityKind::Episode => {
                true
            }
            EntityKind::Actor => false,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(kind: &str) -> Result<EntityKind> {
        match kind {
            "movie" => Ok(EntityKind::Movie),
            "tvshow" | "tv" => Ok(EntityKind::Tvshow),
            "episode" => Ok(EntityKind::Episode),
            "actor" => Ok(EntityKind::Actor),
            unk => Err(Error::bug(format!(
                "unrecognized entity kind: '{}'",
                unk
            ))),
        }
    }
}

/// A user rating attached to a media entity.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Rating {
    /// The number of votes involved in this rating.
    pub votes: i64,
    /// The rank, on a scale of 0 to 100, where 100 is best.
    pub rank: i64,
}

/// A single credit joining an actor to a media entity.
///
/// A credit is only present on search results when the search constrained
/// results by an actor or a media sub-search.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Credit {
    /// The atom of the credited actor.
    pub actor_id: Atom,
    /// The atom of the media entity the actor is credited in.
    pub media_id: Atom,
    /// The character played, which may be empty.
    pub character: String,
    /// The billing position, where `0` means unknown.
    pub position: i64,
    /// Free-form attributes attached to the credit, e.g., `(voice)`.
    pub attrs: String,
}

/// A single result of a search.
///
/// Results are produced fresh for every execution of a search and are
/// returned in the order given by the compiled query's `ORDER BY` clause.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchResult {
    /// The kind of this entity.
    pub entity: EntityKind,
    /// The atom identifying this entity.
    pub id: Atom,
    /// The display name of this entity.
    pub name: String,
    /// The year of this entity, or `0` if unknown or not applicable.
    pub year: i64,
    /// Arbitrary additional data specific to an entity.
    ///
    /// e.g., Whether a movie is straight to video or made for TV, the
    /// running years of a TV show, or the TV show and season/episode number
    /// of an episode.
    pub attrs: String,
    /// The amount of similarity between the name given in the query and the
    /// name of this result.
    ///
    /// This is set to `-1` when similarity is not computed, e.g., when the
    /// store does not support fuzzy matching or the query has no name.
    pub similarity: f64,
    /// The rating of this entity, if one exists.
    pub rating: Option<Rating>,
    /// The credit connecting this result to an actor or media sub-search,
    /// if the search involved one.
    pub credit: Option<Credit>,
}

impl SearchResult {
    /// Returns true if and only if a similarity score was computed for this
    /// result.
    pub fn has_similarity(&self) -> bool {
        self.similarity > -1.0
    }

    /// Convert a raw row, as produced by executing a compiled query, into a
    /// search result.
    pub(crate) fn from_row(row: Row) -> Result<SearchResult> {
        let entity = match row.entity.parse() {
            Ok(entity) => entity,
            Err(_) => bug!(
                "row for atom {} has unrecognized entity '{}'",
                row.atom_id,
                row.entity
            ),
        };
        let rating = if row.votes == 0 && row.rank == 0 {
            None
        } else {
            Some(Rating { votes: row.votes, rank: row.rank })
        };
        let credit = if row.credit_actor_id == 0 && row.credit_media_id == 0 {
            None
        } else {
            Some(Credit {
                actor_id: Atom(row.credit_actor_id),
                media_id: Atom(row.credit_media_id),
                character: row.credit_character,
                position: row.credit_position,
                attrs: row.credit_attrs,
            })
        };
        Ok(SearchResult {
            entity,
            id: Atom(row.atom_id),
            name: row.name,
            year: row.year,
            attrs: row.attrs,
            similarity: row.similarity,
            rating,
            credit,
        })
    }
}
