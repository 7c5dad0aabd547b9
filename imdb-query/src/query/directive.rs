use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

use crate::error::{Error, Result};
use crate::query::range::{integer, Range};
use crate::query::{Dimension, Direction, Query, Role};
use crate::record::{Atom, EntityKind};
use crate::sql;

/// A single search directive available in a query string.
///
/// Directives are written as `{name}` or `{name:value}`, where `value` is
/// interpreted specially depending on the directive. A directive may have
/// synonyms. For example, `{seasons:1-5}` can also be written more tersely as
/// `{s:1-5}`.
///
/// The complete list of directives is available via
/// [`directives`](fn.directives.html).
#[derive(Clone, Copy)]
pub struct Directive {
    name: &'static str,
    synonyms: &'static [&'static str],
    description: &'static str,
    apply: fn(&mut Query, &str) -> Result<()>,
}

impl Directive {
    /// The canonical name of this directive.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Zero or more alternate names for this directive.
    pub fn synonyms(&self) -> &'static [&'static str] {
        self.synonyms
    }

    /// A brief description of what this directive does, suitable for
    /// showing to end users.
    pub fn description(&self) -> &'static str {
        self.description
    }

    pub(crate) fn apply(&self, query: &mut Query, value: &str) -> Result<()> {
        (self.apply)(query, value)
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Directive")
            .field("name", &self.name)
            .field("synonyms", &self.synonyms)
            .finish()
    }
}

lazy_static! {
    // The single point of truth about every directive, sorted by name.
    static ref DIRECTIVES: Vec<Directive> = {
        let mut directives = registry();
        directives.sort_by_key(|d| d.name);
        directives
    };

    // Every directive keyed by its name and each of its synonyms.
    static ref BY_NAME: HashMap<&'static str, &'static Directive> = {
        let mut map = HashMap::new();
        for d in DIRECTIVES.iter() {
            map.insert(d.name, d);
            for &synonym in d.synonyms {
                map.insert(synonym, d);
            }
        }
        map
    };
}

/// Returns every directive recognized in a query string, sorted by name.
pub fn directives() -> &'static [Directive] {
    &DIRECTIVES
}

/// Find the directive with the given name or synonym. Names are case
/// sensitive.
pub(crate) fn lookup(name: &str) -> Option<&'static Directive> {
    BY_NAME.get(name).copied()
}

fn registry() -> Vec<Directive> {
    vec![
        Directive {
            name: "movie",
            synonyms: &[],
            description: "Without a value, restricts results to movies. This \
                          may be combined with other entity directives to \
                          allow several kinds. With a value, e.g., \
                          {movie:the matrix}, runs a sub-search for a movie \
                          and restricts results to its cast.",
            apply: |q, v| kind_or_sub(q, v, EntityKind::Movie, Role::Movie),
        },
        Directive {
            name: "tvshow",
            synonyms: &["tv"],
            description: "Without a value, restricts results to TV shows. \
                          With a value, runs a sub-search for a TV show and \
                          restricts results to its episodes and cast.",
            apply: |q, v| kind_or_sub(q, v, EntityKind::Tvshow, Role::Tvshow),
        },
        Directive {
            name: "episode",
            synonyms: &[],
            description: "Without a value, restricts results to episodes. \
                          With a value, runs a sub-search for an episode and \
                          restricts results to its cast.",
            apply: |q, v| {
                kind_or_sub(q, v, EntityKind::Episode, Role::Episode)
            },
        },
        Directive {
            name: "actor",
            synonyms: &[],
            description: "Without a value, restricts results to actors. \
                          With a value, runs a sub-search for an actor and \
                          restricts results to media the actor is credited \
                          in.",
            apply: |q, v| kind_or_sub(q, v, EntityKind::Actor, Role::Actor),
        },
        Directive {
            name: "credits",
            synonyms: &[],
            description: "A sub-search for any media entity (movie, TV show \
                          or episode) that restricts results to the actors \
                          credited in it.",
            apply: |q, v| sub_search(q, "credits", v, Role::Media),
        },
        Directive {
            name: "cast",
            synonyms: &[],
            description: "A sub-search for a cast member that restricts \
                          results to the media entities in which they \
                          appeared.",
            apply: |q, v| sub_search(q, "cast", v, Role::Actor),
        },
        Directive {
            name: "show",
            synonyms: &[],
            description: "A sub-search for a TV show that restricts results \
                          to episodes of that show. e.g., \
                          {show:supernatural} {s:1}",
            apply: |q, v| sub_search(q, "show", v, Role::Tvshow),
        },
        Directive {
            name: "debug",
            synonyms: &[],
            description: "Logs every SQL query executed by the search, \
                          including sub-searches.",
            apply: |q, _| {
                q.debug = true;
                Ok(())
            },
        },
        Directive {
            name: "id",
            synonyms: &["atom"],
            description: "Selects exactly the entity with the given atom \
                          identifier, e.g., {id:123}. Atom identifiers may \
                          change when the database is rebuilt, so do not \
                          rely on them long term.",
            apply: |q, v| {
                q.atom = Some(Atom(integer(v)?));
                Ok(())
            },
        },
        Directive {
            name: "years",
            synonyms: &["year"],
            description: "Only show results from the year or years given. \
                          e.g., {years:1990-1999} shows the 90s and \
                          {years:2000-} shows everything since 2000.",
            apply: |q, v| range(q, v, Dimension::Year),
        },
        Directive {
            name: "rank",
            synonyms: &["rate", "rating"],
            description: "Only show results whose rating rank is in the \
                          range given. Ranks go from 0 to 100, where 100 is \
                          best. e.g., {rank:70-}",
            apply: |q, v| range(q, v, Dimension::Rank),
        },
        Directive {
            name: "votes",
            synonyms: &[],
            description: "Only show results whose rating has a vote count in \
                          the range given. e.g., {votes:10000-}",
            apply: |q, v| range(q, v, Dimension::Votes),
        },
        Directive {
            name: "billed",
            synonyms: &["billing"],
            description: "When results are restricted by an actor or media \
                          sub-search, only show credits with a billing \
                          position in the range given. e.g., {billed:1-5} \
                          keeps the top five billed credits.",
            apply: |q, v| range(q, v, Dimension::Billing),
        },
        Directive {
            name: "seasons",
            synonyms: &["s", "season"],
            description: "Only show episodes from the season or seasons \
                          given. e.g., {s:1}. Movies, TV shows and actors \
                          are not affected.",
            apply: |q, v| range(q, v, Dimension::Season),
        },
        Directive {
            name: "episodes",
            synonyms: &["e"],
            description: "Only show episodes with an episode number in the \
                          range given. e.g., {e:1-5}. Movies, TV shows and \
                          actors are not affected.",
            apply: |q, v| range(q, v, Dimension::Episode),
        },
        Directive {
            name: "notv",
            synonyms: &[],
            description: "Removes made for TV movies from the results.",
            apply: |q, _| {
                q.no_tv_movies = true;
                Ok(())
            },
        },
        Directive {
            name: "novideo",
            synonyms: &[],
            description: "Removes made for video movies from the results.",
            apply: |q, _| {
                q.no_video_movies = true;
                Ok(())
            },
        },
        Directive {
            name: "limit",
            synonyms: &[],
            description: "The maximum number of results to return. The \
                          default is 30.",
            apply: |q, v| {
                q.limit = v.parse().map_err(|err| Error::number(v, err))?;
                Ok(())
            },
        },
        Directive {
            name: "sort",
            synonyms: &[],
            description: "Sorts results by the column given, optionally \
                          followed by asc or desc. It may be given several \
                          times to break ties. Fuzzy searches always sort by \
                          similarity first. e.g., {sort:episode desc}",
            apply: sort,
        },
    ]
}

fn kind_or_sub(
    q: &mut Query,
    v: &str,
    kind: EntityKind,
    role: Role,
) -> Result<()> {
    if v.is_empty() {
        q.add_kind(kind);
        Ok(())
    } else {
        sub_search(q, kind.as_str(), v, role)
    }
}

fn sub_search(q: &mut Query, name: &str, v: &str, role: Role) -> Result<()> {
    if v.is_empty() {
        return Err(Error::empty_value(name));
    }
    let sub: Query = v.parse().map_err(|e| Error::sub_search(role.label(), e))?;
    q.set_sub_search(role, sub);
    Ok(())
}

fn range(q: &mut Query, v: &str, dim: Dimension) -> Result<()> {
    let range = Range::parse(v, 0, dim.upper_bound())?;
    q.ranges.insert(dim, range);
    Ok(())
}

fn sort(q: &mut Query, v: &str) -> Result<()> {
    let fields: Vec<&str> = v.split_whitespace().collect();
    let (column, direction) = match fields[..] {
        [column] => (column, sql::default_direction(column)),
        [column, dir] => match dir.parse::<Direction>() {
            Ok(direction) => (column, direction),
            Err(_) => return Err(Error::invalid_sort(v)),
        },
        _ => return Err(Error::invalid_sort(v)),
    };
    q.add_sort(column, direction);
    Ok(())
}
