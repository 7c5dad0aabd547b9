use std::collections::BTreeMap;
use std::fmt;
use std::result;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::record::{Atom, EntityKind};

pub use self::directive::{directives, Directive};
pub use self::range::Range;

mod directive;
mod range;
mod tokens;

/// The default maximum number of results returned by a search.
const DEFAULT_LIMIT: usize = 30;

/// A description of a search over movies, TV shows, episodes and actors.
///
/// A query typically consists of a name along with zero or more filters.
/// Filters are matched conjunctively, except for entity kinds: adding
/// several kinds permits results of any of them.
///
/// A query may also contain sub-searches. A sub-search is itself a complete
/// query, which is run and resolved to a single entity before its parent is
/// executed. For example, the query `{show:supernatural} {s:1}` first finds
/// the TV show named "supernatural," and then finds the episodes in its
/// first season.
///
/// Queries are usually built by parsing the free-form query syntax via
/// `FromStr`, but they may also be built directly with the builder methods
/// on this type. The `Display` implementation writes a query back out in the
/// free-form syntax, and the `Serialize` and `Deserialize` implementations
/// use that same syntax.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Query {
    pub(crate) name: Option<String>,
    pub(crate) fuzzy: bool,
    pub(crate) kinds: Vec<EntityKind>,
    pub(crate) atom: Option<Atom>,
    pub(crate) ranges: BTreeMap<Dimension, Range>,
    pub(crate) subs: BTreeMap<Role, SubSearch>,
    pub(crate) order: Vec<SortOrder>,
    pub(crate) limit: usize,
    pub(crate) no_tv_movies: bool,
    pub(crate) no_video_movies: bool,
    pub(crate) debug: bool,
}

impl Default for Query {
    fn default() -> Query {
        Query::new()
    }
}

impl Query {
    /// Create a new empty query.
    ///
    /// An empty query matches every named entity, up to the default limit
    /// of 30 results.
    pub fn new() -> Query {
        Query {
            name: None,
            fuzzy: true,
            kinds: vec![],
            atom: None,
            ranges: BTreeMap::new(),
            subs: BTreeMap::new(),
            order: vec![],
            limit: DEFAULT_LIMIT,
            no_tv_movies: false,
            no_video_movies: false,
            debug: false,
        }
    }

    /// Set the name to query by.
    ///
    /// If the name contains `%` or `_`, then it is matched as a SQL `LIKE`
    /// pattern. Otherwise, it is matched fuzzily when the store supports
    /// it, and exactly when it doesn't.
    pub fn name(mut self, name: &str) -> Query {
        self.name = if name.is_empty() { None } else { Some(name.to_string()) };
        self
    }

    /// Enable or disable fuzzy name matching.
    ///
    /// Fuzzy matching is enabled by default, but is only ever used when the
    /// store supports it.
    pub fn fuzzy(mut self, yes: bool) -> Query {
        self.fuzzy = yes;
        self
    }

    /// Add an entity kind to filter by.
    ///
    /// Multiple kinds can be added to a query, and search results must
    /// match at least one of them.
    pub fn kind(mut self, kind: EntityKind) -> Query {
        self.add_kind(kind);
        self
    }

    /// Restrict results to the single entity with the given atom.
    pub fn atom(mut self, atom: Atom) -> Query {
        self.atom = Some(atom);
        self
    }

    /// Set the inclusive range for the given dimension, replacing any range
    /// previously set for it.
    pub fn range(mut self, dim: Dimension, range: Range) -> Query {
        self.ranges.insert(dim, range);
        self
    }

    /// Restrict results to the inclusive range of years given.
    pub fn years(self, min: i64, max: i64) -> Query {
        self.range(Dimension::Year, Range::new(min, max))
    }

    /// Restrict results to episodes in the inclusive range of seasons given.
    /// Results that aren't episodes are unaffected.
    pub fn seasons(self, min: i64, max: i64) -> Query {
        self.range(Dimension::Season, Range::new(min, max))
    }

    /// Restrict results to episodes in the inclusive range of episode
    /// numbers given. Results that aren't episodes are unaffected.
    pub fn episodes(self, min: i64, max: i64) -> Query {
        self.range(Dimension::Episode, Range::new(min, max))
    }

    /// Add a sub-search with the given role.
    ///
    /// The sub-search is resolved to a single entity when the search is
    /// executed, and that entity then restricts the results of this query.
    /// The sub-search is automatically restricted to the entity kinds that
    /// make sense for its role. Any existing sub-search with the same role is
    /// replaced.
    pub fn sub_search(mut self, role: Role, sub: Query) -> Query {
        self.set_sub_search(role, sub);
        self
    }

    /// Restrict results to those connected to the TV show found by the
    /// given sub-search: its episodes, or actors credited in it.
    pub fn tvshow(self, sub: Query) -> Query {
        self.sub_search(Role::Tvshow, sub)
    }

    /// Restrict results to media entities in which the actor found by the
    /// given sub-search is credited.
    pub fn actor(self, sub: Query) -> Query {
        self.sub_search(Role::Actor, sub)
    }

    /// Set the maximum number of results.
    pub fn limit(mut self, limit: usize) -> Query {
        self.limit = limit;
        self
    }

    /// Add a sort key. Keys are applied in the order they are added.
    ///
    /// Columns that aren't recognized are ignored when the query is
    /// compiled.
    pub fn sort(mut self, column: &str, direction: Direction) -> Query {
        self.add_sort(column, direction);
        self
    }

    /// Remove made for TV movies from the results.
    pub fn no_tv_movies(mut self) -> Query {
        self.no_tv_movies = true;
        self
    }

    /// Remove made for video movies from the results.
    pub fn no_video_movies(mut self) -> Query {
        self.no_video_movies = true;
        self
    }

    /// When enabled, every SQL query executed for this search is logged at
    /// the `info` level.
    pub fn debug(mut self, yes: bool) -> Query {
        self.debug = yes;
        self
    }

    /// Returns true if and only if this query asks for verbose logging.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Return the sub-search for the given role, if one exists.
    pub fn get_sub_search(&self, role: Role) -> Option<&Query> {
        self.subs.get(&role).map(|sub| &sub.query)
    }

    /// Returns true if and only if the name of this query should be matched
    /// as a `LIKE` pattern.
    pub(crate) fn has_wildcards(&self) -> bool {
        self.name.as_ref().map_or(false, |n| n.contains(&['%', '_'][..]))
    }

    pub(crate) fn add_kind(&mut self, kind: EntityKind) {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
    }

    pub(crate) fn add_sort(&mut self, column: &str, direction: Direction) {
        self.order.push(SortOrder { column: column.to_string(), direction });
    }

    pub(crate) fn set_sub_search(&mut self, role: Role, mut sub: Query) {
        match role {
            Role::Media => {
                if !sub.kinds.iter().any(|k| k.is_media()) {
                    for &kind in role.kinds() {
                        sub.add_kind(kind);
                    }
                }
            }
            _ => {
                for &kind in role.kinds() {
                    sub.add_kind(kind);
                }
            }
        }
        self.subs.insert(role, SubSearch { query: sub, id: None });
    }
}

/// A role that a sub-search plays in its parent query.
///
/// The role determines which entity kinds the sub-search looks for and how
/// its resolved entity restricts the parent. Roles are resolved in the order
/// they are declared here.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Role {
    /// A movie. Restricts the parent to the movie's cast.
    Movie,
    /// A TV show. Restricts the parent to the show's episodes or cast.
    Tvshow,
    /// An episode. Restricts the parent to the episode's cast.
    Episode,
    /// Any media entity. Restricts the parent to its cast.
    Media,
    /// An actor. Restricts the parent to media the actor is credited in.
    Actor,
}

impl Role {
    /// A short noun phrase describing this role, e.g., `TV show`.
    ///
    /// This is given to disambiguation callbacks so they can tell the user
    /// what is being chosen.
    pub fn label(&self) -> &'static str {
        match *self {
            Role::Movie => "movie",
            Role::Tvshow => "TV show",
            Role::Episode => "episode",
            Role::Media => "media",
            Role::Actor => "actor",
        }
    }

    /// The entity kinds a sub-search with this role is restricted to.
    pub fn kinds(&self) -> &'static [EntityKind] {
        match *self {
            Role::Movie => &[EntityKind::Movie],
            Role::Tvshow => &[EntityKind::Tvshow],
            Role::Episode => &[EntityKind::Episode],
            Role::Media => {
                &[EntityKind::Movie, EntityKind::Tvshow, EntityKind::Episode]
            }
            Role::Actor => &[EntityKind::Actor],
        }
    }

    /// Returns true if and only if this role resolves to a media entity,
    /// whose cast a parent query is restricted to.
    pub fn is_media(&self) -> bool {
        *self != Role::Actor
    }

    /// The canonical directive that introduces a sub-search of this role.
    fn directive(&self) -> &'static str {
        match *self {
            Role::Movie => "movie",
            Role::Tvshow => "tvshow",
            Role::Episode => "episode",
            Role::Media => "credits",
            Role::Actor => "actor",
        }
    }
}

/// A numeric dimension that can be restricted to a range.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Dimension {
    /// The year of a movie, TV show or episode.
    Year,
    /// The rank of a rating, from 0 to 100.
    Rank,
    /// The number of votes of a rating.
    Votes,
    /// The season of an episode.
    Season,
    /// The episode number of an episode.
    Episode,
    /// The billing position of a credit.
    Billing,
}

impl Dimension {
    /// The upper bound used when a range for this dimension is open ended.
    pub fn upper_bound(&self) -> i64 {
        match *self {
            Dimension::Year => 3_000,
            Dimension::Rank => 100,
            Dimension::Votes => 1_000_000_000,
            Dimension::Season => 1_000_000,
            Dimension::Episode => 1_000_000,
            Dimension::Billing => 1_000_000,
        }
    }

    /// The canonical directive that sets a range on this dimension.
    fn directive(&self) -> &'static str {
        match *self {
            Dimension::Year => "years",
            Dimension::Rank => "rank",
            Dimension::Votes => "votes",
            Dimension::Season => "seasons",
            Dimension::Episode => "episodes",
            Dimension::Billing => "billed",
        }
    }
}

/// The direction of a sort key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Smallest first.
    Asc,
    /// Biggest first.
    Desc,
}

impl Direction {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match *self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Direction> {
        match &*s.to_lowercase() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(Error::invalid_sort(s)),
        }
    }
}

/// A single sort key: a column name, as written in the query, and a
/// direction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SortOrder {
    pub(crate) column: String,
    pub(crate) direction: Direction,
}

impl SortOrder {
    /// The column name as it was given.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The sort direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// A sub-search owned by its parent query, along with the atom it resolved
/// to. The atom is only set on the working copy of a query while it is being
/// executed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct SubSearch {
    pub(crate) query: Query,
    pub(crate) id: Option<Atom>,
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(qstr: &str) -> Result<Query> {
        let mut q = Query::new();
        let mut terms = vec![];
        for token in tokens::tokens(qstr) {
            let (name, val) = match tokens::directive(&token) {
                None => {
                    terms.push(token);
                    continue;
                }
                Some(pair) => pair,
            };
            let d = match directive::lookup(name) {
                None => return Err(Error::unknown_directive(name)),
                Some(d) => d,
            };
            d.apply(&mut q, val).map_err(|e| Error::directive(name, e))?;
        }
        if !terms.is_empty() {
            q.name = Some(terms.join(" "));
        }
        Ok(q)
    }
}

/// Writes this query in the free-form query syntax.
///
/// Parsing the output yields an equivalent query. The one exception is the
/// fuzzy setting, which has no directive and is therefore not written.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts: Vec<String> = vec![];
        for kind in &self.kinds {
            parts.push(format!("{{{}}}", kind));
        }
        if let Some(atom) = self.atom {
            parts.push(format!("{{id:{}}}", atom));
        }
        for (dim, range) in &self.ranges {
            parts.push(format!("{{{}:{}}}", dim.directive(), range));
        }
        for (role, sub) in &self.subs {
            parts.push(format!("{{{}:{}}}", role.directive(), sub.query));
        }
        if self.no_tv_movies {
            parts.push("{notv}".to_string());
        }
        if self.no_video_movies {
            parts.push("{novideo}".to_string());
        }
        for ord in &self.order {
            parts.push(format!("{{sort:{} {}}}", ord.column, ord.direction));
        }
        if self.limit != DEFAULT_LIMIT {
            parts.push(format!("{{limit:{}}}", self.limit));
        }
        if self.debug {
            parts.push("{debug}".to_string());
        }
        if let Some(ref name) = self.name {
            parts.push(name.clone());
        }
        write!(f, "{}", parts.join(" "))
    }
}

impl Serialize for Query {
    fn serialize<S>(&self, s: S) -> result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.to_string())
    }
}

impl<'a> Deserialize<'a> for Query {
    fn deserialize<D>(d: D) -> result::Result<Query, D::Error>
    where
        D: Deserializer<'a>,
    {
        use serde::de::Error;

        let querystr = String::deserialize(d)?;
        querystr.parse::<Query>().map_err(|e| D::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(q: &str) -> Query {
        q.parse().unwrap()
    }

    fn parse_err(q: &str) -> Error {
        q.parse::<Query>().unwrap_err()
    }

    #[test]
    fn names() {
        assert_eq!(parse("foo bar baz"), Query::new().name("foo bar baz"));
        assert_eq!(parse("  foo   bar "), Query::new().name("foo bar"));
        assert_eq!(parse(""), Query::new());
    }

    #[test]
    fn kinds() {
        assert_eq!(parse("{movie}"), Query::new().kind(EntityKind::Movie));
        assert_eq!(
            parse("{movie}{tvshow}"),
            Query::new().kind(EntityKind::Movie).kind(EntityKind::Tvshow),
        );
        assert_eq!(
            parse("citizen {movie} kane {tv} {movie}"),
            Query::new()
                .name("citizen kane")
                .kind(EntityKind::Movie)
                .kind(EntityKind::Tvshow),
        );
        assert_eq!(parse("{movie:}"), Query::new().kind(EntityKind::Movie));
    }

    #[test]
    fn plain_words_are_not_directives() {
        assert_eq!(parse("movie"), Query::new().name("movie"));
        assert_eq!(parse("{movie"), Query::new().name("{movie"));
        assert_eq!(parse("{}"), Query::new().name("{}"));
        assert_eq!(parse("the\tmatrix"), Query::new().name("the\tmatrix"));
    }

    #[test]
    fn ranges() {
        assert_eq!(parse("{years:1990-1999}"), Query::new().years(1990, 1999));
        assert_eq!(parse("{year:1990}"), Query::new().years(1990, 1990));
        assert_eq!(parse("{years:1990-}"), Query::new().years(1990, 3000));
        assert_eq!(parse("{years:-1990}"), Query::new().years(0, 1990));
        assert_eq!(parse("{ years : - }"), Query::new().years(0, 3000));
        assert_eq!(
            parse("{votes:10000-}"),
            Query::new().range(Dimension::Votes, Range::new(10000, 1_000_000_000)),
        );
        assert_eq!(
            parse("{rank:70-}"),
            Query::new().range(Dimension::Rank, Range::new(70, 100)),
        );
        assert_eq!(
            parse("{billing:1-5}"),
            Query::new().range(Dimension::Billing, Range::new(1, 5)),
        );
        assert_eq!(parse("{e:2}"), Query::new().episodes(2, 2));
    }

    #[test]
    fn rank_synonyms() {
        let expected = Query::new().range(Dimension::Rank, Range::new(70, 100));
        assert_eq!(parse("{rank:70-}"), expected);
        assert_eq!(parse("{rate:70-}"), expected);
        assert_eq!(parse("{rating:70-}"), expected);
        assert_eq!(parse("{rating:70-}").to_string(), "{rank:70-100}");
    }

    #[test]
    fn open_ranges_end_at_the_dimension_bound() {
        assert_eq!(Dimension::Year.upper_bound(), 3_000);
        assert_eq!(Dimension::Rank.upper_bound(), 100);
        for (qstr, dim) in &[
            ("{years:1-}", Dimension::Year),
            ("{rank:1-}", Dimension::Rank),
            ("{votes:1-}", Dimension::Votes),
            ("{seasons:1-}", Dimension::Season),
            ("{episodes:1-}", Dimension::Episode),
            ("{billed:1-}", Dimension::Billing),
        ] {
            let q = parse(qstr);
            let expected = Range::new(1, dim.upper_bound());
            assert_eq!(q.ranges[dim], expected, "{}", qstr);
        }
    }

    #[test]
    fn season_synonyms() {
        let expected = Query::new().seasons(1, 3);
        assert_eq!(parse("{s:1-3}"), expected);
        assert_eq!(parse("{season:1-3}"), expected);
        assert_eq!(parse("{seasons:1-3}"), expected);
    }

    #[test]
    fn later_ranges_replace_earlier_ones() {
        assert_eq!(
            parse("{years:1990} {year:2000-2010}"),
            Query::new().years(2000, 2010),
        );
    }

    #[test]
    fn flags() {
        assert_eq!(
            parse("{notv} {novideo} {debug}"),
            Query::new().no_tv_movies().no_video_movies().debug(true),
        );
        assert_eq!(parse("{limit:5}"), Query::new().limit(5));
        assert_eq!(parse("{id:42}"), Query::new().atom(Atom(42)));
        assert_eq!(parse("{atom:42}"), Query::new().atom(Atom(42)));
    }

    #[test]
    fn sorting() {
        assert_eq!(
            parse("{sort:year}"),
            Query::new().sort("year", Direction::Desc),
        );
        assert_eq!(
            parse("{sort:name}"),
            Query::new().sort("name", Direction::Asc),
        );
        assert_eq!(
            parse("{sort:episode desc}"),
            Query::new().sort("episode", Direction::Desc),
        );
        assert_eq!(
            parse("{sort:whatever}"),
            Query::new().sort("whatever", Direction::Asc),
        );
        assert_eq!(
            parse("{sort:season} {sort:episode_num DESC}"),
            Query::new()
                .sort("season", Direction::Asc)
                .sort("episode_num", Direction::Desc),
        );
    }

    #[test]
    fn sub_searches() {
        let q = parse("{show:supernatural}{s:1}");
        let show = Query::new().name("supernatural").kind(EntityKind::Tvshow);
        assert_eq!(q, Query::new().tvshow(show.clone()).seasons(1, 1));
        assert_eq!(q.get_sub_search(Role::Tvshow), Some(&show));

        assert_eq!(parse("{tv:supernatural}"), parse("{show:supernatural}"));
        assert_eq!(
            parse("{cast:keanu reeves}"),
            parse("{actor:keanu reeves}"),
        );
        assert_eq!(
            parse("{actor:keanu reeves}"),
            Query::new().actor(
                Query::new().name("keanu reeves").kind(EntityKind::Actor)
            ),
        );
    }

    #[test]
    fn nested_sub_searches() {
        let q = parse("{cast:{movie:{years:1999} the matrix} {billed:1}}");
        let actor = q.get_sub_search(Role::Actor).unwrap();
        let movie = actor.get_sub_search(Role::Movie).unwrap();
        assert_eq!(
            *movie,
            Query::new()
                .name("the matrix")
                .years(1999, 1999)
                .kind(EntityKind::Movie),
        );
        assert_eq!(
            actor.ranges.get(&Dimension::Billing),
            Some(&Range::new(1, 1)),
        );
    }

    #[test]
    fn credits_are_any_media() {
        let q = parse("{credits:the matrix}");
        let sub = q.get_sub_search(Role::Media).unwrap();
        assert_eq!(
            sub.kinds,
            vec![EntityKind::Movie, EntityKind::Tvshow, EntityKind::Episode],
        );

        let q = parse("{credits:{tvshow} the wire}");
        let sub = q.get_sub_search(Role::Media).unwrap();
        assert_eq!(sub.kinds, vec![EntityKind::Tvshow]);
    }

    #[test]
    fn errors() {
        match *parse_err("{blah}").kind() {
            ErrorKind::UnknownDirective(ref name) => assert_eq!(name, "blah"),
            ref kind => panic!("unexpected error kind: {:?}", kind),
        }
        assert!(parse_err("{Movie}").is_malformed_query());
        assert!(parse_err("{limit:a}").is_malformed_query());
        assert!(parse_err("{limit:}").is_malformed_query());
        assert!(parse_err("{id:x}").is_malformed_query());
        assert!(parse_err("{years:19x0}").is_malformed_query());
        assert!(parse_err("{sort:}").is_malformed_query());
        assert!(parse_err("{sort:a b c}").is_malformed_query());
        assert!(parse_err("{sort:year sideways}").is_malformed_query());
    }

    #[test]
    fn errors_name_the_directive() {
        let err = parse_err("{s:one}");
        assert!(err.to_string().starts_with("{s}:"), "{}", err);
        assert!(err.to_string().contains("'one'"), "{}", err);

        let err = parse_err("{show}");
        match *err.kind() {
            ErrorKind::Directive { ref name, ref err } => {
                assert_eq!(name, "show");
                match *err.kind() {
                    ErrorKind::EmptyValue(ref name) => assert_eq!(name, "show"),
                    ref kind => panic!("unexpected error kind: {:?}", kind),
                }
            }
            ref kind => panic!("unexpected error kind: {:?}", kind),
        }
    }

    #[test]
    fn sub_search_errors_are_tagged() {
        let err = parse_err("{show:{limit:x} supernatural}");
        match *err.kind() {
            ErrorKind::Directive { ref err, .. } => match *err.kind() {
                ErrorKind::SubSearch { ref what, .. } => {
                    assert_eq!(what, "TV show");
                }
                ref kind => panic!("unexpected error kind: {:?}", kind),
            },
            ref kind => panic!("unexpected error kind: {:?}", kind),
        }
        assert!(err.is_malformed_query());
    }

    #[test]
    fn wildcards() {
        assert!(parse("the matrix%").has_wildcards());
        assert!(parse("the_matrix").has_wildcards());
        assert!(!parse("the matrix").has_wildcards());
        assert!(!parse("{movie}").has_wildcards());
    }

    #[test]
    fn display() {
        let q = Query::new()
            .name("foo bar")
            .kind(EntityKind::Tvshow)
            .kind(EntityKind::Movie)
            .seasons(4, 5)
            .no_tv_movies()
            .sort("year", Direction::Desc)
            .limit(31);
        assert_eq!(
            q.to_string(),
            "{tvshow} {movie} {seasons:4-5} {notv} {sort:year desc} \
             {limit:31} foo bar",
        );

        let q = parse("{show:supernatural} {s:1}");
        assert_eq!(q.to_string(), "{seasons:1} {tvshow:{tvshow} supernatural}");
    }

    #[test]
    fn display_roundtrip() {
        let queries = &[
            "citizen kane {movie}",
            "{show:{s:1-3} supernatural} {sort:episode desc} {limit:5}",
            "{credits:the matrix} {billed:1-3} {debug}",
            "{cast:{movie:the matrix} keanu} {id:9} {novideo} foo%",
        ];
        for qstr in queries {
            let q = parse(qstr);
            assert_eq!(parse(&q.to_string()), q, "query: {}", qstr);
        }

        let built = &[
            Query::new().years(-5, -5),
            Query::new().years(-5, 10).name("foo"),
            Query::new().range(Dimension::Billing, Range::new(0, -1)),
        ];
        for q in built {
            assert_eq!(parse(&q.to_string()), *q, "query: {}", q);
        }
    }

    #[test]
    fn serialize() {
        #[derive(Serialize)]
        struct Test {
            query: Query,
        }
        let query = Query::new().name("foo bar baz").limit(31).seasons(4, 4);
        let got = serde_json::to_string(&Test { query }).unwrap();

        let expected = r#"{"query":"{seasons:4} {limit:31} foo bar baz"}"#;
        assert_eq!(got, expected);
    }

    #[test]
    fn deserialize() {
        let json = r#"{"query": "foo {limit:30} bar {s:4} baz {tvshow}"}"#;
        let expected: Query =
            "{tvshow} {seasons:4} foo bar baz".parse().unwrap();

        #[derive(Deserialize)]
        struct Test {
            query: Query,
        }
        let got: Test = serde_json::from_str(json).unwrap();
        assert_eq!(got.query, expected);
    }
}
