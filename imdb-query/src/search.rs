use std::fmt;
use std::result;
use std::time::Instant;

use crate::error::{ChooserError, Error, Result};
use crate::query::Query;
use crate::record::{Atom, SearchResult};
use crate::sql::SqlQuery;
use crate::store::{Row, Store};

/// The default threshold used to automatically pick a sub-search result.
const DEFAULT_GOOD_THRESHOLD: f64 = 0.25;

/// A callback that picks one result out of an ambiguous sub-search.
///
/// It is given every result of the sub-search, in order, along with a short
/// noun phrase describing what is being picked (e.g., `TV show`). Returning
/// `None` stops the search, which then returns no results. Returning an error
/// also stops the search, and the error is reported to the caller of
/// [`Searcher::search`](struct.Searcher.html#method.search).
pub type Chooser = Box<
    dyn FnMut(
        &[SearchResult],
        &str,
    ) -> result::Result<Option<SearchResult>, ChooserError>,
>;

/// A handle for executing queries against a store.
///
/// The primary interface to a `Searcher` is its `search` method, which takes
/// as input a [`Query`](struct.Query.html), resolves each of its sub-searches
/// to a single entity and then executes the query as a single SQL statement.
///
/// The good-match threshold and chooser configured on a searcher apply to
/// every sub-search at every level of nesting.
pub struct Searcher<S> {
    store: S,
    good_threshold: f64,
    chooser: Option<Chooser>,
}

impl<S: fmt::Debug> fmt::Debug for Searcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Searcher")
            .field("store", &self.store)
            .field("good_threshold", &self.good_threshold)
            .field("chooser", &self.chooser.as_ref().map(|_| "<chooser>"))
            .finish()
    }
}

impl<S: Store> Searcher<S> {
    /// Create a new searcher for the given store.
    ///
    /// A single searcher can be used to execute many queries.
    pub fn new(store: S) -> Searcher<S> {
        Searcher {
            store,
            good_threshold: DEFAULT_GOOD_THRESHOLD,
            chooser: None,
        }
    }

    /// Set the threshold at which the best result of a sub-search is picked
    /// automatically.
    ///
    /// When a sub-search returns two or more results with similarity scores,
    /// and the score of the first exceeds the score of the second by at
    /// least this amount, then the first result is picked without consulting
    /// the chooser.
    ///
    /// The default is `0.25`. Set it to something above `1.0` to always
    /// defer to the chooser.
    pub fn good_threshold(mut self, threshold: f64) -> Searcher<S> {
        self.good_threshold = threshold;
        self
    }

    /// Set the callback used to pick among ambiguous sub-search results.
    ///
    /// When no chooser is set, the first result is always picked.
    pub fn chooser<F>(mut self, chooser: F) -> Searcher<S>
    where
        F: FnMut(
                &[SearchResult],
                &str,
            ) -> result::Result<Option<SearchResult>, ChooserError>
            + 'static,
    {
        self.chooser = Some(Box::new(chooser));
        self
    }

    /// Return a reference to the underlying store for this searcher.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute a search with the given `Query`.
    ///
    /// Sub-searches are resolved first, depth first, in the order movie, TV
    /// show, episode, media and then actor. If any sub-search finds nothing
    /// (or the chooser declines to pick anything), then no results are
    /// returned and the outer query is never executed.
    ///
    /// The query given is not modified. The atoms that sub-searches resolve
    /// to are recorded on a private copy.
    pub fn search(&mut self, query: &Query) -> Result<Vec<SearchResult>> {
        let mut query = query.clone();
        match self.execute(&mut query)? {
            None => Ok(vec![]),
            Some(results) => Ok(results),
        }
    }

    /// Pick a single result from the results of a sub-search.
    ///
    /// `what` describes what is being picked and is given to the chooser.
    ///
    /// No results means nothing is picked. A single result is always picked.
    /// Otherwise, the first result is picked if it is clearly better than
    /// the second according to the good-match threshold. If it isn't, then
    /// the chooser decides. Without a chooser, the first result is picked.
    pub fn pick(
        &mut self,
        results: &[SearchResult],
        what: &str,
    ) -> Result<Option<SearchResult>> {
        let (first, second) = match results {
            [] => return Ok(None),
            [only] => return Ok(Some(only.clone())),
            [first, second, ..] => (first, second),
        };
        if first.has_similarity()
            && second.has_similarity()
            && first.similarity - second.similarity >= self.good_threshold
        {
            log::debug!(
                "picked {} '{}' automatically ({:.3} vs {:.3})",
                what,
                first.name,
                first.similarity,
                second.similarity
            );
            return Ok(Some(first.clone()));
        }
        match self.chooser {
            None => Ok(Some(first.clone())),
            Some(ref mut choose) => choose(results, what).map_err(Error::chooser),
        }
    }

    /// Run the given query, resolving its sub-searches first. `None` is
    /// returned when a sub-search picked nothing.
    ///
    /// Every sub-search takes the debug setting of its parent, so the root
    /// query decides how statements are logged at every level.
    fn execute(
        &mut self,
        query: &mut Query,
    ) -> Result<Option<Vec<SearchResult>>> {
        let debug = query.debug;
        for (role, sub) in query.subs.iter_mut() {
            sub.query.debug = debug;
            let picked = self
                .resolve(&mut sub.query, role.label())
                .map_err(|err| Error::sub_search(role.label(), err))?;
            match picked {
                None => {
                    log::debug!("{} sub-search picked nothing", role.label());
                    return Ok(None);
                }
                Some(id) => sub.id = Some(id),
            }
        }

        let sql = SqlQuery::compile(query, self.store.fuzzy_enabled());
        let results = self
            .fetch(&sql, debug)?
            .into_iter()
            .map(SearchResult::from_row)
            .collect::<Result<Vec<SearchResult>>>()?;
        Ok(Some(results))
    }

    fn resolve(
        &mut self,
        query: &mut Query,
        what: &str,
    ) -> Result<Option<Atom>> {
        let results = match self.execute(query)? {
            None => return Ok(None),
            Some(results) => results,
        };
        Ok(self.pick(&results, what)?.map(|r| r.id))
    }

    /// Send a single statement to the store. Statements are logged at info
    /// level when debugging and at trace level otherwise.
    fn fetch(&self, sql: &SqlQuery, debug: bool) -> Result<Vec<Row>> {
        if debug {
            log::info!("{}\nparams: {:?}", sql.sql(), sql.params());
        } else {
            log::trace!("{}\nparams: {:?}", sql.sql(), sql.params());
        }
        let start = Instant::now();
        let rows = self.store.execute(sql)?;
        let elapsed = start.elapsed();
        log::debug!(
            "{} rows fetched in {}.{:03}s",
            rows.len(),
            elapsed.as_secs(),
            elapsed.subsec_millis()
        );
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::ErrorKind;
    use crate::query::Role;
    use crate::store::Row;

    /// A store that answers each statement with the next scripted set of
    /// rows, and remembers every statement it was asked to execute.
    #[derive(Debug, Default)]
    struct MockStore {
        responses: RefCell<Vec<Vec<Row>>>,
        executed: RefCell<Vec<SqlQuery>>,
        fail: bool,
    }

    impl MockStore {
        fn new(mut responses: Vec<Vec<Row>>) -> MockStore {
            responses.reverse();
            MockStore { responses: RefCell::new(responses), ..MockStore::default() }
        }

        fn executed(&self) -> Vec<SqlQuery> {
            self.executed.borrow().clone()
        }
    }

    impl Store for MockStore {
        fn fuzzy_enabled(&self) -> bool {
            true
        }

        fn execute(&self, query: &SqlQuery) -> Result<Vec<Row>> {
            self.executed.borrow_mut().push(query.clone());
            if self.fail {
                let err = std::io::Error::new(std::io::ErrorKind::Other, "down");
                return Err(Error::storage(err));
            }
            Ok(self.responses.borrow_mut().pop().unwrap_or_default())
        }
    }

    fn row(entity: &str, id: i64, name: &str, similarity: f64) -> Row {
        Row {
            entity: entity.to_string(),
            atom_id: id,
            name: name.to_string(),
            similarity,
            ..Row::default()
        }
    }

    fn result(entity: &str, id: i64, similarity: f64) -> SearchResult {
        SearchResult::from_row(row(entity, id, "x", similarity)).unwrap()
    }

    fn query(q: &str) -> Query {
        q.parse().unwrap()
    }

    #[test]
    fn pick_clear_winner() {
        let mut s = Searcher::new(MockStore::new(vec![]))
            .chooser(|_, _| panic!("chooser should not be called"));
        let rs = vec![result("tvshow", 1, 0.9), result("tvshow", 2, 0.5)];
        assert_eq!(s.pick(&rs, "TV show").unwrap().unwrap().id, Atom(1));
    }

    #[test]
    fn pick_ambiguous_without_chooser() {
        let mut s = Searcher::new(MockStore::new(vec![]));
        let rs = vec![result("tvshow", 1, 0.6), result("tvshow", 2, 0.5)];
        assert_eq!(s.pick(&rs, "TV show").unwrap().unwrap().id, Atom(1));
    }

    #[test]
    fn pick_ambiguous_with_chooser() {
        let seen = Rc::new(RefCell::new(vec![]));
        let seen2 = Rc::clone(&seen);
        let mut s = Searcher::new(MockStore::new(vec![])).chooser(
            move |rs: &[SearchResult], what: &str| {
                seen2.borrow_mut().push((rs.len(), what.to_string()));
                Ok(Some(rs[1].clone()))
            },
        );
        let rs = vec![result("tvshow", 1, 0.6), result("tvshow", 2, 0.5)];
        assert_eq!(s.pick(&rs, "TV show").unwrap().unwrap().id, Atom(2));
        assert_eq!(*seen.borrow(), vec![(2, "TV show".to_string())]);
    }

    #[test]
    fn pick_without_similarity_asks_chooser() {
        let mut s = Searcher::new(MockStore::new(vec![]))
            .good_threshold(0.0)
            .chooser(|rs: &[SearchResult], _: &str| Ok(Some(rs[1].clone())));
        let rs = vec![result("movie", 1, -1.0), result("movie", 2, -1.0)];
        assert_eq!(s.pick(&rs, "movie").unwrap().unwrap().id, Atom(2));
    }

    #[test]
    fn pick_trivial() {
        let mut s = Searcher::new(MockStore::new(vec![]))
            .chooser(|_, _| panic!("chooser should not be called"));
        assert_eq!(s.pick(&[], "movie").unwrap(), None);
        let rs = vec![result("movie", 5, -1.0)];
        assert_eq!(s.pick(&rs, "movie").unwrap().unwrap().id, Atom(5));
    }

    #[test]
    fn no_sub_searches() {
        let store = MockStore::new(vec![vec![row("movie", 1, "Citizen Kane", 1.0)]]);
        let mut s = Searcher::new(store);
        let rs = s.search(&query("citizen kane {movie}")).unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs[0].name, "Citizen Kane");

        let executed = s.store().executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(executed[0].params(), &["citizen kane".to_string()]);
    }

    #[test]
    fn sub_search_resolves_before_parent() {
        let store = MockStore::new(vec![
            vec![
                row("tvshow", 10, "Supernatural", 1.0),
                row("tvshow", 20, "Supernatural Science", 0.4),
            ],
            vec![row("episode", 11, "Pilot", -1.0)],
        ]);
        let mut s = Searcher::new(store)
            .chooser(|_, _| panic!("chooser should not be called"));
        let rs = s.search(&query("{show:supernatural} {s:1}")).unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs[0].id, Atom(11));

        let executed = s.store().executed();
        assert_eq!(executed.len(), 2);
        assert!(executed[0].sql().contains("IN ('tvshow')"));
        assert!(executed[1].sql().contains("e.tvshow_atom_id = 10"));
    }

    #[test]
    fn empty_sub_search_short_circuits() {
        let store = MockStore::new(vec![vec![]]);
        let mut s = Searcher::new(store);
        let rs = s.search(&query("{show:nothing here} {s:1}")).unwrap();
        assert!(rs.is_empty());
        assert_eq!(s.store().executed().len(), 1);
    }

    #[test]
    fn chooser_declines() {
        let store = MockStore::new(vec![vec![
            row("actor", 1, "Keanu Reeves", 0.6),
            row("actor", 2, "Keanu Reeves (II)", 0.5),
        ]]);
        let mut s = Searcher::new(store).chooser(|_, _| Ok(None));
        let rs = s.search(&query("{actor:keanu reeves}")).unwrap();
        assert!(rs.is_empty());
        assert_eq!(s.store().executed().len(), 1);
    }

    #[test]
    fn chooser_error() {
        let store = MockStore::new(vec![vec![
            row("actor", 1, "Keanu Reeves", 0.6),
            row("actor", 2, "Keanu Reeves (II)", 0.5),
        ]]);
        let mut s =
            Searcher::new(store).chooser(|_, _| Err("user gave up".into()));
        let err = s.search(&query("{actor:keanu reeves}")).unwrap_err();
        match *err.kind() {
            ErrorKind::SubSearch { ref what, ref err } => {
                assert_eq!(what, "actor");
                match *err.kind() {
                    ErrorKind::Chooser(ref err) => {
                        assert_eq!(err.to_string(), "user gave up");
                    }
                    ref kind => panic!("unexpected error kind: {:?}", kind),
                }
            }
            ref kind => panic!("unexpected error kind: {:?}", kind),
        }
        assert!(!err.is_malformed_query());
        assert_eq!(s.store().executed().len(), 1);
    }

    #[test]
    fn storage_errors_pass_through() {
        let store = MockStore { fail: true, ..MockStore::default() };
        let mut s = Searcher::new(store);
        let err = s.search(&query("foo")).unwrap_err();
        match *err.kind() {
            ErrorKind::Storage(_) => {}
            ref kind => panic!("unexpected error kind: {:?}", kind),
        }

        let store = MockStore { fail: true, ..MockStore::default() };
        let mut s = Searcher::new(store);
        let err = s.search(&query("{movie:foo}")).unwrap_err();
        match *err.kind() {
            ErrorKind::SubSearch { ref what, .. } => assert_eq!(what, "movie"),
            ref kind => panic!("unexpected error kind: {:?}", kind),
        }
    }

    #[test]
    fn roles_resolve_in_order() {
        let store = MockStore::new(vec![
            vec![row("movie", 2, "The Matrix", 1.0)],
            vec![row("actor", 30, "Keanu Reeves", 1.0)],
            vec![],
        ]);
        let mut s = Searcher::new(store);
        let q = query("{actor:keanu reeves} {movie:the matrix}");
        s.search(&q).unwrap();

        let executed = s.store().executed();
        assert_eq!(executed.len(), 3);
        assert_eq!(executed[0].params(), &["the matrix".to_string()]);
        assert_eq!(executed[1].params(), &["keanu reeves".to_string()]);
        assert!(executed[2].sql().contains("c_media.media_atom_id = 2"));
        assert!(executed[2].sql().contains("c_actor.actor_atom_id = 30"));
    }

    #[test]
    fn nested_sub_searches() {
        let store = MockStore::new(vec![
            vec![row("movie", 2, "The Matrix", 1.0)],
            vec![row("actor", 30, "Keanu Reeves", 1.0)],
            vec![row("movie", 3, "The Matrix Reloaded", -1.0)],
        ]);
        let mut s = Searcher::new(store);
        let q = query("{cast:{movie:the matrix} keanu}");
        let rs = s.search(&q).unwrap();
        assert_eq!(rs[0].id, Atom(3));

        let executed = s.store().executed();
        assert_eq!(executed.len(), 3);
        // The actor sub-search is restricted by the movie it resolved.
        assert!(executed[1].sql().contains("c_media.media_atom_id = 2"));
        assert!(executed[1].sql().contains("IN ('actor')"));
        assert!(executed[2].sql().contains("c_actor.actor_atom_id = 30"));

        // The caller's query is untouched.
        assert!(q.subs[&Role::Actor].id.is_none());
    }

    #[test]
    fn debug_flag_comes_from_the_root() {
        let store = MockStore::new(vec![
            vec![row("tvshow", 10, "x", 1.0)],
            vec![row("movie", 2, "x", 1.0)],
        ]);
        let mut s = Searcher::new(store);
        let mut q = query("{debug} {movie:{show:supernatural} the matrix}");
        assert!(!q.get_sub_search(Role::Movie).unwrap().is_debug());
        s.execute(&mut q).unwrap().unwrap();

        let movie = q.get_sub_search(Role::Movie).unwrap();
        assert!(movie.is_debug());
        assert!(movie.get_sub_search(Role::Tvshow).unwrap().is_debug());
    }

    #[test]
    fn debug_flag_of_a_sub_search_is_ignored() {
        let store = MockStore::new(vec![vec![row("movie", 2, "x", 1.0)]]);
        let mut s = Searcher::new(store);
        let mut q = query("{movie:{debug} the matrix}");
        assert!(q.get_sub_search(Role::Movie).unwrap().is_debug());
        s.execute(&mut q).unwrap().unwrap();
        assert!(!q.get_sub_search(Role::Movie).unwrap().is_debug());
    }

    #[test]
    fn pick_gap_equal_to_threshold() {
        let mut s = Searcher::new(MockStore::default())
            .good_threshold(0.25)
            .chooser(|_, _| panic!("chooser must not be called"));
        let rs = vec![result("movie", 1, 0.75), result("movie", 2, 0.5)];
        assert_eq!(s.pick(&rs, "movie").unwrap().unwrap().id, Atom(1));
    }
}
