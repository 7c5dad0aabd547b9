use crate::query::{Dimension, Direction, Query, Range, Role};
use crate::record::Atom;

/// The expression that derives the kind of entity for each row. The first
/// entity table that joins wins.
const ENTITY_COLUMN: &str = "\
CASE
    WHEN m.atom_id IS NOT NULL THEN 'movie'
    WHEN t.atom_id IS NOT NULL THEN 'tvshow'
    WHEN e.atom_id IS NOT NULL THEN 'episode'
    WHEN a.atom_id IS NOT NULL THEN 'actor'
    ELSE ''
  END";

const ATOM_COLUMN: &str = "COALESCE(m.atom_id, t.atom_id, e.atom_id, a.atom_id)";

const YEAR_COLUMN: &str = "COALESCE(m.year, t.year, e.year, 0)";

const ATTRS_COLUMN: &str = "\
CASE
    WHEN m.atom_id IS NOT NULL THEN
      trim(
        CASE WHEN m.tv THEN '(TV) ' ELSE '' END
        || CASE WHEN m.video THEN '(V)' ELSE '' END
      )
    WHEN t.atom_id IS NOT NULL THEN
      CASE
        WHEN t.year_start > 0 THEN cast(t.year_start AS text)
        ELSE '????'
      END
      || '-' ||
      CASE
        WHEN t.year_end > 0 THEN cast(t.year_end AS text)
        ELSE '????'
      END
    WHEN e.atom_id IS NOT NULL THEN
      '(TV show: ' || COALESCE(et.name, '')
      || CASE
        WHEN e.season > 0 AND e.episode_num > 0 THEN
          ', #' || cast(e.season AS text) || '.' || cast(e.episode_num AS text)
        ELSE ''
      END
      || ')'
    ELSE ''
  END";

const BASE_JOINS: &str = "\
FROM name
LEFT JOIN movie AS m ON name.atom_id = m.atom_id
LEFT JOIN tvshow AS t ON name.atom_id = t.atom_id
LEFT JOIN episode AS e ON name.atom_id = e.atom_id
LEFT JOIN name AS et ON e.tvshow_atom_id = et.atom_id
LEFT JOIN actor AS a ON name.atom_id = a.atom_id
LEFT JOIN rating ON name.atom_id = rating.atom_id";

/// The credit columns in projection order: the column on the `credit`
/// table, the value used when no credit joined and the projected alias.
const CREDIT_COLUMNS: &[(&str, &str, &str)] = &[
    ("actor_atom_id", "0", "c_actor_id"),
    ("media_atom_id", "0", "c_media_id"),
    ("character", "''", "c_character"),
    ("position", "0", "c_position"),
    ("attrs", "''", "c_attrs"),
];

/// A single SQL statement along with its positional parameters.
///
/// Every compiled statement selects the same thirteen columns, in the order
/// of the fields on [`Row`](struct.Row.html). The statement refers to at
/// most one parameter, `$1`, which is always the name being searched for.
/// No user supplied text is ever written into the statement itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SqlQuery {
    sql: String,
    params: Vec<String>,
}

impl SqlQuery {
    /// Compile the given query into a single SQL statement.
    ///
    /// `fuzzy_enabled` should report whether the store executing the
    /// statement supports trigram similarity. Only sub-searches that have
    /// been resolved to an atom influence the statement. Unresolved
    /// sub-searches are ignored.
    ///
    /// Compilation is a pure function of its inputs.
    pub fn compile(query: &Query, fuzzy_enabled: bool) -> SqlQuery {
        Compiler::new(query, fuzzy_enabled).compile()
    }

    /// The text of this statement.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The positional parameters of this statement. The first binds to `$1`.
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

struct Compiler<'q> {
    query: &'q Query,
    fuzzy: bool,
    actor: Option<Atom>,
    media: Option<(Role, Atom)>,
}

impl<'q> Compiler<'q> {
    fn new(query: &'q Query, fuzzy_enabled: bool) -> Compiler<'q> {
        // Sub-searches are kept in role order, so the first resolved media
        // role wins.
        let media = query
            .subs
            .iter()
            .filter(|&(role, _)| role.is_media())
            .find_map(|(&role, sub)| sub.id.map(|id| (role, id)));
        Compiler {
            query,
            fuzzy: fuzzy_enabled && query.fuzzy && !query.has_wildcards(),
            actor: query.subs.get(&Role::Actor).and_then(|s| s.id),
            media,
        }
    }

    fn compile(&self) -> SqlQuery {
        let mut sql = format!(
            "SELECT\n  {} AS entity,\n  {} AS atom_id,\n  name.name AS name,\n  \
             {} AS year,\n  {},\n  {} AS attrs,\n  \
             COALESCE(rating.votes, 0) AS votes,\n  \
             COALESCE(rating.rank, 0) AS rank,\n  {}\n{}",
            ENTITY_COLUMN,
            ATOM_COLUMN,
            YEAR_COLUMN,
            self.similarity_column(),
            ATTRS_COLUMN,
            self.credit_columns(),
            BASE_JOINS,
        );
        for join in self.credit_joins() {
            sql.push('\n');
            sql.push_str(&join);
        }
        sql.push_str("\nWHERE\n  ");
        sql.push_str(&self.conditions().join("\n  AND "));
        if let Some(order) = self.order_by() {
            sql.push('\n');
            sql.push_str(&order);
        }
        sql.push_str(&format!("\nLIMIT {}", self.query.limit));

        let params = match self.query.name {
            None => vec![],
            Some(ref name) => vec![name.clone()],
        };
        SqlQuery { sql, params }
    }

    fn has_fuzzy_name(&self) -> bool {
        self.fuzzy && self.query.name.is_some()
    }

    fn similarity_column(&self) -> &'static str {
        if self.has_fuzzy_name() {
            "similarity(name.name, $1) AS similarity"
        } else {
            "-1 AS similarity"
        }
    }

    fn credit_aliases(&self) -> Vec<&'static str> {
        let mut aliases = vec![];
        if self.actor.is_some() {
            aliases.push("c_actor");
        }
        if self.media.is_some() {
            aliases.push("c_media");
        }
        aliases
    }

    fn credit_columns(&self) -> String {
        let aliases = self.credit_aliases();
        let columns: Vec<String> = CREDIT_COLUMNS
            .iter()
            .map(|&(column, zero, name)| {
                if aliases.is_empty() {
                    return format!("{} AS {}", zero, name);
                }
                let mut exprs: Vec<String> = aliases
                    .iter()
                    .map(|alias| format!("{}.{}", alias, column))
                    .collect();
                exprs.push(zero.to_string());
                format!("COALESCE({}) AS {}", exprs.join(", "), name)
            })
            .collect();
        columns.join(",\n  ")
    }

    fn credit_joins(&self) -> Vec<String> {
        let mut joins = vec![];
        if let Some(id) = self.actor {
            joins.push(format!(
                "LEFT JOIN credit AS c_actor ON \
                 name.atom_id = c_actor.media_atom_id \
                 AND c_actor.actor_atom_id = {}",
                id,
            ));
        }
        if let Some((_, id)) = self.media {
            joins.push(format!(
                "LEFT JOIN credit AS c_media ON \
                 a.atom_id = c_media.actor_atom_id \
                 AND c_media.media_atom_id = {}",
                id,
            ));
        }
        joins
    }

    fn conditions(&self) -> Vec<String> {
        let q = self.query;
        let mut conj = vec![format!("{} IS NOT NULL", ATOM_COLUMN)];

        let mut joined = None;
        if let Some((role, id)) = self.media {
            conj.push(match role {
                Role::Tvshow => format!(
                    "(e.tvshow_atom_id = {} \
                     OR c_media.actor_atom_id IS NOT NULL)",
                    id,
                ),
                _ => "c_media.actor_atom_id IS NOT NULL".to_string(),
            });
            joined = Some("c_media");
        }
        if self.actor.is_some() {
            conj.push("c_actor.media_atom_id IS NOT NULL".to_string());
            joined = Some("c_actor");
        }
        if let (Some(alias), Some(r)) = (joined, q.ranges.get(&Dimension::Billing))
        {
            conj.push(range_cond(&format!("{}.position", alias), r));
        }

        if let Some(atom) = q.atom {
            conj.push(format!("name.atom_id = {}", atom));
        }
        if !q.kinds.is_empty() {
            let kinds: Vec<String> =
                q.kinds.iter().map(|k| format!("'{}'", k.as_str())).collect();
            conj.push(format!("{} IN ({})", ENTITY_COLUMN, kinds.join(", ")));
        }
        for (&dim, r) in &q.ranges {
            match dim {
                Dimension::Year => conj.push(range_cond(YEAR_COLUMN, r)),
                Dimension::Rank => conj.push(range_cond("rating.rank", r)),
                Dimension::Votes => conj.push(range_cond("rating.votes", r)),
                Dimension::Season => conj.push(format!(
                    "(e.atom_id IS NULL OR {})",
                    range_cond("e.season", r),
                )),
                Dimension::Episode => conj.push(format!(
                    "(e.atom_id IS NULL OR {})",
                    range_cond("e.episode_num", r),
                )),
                // Handled with the credit joins above.
                Dimension::Billing => {}
            }
        }
        if q.no_tv_movies {
            conj.push(
                "(m.atom_id IS NULL OR m.tv = cast(0 as boolean))".to_string(),
            );
        }
        if q.no_video_movies {
            conj.push(
                "(m.atom_id IS NULL OR m.video = cast(0 as boolean))"
                    .to_string(),
            );
        }
        if q.name.is_some() {
            let pred = if q.has_wildcards() {
                "name.name LIKE $1"
            } else if self.fuzzy {
                "name.name % $1"
            } else {
                "name.name = $1"
            };
            conj.push(pred.to_string());
        }
        conj
    }

    fn order_by(&self) -> Option<String> {
        let mut keys = vec![];
        if self.has_fuzzy_name() {
            keys.push("similarity DESC NULLS LAST".to_string());
        }
        for ord in &self.query.order {
            let column = match qualified_column(&ord.column) {
                None => continue,
                Some(column) => column,
            };
            keys.push(format!(
                "{} {} NULLS LAST",
                column,
                ord.direction.as_sql()
            ));
        }
        if keys.is_empty() {
            None
        } else {
            Some(format!("ORDER BY {}", keys.join(", ")))
        }
    }
}

fn range_cond(column: &str, r: &Range) -> String {
    format!("{} >= {} AND {} <= {}", column, r.min, column, r.max)
}

/// Map a sort column, as written in a query, to the expression used in the
/// `ORDER BY` clause. Columns not in this list cannot be sorted on.
pub(crate) fn qualified_column(column: &str) -> Option<&'static str> {
    Some(match column {
        "entity" => "entity",
        "atom_id" => "atom_id",
        "name" | "title" => "name",
        "year" => "year",
        "attrs" => "attrs",
        "similarity" => "similarity",
        "season" => "e.season",
        "episode" | "episode_num" => "e.episode_num",
        "rank" | "rating" => "rating.rank",
        "votes" => "rating.votes",
        "billing" | "billed" => "c_position",
        _ => return None,
    })
}

/// The direction used for a sort column when the query doesn't give one.
pub(crate) fn default_direction(column: &str) -> Direction {
    match column {
        "year" | "similarity" | "rank" | "rating" | "votes" => Direction::Desc,
        _ => Direction::Asc,
    }
}
