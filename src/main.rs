use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use imdb_query::{Query, Searcher, SqliteStore};

use crate::util::{choose, write_directives, write_tsv};

mod logger;
mod util;

fn main() {
    if let Err(err) = try_main() {
        // A pipe error occurs when the consumer of this process's output has
        // hung up. This is a normal event, and we should quit gracefully.
        if is_pipe_error(&err) {
            process::exit(0);
        }
        eprintln!("{:?}", err);
        process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::from_matches(&app().get_matches())?;
    logger::init(if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    })?;
    if args.directives {
        return write_directives(io::stdout());
    }

    let db = match args.db {
        None => anyhow::bail!("no database given, use --db or IMDB_FIND_DB"),
        Some(ref db) => db,
    };
    let query: Query = args.query.parse()?;
    log::debug!("parsed query: {}", query);

    let mut searcher =
        Searcher::new(SqliteStore::open(db)?).good_threshold(args.good_threshold);
    if args.prompt {
        searcher = searcher.chooser(choose);
    }
    let results = searcher.search(&query)?;
    if args.json {
        let mut stdout = io::stdout();
        serde_json::to_writer_pretty(&mut stdout, &results)?;
        writeln!(stdout)?;
        return Ok(());
    }
    if results.is_empty() {
        anyhow::bail!("no search results found for query");
    }
    write_tsv(io::stdout(), &results)
}

#[derive(Debug)]
struct Args {
    db: Option<PathBuf>,
    debug: bool,
    directives: bool,
    good_threshold: f64,
    json: bool,
    prompt: bool,
    query: String,
}

impl Args {
    fn from_matches(matches: &clap::ArgMatches) -> anyhow::Result<Args> {
        let query = matches
            .values_of_lossy("query")
            .map(|words| words.join(" "))
            .unwrap_or_default();
        let good_threshold = match matches.value_of_lossy("good-threshold") {
            None => 0.25,
            Some(t) => t.parse()?,
        };
        Ok(Args {
            db: matches.value_of_os("db").map(PathBuf::from),
            debug: matches.is_present("debug"),
            directives: matches.is_present("directives"),
            good_threshold,
            json: matches.is_present("json"),
            prompt: !matches.is_present("no-prompt"),
            query,
        })
    }
}

fn app() -> clap::App<'static, 'static> {
    use clap::{App, AppSettings, Arg};

    App::new("imdb-find")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .max_term_width(100)
        .setting(AppSettings::UnifiedHelpMessage)
        .after_help("Run with --directives to list everything that may \
                     appear in {...} inside a query.")
        .arg(Arg::with_name("query")
             .multiple(true)
             .help("The search query. Plain words are matched against \
                    names, e.g., 'the matrix {movie} {sort:year}'. \
                    Multiple arguments are joined with spaces."))
        .arg(Arg::with_name("db")
             .long("db")
             .env("IMDB_FIND_DB")
             .takes_value(true)
             .help("The SQLite database to search."))
        .arg(Arg::with_name("debug")
             .long("debug")
             .help("Show debug messages. Use this when filing bugs."))
        .arg(Arg::with_name("directives")
             .long("directives")
             .help("Print every search directive and then exit."))
        .arg(Arg::with_name("good-threshold")
             .long("good-threshold")
             .env("IMDB_FIND_GOOD_THRESHOLD")
             .takes_value(true)
             .default_value("0.25")
             .help("When a sub-search finds several results, the first is \
                    picked without asking when its similarity beats the \
                    second by at least this much."))
        .arg(Arg::with_name("json")
             .long("json")
             .help("Print results as JSON instead of a table."))
        .arg(Arg::with_name("no-prompt")
             .long("no-prompt")
             .help("Never ask which result of an ambiguous sub-search to \
                    use. The first result is always picked instead."))
}

/// Return true if and only if an I/O broken pipe error exists in the causal
/// chain of the given error.
fn is_pipe_error(err: &anyhow::Error) -> bool {
    for cause in err.chain() {
        if let Some(ioerr) = cause.downcast_ref::<io::Error>() {
            if ioerr.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}
