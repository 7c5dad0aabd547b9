// A small stderr logger for the `log` crate. Only messages from the crates
// in this workspace are printed. Debug and trace messages name the module
// they came from, which makes the SQL logged during a search easy to follow.

use log::{self, Log};

/// The crates whose messages are printed.
const CRATES: &[&str] = &["imdb_find", "imdb_query"];

/// Install the logger and show messages up to the given level.
pub fn init(level: log::LevelFilter) -> anyhow::Result<()> {
    log::set_logger(LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

#[derive(Debug)]
struct Logger(());

const LOGGER: &Logger = &Logger(());

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level() && is_ours(metadata.target())
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", line(record));
        }
    }

    fn flush(&self) {
        // eprintln! is unbuffered.
    }
}

/// Returns true if the target belongs to one of our crates. Dependencies
/// such as rusqlite are silenced.
fn is_ours(target: &str) -> bool {
    let krate = target.split("::").next().unwrap_or(target);
    CRATES.contains(&krate)
}

fn line(record: &log::Record) -> String {
    match record.level() {
        log::Level::Debug | log::Level::Trace => {
            let target = record.target();
            let module = target.splitn(2, "::").nth(1).unwrap_or(target);
            format!("{}[{}]: {}", record.level(), module, record.args())
        }
        level => format!("{}: {}", level, record.args()),
    }
}
