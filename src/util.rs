use std::io::{self, Write};
use std::result;

use imdb_query::{directives, ChooserError, SearchResult};
use tabwriter::TabWriter;

/// Ask the end user to pick one of the given sub-search results.
///
/// This is called only when there is no clear winner among the results. The
/// candidates and the prompt are written to stderr, so that they don't mix
/// with results written to stdout. An empty answer picks nothing, which
/// stops the search.
pub fn choose(
    results: &[SearchResult],
    what: &str,
) -> result::Result<Option<SearchResult>, ChooserError> {
    let mut stderr = io::stderr();
    writeln!(stderr, "More than one {} matches:", what)?;
    write_tsv(&mut stderr, results)?;
    let choice = read_number(1, results.len())?;
    Ok(choice.map(|i| results[i - 1].clone()))
}

/// Reads a number from stdin in the given inclusive range. If the answer is
/// empty, then `None` is returned.
pub fn read_number(start: usize, end: usize) -> anyhow::Result<Option<usize>> {
    let mut stderr = io::stderr();
    write!(
        stderr,
        "Please enter your choice [{}-{}] (or nothing to give up): ",
        start, end
    )?;
    stderr.flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    let response = response.trim();
    if response.is_empty() {
        return Ok(None);
    }
    let choice: usize = response.parse()?;
    if choice < start || choice > end {
        anyhow::bail!(
            "invalid choice: {} is not in range [{}-{}]",
            choice,
            start,
            end
        );
    }
    Ok(Some(choice))
}

/// Write the given results to the given writer as an aligned table.
///
/// The similarity and credit columns are only included when at least one
/// result has one.
pub fn write_tsv<W: io::Write>(
    wtr: W,
    results: &[SearchResult],
) -> anyhow::Result<()> {
    let scores = results.iter().any(|r| r.has_similarity());
    let credits = results.iter().any(|r| r.credit.is_some());

    let mut wtr = TabWriter::new(wtr).minwidth(4);
    write!(wtr, "#\tkind\tid\tname\tyear\tinfo\trank\tvotes")?;
    if scores {
        write!(wtr, "\tscore")?;
    }
    if credits {
        write!(wtr, "\tcredit")?;
    }
    writeln!(wtr)?;
    for (i, r) in results.iter().enumerate() {
        write!(
            wtr,
            "{}\t{}\t{}\t{}\t{}\t{}",
            i + 1,
            r.entity,
            r.id,
            r.name,
            if r.year > 0 { r.year.to_string() } else { "N/A".to_string() },
            r.attrs,
        )?;
        match r.rating {
            None => write!(wtr, "\t-\t-")?,
            Some(ref rating) => {
                write!(wtr, "\t{}\t{}", rating.rank, rating.votes)?
            }
        }
        if scores {
            write!(wtr, "\t{:0.3}", r.similarity)?;
        }
        if credits {
            match r.credit {
                None => write!(wtr, "\t")?,
                Some(ref c) if c.position > 0 => {
                    write!(wtr, "\t{} (#{})", c.character, c.position)?
                }
                Some(ref c) => write!(wtr, "\t{}", c.character)?,
            }
        }
        writeln!(wtr)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every search directive, with its synonyms and description, to the
/// given writer.
pub fn write_directives<W: io::Write>(wtr: W) -> anyhow::Result<()> {
    let mut wtr = TabWriter::new(wtr).minwidth(4);
    writeln!(wtr, "directive\tsynonyms\tdescription")?;
    for d in directives() {
        writeln!(
            wtr,
            "{{{}}}\t{}\t{}",
            d.name(),
            d.synonyms().join(", "),
            d.description()
        )?;
    }
    wtr.flush()?;
    Ok(())
}
