use std::fmt;

use crate::error::{Error, Result};

/// An inclusive range of integers.
///
/// There is no requirement that `min <= max`. A range with `min > max`
/// simply matches nothing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Range {
    /// The inclusive lower bound.
    pub min: i64,
    /// The inclusive upper bound.
    pub max: i64,
}

impl Range {
    /// Create a new inclusive range.
    pub fn new(min: i64, max: i64) -> Range {
        Range { min, max }
    }

    /// Parse a range of the form `x-y`.
    ///
    /// If given only `x`, then the range is `x-x`. If given `x-`, then the
    /// range is `x-max`. If given `-y`, then the range is `min-y`. If given
    /// `-` or the empty string, then the range is `min-max`.
    ///
    /// The bounds are separated by the first `-` that follows a bound. A `-`
    /// at the start of the range, or right after the separator, is a sign.
    /// So `-5` is `min-5`, while `-5-` is `-5-max` and `-5--1` is `-5` to
    /// `-1`.
    pub fn parse(s: &str, min: i64, max: i64) -> Result<Range> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Range::new(min, max));
        }
        let (start, end) = match separator(s) {
            Some(i) => (s[..i].trim(), s[i + 1..].trim()),
            None if s.starts_with('-') => ("", s[1..].trim()),
            None => {
                let n = integer(s)?;
                return Ok(Range::new(n, n));
            }
        };
        let start = if start.is_empty() { min } else { integer(start)? };
        let end = if end.is_empty() { max } else { integer(end)? };
        Ok(Range::new(start, end))
    }
}

/// Writes `x` for a non-negative range of one integer and `x-y` otherwise,
/// either of which `Range::parse` reads back as the same range.
impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.min == self.max && self.min >= 0 {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Return the position of the `-` separating the two bounds of a range, if
/// there is a lower bound.
fn separator(s: &str) -> Option<usize> {
    s.char_indices().filter(|&(_, c)| c == '-').map(|(i, _)| i).find(|&i| {
        match s[..i].trim_end().chars().last() {
            None | Some('-') => false,
            Some(_) => true,
        }
    })
}

/// Parse a single integer, reporting the offending text on failure.
pub(crate) fn integer(s: &str) -> Result<i64> {
    s.parse().map_err(|err| Error::number(s, err))
}
