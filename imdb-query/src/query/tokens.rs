use lazy_static::lazy_static;
use regex::Regex;

/// Break a query into tokens.
///
/// A token is delimited by spaces, except when curly braces are present.
/// A space inside a `{...}` span (at any depth) does not end a token, and a
/// token is ended as soon as the closing brace that returns the depth to
/// zero is seen. Other whitespace, such as tabs, is part of a token. For example, in the string `a b {x y z} c`, there are
/// exactly four tokens: `a`, `b`, `{x y z}` and `c`.
///
/// Unbalanced braces are not an error. Whatever is left over at the end of
/// the query becomes the last token.
pub fn tokens(query: &str) -> Vec<String> {
    let mut tokens = vec![];
    let mut buf = String::new();
    let mut depth: i64 = 0;
    for c in query.chars() {
        match c {
            '{' => {
                depth += 1;
                buf.push(c);
            }
            '}' => {
                depth -= 1;
                buf.push(c);
                if depth == 0 {
                    tokens.push(std::mem::take(&mut buf));
                }
            }
            ' ' => {
                if depth != 0 {
                    buf.push(c);
                } else if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
            }
            c => buf.push(c),
        }
    }
    if !buf.is_empty() {
        tokens.push(buf);
    }
    tokens
}

/// Split a token of the form `{name}` or `{name:value}` into its name and
/// value. The value of `{name}` is empty. Both are trimmed.
///
/// If the token is not a directive, then `None` is returned and the token
/// should be treated as part of the name being searched.
pub fn directive(token: &str) -> Option<(&str, &str)> {
    lazy_static! {
        // The value may itself contain colons and nested directives, so
        // only the first colon separates the name from the value.
        static ref DIRECTIVE: Regex = Regex::new(
            r"(?s)^\{(?P<name>[^:]*)(?::(?P<val>.*))?\}$"
        ).unwrap();
    }
    if token.len() < 3 {
        return None;
    }
    let caps = DIRECTIVE.captures(token)?;
    let name = caps.name("name").map_or("", |m| m.as_str());
    let val = caps.name("val").map_or("", |m| m.as_str());
    Some((name.trim(), val.trim()))
}
