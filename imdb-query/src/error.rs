use std::fmt;

/// A type alias for handling errors throughout imdb-query.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by a disambiguation callback.
///
/// Callers may return any error they like from a chooser. It is reported
/// back to the caller of the search, unchanged, as the source of an
/// [`ErrorKind::Chooser`](enum.ErrorKind.html) error.
pub type ChooserError = Box<dyn std::error::Error + Send + Sync>;

/// An error that can occur while parsing, compiling or executing a search.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Return a reference to the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Transfer ownership of the kind of this error.
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub(crate) fn unknown_directive<T: AsRef<str>>(unk: T) -> Error {
        Error { kind: ErrorKind::UnknownDirective(unk.as_ref().to_string()) }
    }

    pub(crate) fn directive<T: AsRef<str>>(name: T, err: Error) -> Error {
        Error {
            kind: ErrorKind::Directive {
                name: name.as_ref().to_string(),
                err: Box::new(err),
            },
        }
    }

    pub(crate) fn number<T: AsRef<str>>(
        text: T,
        err: std::num::ParseIntError,
    ) -> Error {
        Error {
            kind: ErrorKind::Number { text: text.as_ref().to_string(), err },
        }
    }

    pub(crate) fn empty_value<T: AsRef<str>>(name: T) -> Error {
        Error { kind: ErrorKind::EmptyValue(name.as_ref().to_string()) }
    }

    pub(crate) fn invalid_sort<T: AsRef<str>>(spec: T) -> Error {
        Error { kind: ErrorKind::InvalidSort(spec.as_ref().to_string()) }
    }

    pub(crate) fn sub_search<T: AsRef<str>>(what: T, err: Error) -> Error {
        Error {
            kind: ErrorKind::SubSearch {
                what: what.as_ref().to_string(),
                err: Box::new(err),
            },
        }
    }

    pub(crate) fn chooser(err: ChooserError) -> Error {
        Error { kind: ErrorKind::Chooser(err) }
    }

    pub(crate) fn storage<E: std::error::Error + Send + Sync + 'static>(
        err: E,
    ) -> Error {
        Error { kind: ErrorKind::Storage(Box::new(err)) }
    }

    pub(crate) fn bug<T: AsRef<str>>(msg: T) -> Error {
        Error { kind: ErrorKind::Bug(msg.as_ref().to_string()) }
    }

    /// Returns true if and only if this error was caused by a malformed
    /// query string, at any level of sub-search nesting.
    ///
    /// This is useful for distinguishing mistakes a user can fix by editing
    /// their query from failures in the storage layer or a chooser.
    pub fn is_malformed_query(&self) -> bool {
        match self.kind {
            ErrorKind::UnknownDirective(_)
            | ErrorKind::Number { .. }
            | ErrorKind::EmptyValue(_)
            | ErrorKind::InvalidSort(_) => true,
            ErrorKind::Directive { ref err, .. }
            | ErrorKind::SubSearch { ref err, .. } => err.is_malformed_query(),
            _ => false,
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            ErrorKind::Directive { ref err, .. } => Some(&**err),
            ErrorKind::Number { ref err, .. } => Some(err),
            ErrorKind::SubSearch { ref err, .. } => Some(&**err),
            ErrorKind::Chooser(ref err) => Some(&**err),
            ErrorKind::Storage(ref err) => Some(&**err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// The specific kind of error that can occur.
#[derive(Debug)]
pub enum ErrorKind {
    /// An error parsing the name of a directive from a query.
    ///
    /// The data provided is the unrecognized name.
    UnknownDirective(String),
    /// A recognized directive was given a value it could not accept.
    ///
    /// This wraps the underlying problem with the name of the directive, as
    /// it was written in the query.
    Directive {
        /// The directive name, e.g., `years` or `s`.
        name: String,
        /// The underlying error.
        err: Box<Error>,
    },
    /// An error occurred while parsing an integer in a query.
    Number {
        /// The text that failed to parse.
        text: String,
        /// The underlying parse error.
        err: std::num::ParseIntError,
    },
    /// A directive that requires a value was given none.
    ///
    /// The data provided is the directive name.
    EmptyValue(String),
    /// A sort directive was not of the form `column` or `column direction`,
    /// or its direction was neither `asc` nor `desc`.
    ///
    /// The data provided is the value of the sort directive.
    InvalidSort(String),
    /// An error occurred inside a sub-search.
    ///
    /// This is returned both when a sub-search query fails to parse and
    /// when executing or disambiguating it fails.
    SubSearch {
        /// A short noun phrase describing the sub-search, e.g., `TV show`.
        what: String,
        /// The underlying error.
        err: Box<Error>,
    },
    /// A disambiguation callback returned an error. The search was stopped.
    Chooser(ChooserError),
    /// The storage layer failed to execute a query.
    Storage(Box<dyn std::error::Error + Send + Sync>),
    /// An unexpected error occurred that should not have occurred.
    /// Generally, these errors correspond to bugs in this library or rows
    /// that do not conform to the expected schema.
    Bug(String),
    /// Hints that destructuring should not be exhaustive.
    ///
    /// This enum may grow additional variants, so this makes sure clients
    /// don't count on exhaustive matching. (Otherwise, adding a new variant
    /// could break existing code.)
    #[doc(hidden)]
    __Nonexhaustive,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ErrorKind::UnknownDirective(ref unk) => {
                write!(f, "unrecognized search directive: '{}'", unk)
            }
            ErrorKind::Directive { ref name, ref err } => {
                write!(f, "{{{}}}: {}", name, err)
            }
            ErrorKind::Number { ref text, ref err } => {
                write!(f, "could not parse '{}' as integer: {}", text, err)
            }
            ErrorKind::EmptyValue(ref name) => {
                write!(f, "no query found for '{}'", name)
            }
            ErrorKind::InvalidSort(ref spec) => {
                write!(f, "invalid sort format: '{}'", spec)
            }
            ErrorKind::SubSearch { ref what, ref err } => {
                write!(f, "error with {} sub-search: {}", what, err)
            }
            ErrorKind::Chooser(ref err) => {
                write!(f, "selection aborted: {}", err)
            }
            ErrorKind::Storage(ref err) => write!(f, "storage error: {}", err),
            ErrorKind::Bug(ref msg) => {
                let report = "Please report this bug with a backtrace at \
                              https://github.com/BurntSushi/imdb-rename";
                write!(f, "BUG: {}\n{}", msg, report)
            }
            ErrorKind::__Nonexhaustive => panic!("invalid error"),
        }
    }
}
