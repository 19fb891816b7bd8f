//! Error types for tscfg-build
//!
//! Library code returns [`TscfgError`]; the binary wraps it in `anyhow`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tscfg-build operations
pub type TscfgResult<T> = Result<T, TscfgError>;

/// What went wrong while parsing a specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Type hint names a type outside the supported set
    UnknownType(String),
    /// A `{` or `[` block is never closed
    UnterminatedBlock,
    /// A quoted string is never closed
    UnterminatedString,
    /// `#@envvar` is not directly followed by a leaf
    MisplacedPragma(String),
    /// `#@envvar` with a missing or malformed variable name
    InvalidPragma(String),
    /// A list schema must contain exactly one element
    InvalidList(String),
    /// Anything the grammar does not allow at this point
    UnexpectedToken(String),
    /// Objects, lists or dotted keys nested past the given limit
    NestingTooDeep(usize),
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaErrorKind::UnknownType(token) => write!(f, "unknown type '{}'", token),
            SchemaErrorKind::UnterminatedBlock => write!(f, "unterminated block"),
            SchemaErrorKind::UnterminatedString => write!(f, "unterminated string"),
            SchemaErrorKind::MisplacedPragma(name) => {
                write!(f, "#@envvar {} must be followed by a leaf entry", name)
            }
            SchemaErrorKind::InvalidPragma(text) => write!(f, "invalid pragma '{}'", text),
            SchemaErrorKind::InvalidList(msg) => write!(f, "invalid list: {}", msg),
            SchemaErrorKind::UnexpectedToken(msg) => write!(f, "unexpected {}", msg),
            SchemaErrorKind::NestingTooDeep(limit) => {
                write!(f, "nesting deeper than {} levels", limit)
            }
        }
    }
}

/// Malformed specification text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{file}:{line}:{column}: {kind}")]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub file: PathBuf,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
}

/// The model cannot be expressed as a Java class
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Two keys in one branch map to the same Java identifier
    #[error("keys '{first}' and '{second}' in {scope} both map to Java name '{ident}'")]
    IdentifierCollision {
        scope: String,
        first: String,
        second: String,
        ident: String,
    },

    /// A nested type would shadow an enclosing type of the same name
    #[error("nested class '{name}' at '{path}' clashes with an enclosing class")]
    NestedNameClash { name: String, path: String },

    /// An explicit class or package override is not a legal Java name
    #[error("'{value}' is not a valid Java {what}")]
    InvalidIdentifier { what: &'static str, value: String },
}

/// Main error type for tscfg-build operations
#[derive(Error, Debug)]
pub enum TscfgError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Filesystem failure, with the path that was being touched
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid `tscfg.toml` or unit declaration
    #[error("invalid manifest {file}: {message}")]
    Manifest { file: PathBuf, message: String },

    /// Failure while processing one configuration unit
    #[error("unit '{unit}' ({spec}): {source}")]
    Unit {
        unit: String,
        spec: PathBuf,
        #[source]
        source: Box<TscfgError>,
    },
}

impl TscfgError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TscfgError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn manifest(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TscfgError::Manifest {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Innermost error, skipping `Unit` wrappers
    pub fn root_cause(&self) -> &TscfgError {
        match self {
            TscfgError::Unit { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
