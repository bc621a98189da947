//! Error types for convcache
//!
//! All modules use `ConvcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for convcache operations
pub type ConvcacheResult<T> = Result<T, ConvcacheError>;

/// All errors that can occur in convcache
#[derive(Error, Debug)]
pub enum ConvcacheError {
    // Cache protocol errors
    #[error("Forward reference was never fulfilled to {verb} for {key}")]
    UnresolvedForward { verb: String, key: String },

    #[error("Forward reference to {verb} for {key} was already fulfilled")]
    DoubleResolution { verb: String, key: String },

    #[error("Forward reference to {verb} for {key} outlived its target")]
    DetachedForward { verb: String, key: String },

    #[error("No build in flight to complete: {verb} for {key}")]
    StaleComplete { verb: String, key: String },

    #[error("Abandoning a build not owned by the caller: {verb} for {key}")]
    ForeignAbandon { verb: String, key: String },

    // Schema errors
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Invalid type expression '{input}': {reason}")]
    TypeSyntax { input: String, reason: String },

    #[error("Duplicate definition in schema: {0}")]
    DuplicateDefinition(String),

    #[error("Invalid default for {record}.{field}: {reason}")]
    InvalidDefault {
        record: String,
        field: String,
        reason: String,
    },

    #[error("Field {record}.{field} collides with the record tag key")]
    ReservedField { record: String, field: String },

    #[error("Invalid schema at {path}: {reason}")]
    SchemaInvalid { path: PathBuf, reason: String },

    // Conversion errors
    #[error("Expected {expected}, found {found}")]
    Mismatch { expected: String, found: String },

    #[error("Integer {0} is out of range for int")]
    IntOutOfRange(String),

    #[error("Missing required field {record}.{field}")]
    MissingField { record: String, field: String },

    #[error("Expected {expected} tuple elements, found {found}")]
    TupleLength { expected: usize, found: usize },

    #[error("Action built for {actual} was invoked as {requested}")]
    VerbMismatch { requested: String, actual: String },

    #[error("Invalid value at {path}: {source}")]
    AtPath {
        path: String,
        #[source]
        source: Box<ConvcacheError>,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl ConvcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a type mismatch error
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Mismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Wrap an error with the location it occurred at (field name or index)
    pub fn at(self, segment: impl std::fmt::Display) -> Self {
        match self {
            Self::AtPath { path, source } => Self::AtPath {
                path: format!("{}.{}", segment, path),
                source,
            },
            other => Self::AtPath {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Check if the error is a cache protocol violation by the builder
    ///
    /// These are never caused by input data and must abort the top-level build.
    pub fn is_protocol_violation(&self) -> bool {
        match self {
            Self::UnresolvedForward { .. }
            | Self::DetachedForward { .. }
            | Self::DoubleResolution { .. }
            | Self::StaleComplete { .. }
            | Self::ForeignAbandon { .. } => true,
            Self::AtPath { source, .. } => source.is_protocol_violation(),
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownType(_) => Some("Define the record in the schema or fix the type name"),
            Self::TypeSyntax { .. } => {
                Some("Types look like: int, str, list[Node], optional[str], tuple[int, str]")
            }
            Self::UnresolvedForward { .. } => {
                Some("A converter was invoked before its build finished")
            }
            Self::DetachedForward { .. } => {
                Some("Keep the top-level converter alive while using its components")
            }
            Self::ReservedField { .. } => Some("Rename the field or drop the record's tag"),
            _ => None,
        }
    }
}
