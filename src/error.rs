use std::{fmt, path::PathBuf};

use itertools::Itertools;
use thiserror::Error;

/// A single problem found in one front-matter field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("field `{field}` is not a valid date ({value}): {reason}")]
    DateCoercion {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("unknown field `{field}`")]
    UnknownField { field: String },
}

impl FieldIssue {
    pub fn field(&self) -> &str {
        match self {
            FieldIssue::MissingField { field }
            | FieldIssue::TypeMismatch { field, .. }
            | FieldIssue::DateCoercion { field, .. } => *field,
            FieldIssue::UnknownField { field } => field.as_str(),
        }
    }
}

/// Every issue found while validating one front-matter mapping, in schema field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn issue_for(&self, field: &str) -> Option<&FieldIssue> {
        self.issues.iter().find(|issue| issue.field() == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.issues.iter().join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrontMatterError {
    #[error("front matter opened with `---` but never closed")]
    Unterminated,
    #[error("front matter must be a mapping, found {0}")]
    NotAMapping(&'static str),
    #[error("front matter is not valid YAML: {0}")]
    Yaml(String),
}

/// Why a single document was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentErrorKind {
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("entry id `{id}` is already used by {}", .first.display())]
    DuplicateId { id: String, first: PathBuf },
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}: {kind}", .path.display())]
pub struct DocumentError {
    pub path: PathBuf,
    pub kind: DocumentErrorKind,
}

#[derive(Error, Debug)]
pub enum LogErr {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Async runtime error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Front matter error: {0}")]
    FrontMatter(#[from] FrontMatterError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
    #[error("{} invalid document(s):\n{}", .0.len(), .0.iter().join("\n"))]
    InvalidDocuments(Vec<DocumentError>),
    #[error("{0}")]
    Message(String),
    #[error("{context}:\n {source}")]
    Context {
        context: String,
        #[source]
        source: Box<LogErr>,
    },
}

impl From<String> for LogErr {
    fn from(msg: String) -> Self {
        LogErr::Message(msg)
    }
}

impl From<&str> for LogErr {
    fn from(msg: &str) -> Self {
        LogErr::Message(msg.to_string())
    }
}

pub trait ContextExt<T> {
    fn with_context<F>(self, context: F) -> Result<T, LogErr>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<LogErr>> ContextExt<T> for Result<T, E> {
    fn with_context<F>(self, context: F) -> Result<T, LogErr>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| LogErr::Context {
            context: context(),
            source: Box::new(err.into()),
        })
    }
}
