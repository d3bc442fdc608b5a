//! Error taxonomy for the materializer core.
//!
//! Core modules (graph, reasoning, sparql, canonical) return [`Error`]; the
//! command layer wraps these in `anyhow` with file context. Per-rule failures
//! never surface here: the rule applier downgrades them to warnings and
//! records them in its report.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the materializer core
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}{}: {message}", path.display(), line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error("invalid IRI {iri}: {message}")]
    InvalidIri { iri: String, message: String },

    #[error("fixpoint not reached after {passes} passes")]
    PassLimitExceeded { passes: usize },

    #[error("rule evaluation failed: {0}")]
    Evaluation(String),

    #[error("graph storage error: {0}")]
    Storage(String),

    #[error("cannot read rule directory {}: {message}", path.display())]
    RuleDirectory { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid shapes graph: {0}")]
    Shape(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Coarse grouping used as a structured log field
    pub fn category(&self) -> &'static str {
        match self {
            Error::Io { .. } | Error::RuleDirectory { .. } => "io_error",
            Error::Parse { .. } => "parse_error",
            Error::Serialize(_) => "serialize_error",
            Error::InvalidIri { .. } | Error::Config(_) | Error::Shape(_) => "validation_error",
            Error::PassLimitExceeded { .. } => "resource_limit",
            Error::Evaluation(_) | Error::Storage(_) => "subsystem_error",
        }
    }

    /// Line reported by the parser, when the error carries one
    pub fn line(&self) -> Option<u64> {
        match self {
            Error::Parse { line, .. } => *line,
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_line() {
        let err = Error::Parse {
            path: PathBuf::from("rdf/data.ttl"),
            line: Some(7),
            message: "unexpected end of file".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse rdf/data.ttl (line 7): unexpected end of file"
        );
        assert_eq!(err.category(), "parse_error");
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn parse_error_display_without_line() {
        let err = Error::Parse {
            path: PathBuf::from("a.ttl"),
            line: None,
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "failed to parse a.ttl: bad");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn categories_group_variants() {
        assert_eq!(Error::PassLimitExceeded { passes: 3 }.category(), "resource_limit");
        assert_eq!(Error::Evaluation("x".into()).category(), "subsystem_error");
        assert_eq!(Error::Config("x".into()).category(), "validation_error");
    }
}
