//! Declarative rule artifacts.
//!
//! A rule file holds one SPARQL query or one SPARQL update. Its kind is
//! decided once, when the file is loaded, by parsing it: a query is
//! additive, an update is mutating. Text that parses as neither is kept as
//! an unavailable entry so the applier can report it.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use oxigraph::sparql::{Query, Update};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_RULE_PATTERNS: [&str; 3] = ["*.rq", "*.ru", "*.sparql"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RuleKind {
    /// Update that may both delete and insert
    Mutating,
    /// Query whose result triples are added
    Additive,
}

impl RuleKind {
    /// Classify rule text, returning the parser's message when it is neither form
    pub fn classify(text: &str) -> std::result::Result<Self, String> {
        match Query::parse(text, None) {
            Ok(_) => Ok(RuleKind::Additive),
            Err(query_error) => match Update::parse(text, None) {
                Ok(_) => Ok(RuleKind::Mutating),
                Err(update_error) => Err(format!(
                    "not a SPARQL query ({query_error}) nor update ({update_error})"
                )),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleArtifact {
    pub name: String,
    pub path: PathBuf,
    pub text: String,
    pub kind: RuleKind,
}

impl RuleArtifact {
    pub fn from_text(
        path: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> std::result::Result<Self, String> {
        let path = path.into();
        let text = text.into();
        let kind = RuleKind::classify(&text)?;
        Ok(Self {
            name: rule_name(&path),
            path,
            text,
            kind,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    Missing,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEntry {
    Ready(RuleArtifact),
    Unavailable {
        name: String,
        path: PathBuf,
        reason: Unavailable,
    },
}

impl RuleEntry {
    /// Read and classify one rule file
    pub fn load(path: &Path) -> Self {
        let unavailable = |reason| RuleEntry::Unavailable {
            name: rule_name(path),
            path: path.to_path_buf(),
            reason,
        };

        match fs::read_to_string(path) {
            Ok(text) => match RuleArtifact::from_text(path, text) {
                Ok(artifact) => RuleEntry::Ready(artifact),
                Err(message) => unavailable(Unavailable::Invalid(message)),
            },
            Err(error) if error.kind() == ErrorKind::NotFound => unavailable(Unavailable::Missing),
            Err(error) => unavailable(Unavailable::Invalid(format!("cannot read rule file: {error}"))),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RuleEntry::Ready(artifact) => &artifact.name,
            RuleEntry::Unavailable { name, .. } => name,
        }
    }
}

/// Ordered rule artifacts: directory files by name, then explicit files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    entries: Vec<RuleEntry>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files in `dir` (not recursive) whose name matches one of `patterns`.
    ///
    /// A directory that cannot be listed is fatal; individual files that
    /// fail to load become unavailable entries.
    pub fn load(dir: &Path, patterns: &[String]) -> Result<Self> {
        let matcher = build_matcher(patterns)?;
        if !dir.is_dir() {
            return Err(Error::RuleDirectory {
                path: dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut set = Self::new();
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|error| Error::RuleDirectory {
                path: dir.to_path_buf(),
                message: error.to_string(),
            })?;
            if entry.file_type().is_file() && matcher.is_match(entry.file_name()) {
                set.push_file(entry.path());
            }
        }

        tracing::debug!(dir = %dir.display(), rules = set.len(), "loaded rule directory");
        Ok(set)
    }

    pub fn push_file(&mut self, path: &Path) {
        self.entries.push(RuleEntry::load(path));
    }

    pub fn push(&mut self, entry: RuleEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_matcher(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|error| Error::Config(format!("invalid rule pattern {pattern:?}: {error}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|error| Error::Config(format!("invalid rule patterns: {error}")))
}

fn rule_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
