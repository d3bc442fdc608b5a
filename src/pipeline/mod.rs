//! Command operations: merge+sort, sort, reason, validate-syntax and
//! validate-shape.
//!
//! Every operation returns `anyhow::Result<CommandOutcome>`. `Failure` is a
//! completed run with a negative verdict (syntax errors found, graph does not
//! conform); `Err` is a run that could not complete (unreadable or
//! unparsable input, bad rule directory). Both map to exit status 1.

mod merge;
mod reason;
mod validate;

pub use reason::ReasonRequest;
pub use validate::SyntaxReport;

use crate::canonical::CanonicalSerializer;
use crate::config::MaterializerConfig;
use crate::graph::{Document, load_turtle};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Failure,
}

impl CommandOutcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            CommandOutcome::Success
        } else {
            CommandOutcome::Failure
        }
    }

    pub fn is_success(self) -> bool {
        self == CommandOutcome::Success
    }

    pub fn exit_code(self) -> u8 {
        match self {
            CommandOutcome::Success => 0,
            CommandOutcome::Failure => 1,
        }
    }
}

impl From<CommandOutcome> for ExitCode {
    fn from(outcome: CommandOutcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

/// Resolved configuration plus the serializer built from it
pub struct Pipeline {
    config: MaterializerConfig,
    serializer: CanonicalSerializer,
}

impl Pipeline {
    pub fn new(config: MaterializerConfig) -> Self {
        let serializer = CanonicalSerializer::new(config.canonical.clone());
        Self { config, serializer }
    }

    pub fn config(&self) -> &MaterializerConfig {
        &self.config
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let document =
            load_turtle(path).with_context(|| format!("failed to load {}", path.display()))?;
        info!(
            path = %path.display(),
            triples = document.store.size(),
            "Loaded {} triples from {}",
            document.store.size(),
            path.display()
        );
        Ok(document)
    }

    /// Load several documents and merge them into one
    fn load_merged(&self, paths: &[&Path], rewrite_inputs: bool) -> Result<Document> {
        let mut merged = Document::default();
        for path in paths {
            let document = self.load(path)?;
            if rewrite_inputs {
                self.write(&document, path)?;
            }
            merged.merge(&document);
        }
        info!(triples = merged.store.size(), "Total graph size: {} triples", merged.store.size());
        Ok(merged)
    }

    fn write(&self, document: &Document, path: &Path) -> Result<()> {
        self.serializer
            .write_to_path(&document.store, &document.namespaces, path)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}
