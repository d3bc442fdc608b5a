//! Canonical Turtle sorting, merging and forward-chaining materialization
//! for small RDF knowledge graphs.

pub mod annotations;
pub mod canonical;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod ontology;
pub mod pipeline;
pub mod reasoning;
pub mod sparql;

pub use canonical::{CanonicalConfig, CanonicalSerializer, NamespaceBindings};
pub use config::{CliArgs, Command, MaterializerConfig};
pub use error::{Error, Result};
pub use graph::{Document, Triple, TripleStore};
pub use logging::{LoggingConfig, init_logging};
pub use pipeline::{CommandOutcome, Pipeline, ReasonRequest};
pub use reasoning::{FixpointEngine, FixpointReport, ReasoningConfig, RuleMetadata, SchemaExtractor};
pub use sparql::{DeclarativeRuleApplier, RuleSet};

use std::io;

/// Resolve configuration and run the selected command
pub fn run(cli: CliArgs) -> anyhow::Result<CommandOutcome> {
    let config = MaterializerConfig::from_args(&cli)?;
    let pipeline = Pipeline::new(config);

    tracing::debug!(command = ?cli.command, "dispatching command");

    match cli.command {
        Command::Merge {
            inputs,
            output,
            rewrite_inputs,
        } => pipeline.merge(&inputs, &output, rewrite_inputs),
        Command::Reason {
            ontology,
            data,
            output,
            rules_dir,
            rules,
            rewrite_inputs,
            no_structural,
        } => pipeline.reason(&ReasonRequest {
            ontology,
            data,
            output,
            rules_dir,
            rule_files: rules,
            rewrite_inputs,
            structural: !no_structural,
        }),
        Command::ValidateSyntax {
            directory,
            no_recursive,
        } => pipeline.validate_syntax(&directory, !no_recursive, &mut io::stdout().lock()),
        Command::ValidateShape {
            data,
            shapes,
            infer,
        } => pipeline.validate_shape(&data, &shapes, infer, &mut io::stdout().lock()),
        Command::Sort { file } => pipeline.sort(&file),
    }
}
