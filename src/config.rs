use crate::canonical::CanonicalConfig;
use crate::reasoning::ReasoningConfig;
use crate::sparql::DEFAULT_RULE_PATTERNS;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oxigraph::model::NamedNode;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Turtle `PN_PREFIX`, restricted to ASCII
const PREFIX_NAME_PATTERN: &str = r"^[A-Za-z]([A-Za-z0-9_.-]*[A-Za-z0-9_-])?$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializerConfig {
    pub canonical: CanonicalConfig,
    pub reasoning: ReasoningConfig,
    pub rule_patterns: Vec<String>,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            canonical: CanonicalConfig::default(),
            reasoning: ReasoningConfig::default(),
            rule_patterns: DEFAULT_RULE_PATTERNS
                .iter()
                .map(|pattern| (*pattern).to_string())
                .collect(),
        }
    }
}

impl MaterializerConfig {
    /// Resolve CLI (and env, through clap) over the config file over defaults
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            reserved_prefix: cli_reserved_prefix,
            reserved_namespace: cli_reserved_namespace,
            max_passes: cli_max_passes,
            command: _,
        } = args;

        let file_config = if let Some(path) = config.as_deref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            reserved_prefix: file_reserved_prefix,
            reserved_namespace: file_reserved_namespace,
            max_passes: file_max_passes,
            structural_rules: file_structural_rules,
            equivalence_predicates: file_equivalence_predicates,
            property_copies: file_property_copies,
            rule_patterns: file_rule_patterns,
        } = file_config;

        let defaults = Self::default();

        let canonical = CanonicalConfig {
            reserved_prefix: cli_reserved_prefix
                .clone()
                .or(file_reserved_prefix)
                .unwrap_or(defaults.canonical.reserved_prefix),
            reserved_namespace: cli_reserved_namespace
                .clone()
                .or(file_reserved_namespace)
                .unwrap_or(defaults.canonical.reserved_namespace),
        };

        let reasoning = ReasoningConfig {
            max_passes: cli_max_passes
                .or(file_max_passes)
                .unwrap_or(defaults.reasoning.max_passes),
            structural_rules: file_structural_rules.unwrap_or(defaults.reasoning.structural_rules),
            equivalence_predicates: file_equivalence_predicates
                .unwrap_or(defaults.reasoning.equivalence_predicates),
            property_copies: file_property_copies.unwrap_or(defaults.reasoning.property_copies),
        };

        let mut rule_patterns = file_rule_patterns
            .unwrap_or(defaults.rule_patterns)
            .into_iter()
            .map(|pattern| pattern.trim().to_string())
            .filter(|pattern| !pattern.is_empty())
            .collect::<Vec<_>>();
        rule_patterns.dedup();

        let resolved = Self {
            canonical,
            reasoning,
            rule_patterns,
        };
        resolved.validate()?;
        Ok(resolved)
    }

    pub fn validate(&self) -> Result<()> {
        let prefix = &self.canonical.reserved_prefix;
        anyhow::ensure!(
            !prefix.is_empty(),
            "reserved prefix must not be empty, every other prefix would be dropped as an alias"
        );
        let prefix_name = Regex::new(PREFIX_NAME_PATTERN).context("invalid prefix pattern")?;
        anyhow::ensure!(
            prefix_name.is_match(prefix),
            "reserved prefix {:?} is not a valid Turtle prefix name",
            prefix
        );

        let namespace = &self.canonical.reserved_namespace;
        NamedNode::new(namespace.as_str())
            .with_context(|| format!("reserved namespace {namespace:?} is not an absolute IRI"))?;

        anyhow::ensure!(
            self.reasoning.max_passes >= 1,
            "max passes must be at least 1"
        );

        for iri in &self.reasoning.equivalence_predicates {
            NamedNode::new(iri.as_str())
                .with_context(|| format!("equivalence predicate {iri:?} is not a valid IRI"))?;
        }
        for copy in &self.reasoning.property_copies {
            for iri in [&copy.from, &copy.to] {
                NamedNode::new(iri.as_str())
                    .with_context(|| format!("property copy IRI {iri:?} is not a valid IRI"))?;
            }
        }

        anyhow::ensure!(
            !self.rule_patterns.is_empty(),
            "at least one rule file pattern must be provided"
        );
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rdf-materializer",
    about = "Canonical Turtle sorting, merging and forward-chaining materialization",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "RDF_MATERIALIZER_RESERVED_PREFIX",
        value_name = "PREFIX",
        help = "Prefix name always bound to the reserved namespace",
        global = true
    )]
    pub reserved_prefix: Option<String>,

    #[arg(
        long,
        env = "RDF_MATERIALIZER_RESERVED_NAMESPACE",
        value_name = "IRI",
        help = "Canonical IRI of the reserved prefix",
        global = true
    )]
    pub reserved_namespace: Option<String>,

    #[arg(
        long,
        env = "RDF_MATERIALIZER_MAX_PASSES",
        value_name = "N",
        help = "Maximum number of inference passes before giving up",
        value_parser = clap::value_parser!(usize),
        global = true
    )]
    pub max_passes: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Merge Turtle files into one canonically sorted file
    Merge {
        #[arg(required = true, value_name = "INPUT")]
        inputs: Vec<PathBuf>,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(long, help = "Canonicalize every input file in place before merging")]
        rewrite_inputs: bool,
    },

    /// Merge ontology and data, materialize inferences and write the result
    Reason {
        #[arg(long, value_name = "FILE")]
        ontology: PathBuf,

        #[arg(long, value_name = "FILE")]
        data: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        #[arg(long, value_name = "DIR", help = "Directory of SPARQL rule files")]
        rules_dir: Option<PathBuf>,

        #[arg(
            long = "rule",
            short = 'r',
            value_name = "FILE",
            help = "Individual rule file, applied after the rules directory"
        )]
        rules: Vec<PathBuf>,

        #[arg(long, help = "Canonicalize the ontology and data files in place")]
        rewrite_inputs: bool,

        #[arg(long, help = "Apply only declarative rules")]
        no_structural: bool,
    },

    /// Check that every Turtle file under a directory parses
    ValidateSyntax {
        #[arg(default_value = ".", value_name = "DIR")]
        directory: PathBuf,

        #[arg(long, help = "Only check files directly inside the directory")]
        no_recursive: bool,
    },

    /// Validate a data graph against a SHACL shapes graph
    ValidateShape {
        #[arg(long, value_name = "FILE")]
        data: PathBuf,

        #[arg(long, value_name = "FILE")]
        shapes: PathBuf,

        #[arg(long, help = "Materialize RDFS-style inferences before validating")]
        infer: bool,
    },

    /// Canonicalize a Turtle file in place
    Sort {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    reserved_prefix: Option<String>,
    reserved_namespace: Option<String>,
    max_passes: Option<usize>,
    structural_rules: Option<bool>,
    equivalence_predicates: Option<Vec<String>>,
    property_copies: Option<Vec<crate::reasoning::PropertyCopy>>,
    rule_patterns: Option<Vec<String>>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
