//! Declarative SPARQL rules: loading, evaluation and application

pub mod applier;
pub mod artifact;
pub mod evaluator;

pub use applier::{DeclarativeRuleApplier, RuleOutcome, RuleReport, RuleStatus};
pub use artifact::{DEFAULT_RULE_PATTERNS, RuleArtifact, RuleEntry, RuleKind, RuleSet, Unavailable};
pub use evaluator::{OxigraphEvaluator, PatternEvaluator};
