//! Forward-chaining over schema-derived structural rules

pub mod fixpoint;
pub mod rules;
pub mod schema;

pub use fixpoint::{
    EngineState, FixpointEngine, FixpointReport, PassStats, PropertyCopy, ReasoningConfig,
};
pub use rules::{
    Delta, DomainRangeRule, InverseRule, PropertyCopyRule, StructuralRule, SubclassRule,
    TransitiveRule, builtin_rules, cleanup,
};
pub use schema::{RuleMetadata, SchemaExtractor, SchemaSummary};
