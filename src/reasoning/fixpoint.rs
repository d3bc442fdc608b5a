//! Fixpoint Engine.
//!
//! Each pass freezes the store, lets every structural rule propose a delta
//! against that snapshot, applies the delta at once and runs cleanup. The
//! engine converges when a pass leaves the store exactly as it found it.
//! A pass cap guards against runaway rule sets.

use super::rules::{Delta, PropertyCopyRule, StructuralRule, builtin_rules, cleanup};
use super::schema::RuleMetadata;
use crate::error::{Error, Result};
use crate::graph::{StoreSnapshot, TripleStore, owl};
use oxigraph::model::NamedNode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ============================================================================
// Configuration
// ============================================================================

/// `(s, from, o) ⇒ (s, to, o)`, configured by IRI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyCopy {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub max_passes: usize,
    pub structural_rules: bool,
    pub equivalence_predicates: Vec<String>,
    pub property_copies: Vec<PropertyCopy>,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            max_passes: 1000,
            structural_rules: true,
            equivalence_predicates: vec![owl::SAME_AS.as_str().to_string()],
            property_copies: Vec::new(),
        }
    }
}

fn named_node(iri: &str) -> Result<NamedNode> {
    NamedNode::new(iri).map_err(|error| Error::InvalidIri {
        iri: iri.to_string(),
        message: error.to_string(),
    })
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Expanding,
    Converged,
}

/// Counts for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    pub pass: usize,
    pub added: usize,
    pub removed: usize,
    pub size_before: usize,
    pub size_after: usize,
}

/// Outcome of a full run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixpointReport {
    pub passes: usize,
    pub added: usize,
    pub removed: usize,
    pub converged: bool,
}

pub struct FixpointEngine {
    metadata: RuleMetadata,
    rules: Vec<Box<dyn StructuralRule>>,
    equivalence: Vec<NamedNode>,
    max_passes: usize,
    state: EngineState,
}

impl FixpointEngine {
    pub fn new(metadata: RuleMetadata, config: &ReasoningConfig) -> Result<Self> {
        let mut rules = if config.structural_rules {
            builtin_rules()
        } else {
            Vec::new()
        };
        for copy in &config.property_copies {
            rules.push(Box::new(PropertyCopyRule::new(
                named_node(&copy.from)?,
                named_node(&copy.to)?,
            )));
        }

        let equivalence = config
            .equivalence_predicates
            .iter()
            .map(|iri| named_node(iri))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            metadata,
            rules,
            equivalence,
            max_passes: config.max_passes,
            state: EngineState::Expanding,
        })
    }

    pub fn with_rule(mut self, rule: impl StructuralRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Candidate triples every rule derives from `snapshot`
    pub fn compute_delta(&self, snapshot: &StoreSnapshot) -> Delta {
        let mut delta = Delta::new();
        for rule in &self.rules {
            let before = delta.len();
            rule.derive(&self.metadata, snapshot, &mut delta);
            debug!(rule = rule.name(), proposed = delta.len() - before, "rule evaluated");
        }
        delta
    }

    /// One expansion pass followed by cleanup
    pub fn run_pass(&mut self, store: &mut TripleStore, pass: usize) -> PassStats {
        let snapshot = store.snapshot();
        let size_before = snapshot.len();

        let added = self.compute_delta(&snapshot).apply(store);
        let removed = cleanup(store, &self.equivalence);

        let unchanged = (added == 0 && removed == 0)
            || (store.size() == size_before && store.snapshot() == snapshot);
        self.state = if unchanged {
            EngineState::Converged
        } else {
            EngineState::Expanding
        };

        PassStats {
            pass,
            added,
            removed,
            size_before,
            size_after: store.size(),
        }
    }

    /// Expand `store` until a pass makes no change
    pub fn run(&mut self, store: &mut TripleStore) -> Result<FixpointReport> {
        self.state = EngineState::Expanding;
        let mut report = FixpointReport {
            removed: cleanup(store, &self.equivalence),
            ..FixpointReport::default()
        };

        while self.state == EngineState::Expanding {
            if report.passes >= self.max_passes {
                return Err(Error::PassLimitExceeded {
                    passes: self.max_passes,
                });
            }
            let stats = self.run_pass(store, report.passes + 1);
            debug!(
                pass = stats.pass,
                added = stats.added,
                removed = stats.removed,
                size = stats.size_after,
                "pass complete"
            );
            report.passes = stats.pass;
            report.added += stats.added;
            report.removed += stats.removed;
        }
        report.converged = true;

        info!(
            passes = report.passes,
            added = report.added,
            removed = report.removed,
            size = store.size(),
            "fixpoint reached"
        );
        Ok(report)
    }
}
