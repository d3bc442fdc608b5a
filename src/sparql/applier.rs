//! Declarative Rule Applier.
//!
//! Rules run strictly in set order. Each one is isolated: a failure restores
//! the store to its state just before that rule and processing continues
//! with the next rule.

use super::artifact::{RuleArtifact, RuleEntry, RuleKind, RuleSet, Unavailable};
use super::evaluator::{OxigraphEvaluator, PatternEvaluator};
use crate::error::Result;
use crate::graph::{GraphDiff, TripleStore};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatus {
    Applied { added: usize, removed: usize },
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub name: String,
    pub kind: Option<RuleKind>,
    pub status: RuleStatus,
}

impl RuleOutcome {
    /// `name: +A/-R triples` for applied rules
    pub fn summary(&self) -> String {
        match &self.status {
            RuleStatus::Applied { added, removed } => {
                format!("{}: +{added}/-{removed} triples", self.name)
            }
            RuleStatus::Missing => format!("{}: rule file not found", self.name),
            RuleStatus::Failed(message) => format!("{}: failed: {message}", self.name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleReport {
    pub outcomes: Vec<RuleOutcome>,
}

impl RuleReport {
    pub fn total_added(&self) -> usize {
        self.applied().map(|(added, _)| added).sum()
    }

    pub fn total_removed(&self) -> usize {
        self.applied().map(|(_, removed)| removed).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, RuleStatus::Failed(_)))
            .count()
    }

    pub fn missing_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == RuleStatus::Missing)
            .count()
    }

    /// True if any rule added or removed a triple
    pub fn changed(&self) -> bool {
        self.applied().any(|(added, removed)| added + removed > 0)
    }

    fn applied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome.status {
            RuleStatus::Applied { added, removed } => Some((added, removed)),
            _ => None,
        })
    }
}

pub struct DeclarativeRuleApplier<E: PatternEvaluator = OxigraphEvaluator> {
    evaluator: E,
}

impl Default for DeclarativeRuleApplier {
    fn default() -> Self {
        Self::new(OxigraphEvaluator)
    }
}

impl<E: PatternEvaluator> DeclarativeRuleApplier<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn apply(&self, store: &mut TripleStore, rules: &RuleSet) -> RuleReport {
        let mut report = RuleReport::default();
        for entry in rules.entries() {
            let outcome = match entry {
                RuleEntry::Ready(artifact) => self.apply_one(store, artifact),
                RuleEntry::Unavailable { name, path, reason } => {
                    let status = match reason {
                        Unavailable::Missing => {
                            warn!(rule = %name, path = %path.display(), "rule file not found, skipping");
                            RuleStatus::Missing
                        }
                        Unavailable::Invalid(message) => {
                            warn!(rule = %name, path = %path.display(), error = %message, "invalid rule, skipping");
                            RuleStatus::Failed(message.clone())
                        }
                    };
                    RuleOutcome {
                        name: name.clone(),
                        kind: None,
                        status,
                    }
                }
            };
            report.outcomes.push(outcome);
        }
        report
    }

    fn apply_one(&self, store: &mut TripleStore, artifact: &RuleArtifact) -> RuleOutcome {
        let before = store.snapshot();
        let status = match self.evaluate(store, artifact) {
            Ok(()) => {
                let diff = GraphDiff::compute(&before, &store.snapshot());
                info!(rule = %artifact.name, kind = %artifact.kind, "{}: {}", artifact.name, diff.report());
                let stats = diff.stats();
                RuleStatus::Applied {
                    added: stats.added_count,
                    removed: stats.removed_count,
                }
            }
            Err(error) => {
                store.replace_with(&before);
                warn!(
                    rule = %artifact.name,
                    category = error.category(),
                    error = %error,
                    "rule failed, store left as before the rule"
                );
                RuleStatus::Failed(error.to_string())
            }
        };
        RuleOutcome {
            name: artifact.name.clone(),
            kind: Some(artifact.kind),
            status,
        }
    }

    fn evaluate(&self, store: &mut TripleStore, artifact: &RuleArtifact) -> Result<()> {
        match artifact.kind {
            RuleKind::Mutating => self.evaluator.execute_update(store, &artifact.text),
            RuleKind::Additive => {
                let produced = self.evaluator.select_triples(store, &artifact.text)?;
                for triple in produced {
                    store.add(triple);
                }
                Ok(())
            }
        }
    }
}
