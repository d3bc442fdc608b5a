use super::{CommandOutcome, Pipeline};
use crate::reasoning::{FixpointEngine, ReasoningConfig, SchemaExtractor};
use crate::sparql::{DeclarativeRuleApplier, OxigraphEvaluator, RuleSet};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ReasonRequest {
    pub ontology: PathBuf,
    pub data: PathBuf,
    pub output: PathBuf,
    pub rules_dir: Option<PathBuf>,
    /// Applied after the directory's rules, in the order given
    pub rule_files: Vec<PathBuf>,
    pub rewrite_inputs: bool,
    /// Run the schema-derived structural rules
    pub structural: bool,
}

impl Pipeline {
    /// load → merge → extract schema → fixpoint → declarative rules →
    /// fixpoint again if the rules changed anything → canonical write
    pub fn reason(&self, request: &ReasonRequest) -> Result<CommandOutcome> {
        let ontology = self.load(&request.ontology)?;
        let data = self.load(&request.data)?;
        if request.rewrite_inputs {
            self.write(&ontology, &request.ontology)?;
            self.write(&data, &request.data)?;
        }

        let metadata = SchemaExtractor::extract(&ontology.store);
        let summary = metadata.summary();
        info!(
            subclass = summary.subclass_edges,
            inverse = summary.inverse_pairs,
            transitive = summary.transitive_properties,
            domain = summary.domain_edges,
            range = summary.range_edges,
            "extracted schema"
        );

        let mut graph = ontology;
        graph.merge(&data);
        info!(triples = graph.store.size(), "Total graph size: {} triples", graph.store.size());

        let rules = self.rule_set(request)?;

        let reasoning = ReasoningConfig {
            structural_rules: request.structural && self.config.reasoning.structural_rules,
            ..self.config.reasoning.clone()
        };
        let mut engine = FixpointEngine::new(metadata, &reasoning)
            .context("invalid reasoning configuration")?;
        let has_structural = !engine.rule_names().is_empty();

        if has_structural {
            engine
                .run(&mut graph.store)
                .context("structural inference did not converge")?;
        }

        if !rules.is_empty() {
            info!(rules = rules.len(), "Applying {} inference rules", rules.len());
            let report = DeclarativeRuleApplier::new(OxigraphEvaluator).apply(&mut graph.store, &rules);
            info!(
                added = report.total_added(),
                removed = report.total_removed(),
                failed = report.failed_count(),
                missing = report.missing_count(),
                "declarative rules applied"
            );
            if report.changed() && has_structural {
                engine
                    .run(&mut graph.store)
                    .context("structural inference did not converge after declarative rules")?;
            }
        }

        self.write(&graph, &request.output)?;
        Ok(CommandOutcome::Success)
    }

    fn rule_set(&self, request: &ReasonRequest) -> Result<RuleSet> {
        let mut rules = match &request.rules_dir {
            Some(dir) => RuleSet::load(dir, &self.config.rule_patterns)
                .with_context(|| format!("failed to load rules from {}", dir.display()))?,
            None => RuleSet::new(),
        };
        for file in &request.rule_files {
            rules.push_file(file);
        }
        Ok(rules)
    }
}
