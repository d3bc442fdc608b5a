//! Pattern Query/Update Evaluator.
//!
//! The applier only sees the [`PatternEvaluator`] trait. The default
//! implementation copies the triple store into an in-memory oxigraph store,
//! evaluates there and reads the default graph back.

use crate::error::{Error, Result};
use crate::graph::{Triple, TripleStore};
use oxigraph::model::{GraphNameRef, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

pub trait PatternEvaluator {
    /// Triples produced by an additive rule; the store is left untouched
    fn select_triples(&self, store: &TripleStore, rule: &str) -> Result<Vec<Triple>>;

    /// Applies a mutating rule to `store` in place
    fn execute_update(&self, store: &mut TripleStore, rule: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OxigraphEvaluator;

impl OxigraphEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Copies well-formed triples into a fresh store; Literal-subject
    /// triples cannot enter it and are handed back separately.
    fn load(store: &TripleStore) -> Result<(Store, Vec<Triple>)> {
        let oxigraph = Store::new().map_err(storage_error)?;
        let mut unrepresentable = Vec::new();
        for triple in store {
            match triple.to_quad() {
                Some(quad) => {
                    oxigraph.insert(&quad).map_err(storage_error)?;
                }
                None => unrepresentable.push(triple.clone()),
            }
        }
        Ok((oxigraph, unrepresentable))
    }

    fn read_default_graph(oxigraph: &Store) -> Result<Vec<Triple>> {
        oxigraph
            .quads_for_pattern(None, None, None, Some(GraphNameRef::DefaultGraph))
            .map(|quad| quad.map(Triple::from).map_err(storage_error))
            .collect()
    }
}

impl PatternEvaluator for OxigraphEvaluator {
    fn select_triples(&self, store: &TripleStore, rule: &str) -> Result<Vec<Triple>> {
        let (oxigraph, _) = Self::load(store)?;
        let results = oxigraph.query(rule).map_err(evaluation_error)?;

        match results {
            QueryResults::Graph(triples) => triples
                .map(|triple| triple.map(Triple::from).map_err(evaluation_error))
                .collect(),
            QueryResults::Solutions(solutions) => {
                let variables = solutions.variables().to_vec();
                if variables.len() < 3 {
                    return Err(Error::Evaluation(format!(
                        "SELECT rule projects {} variables, needs subject, predicate and object",
                        variables.len()
                    )));
                }
                let mut produced = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(evaluation_error)?;
                    let row = (
                        solution.get(&variables[0]),
                        solution.get(&variables[1]),
                        solution.get(&variables[2]),
                    );
                    if let (Some(subject), Some(Term::NamedNode(predicate)), Some(object)) = row {
                        if !subject.is_literal() {
                            produced.push(Triple::new(
                                subject.clone(),
                                predicate.clone(),
                                object.clone(),
                            ));
                        }
                    }
                }
                Ok(produced)
            }
            QueryResults::Boolean(_) => Err(Error::Evaluation(
                "ASK rules produce no triples".to_string(),
            )),
        }
    }

    fn execute_update(&self, store: &mut TripleStore, rule: &str) -> Result<()> {
        let (oxigraph, unrepresentable) = Self::load(store)?;
        oxigraph.update(rule).map_err(evaluation_error)?;

        let updated = Self::read_default_graph(&oxigraph)?;
        *store = updated.into_iter().chain(unrepresentable).collect();
        Ok(())
    }
}

fn storage_error(error: impl std::fmt::Display) -> Error {
    Error::Storage(error.to_string())
}

fn evaluation_error(error: impl std::fmt::Display) -> Error {
    Error::Evaluation(error.to_string())
}
