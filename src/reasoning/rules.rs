//! Structural expansion rules and cleanup.
//!
//! Every rule reads a frozen [`StoreSnapshot`] and proposes candidate
//! triples into a shared [`Delta`]; the engine applies the delta in one step
//! after all rules ran. Rule order within a pass therefore never matters.

use super::schema::RuleMetadata;
use crate::graph::{StoreSnapshot, Triple, TripleStore, rdf};
use oxigraph::model::{NamedNode, Term};
use std::collections::{HashMap, HashSet};

/// A forward-chaining rule over one pass-start snapshot
pub trait StructuralRule: Send + Sync {
    /// Rule identifier used in logs
    fn name(&self) -> &str;

    /// Propose the triples this rule derives from `snapshot`
    fn derive(&self, metadata: &RuleMetadata, snapshot: &StoreSnapshot, delta: &mut Delta);
}

/// Candidate additions computed from one snapshot
#[derive(Debug, Default)]
pub struct Delta {
    additions: HashSet<Triple>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `triple` unless the snapshot already holds it
    pub fn propose(&mut self, snapshot: &StoreSnapshot, triple: Triple) -> bool {
        if snapshot.contains(&triple) {
            return false;
        }
        self.additions.insert(triple)
    }

    pub fn len(&self) -> usize {
        self.additions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.additions.contains(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.additions.iter()
    }

    /// Adds all candidates to `store`; returns how many were new
    pub fn apply(self, store: &mut TripleStore) -> usize {
        store.extend(self.additions)
    }
}

/// `(s, p, o)` and `p inverseOf q` ⇒ `(o, q, s)`.
///
/// Skipped when `o` is a Literal: the derived triple would have a Literal
/// subject that cleanup deletes again on every pass.
#[derive(Debug, Default)]
pub struct InverseRule;

impl StructuralRule for InverseRule {
    fn name(&self) -> &str {
        "inverse"
    }

    fn derive(&self, metadata: &RuleMetadata, snapshot: &StoreSnapshot, delta: &mut Delta) {
        if metadata.inverse_of.is_empty() {
            return;
        }
        for triple in snapshot {
            if triple.object.is_literal() {
                continue;
            }
            for inverse in metadata.inverses(&triple.predicate) {
                delta.propose(
                    snapshot,
                    Triple::new(triple.object.clone(), inverse.clone(), triple.subject.clone()),
                );
            }
        }
    }
}

/// `(x, rdf:type, A)` and `A subClassOf B` ⇒ `(x, rdf:type, B)`, one level per pass
#[derive(Debug, Default)]
pub struct SubclassRule;

impl StructuralRule for SubclassRule {
    fn name(&self) -> &str {
        "subclass"
    }

    fn derive(&self, metadata: &RuleMetadata, snapshot: &StoreSnapshot, delta: &mut Delta) {
        if metadata.subclass_of.is_empty() {
            return;
        }
        for triple in snapshot {
            let Term::NamedNode(class) = &triple.object else {
                continue;
            };
            if triple.predicate.as_ref() != rdf::TYPE {
                continue;
            }
            for superclass in metadata.superclasses(class) {
                delta.propose(
                    snapshot,
                    Triple::new(triple.subject.clone(), rdf::TYPE, superclass.clone()),
                );
            }
        }
    }
}

/// `(x, p, y)`, `(y, p, z)` and `p` transitive ⇒ `(x, p, z)`, one hop per pass
#[derive(Debug, Default)]
pub struct TransitiveRule;

impl StructuralRule for TransitiveRule {
    fn name(&self) -> &str {
        "transitive"
    }

    fn derive(&self, metadata: &RuleMetadata, snapshot: &StoreSnapshot, delta: &mut Delta) {
        if metadata.transitive.is_empty() {
            return;
        }
        let mut adjacency: HashMap<&NamedNode, HashMap<&Term, Vec<&Term>>> = HashMap::new();
        for triple in snapshot {
            if metadata.is_transitive(&triple.predicate) {
                adjacency
                    .entry(&triple.predicate)
                    .or_default()
                    .entry(&triple.subject)
                    .or_default()
                    .push(&triple.object);
            }
        }

        for (property, edges) in &adjacency {
            for (x, ys) in edges {
                for y in ys {
                    let Some(zs) = edges.get(y) else {
                        continue;
                    };
                    for z in zs {
                        delta.propose(
                            snapshot,
                            Triple::new((*x).clone(), (*property).clone(), (*z).clone()),
                        );
                    }
                }
            }
        }
    }
}

/// `(s, p, o)` with `p domain C` ⇒ `(s, rdf:type, C)`; with `p range C` ⇒ `(o, rdf:type, C)`.
///
/// Range typing of Literal objects is skipped for the same reason as in
/// [`InverseRule`].
#[derive(Debug, Default)]
pub struct DomainRangeRule;

impl StructuralRule for DomainRangeRule {
    fn name(&self) -> &str {
        "domain_range"
    }

    fn derive(&self, metadata: &RuleMetadata, snapshot: &StoreSnapshot, delta: &mut Delta) {
        if metadata.domain_of.is_empty() && metadata.range_of.is_empty() {
            return;
        }
        for triple in snapshot {
            for class in metadata.domains(&triple.predicate) {
                delta.propose(
                    snapshot,
                    Triple::new(triple.subject.clone(), rdf::TYPE, class.clone()),
                );
            }
            if triple.object.is_literal() {
                continue;
            }
            for class in metadata.ranges(&triple.predicate) {
                delta.propose(
                    snapshot,
                    Triple::new(triple.object.clone(), rdf::TYPE, class.clone()),
                );
            }
        }
    }
}

/// `(s, from, o)` ⇒ `(s, to, o)`, e.g. copying `rdfs:label` onto a display predicate
#[derive(Debug, Clone)]
pub struct PropertyCopyRule {
    name: String,
    from: NamedNode,
    to: NamedNode,
}

impl PropertyCopyRule {
    pub fn new(from: NamedNode, to: NamedNode) -> Self {
        Self {
            name: format!("copy <{}> -> <{}>", from.as_str(), to.as_str()),
            from,
            to,
        }
    }
}

impl StructuralRule for PropertyCopyRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn derive(&self, _metadata: &RuleMetadata, snapshot: &StoreSnapshot, delta: &mut Delta) {
        for triple in snapshot {
            if triple.predicate == self.from {
                delta.propose(
                    snapshot,
                    Triple::new(triple.subject.clone(), self.to.clone(), triple.object.clone()),
                );
            }
        }
    }
}

/// The four rules every structural run starts with
pub fn builtin_rules() -> Vec<Box<dyn StructuralRule>> {
    vec![
        Box::new(InverseRule),
        Box::new(SubclassRule),
        Box::new(TransitiveRule),
        Box::new(DomainRangeRule),
    ]
}

/// Removes Literal-subject triples and self-equivalences; returns how many went
pub fn cleanup(store: &mut TripleStore, equivalence: &[NamedNode]) -> usize {
    store.retain(|triple| triple.is_well_formed() && !triple.is_self_equivalence(equivalence))
}
