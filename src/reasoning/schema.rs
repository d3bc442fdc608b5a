//! Schema Extractor: derives rule metadata from ontology triples.
//!
//! One linear scan. Only direct edges are recorded; closure is left to the
//! fixpoint engine. Blank-node class expressions (restrictions, unions) are
//! ignored since none of the structural rules can use them.

use crate::graph::{Triple, TripleStore, owl, rdf, rdfs};
use indexmap::{IndexMap, IndexSet};
use oxigraph::model::{NamedNode, Term};

type Edges = IndexMap<NamedNode, IndexSet<NamedNode>>;

/// Direct schema edges driving the structural rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleMetadata {
    pub subclass_of: Edges,
    /// Stored symmetrically: if `p ↦ q` then `q ↦ p`
    pub inverse_of: Edges,
    pub transitive: IndexSet<NamedNode>,
    pub domain_of: Edges,
    pub range_of: Edges,
}

impl RuleMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn superclasses<'a>(&'a self, class: &NamedNode) -> impl Iterator<Item = &'a NamedNode> {
        targets(&self.subclass_of, class)
    }

    pub fn inverses<'a>(&'a self, property: &NamedNode) -> impl Iterator<Item = &'a NamedNode> {
        targets(&self.inverse_of, property)
    }

    pub fn is_transitive(&self, property: &NamedNode) -> bool {
        self.transitive.contains(property)
    }

    pub fn domains<'a>(&'a self, property: &NamedNode) -> impl Iterator<Item = &'a NamedNode> {
        targets(&self.domain_of, property)
    }

    pub fn ranges<'a>(&'a self, property: &NamedNode) -> impl Iterator<Item = &'a NamedNode> {
        targets(&self.range_of, property)
    }

    pub fn add_subclass(&mut self, class: NamedNode, superclass: NamedNode) {
        self.subclass_of.entry(class).or_default().insert(superclass);
    }

    pub fn add_inverse(&mut self, property: NamedNode, inverse: NamedNode) {
        self.inverse_of
            .entry(property.clone())
            .or_default()
            .insert(inverse.clone());
        self.inverse_of.entry(inverse).or_default().insert(property);
    }

    pub fn add_transitive(&mut self, property: NamedNode) {
        self.transitive.insert(property);
    }

    pub fn add_domain(&mut self, property: NamedNode, class: NamedNode) {
        self.domain_of.entry(property).or_default().insert(class);
    }

    pub fn add_range(&mut self, property: NamedNode, class: NamedNode) {
        self.range_of.entry(property).or_default().insert(class);
    }

    /// Union with `other`
    pub fn merge(&mut self, other: &RuleMetadata) {
        for (class, supers) in &other.subclass_of {
            for superclass in supers {
                self.add_subclass(class.clone(), superclass.clone());
            }
        }
        for (property, inverses) in &other.inverse_of {
            for inverse in inverses {
                self.add_inverse(property.clone(), inverse.clone());
            }
        }
        for property in &other.transitive {
            self.add_transitive(property.clone());
        }
        for (property, classes) in &other.domain_of {
            for class in classes {
                self.add_domain(property.clone(), class.clone());
            }
        }
        for (property, classes) in &other.range_of {
            for class in classes {
                self.add_range(property.clone(), class.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subclass_of.is_empty()
            && self.inverse_of.is_empty()
            && self.transitive.is_empty()
            && self.domain_of.is_empty()
            && self.range_of.is_empty()
    }

    pub fn summary(&self) -> SchemaSummary {
        let edges = |map: &Edges| map.values().map(IndexSet::len).sum();
        SchemaSummary {
            subclass_edges: edges(&self.subclass_of),
            inverse_pairs: edges(&self.inverse_of) / 2,
            transitive_properties: self.transitive.len(),
            domain_edges: edges(&self.domain_of),
            range_edges: edges(&self.range_of),
        }
    }
}

fn targets<'a>(edges: &'a Edges, key: &NamedNode) -> impl Iterator<Item = &'a NamedNode> {
    edges.get(key).into_iter().flatten()
}

/// Edge counts, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaSummary {
    pub subclass_edges: usize,
    pub inverse_pairs: usize,
    pub transitive_properties: usize,
    pub domain_edges: usize,
    pub range_edges: usize,
}

pub struct SchemaExtractor;

impl SchemaExtractor {
    pub fn extract(ontology: &TripleStore) -> RuleMetadata {
        let mut metadata = RuleMetadata::new();
        for triple in ontology {
            Self::scan(triple, &mut metadata);
        }

        let summary = metadata.summary();
        tracing::debug!(
            subclass_edges = summary.subclass_edges,
            inverse_pairs = summary.inverse_pairs,
            transitive = summary.transitive_properties,
            domains = summary.domain_edges,
            ranges = summary.range_edges,
            "extracted rule metadata"
        );
        metadata
    }

    fn scan(triple: &Triple, metadata: &mut RuleMetadata) {
        let (Term::NamedNode(subject), Term::NamedNode(object)) = (&triple.subject, &triple.object)
        else {
            return;
        };
        let predicate = triple.predicate.as_ref();

        if predicate == rdfs::SUB_CLASS_OF {
            metadata.add_subclass(subject.clone(), object.clone());
        } else if predicate == owl::INVERSE_OF {
            metadata.add_inverse(subject.clone(), object.clone());
        } else if predicate == rdfs::DOMAIN {
            metadata.add_domain(subject.clone(), object.clone());
        } else if predicate == rdfs::RANGE {
            metadata.add_range(subject.clone(), object.clone());
        } else if predicate == rdf::TYPE && object.as_ref() == owl::TRANSITIVE_PROPERTY {
            metadata.add_transitive(subject.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_turtle;
    use std::path::Path;

    const ONTOLOGY: &str = r#"
@prefix ex: <http://example.org/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .

ex:Dog rdfs:subClassOf ex:Animal , [ a owl:Restriction ] .
ex:Animal rdfs:subClassOf ex:LivingThing .
ex:hasOwner owl:inverseOf ex:owns .
ex:ancestorOf a owl:TransitiveProperty .
ex:worksAt rdfs:domain ex:Person ; rdfs:range ex:Company .
"#;

    fn iri(local: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{local}")).unwrap()
    }

    #[test]
    fn extracts_all_four_maps() {
        let ontology = parse_turtle(ONTOLOGY, Path::new("ontology.ttl")).unwrap();
        let metadata = SchemaExtractor::extract(&ontology.store);

        assert_eq!(metadata.superclasses(&iri("Dog")).collect::<Vec<_>>(), vec![&iri("Animal")]);
        assert_eq!(
            metadata.superclasses(&iri("Animal")).collect::<Vec<_>>(),
            vec![&iri("LivingThing")]
        );
        assert!(metadata.is_transitive(&iri("ancestorOf")));
        assert_eq!(metadata.domains(&iri("worksAt")).collect::<Vec<_>>(), vec![&iri("Person")]);
        assert_eq!(metadata.ranges(&iri("worksAt")).collect::<Vec<_>>(), vec![&iri("Company")]);
    }

    #[test]
    fn inverse_is_symmetric() {
        let ontology = parse_turtle(ONTOLOGY, Path::new("ontology.ttl")).unwrap();
        let metadata = SchemaExtractor::extract(&ontology.store);

        assert_eq!(metadata.inverses(&iri("hasOwner")).collect::<Vec<_>>(), vec![&iri("owns")]);
        assert_eq!(metadata.inverses(&iri("owns")).collect::<Vec<_>>(), vec![&iri("hasOwner")]);
        assert_eq!(metadata.summary().inverse_pairs, 1);
    }

    #[test]
    fn closure_is_not_precomputed() {
        let ontology = parse_turtle(ONTOLOGY, Path::new("ontology.ttl")).unwrap();
        let metadata = SchemaExtractor::extract(&ontology.store);
        assert!(!metadata.superclasses(&iri("Dog")).any(|c| c == &iri("LivingThing")));
    }

    #[test]
    fn empty_store_yields_empty_metadata() {
        let metadata = SchemaExtractor::extract(&TripleStore::new());
        assert!(metadata.is_empty());
    }

    #[test]
    fn merge_unions_edges() {
        let mut left = RuleMetadata::new();
        left.add_subclass(iri("Dog"), iri("Animal"));
        let mut right = RuleMetadata::new();
        right.add_subclass(iri("Dog"), iri("Pet"));
        right.add_transitive(iri("partOf"));

        left.merge(&right);
        assert_eq!(left.superclasses(&iri("Dog")).count(), 2);
        assert!(left.is_transitive(&iri("partOf")));
    }
}
