//! Triples and the fixed vocabulary the engine reasons over.
//!
//! A [`Triple`] is a *generalized* triple: its subject is any [`Term`], so a
//! store can transiently hold a Literal subject before cleanup removes it.
//! Only well-formed triples convert to oxigraph's model for serialization and
//! SPARQL evaluation.

use oxigraph::model::{GraphName, NamedNode, NamedOrBlankNode, Quad, Term};
use std::fmt;

pub use oxigraph::model::vocab::{rdf, rdfs, xsd};

/// OWL terms used by the schema extractor and cleanup
pub mod owl {
    use oxigraph::model::NamedNodeRef;

    pub const INVERSE_OF: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#inverseOf");
    pub const TRANSITIVE_PROPERTY: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#TransitiveProperty");
    pub const SAME_AS: NamedNodeRef<'static> =
        NamedNodeRef::new_unchecked("http://www.w3.org/2002/07/owl#sameAs");
}

/// SHACL namespace
pub const SH_NS: &str = "http://www.w3.org/ns/shacl#";

/// An RDF statement with structural equality
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: NamedNode,
    pub object: Term,
}

impl Triple {
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<NamedNode>,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// False when the subject is a Literal
    pub fn is_well_formed(&self) -> bool {
        !self.subject.is_literal()
    }

    /// `(s, p, s)` where `p` is one of the equivalence predicates
    pub fn is_self_equivalence(&self, equivalence: &[NamedNode]) -> bool {
        self.subject == self.object && equivalence.contains(&self.predicate)
    }

    /// Converts to oxigraph's triple model. Returns `None` for a Literal subject.
    pub fn to_rdf(&self) -> Option<oxigraph::model::Triple> {
        let subject = match &self.subject {
            Term::NamedNode(node) => NamedOrBlankNode::from(node.clone()),
            Term::BlankNode(node) => NamedOrBlankNode::from(node.clone()),
            _ => return None,
        };
        Some(oxigraph::model::Triple::new(
            subject,
            self.predicate.clone(),
            self.object.clone(),
        ))
    }

    /// Same as [`Triple::to_rdf`], placed in the default graph
    pub fn to_quad(&self) -> Option<Quad> {
        self.to_rdf()
            .map(|triple| triple.in_graph(GraphName::DefaultGraph))
    }
}

impl From<oxigraph::model::Triple> for Triple {
    fn from(triple: oxigraph::model::Triple) -> Self {
        Self {
            subject: triple.subject.into(),
            predicate: triple.predicate,
            object: triple.object,
        }
    }
}

impl From<Quad> for Triple {
    fn from(quad: Quad) -> Self {
        Self {
            subject: quad.subject.into(),
            predicate: quad.predicate,
            object: quad.object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{BlankNode, Literal};

    fn iri(value: &str) -> NamedNode {
        NamedNode::new(value).unwrap()
    }

    #[test]
    fn literal_subject_is_not_well_formed() {
        let triple = Triple::new(
            Literal::new_simple_literal("Rex"),
            iri("http://example.org/owns"),
            iri("http://example.org/alice"),
        );
        assert!(!triple.is_well_formed());
        assert!(triple.to_rdf().is_none());
        assert!(triple.to_quad().is_none());
    }

    #[test]
    fn blank_subject_converts() {
        let triple = Triple::new(
            BlankNode::new("b1").unwrap(),
            rdf::TYPE.into_owned(),
            iri("http://example.org/Dog"),
        );
        let rdf_triple = triple.to_rdf().unwrap();
        assert_eq!(Triple::from(rdf_triple), triple);
    }

    #[test]
    fn self_equivalence_detection() {
        let rex = iri("http://example.org/rex");
        let same = Triple::new(rex.clone(), owl::SAME_AS.into_owned(), rex.clone());
        let equivalence = vec![owl::SAME_AS.into_owned()];
        assert!(same.is_self_equivalence(&equivalence));

        let other = Triple::new(
            rex.clone(),
            owl::SAME_AS.into_owned(),
            iri("http://example.org/rex2"),
        );
        assert!(!other.is_self_equivalence(&equivalence));

        let not_equivalence = Triple::new(rex.clone(), iri("http://example.org/knows"), rex);
        assert!(!not_equivalence.is_self_equivalence(&equivalence));
    }

    #[test]
    fn display_uses_ntriples_terms() {
        let triple = Triple::new(
            iri("http://example.org/rex"),
            iri("http://example.org/name"),
            Literal::new_language_tagged_literal_unchecked("Rex", "en"),
        );
        assert_eq!(
            triple.to_string(),
            "<http://example.org/rex> <http://example.org/name> \"Rex\"@en ."
        );
    }
}
