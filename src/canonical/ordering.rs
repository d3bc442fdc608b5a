//! Deterministic total order over triples.
//!
//! Terms are ranked IRI < blank node < literal. IRIs compare as strings,
//! literals by lexical value then language tag or datatype. Blank nodes are
//! first relabeled by oxigraph's graph canonicalization, so parser-assigned
//! ids never leak into the order or the output.

use crate::graph::{Triple, TripleStore};
use oxigraph::model::{BlankNode, CanonicalizationAlgorithm, Graph, Term};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};

const LABEL_HEX_DIGITS: usize = 16;

/// Sort key of a single term
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TermKey {
    rank: u8,
    value: String,
    qualifier: String,
}

impl TermKey {
    pub fn of(term: &Term) -> Self {
        #[allow(unreachable_patterns)]
        match term {
            Term::NamedNode(node) => Self {
                rank: 0,
                value: node.as_str().to_owned(),
                qualifier: String::new(),
            },
            Term::BlankNode(node) => Self {
                rank: 1,
                value: node.as_str().to_owned(),
                qualifier: String::new(),
            },
            Term::Literal(literal) => Self {
                rank: 2,
                value: literal.value().to_owned(),
                qualifier: match literal.language() {
                    Some(language) => format!("@{language}"),
                    None => format!("^^{}", literal.datatype().as_str()),
                },
            },
            other => Self {
                rank: 3,
                value: other.to_string(),
                qualifier: String::new(),
            },
        }
    }
}

/// Sort key of a triple: subject, then predicate, then object
pub fn triple_key(triple: &Triple) -> (TermKey, String, TermKey) {
    (
        TermKey::of(&triple.subject),
        triple.predicate.as_str().to_owned(),
        TermKey::of(&triple.object),
    )
}

pub fn sort_triples(triples: &mut [Triple]) {
    triples.sort_by_cached_key(triple_key);
}

/// All triples of `store`, blank nodes relabeled, in canonical order
pub fn canonical_order(store: &TripleStore) -> Vec<Triple> {
    let mut triples = relabel_blank_nodes(store.iter().cloned().collect());
    sort_triples(&mut triples);
    triples
}

/// Rewrites every blank node of the well-formed triples to its canonical
/// label. Literal-subject triples cannot enter an RDF graph and pass
/// through untouched.
pub fn relabel_blank_nodes(triples: Vec<Triple>) -> Vec<Triple> {
    if !triples.iter().any(has_blank_node) {
        return triples;
    }
    let (well_formed, literal_subject): (Vec<Triple>, Vec<Triple>) =
        triples.into_iter().partition(Triple::is_well_formed);

    let mut graph = Graph::new();
    for triple in well_formed.iter().filter_map(Triple::to_rdf) {
        graph.insert(&triple);
    }
    // Ties between nodes that hashing cannot separate are broken by trying
    // each candidate and keeping the smallest result.
    graph.canonicalize(CanonicalizationAlgorithm::Unstable);

    let canonical: Vec<Triple> = graph
        .iter()
        .map(|triple| Triple::from(triple.into_owned()))
        .collect();
    let labels = canonical_blank_labels(&canonical);
    canonical
        .into_iter()
        .map(|triple| Triple {
            subject: relabel(triple.subject, &labels),
            predicate: triple.predicate,
            object: relabel(triple.object, &labels),
        })
        .chain(literal_subject)
        .collect()
}

fn has_blank_node(triple: &Triple) -> bool {
    triple.subject.is_blank_node() || triple.object.is_blank_node()
}

fn relabel(term: Term, labels: &HashMap<BlankNode, BlankNode>) -> Term {
    match term {
        Term::BlankNode(node) => match labels.get(&node) {
            Some(label) => Term::BlankNode(label.clone()),
            None => Term::BlankNode(node),
        },
        other => other,
    }
}

/// Maps canonicalized blank-node ids to short `b<hex>` labels.
///
/// `triples` must already carry canonical ids. Labels are the first hex
/// digits of the id's SHA-256; a collision gets a `_k` suffix in id order.
pub fn canonical_blank_labels(triples: &[Triple]) -> HashMap<BlankNode, BlankNode> {
    let nodes: BTreeSet<&BlankNode> = triples
        .iter()
        .flat_map(|triple| [&triple.subject, &triple.object])
        .filter_map(|term| match term {
            Term::BlankNode(node) => Some(node),
            _ => None,
        })
        .collect();

    let mut labels = HashMap::with_capacity(nodes.len());
    let mut seen: HashMap<String, usize> = HashMap::new();
    for node in nodes {
        let digest = format!("{:x}", Sha256::digest(node.as_str().as_bytes()));
        let short = &digest[..LABEL_HEX_DIGITS];
        let duplicate = seen.entry(short.to_string()).or_insert(0);
        let label = if *duplicate == 0 {
            format!("b{short}")
        } else {
            format!("b{short}_{duplicate}")
        };
        *duplicate += 1;
        labels.insert(node.clone(), BlankNode::new_unchecked(label));
    }
    labels
}
