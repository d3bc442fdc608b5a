//! Canonical Serializer properties
//!
//! - Idempotence: reserializing canonical output is byte-identical
//! - Merge is commutative and associative at the triple-set level
//! - Reserved prefix normalization

use anyhow::Result;
use oxigraph::model::{BlankNode, Literal, NamedNode, Term};
use proptest::prelude::*;
use rdf_materializer::canonical::{CanonicalConfig, CanonicalSerializer, NamespaceBindings};
use rdf_materializer::graph::{Triple, TripleStore, parse_turtle, xsd};
use std::path::Path;

// =============================================================================
// Generators
// =============================================================================

fn arb_iri() -> impl Strategy<Value = NamedNode> {
    prop::sample::select(vec!["a", "b", "c", "Dog", "name", "owns", "x-1"])
        .prop_map(|local| NamedNode::new(format!("http://example.org/{local}")).unwrap())
}

fn arb_predicate() -> impl Strategy<Value = NamedNode> {
    prop_oneof![
        arb_iri(),
        Just(NamedNode::new("http://schema.org/name").unwrap()),
        Just(NamedNode::new("http://www.w3.org/1999/02/22-rdf-syntax-ns#type").unwrap()),
    ]
}

fn arb_literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,12}".prop_map(Literal::new_simple_literal),
        ("[a-z]{1,8}", prop::sample::select(vec!["en", "fr", "de"])).prop_map(|(value, lang)| {
            Literal::new_language_tagged_literal(value, lang).unwrap()
        }),
        (0i64..1000).prop_map(|n| Literal::new_typed_literal(n.to_string(), xsd::INTEGER)),
        any::<bool>().prop_map(|b| Literal::new_typed_literal(b.to_string(), xsd::BOOLEAN)),
    ]
}

fn arb_blank() -> impl Strategy<Value = BlankNode> {
    (0u8..4).prop_map(|n| BlankNode::new(format!("n{n}")).unwrap())
}

fn arb_triple() -> impl Strategy<Value = Triple> {
    prop_oneof![
        (arb_iri(), arb_predicate(), arb_iri())
            .prop_map(|(s, p, o)| Triple::new(s, p, o)),
        (arb_iri(), arb_predicate(), arb_literal())
            .prop_map(|(s, p, o)| Triple::new(s, p, o)),
        (arb_iri(), arb_predicate(), arb_blank())
            .prop_map(|(s, p, o)| Triple::new(s, p, o)),
        (arb_blank(), arb_predicate(), prop_oneof![
            arb_iri().prop_map(Term::from),
            arb_literal().prop_map(Term::from),
        ])
        .prop_map(|(s, p, o)| Triple::new(s, p, o)),
        (arb_blank(), arb_predicate(), arb_blank())
            .prop_map(|(s, p, o)| Triple::new(s, p, o)),
    ]
}

fn blank_cycle(length: usize, predicate: &NamedNode, offset: u8) -> Vec<Triple> {
    (0..length)
        .map(|i| {
            Triple::new(
                BlankNode::new(format!("c{offset}_{i}")).unwrap(),
                predicate.clone(),
                BlankNode::new(format!("c{offset}_{}", (i + 1) % length)).unwrap(),
            )
        })
        .collect()
}

/// Blank-node chains and cycles mixed with arbitrary triples
fn arb_blank_structure() -> impl Strategy<Value = TripleStore> {
    (
        prop::collection::vec((1usize..7, arb_predicate()), 1..4),
        any::<bool>(),
        prop::collection::vec(arb_triple(), 0..8),
    )
        .prop_map(|(cycles, as_chain, extra)| {
            let mut triples = Vec::new();
            for (offset, (length, predicate)) in cycles.into_iter().enumerate() {
                let mut cycle = blank_cycle(length, &predicate, offset as u8);
                if as_chain {
                    cycle.pop();
                }
                triples.extend(cycle);
            }
            triples.extend(extra);
            TripleStore::from_triples(triples)
        })
}

fn arb_store() -> impl Strategy<Value = TripleStore> {
    prop::collection::vec(arb_triple(), 0..24).prop_map(TripleStore::from_triples)
}

fn serializer() -> CanonicalSerializer {
    CanonicalSerializer::new(CanonicalConfig::default())
}

fn bindings() -> NamespaceBindings {
    [("ex", "http://example.org/"), ("schema1", "http://schema.org/")]
        .into_iter()
        .collect()
}

fn merged(stores: &[&TripleStore]) -> TripleStore {
    let mut result = TripleStore::new();
    for store in stores {
        result.merge(store);
    }
    result
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_serialization_is_idempotent(store in arb_store()) {
        let first = serializer().serialize_to_string(&store, &bindings()).unwrap();
        let reparsed = parse_turtle(&first, Path::new("first.ttl")).unwrap();
        let second = serializer()
            .serialize_to_string(&reparsed.store, &reparsed.namespaces)
            .unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_blank_cycles_and_chains_are_idempotent(store in arb_blank_structure()) {
        let first = serializer().serialize_to_string(&store, &bindings()).unwrap();
        let reparsed = parse_turtle(&first, Path::new("first.ttl")).unwrap();
        let second = serializer()
            .serialize_to_string(&reparsed.store, &reparsed.namespaces)
            .unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_merge_is_commutative(a in arb_store(), b in arb_store()) {
        prop_assert_eq!(merged(&[&a, &b]).snapshot(), merged(&[&b, &a]).snapshot());
    }

    #[test]
    fn prop_merge_is_associative(a in arb_store(), b in arb_store(), c in arb_store()) {
        let left = merged(&[&merged(&[&a, &b]), &c]);
        let right = merged(&[&a, &merged(&[&b, &c])]);
        prop_assert_eq!(left.snapshot(), right.snapshot());
    }

    #[test]
    fn prop_output_does_not_depend_on_insertion_order(triples in prop::collection::vec(arb_triple(), 0..16)) {
        let forward = TripleStore::from_triples(triples.clone());
        let backward = TripleStore::from_triples(triples.into_iter().rev());
        prop_assert_eq!(
            serializer().serialize(&forward, &bindings()).unwrap(),
            serializer().serialize(&backward, &bindings()).unwrap()
        );
    }
}

// =============================================================================
// Blank Node Cycles
// =============================================================================

#[test]
fn test_blank_cycle_reserialization_is_stable() -> Result<()> {
    let source = "@prefix ex: <http://example.org/> .\n\
                  _:a ex:next _:b .\n_:b ex:next _:c .\n_:c ex:next _:a .\n";
    let document = parse_turtle(source, Path::new("cycle.ttl"))?;
    let first = serializer().serialize_to_string(&document.store, &document.namespaces)?;

    let mut current = first.clone();
    for round in 0..20 {
        let reparsed = parse_turtle(&current, Path::new("cycle.ttl"))?;
        current = serializer().serialize_to_string(&reparsed.store, &reparsed.namespaces)?;
        assert_eq!(current, first, "round {round} changed the output");
    }
    assert_eq!(document.store.size(), 3);
    Ok(())
}

// =============================================================================
// Prefix Normalization
// =============================================================================

#[test]
fn test_reserved_prefix_bound_exactly_once() -> Result<()> {
    let document = parse_turtle(
        r#"
        @prefix schema1: <http://schema.org/> .
        @prefix schema: <http://example.com/not-schema/> .
        <http://example.org/rex> schema1:name "Rex" ;
            schema:tag "dog" .
        "#,
        Path::new("aliases.ttl"),
    )?;

    let output = serializer().serialize_to_string(&document.store, &document.namespaces)?;
    let reparsed = parse_turtle(&output, Path::new("output.ttl"))?;

    let bound: Vec<_> = reparsed
        .namespaces
        .iter()
        .filter(|(_, iri)| *iri == "http://schema.org/")
        .map(|(prefix, _)| prefix.to_string())
        .collect();
    assert_eq!(bound, vec!["schema".to_string()]);
    assert_eq!(reparsed.store.snapshot(), document.store.snapshot());
    Ok(())
}

#[test]
fn test_configured_reserved_namespace_is_honored() -> Result<()> {
    let config = CanonicalConfig {
        reserved_prefix: "sdo".to_string(),
        reserved_namespace: "https://schema.org/".to_string(),
    };
    let document = parse_turtle(
        "@prefix s: <https://schema.org/> .\n<http://example.org/a> s:name \"A\" .\n",
        Path::new("a.ttl"),
    )?;

    let output = CanonicalSerializer::new(config)
        .serialize_to_string(&document.store, &document.namespaces)?;

    assert!(output.contains("@prefix sdo: <https://schema.org/> ."));
    assert!(output.contains("sdo:name"));
    assert!(!output.contains("@prefix s:"));
    Ok(())
}
