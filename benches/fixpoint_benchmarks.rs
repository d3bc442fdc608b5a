//! Fixpoint and canonical serialization benchmarks.
//!
//! Synthetic graphs: a subclass chain of configurable depth, an ownership
//! relation with an inverse, and a transitive lineage chain.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use oxigraph::model::NamedNode;
use rdf_materializer::canonical::{CanonicalConfig, CanonicalSerializer, NamespaceBindings};
use rdf_materializer::graph::{Triple, TripleStore, owl, rdf, rdfs};
use rdf_materializer::reasoning::{FixpointEngine, ReasoningConfig, SchemaExtractor};
use std::time::Duration;

fn ex(local: impl std::fmt::Display) -> NamedNode {
    NamedNode::new(format!("http://example.org/bench#{local}")).unwrap()
}

/// Ontology with a `depth`-long class chain and `individuals` typed leaves
fn synthetic_graph(depth: usize, individuals: usize) -> (TripleStore, TripleStore) {
    let mut ontology = TripleStore::new();
    for level in 0..depth {
        ontology.add(Triple::new(
            ex(format!("Class{level}")),
            rdfs::SUB_CLASS_OF,
            ex(format!("Class{}", level + 1)),
        ));
    }
    ontology.add(Triple::new(ex("hasOwner"), owl::INVERSE_OF, ex("owns")));
    ontology.add(Triple::new(ex("ancestorOf"), rdf::TYPE, owl::TRANSITIVE_PROPERTY.into_owned()));
    ontology.add(Triple::new(ex("hasOwner"), rdfs::RANGE, ex("Owner")));

    let mut data = TripleStore::new();
    for i in 0..individuals {
        data.add(Triple::new(ex(format!("pet{i}")), rdf::TYPE, ex("Class0")));
        data.add(Triple::new(
            ex(format!("pet{i}")),
            ex("hasOwner"),
            ex(format!("owner{}", i % 16)),
        ));
        if i > 0 && i % 8 != 0 {
            data.add(Triple::new(
                ex(format!("pet{}", i - 1)),
                ex("ancestorOf"),
                ex(format!("pet{i}")),
            ));
        }
    }
    (ontology, data)
}

fn bench_fixpoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixpoint_run");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for individuals in [64usize, 256, 1024] {
        let (ontology, data) = synthetic_graph(6, individuals);
        let metadata = SchemaExtractor::extract(&ontology);
        let mut merged = ontology.clone();
        merged.merge(&data);

        group.bench_with_input(
            BenchmarkId::from_parameter(individuals),
            &merged,
            |b, merged| {
                b.iter(|| {
                    let mut store = merged.clone();
                    let mut engine =
                        FixpointEngine::new(metadata.clone(), &ReasoningConfig::default()).unwrap();
                    black_box(engine.run(&mut store).unwrap())
                })
            },
        );
    }

    group.finish();
}

fn bench_compute_delta(c: &mut Criterion) {
    let (ontology, data) = synthetic_graph(6, 512);
    let metadata = SchemaExtractor::extract(&ontology);
    let mut merged = ontology;
    merged.merge(&data);
    let snapshot = merged.snapshot();
    let engine = FixpointEngine::new(metadata, &ReasoningConfig::default()).unwrap();

    c.bench_function("compute_delta_first_pass", |b| {
        b.iter(|| black_box(engine.compute_delta(black_box(&snapshot))))
    });
}

fn bench_canonical_serialize(c: &mut Criterion) {
    let (ontology, data) = synthetic_graph(6, 512);
    let mut store = ontology;
    store.merge(&data);
    let serializer = CanonicalSerializer::new(CanonicalConfig::default());
    let namespaces: NamespaceBindings = [("ex", "http://example.org/bench#")].into_iter().collect();

    c.bench_function("canonical_serialize", |b| {
        b.iter(|| black_box(serializer.serialize(&store, &namespaces).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_fixpoint,
    bench_compute_delta,
    bench_canonical_serialize
);
criterion_main!(benches);
