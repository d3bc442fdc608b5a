//! Byte-stable Turtle writer.
//!
//! Output depends only on the logical content of the store: prefixes are
//! normalized, blank nodes relabeled and triples written in canonical order,
//! so `serialize(parse(serialize(g))) == serialize(g)`.

use super::CanonicalConfig;
use super::namespaces::NamespaceBindings;
use super::ordering::canonical_order;
use crate::error::{Error, Result};
use crate::graph::{Triple, TripleStore};
use oxigraph::io::{RdfFormat, RdfSerializer};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct CanonicalSerializer {
    config: CanonicalConfig,
}

impl CanonicalSerializer {
    pub fn new(config: CanonicalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CanonicalConfig {
        &self.config
    }

    pub fn normalize_namespaces(&self, namespaces: &NamespaceBindings) -> NamespaceBindings {
        namespaces.normalized(&self.config.reserved_prefix, &self.config.reserved_namespace)
    }

    pub fn canonical_triples(&self, store: &TripleStore) -> Vec<Triple> {
        canonical_order(store)
    }

    /// Serialize `store` as canonical Turtle
    pub fn serialize(&self, store: &TripleStore, namespaces: &NamespaceBindings) -> Result<Vec<u8>> {
        let namespaces = self.normalize_namespaces(namespaces);

        let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
        for (prefix, iri) in namespaces.iter() {
            serializer = serializer
                .with_prefix(prefix, iri)
                .map_err(|error| Error::InvalidIri {
                    iri: iri.to_string(),
                    message: error.to_string(),
                })?;
        }

        let mut writer = serializer.for_writer(Vec::new());
        for triple in self.canonical_triples(store) {
            let rdf_triple = triple.to_rdf().ok_or_else(|| {
                Error::Serialize(format!("literal subject cannot be written: {triple}"))
            })?;
            writer
                .serialize_triple(&rdf_triple)
                .map_err(|error| Error::Serialize(error.to_string()))?;
        }
        writer
            .finish()
            .map_err(|error| Error::Serialize(error.to_string()))
    }

    pub fn serialize_to_string(
        &self,
        store: &TripleStore,
        namespaces: &NamespaceBindings,
    ) -> Result<String> {
        let bytes = self.serialize(store, namespaces)?;
        String::from_utf8(bytes).map_err(|error| Error::Serialize(error.to_string()))
    }

    /// Write canonical Turtle to `path`, creating parent directories
    pub fn write_to_path(
        &self,
        store: &TripleStore,
        namespaces: &NamespaceBindings,
        path: &Path,
    ) -> Result<()> {
        let bytes = self.serialize(store, namespaces)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::io(parent, source))?;
        }
        info!(path = %path.display(), triples = store.size(), "Writing {} triples", store.size());
        fs::write(path, bytes).map_err(|source| Error::io(path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_turtle;
    use assert_matches::assert_matches;
    use oxigraph::model::{Literal, NamedNode};

    const SOURCE: &str = r#"
@prefix ex: <http://example.org/> .
@prefix schema1: <http://schema.org/> .
@prefix schema: <https://schema.org/> .

ex:rex schema1:name "Rex" ;
    ex:tag [ ex:code "A1" ] ;
    a ex:Dog .
ex:alice ex:owns ex:rex .
"#;

    fn serializer() -> CanonicalSerializer {
        CanonicalSerializer::new(CanonicalConfig::default())
    }

    #[test]
    fn reserialization_is_byte_identical() {
        let document = parse_turtle(SOURCE, Path::new("source.ttl")).unwrap();
        let first = serializer()
            .serialize_to_string(&document.store, &document.namespaces)
            .unwrap();

        let reparsed = parse_turtle(&first, Path::new("first.ttl")).unwrap();
        let second = serializer()
            .serialize_to_string(&reparsed.store, &reparsed.namespaces)
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn reserved_prefix_replaces_aliases() {
        let document = parse_turtle(SOURCE, Path::new("source.ttl")).unwrap();
        let output = serializer()
            .serialize_to_string(&document.store, &document.namespaces)
            .unwrap();

        assert!(output.contains("@prefix schema: <http://schema.org/> ."));
        assert!(!output.contains("schema1:"));
        assert!(!output.contains("<https://schema.org/>"));
        assert!(output.contains("schema:name"));
    }

    #[test]
    fn subjects_are_written_in_order() {
        let document = parse_turtle(SOURCE, Path::new("source.ttl")).unwrap();
        let output = serializer()
            .serialize_to_string(&document.store, &document.namespaces)
            .unwrap();
        let alice = output.find("ex:alice").unwrap();
        let rex = output.find("ex:rex ").unwrap();
        assert!(alice < rex);
    }

    #[test]
    fn literal_subject_is_rejected() {
        let store = TripleStore::from_triples([Triple::new(
            Literal::new_simple_literal("Rex"),
            NamedNode::new("http://example.org/p").unwrap(),
            NamedNode::new("http://example.org/o").unwrap(),
        )]);
        let error = serializer()
            .serialize(&store, &NamespaceBindings::new())
            .unwrap_err();
        assert_matches!(error, Error::Serialize(_));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.ttl");
        let document = parse_turtle(SOURCE, Path::new("source.ttl")).unwrap();
        serializer()
            .write_to_path(&document.store, &document.namespaces, &path)
            .unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("ex:owns"));
    }
}
