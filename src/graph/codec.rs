//! Turtle codec backed by oxigraph's parsers.
//!
//! Parsing yields a [`Document`]: the triples plus the prefixes the document
//! declared. Blank nodes get fresh ids per document so that merging two
//! documents never conflates their blank nodes.

use super::store::TripleStore;
use super::triple::Triple;
use crate::canonical::NamespaceBindings;
use crate::error::{Error, Result};
use oxigraph::io::{RdfFormat, RdfParseError, RdfParser};
use std::fs;
use std::path::Path;

/// Parsed triple document
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub store: TripleStore,
    pub namespaces: NamespaceBindings,
}

impl Document {
    pub fn new(store: TripleStore, namespaces: NamespaceBindings) -> Self {
        Self { store, namespaces }
    }

    /// Set union of triples; namespace bindings from `other` win on clashes
    pub fn merge(&mut self, other: &Document) -> usize {
        self.namespaces.merge(&other.namespaces);
        self.store.merge(&other.store)
    }
}

/// Parse Turtle `content`; `source` names the document in errors
pub fn parse_turtle(content: &str, source: &Path) -> Result<Document> {
    let mut parser = RdfParser::from_format(RdfFormat::Turtle)
        .rename_blank_nodes()
        .for_reader(content.as_bytes());

    let mut store = TripleStore::new();
    for quad in parser.by_ref() {
        let quad = quad.map_err(|error| parse_error(source, error))?;
        store.add(Triple::from(quad));
    }

    let namespaces = parser
        .prefixes()
        .map(|(prefix, iri)| (prefix.to_owned(), iri.to_owned()))
        .collect();

    Ok(Document::new(store, namespaces))
}

/// Read and parse a Turtle file
pub fn load_turtle(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
    let document = parse_turtle(&content, path)?;
    tracing::debug!(
        path = %path.display(),
        triples = document.store.size(),
        "parsed document"
    );
    Ok(document)
}

fn parse_error(source: &Path, error: RdfParseError) -> Error {
    let line = match &error {
        RdfParseError::Syntax(syntax) => syntax.location().map(|range| range.start.line + 1),
        _ => None,
    };
    Error::Parse {
        path: source.to_path_buf(),
        line,
        message: error.to_string(),
    }
}
