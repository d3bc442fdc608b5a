//! Triples, the in-memory triple store, diffs and the Turtle codec

pub mod codec;
pub mod diff;
pub mod store;
pub mod triple;

pub use codec::{Document, load_turtle, parse_turtle};
pub use diff::{DiffStats, GraphDiff};
pub use store::{StoreSnapshot, TripleStore};
pub use triple::{SH_NS, Triple, owl, rdf, rdfs, xsd};
