//! Shape validation of RDF graphs
//!
//! - **SHACL validation** - node and property shapes with the SHACL core
//!   constraint components
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use rdf_materializer::ontology::ShapeValidator;
//!
//! let validator = ShapeValidator::from_store(&shapes.store)?;
//! let report = validator.validate(&data.store)?;
//! println!("Conforms: {}", report.conforms());
//! ```

pub mod shacl;

pub use shacl::{
    ConstraintChecker, Severity, ShapeLoader, ShapeValidator, ValidationReport, ValidationResult,
};
