//! SHACL (Shapes Constraint Language) Validation
//!
//! Validates a data graph against the node and property shapes of a shapes
//! graph. Covers the SHACL core targets and the value, cardinality, string
//! and range constraint components used by typical knowledge-graph shape
//! files.
//!
//! # Components
//!
//! - **ShapeValidator**: loads shapes and validates data graphs
//! - **ShapeLoader**: reads node and property shapes out of a shapes graph
//! - **ConstraintChecker**: evaluates property constraints for one focus node
//! - **ValidationReport**: conformance verdict plus individual results
//!
//! # Example
//!
//! ```rust,ignore
//! use rdf_materializer::ontology::ShapeValidator;
//!
//! let validator = ShapeValidator::from_store(&shapes.store)?;
//! let report = validator.validate(&data.store)?;
//! if !report.conforms() {
//!     println!("{}", report.render_text());
//! }
//! ```

use crate::error::{Error, Result};
use crate::graph::{SH_NS, TripleStore, parse_turtle, rdf, rdfs};
use indexmap::IndexSet;
use oxigraph::model::{
    GraphNameRef, NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, QuadRef, Term,
    TermRef,
};
use oxigraph::store::Store;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::Path;

// =============================================================================
// Vocabulary
// =============================================================================

mod sh {
    use oxigraph::model::NamedNodeRef;

    macro_rules! sh_terms {
        ($($name:ident = $local:literal),* $(,)?) => {
            $(pub const $name: NamedNodeRef<'static> =
                NamedNodeRef::new_unchecked(concat!("http://www.w3.org/ns/shacl#", $local));)*
        };
    }

    sh_terms! {
        NODE_SHAPE = "NodeShape",
        PROPERTY = "property",
        PATH = "path",
        INVERSE_PATH = "inversePath",
        TARGET_CLASS = "targetClass",
        TARGET_NODE = "targetNode",
        TARGET_SUBJECTS_OF = "targetSubjectsOf",
        TARGET_OBJECTS_OF = "targetObjectsOf",
        SEVERITY = "severity",
        MESSAGE = "message",
        DEACTIVATED = "deactivated",
        DATATYPE = "datatype",
        CLASS = "class",
        NODE_KIND = "nodeKind",
        MIN_COUNT = "minCount",
        MAX_COUNT = "maxCount",
        PATTERN = "pattern",
        FLAGS = "flags",
        MIN_LENGTH = "minLength",
        MAX_LENGTH = "maxLength",
        MIN_INCLUSIVE = "minInclusive",
        MAX_INCLUSIVE = "maxInclusive",
        IN = "in",
        HAS_VALUE = "hasValue",
        UNIQUE_LANG = "uniqueLang",
    }
}

// =============================================================================
// Severity Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Violation,
}

impl Severity {
    pub fn from_iri(iri: NamedNodeRef<'_>) -> Self {
        match iri.as_str().strip_prefix(SH_NS) {
            Some("Info") => Severity::Info,
            Some("Warning") => Severity::Warning,
            _ => Severity::Violation,
        }
    }

    pub fn to_iri(&self) -> NamedNode {
        NamedNode::new_unchecked(format!("{SH_NS}{self:?}"))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sh:{self:?}")
    }
}

// =============================================================================
// Validation Result
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The node that caused the violation
    focus_node: String,
    result_path: Option<String>,
    /// The value that violated the constraint
    value: Option<String>,
    message: String,
    severity: Severity,
    source_shape: String,
    /// Constraint component, e.g. `sh:minCount`
    source_constraint: Option<String>,
}

impl ValidationResult {
    pub fn new(focus_node: String, message: String, severity: Severity, source_shape: String) -> Self {
        Self {
            focus_node,
            result_path: None,
            value: None,
            message,
            severity,
            source_shape,
            source_constraint: None,
        }
    }

    pub fn with_path(mut self, path: String) -> Self {
        self.result_path = Some(path);
        self
    }

    pub fn with_value(mut self, value: String) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_constraint(mut self, constraint: String) -> Self {
        self.source_constraint = Some(constraint);
        self
    }

    pub fn focus_node(&self) -> &str {
        &self.focus_node
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn source_shape(&self) -> &str {
        &self.source_shape
    }

    pub fn source_constraint(&self) -> Option<&str> {
        self.source_constraint.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

// =============================================================================
// Validation Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    results: Vec<ValidationResult>,
    conforms: bool,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            conforms: true,
        }
    }

    /// Any result, whatever its severity, makes the graph non-conforming
    pub fn add_result(&mut self, result: ValidationResult) {
        self.conforms = false;
        self.results.push(result);
    }

    pub fn conforms(&self) -> bool {
        self.conforms
    }

    pub fn results(&self) -> &[ValidationResult] {
        &self.results
    }

    pub fn violations(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::Violation)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::Warning)
    }

    pub fn violation_count(&self) -> usize {
        self.violations().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialize(e.to_string()))
    }

    /// Human-readable report
    pub fn render_text(&self) -> String {
        let mut text = String::from("Validation Report\n");
        text.push_str(&format!(
            "Conforms: {}\n",
            if self.conforms { "True" } else { "False" }
        ));
        if self.results.is_empty() {
            return text;
        }
        text.push_str(&format!("Results ({}):\n", self.results.len()));
        for result in &self.results {
            text.push_str(&format!(
                "Constraint {} in {}:\n",
                result.severity,
                result.source_constraint.as_deref().unwrap_or("shape")
            ));
            text.push_str(&format!("\tSeverity: {}\n", result.severity));
            text.push_str(&format!("\tSource Shape: {}\n", result.source_shape));
            text.push_str(&format!("\tFocus Node: {}\n", result.focus_node));
            if let Some(path) = &result.result_path {
                text.push_str(&format!("\tResult Path: {path}\n"));
            }
            if let Some(value) = &result.value {
                text.push_str(&format!("\tValue Node: {value}\n"));
            }
            text.push_str(&format!("\tMessage: {}\n", result.message));
        }
        text
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Shapes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum PropertyPath {
    Predicate(NamedNode),
    Inverse(NamedNode),
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyPath::Predicate(predicate) => write!(f, "{predicate}"),
            PropertyPath::Inverse(predicate) => write!(f, "^{predicate}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Iri,
    BlankNode,
    Literal,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    fn from_iri(iri: NamedNodeRef<'_>) -> Option<Self> {
        Some(match iri.as_str().strip_prefix(SH_NS)? {
            "IRI" => NodeKind::Iri,
            "BlankNode" => NodeKind::BlankNode,
            "Literal" => NodeKind::Literal,
            "BlankNodeOrIRI" => NodeKind::BlankNodeOrIri,
            "BlankNodeOrLiteral" => NodeKind::BlankNodeOrLiteral,
            "IRIOrLiteral" => NodeKind::IriOrLiteral,
            _ => return None,
        })
    }

    fn matches(self, term: &Term) -> bool {
        let (iri, blank, literal) = (term.is_named_node(), term.is_blank_node(), term.is_literal());
        match self {
            NodeKind::Iri => iri,
            NodeKind::BlankNode => blank,
            NodeKind::Literal => literal,
            NodeKind::BlankNodeOrIri => blank || iri,
            NodeKind::BlankNodeOrLiteral => blank || literal,
            NodeKind::IriOrLiteral => iri || literal,
        }
    }
}

#[derive(Debug, Clone)]
struct PropertyShape {
    id: String,
    path: PropertyPath,
    datatype: Option<NamedNode>,
    classes: Vec<NamedNode>,
    node_kind: Option<NodeKind>,
    min_count: Option<usize>,
    max_count: Option<usize>,
    pattern: Option<Regex>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    min_inclusive: Option<f64>,
    max_inclusive: Option<f64>,
    in_values: Option<Vec<Term>>,
    has_values: Vec<Term>,
    unique_lang: bool,
    message: Option<String>,
    severity: Option<Severity>,
    deactivated: bool,
}

#[derive(Debug, Clone, Default)]
struct Targets {
    classes: Vec<NamedNode>,
    nodes: Vec<Term>,
    subjects_of: Vec<NamedNode>,
    objects_of: Vec<NamedNode>,
}

#[derive(Debug, Clone)]
struct NodeShape {
    id: String,
    targets: Targets,
    properties: Vec<PropertyShape>,
    severity: Severity,
    deactivated: bool,
}

// =============================================================================
// Shape Loading
// =============================================================================

pub struct ShapeLoader<'a> {
    shapes_store: &'a Store,
}

impl<'a> ShapeLoader<'a> {
    pub fn new(shapes_store: &'a Store) -> Self {
        Self { shapes_store }
    }

    /// Explicit `sh:NodeShape`s plus every subject carrying a target or property
    fn load_all_node_shapes(&self) -> Result<Vec<NodeShape>> {
        let mut ids: IndexSet<NamedOrBlankNode> = IndexSet::new();
        for subject in subjects(self.shapes_store, rdf::TYPE, sh::NODE_SHAPE.into())? {
            ids.insert(subject);
        }
        for predicate in [
            sh::TARGET_CLASS,
            sh::TARGET_NODE,
            sh::TARGET_SUBJECTS_OF,
            sh::TARGET_OBJECTS_OF,
            sh::PROPERTY,
        ] {
            for quad in self.shapes_store.quads_for_pattern(None, Some(predicate), None, None) {
                ids.insert(quad.map_err(storage_error)?.subject);
            }
        }

        ids.iter().map(|id| self.load_node_shape(id.as_ref())).collect()
    }

    fn load_node_shape(&self, shape_id: NamedOrBlankNodeRef<'_>) -> Result<NodeShape> {
        let mut targets = Targets {
            classes: self.named_node_values(shape_id, sh::TARGET_CLASS)?,
            nodes: self.objects(shape_id, sh::TARGET_NODE)?,
            subjects_of: self.named_node_values(shape_id, sh::TARGET_SUBJECTS_OF)?,
            objects_of: self.named_node_values(shape_id, sh::TARGET_OBJECTS_OF)?,
        };

        // Implicit class target: the shape is itself a class
        if let NamedOrBlankNodeRef::NamedNode(named) = shape_id {
            let is_class = self.shapes_store.contains(QuadRef::new(
                named,
                rdf::TYPE,
                rdfs::CLASS,
                GraphNameRef::DefaultGraph,
            ));
            if is_class.map_err(storage_error)? {
                targets.classes.push(named.into_owned());
            }
        }

        let mut properties = Vec::new();
        for property in self.objects(shape_id, sh::PROPERTY)? {
            if let Some(id) = as_subject(&property) {
                if let Some(shape) = self.load_property_shape(id)? {
                    properties.push(shape);
                }
            }
        }

        Ok(NodeShape {
            id: shape_id.to_string(),
            targets,
            properties,
            severity: self
                .named_node_value(shape_id, sh::SEVERITY)?
                .map(|iri| Severity::from_iri(iri.as_ref()))
                .unwrap_or(Severity::Violation),
            deactivated: self.boolean_value(shape_id, sh::DEACTIVATED)?.unwrap_or(false),
        })
    }

    fn load_property_shape(&self, prop_id: NamedOrBlankNodeRef<'_>) -> Result<Option<PropertyShape>> {
        let path = match self.object(prop_id, sh::PATH)? {
            Some(Term::NamedNode(predicate)) => PropertyPath::Predicate(predicate),
            Some(Term::BlankNode(node)) => {
                match self.named_node_value(node.as_ref().into(), sh::INVERSE_PATH)? {
                    Some(predicate) => PropertyPath::Inverse(predicate),
                    None => return Ok(None),
                }
            }
            _ => return Ok(None),
        };

        let pattern = match self.string_value(prop_id, sh::PATTERN)? {
            Some(pattern) => {
                let flags = self.string_value(prop_id, sh::FLAGS)?.unwrap_or_default();
                Some(compile_pattern(&pattern, &flags)?)
            }
            None => None,
        };

        let in_values = match self.object(prop_id, sh::IN)? {
            Some(head) => Some(self.parse_rdf_list(&head)?),
            None => None,
        };

        Ok(Some(PropertyShape {
            id: prop_id.to_string(),
            path,
            datatype: self.named_node_value(prop_id, sh::DATATYPE)?,
            classes: self.named_node_values(prop_id, sh::CLASS)?,
            node_kind: self
                .named_node_value(prop_id, sh::NODE_KIND)?
                .and_then(|iri| NodeKind::from_iri(iri.as_ref())),
            min_count: self.integer_value(prop_id, sh::MIN_COUNT)?,
            max_count: self.integer_value(prop_id, sh::MAX_COUNT)?,
            pattern,
            min_length: self.integer_value(prop_id, sh::MIN_LENGTH)?,
            max_length: self.integer_value(prop_id, sh::MAX_LENGTH)?,
            min_inclusive: self.number_value(prop_id, sh::MIN_INCLUSIVE)?,
            max_inclusive: self.number_value(prop_id, sh::MAX_INCLUSIVE)?,
            in_values,
            has_values: self.objects(prop_id, sh::HAS_VALUE)?,
            unique_lang: self.boolean_value(prop_id, sh::UNIQUE_LANG)?.unwrap_or(false),
            message: self.string_value(prop_id, sh::MESSAGE)?,
            severity: self
                .named_node_value(prop_id, sh::SEVERITY)?
                .map(|iri| Severity::from_iri(iri.as_ref())),
            deactivated: self.boolean_value(prop_id, sh::DEACTIVATED)?.unwrap_or(false),
        }))
    }

    fn objects(&self, subject: NamedOrBlankNodeRef<'_>, predicate: NamedNodeRef<'_>) -> Result<Vec<Term>> {
        objects(self.shapes_store, subject, predicate)
    }

    fn object(&self, subject: NamedOrBlankNodeRef<'_>, predicate: NamedNodeRef<'_>) -> Result<Option<Term>> {
        Ok(self.objects(subject, predicate)?.into_iter().next())
    }

    fn named_node_value(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Option<NamedNode>> {
        Ok(self.named_node_values(subject, predicate)?.into_iter().next())
    }

    fn named_node_values(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Vec<NamedNode>> {
        Ok(self
            .objects(subject, predicate)?
            .into_iter()
            .filter_map(|term| match term {
                Term::NamedNode(node) => Some(node),
                _ => None,
            })
            .collect())
    }

    fn string_value(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Option<String>> {
        Ok(self
            .objects(subject, predicate)?
            .into_iter()
            .find_map(|term| match term {
                Term::Literal(literal) => Some(literal.value().to_string()),
                _ => None,
            }))
    }

    fn integer_value(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Option<usize>> {
        self.parsed_value(subject, predicate)
    }

    fn number_value(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Option<f64>> {
        self.parsed_value(subject, predicate)
    }

    fn boolean_value(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Option<bool>> {
        self.parsed_value(subject, predicate)
    }

    fn parsed_value<T: std::str::FromStr>(
        &self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Result<Option<T>> {
        match self.string_value(subject, predicate)? {
            Some(text) => text.trim().parse::<T>().map(Some).map_err(|_| {
                Error::Shape(format!("{subject}: invalid value {text:?} for {predicate}"))
            }),
            None => Ok(None),
        }
    }

    fn parse_rdf_list(&self, head: &Term) -> Result<Vec<Term>> {
        let mut values = Vec::new();
        let mut visited = HashSet::new();
        let mut current = head.clone();

        while let Some(node) = as_subject(&current) {
            let is_nil = matches!(node, NamedOrBlankNodeRef::NamedNode(n) if n == rdf::NIL);
            if is_nil || !visited.insert(node.into_owned()) {
                break;
            }
            if let Some(first) = self.object(node, rdf::FIRST)? {
                values.push(first);
            }
            match self.object(node, rdf::REST)? {
                Some(rest) => current = rest,
                None => break,
            }
        }

        Ok(values)
    }
}

fn compile_pattern(pattern: &str, flags: &str) -> Result<Regex> {
    let inline: String = flags.chars().filter(|c| "imsx".contains(*c)).collect();
    let source = if inline.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{inline}){pattern}")
    };
    Regex::new(&source).map_err(|e| Error::Shape(format!("invalid sh:pattern {pattern:?}: {e}")))
}

// =============================================================================
// Constraint Checker
// =============================================================================

pub struct ConstraintChecker<'a> {
    data_store: &'a Store,
}

impl<'a> ConstraintChecker<'a> {
    pub fn new(data_store: &'a Store) -> Self {
        Self { data_store }
    }

    /// Check all constraints of `property` for one focus node
    fn check_property(
        &self,
        focus_node: &Term,
        property: &PropertyShape,
        shape: &NodeShape,
    ) -> Result<Vec<ValidationResult>> {
        let values = self.path_values(focus_node, &property.path)?;
        let report = Reporter {
            focus_node,
            property,
            severity: property.severity.unwrap_or(shape.severity),
        };
        let mut results = Vec::new();

        if let Some(min_count) = property.min_count {
            if values.len() < min_count {
                results.push(report.result(
                    "sh:minCount",
                    None,
                    format!("Less than {min_count} values on {}", property.path),
                ));
            }
        }

        if let Some(max_count) = property.max_count {
            if values.len() > max_count {
                results.push(report.result(
                    "sh:maxCount",
                    None,
                    format!("More than {max_count} values on {}", property.path),
                ));
            }
        }

        for value in &values {
            self.check_value(value, property, &report, &mut results)?;
        }

        for expected in &property.has_values {
            if !values.contains(expected) {
                results.push(report.result(
                    "sh:hasValue",
                    None,
                    format!("Missing expected value {expected}"),
                ));
            }
        }

        if property.unique_lang {
            let mut seen_langs = HashSet::new();
            let mut reported = HashSet::new();
            for value in &values {
                if let Term::Literal(lit) = value {
                    if let Some(lang) = lit.language() {
                        if !seen_langs.insert(lang) && reported.insert(lang) {
                            results.push(report.result(
                                "sh:uniqueLang",
                                None,
                                format!("Language \"{lang}\" used more than once"),
                            ));
                        }
                    }
                }
            }
        }

        Ok(results)
    }

    fn check_value(
        &self,
        value: &Term,
        property: &PropertyShape,
        report: &Reporter<'_>,
        results: &mut Vec<ValidationResult>,
    ) -> Result<()> {
        if let Some(expected) = &property.datatype {
            let matches = matches!(value, Term::Literal(lit) if lit.datatype() == expected.as_ref());
            if !matches {
                results.push(report.result(
                    "sh:datatype",
                    Some(value),
                    format!("Value does not have datatype {expected}"),
                ));
            }
        }

        for class in &property.classes {
            if !self.is_instance_of(value, class)? {
                results.push(report.result(
                    "sh:class",
                    Some(value),
                    format!("Value does not have class {class}"),
                ));
            }
        }

        if let Some(kind) = property.node_kind {
            if !kind.matches(value) {
                results.push(report.result(
                    "sh:nodeKind",
                    Some(value),
                    format!("Value is not of node kind {kind:?}"),
                ));
            }
        }

        let text = match value {
            Term::Literal(lit) => Some(lit.value()),
            Term::NamedNode(node) => Some(node.as_str()),
            _ => None,
        };

        if let Some(pattern) = &property.pattern {
            if !text.is_some_and(|text| pattern.is_match(text)) {
                results.push(report.result(
                    "sh:pattern",
                    Some(value),
                    format!("Value does not match pattern \"{}\"", pattern.as_str()),
                ));
            }
        }

        if let Some(min_length) = property.min_length {
            if !text.is_some_and(|text| text.chars().count() >= min_length) {
                results.push(report.result(
                    "sh:minLength",
                    Some(value),
                    format!("Value has less than {min_length} characters"),
                ));
            }
        }

        if let Some(max_length) = property.max_length {
            if !text.is_some_and(|text| text.chars().count() <= max_length) {
                results.push(report.result(
                    "sh:maxLength",
                    Some(value),
                    format!("Value has more than {max_length} characters"),
                ));
            }
        }

        let number = match value {
            Term::Literal(lit) => lit.value().trim().parse::<f64>().ok(),
            _ => None,
        };

        if let Some(min) = property.min_inclusive {
            if !number.is_some_and(|n| n >= min) {
                results.push(report.result(
                    "sh:minInclusive",
                    Some(value),
                    format!("Value is not >= {min}"),
                ));
            }
        }

        if let Some(max) = property.max_inclusive {
            if !number.is_some_and(|n| n <= max) {
                results.push(report.result(
                    "sh:maxInclusive",
                    Some(value),
                    format!("Value is not <= {max}"),
                ));
            }
        }

        if let Some(allowed) = &property.in_values {
            if !allowed.contains(value) {
                let listed: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
                results.push(report.result(
                    "sh:in",
                    Some(value),
                    format!("Value is not in {}", listed.join(", ")),
                ));
            }
        }

        Ok(())
    }

    fn path_values(&self, focus_node: &Term, path: &PropertyPath) -> Result<Vec<Term>> {
        match path {
            PropertyPath::Predicate(predicate) => match as_subject(focus_node) {
                Some(subject) => objects(self.data_store, subject, predicate.as_ref()),
                None => Ok(Vec::new()),
            },
            PropertyPath::Inverse(predicate) => Ok(subjects(
                self.data_store,
                predicate.as_ref(),
                focus_node.as_ref(),
            )?
            .into_iter()
            .map(Term::from)
            .collect()),
        }
    }

    /// `value rdf:type/rdfs:subClassOf* class`
    fn is_instance_of(&self, value: &Term, class: &NamedNode) -> Result<bool> {
        let Some(subject) = as_subject(value) else {
            return Ok(false);
        };
        let mut queue: VecDeque<Term> = objects(self.data_store, subject, rdf::TYPE)?.into();
        let mut visited = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if let Term::NamedNode(node) = &current {
                if node == class {
                    return Ok(true);
                }
            }
            if let Some(node) = as_subject(&current) {
                if visited.insert(node.into_owned()) {
                    queue.extend(objects(self.data_store, node, rdfs::SUB_CLASS_OF)?);
                }
            }
        }
        Ok(false)
    }
}

/// Builds results for one focus node and property shape
struct Reporter<'a> {
    focus_node: &'a Term,
    property: &'a PropertyShape,
    severity: Severity,
}

impl Reporter<'_> {
    fn result(&self, constraint: &str, value: Option<&Term>, default_message: String) -> ValidationResult {
        let message = self.property.message.clone().unwrap_or(default_message);
        let result = ValidationResult::new(
            self.focus_node.to_string(),
            message,
            self.severity,
            self.property.id.clone(),
        )
        .with_path(self.property.path.to_string())
        .with_constraint(constraint.to_string());
        match value {
            Some(value) => result.with_value(value.to_string()),
            None => result,
        }
    }
}

// =============================================================================
// Shape Validator
// =============================================================================

pub struct ShapeValidator {
    shapes: Vec<NodeShape>,
}

impl ShapeValidator {
    pub fn from_store(shapes: &TripleStore) -> Result<Self> {
        let shapes_store = to_oxigraph(shapes)?;
        let shapes = ShapeLoader::new(&shapes_store).load_all_node_shapes()?;
        tracing::debug!(shapes = shapes.len(), "loaded node shapes");
        Ok(Self { shapes })
    }

    pub fn from_turtle(turtle: &str) -> Result<Self> {
        let document = parse_turtle(turtle, Path::new("<shapes>"))?;
        Self::from_store(&document.store)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Validate a data graph against all shapes
    pub fn validate(&self, data: &TripleStore) -> Result<ValidationReport> {
        let data_store = to_oxigraph(data)?;
        let checker = ConstraintChecker::new(&data_store);
        let mut report = ValidationReport::new();

        for shape in self.shapes.iter().filter(|shape| !shape.deactivated) {
            for focus_node in self.focus_nodes(shape, &data_store)? {
                for property in shape.properties.iter().filter(|p| !p.deactivated) {
                    for result in checker.check_property(&focus_node, property, shape)? {
                        report.add_result(result);
                    }
                }
            }
        }

        tracing::info!(
            conforms = report.conforms(),
            results = report.results().len(),
            "shape validation finished"
        );
        Ok(report)
    }

    fn focus_nodes(&self, shape: &NodeShape, data: &Store) -> Result<IndexSet<Term>> {
        let mut focus: IndexSet<Term> = shape.targets.nodes.iter().cloned().collect();

        for class in &shape.targets.classes {
            for subclass in subclasses(data, class)? {
                for instance in subjects(data, rdf::TYPE, subclass.as_ref().into())? {
                    focus.insert(instance.into());
                }
            }
        }
        for predicate in &shape.targets.subjects_of {
            for quad in data.quads_for_pattern(None, Some(predicate.as_ref()), None, None) {
                focus.insert(quad.map_err(storage_error)?.subject.into());
            }
        }
        for predicate in &shape.targets.objects_of {
            for quad in data.quads_for_pattern(None, Some(predicate.as_ref()), None, None) {
                focus.insert(quad.map_err(storage_error)?.object);
            }
        }

        Ok(focus)
    }
}

// =============================================================================
// Store helpers
// =============================================================================

fn to_oxigraph(triples: &TripleStore) -> Result<Store> {
    let store = Store::new().map_err(storage_error)?;
    for quad in triples.iter().filter_map(|triple| triple.to_quad()) {
        store.insert(&quad).map_err(storage_error)?;
    }
    Ok(store)
}

fn as_subject(term: &Term) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        Term::NamedNode(node) => Some(node.as_ref().into()),
        Term::BlankNode(node) => Some(node.as_ref().into()),
        _ => None,
    }
}

fn objects(store: &Store, subject: NamedOrBlankNodeRef<'_>, predicate: NamedNodeRef<'_>) -> Result<Vec<Term>> {
    store
        .quads_for_pattern(Some(subject), Some(predicate), None, None)
        .map(|quad| quad.map(|q| q.object).map_err(storage_error))
        .collect()
}

fn subjects(store: &Store, predicate: NamedNodeRef<'_>, object: TermRef<'_>) -> Result<Vec<NamedOrBlankNode>> {
    store
        .quads_for_pattern(None, Some(predicate), Some(object), None)
        .map(|quad| quad.map(|q| q.subject).map_err(storage_error))
        .collect()
}

/// `class` and everything reaching it through `rdfs:subClassOf*`
fn subclasses(store: &Store, class: &NamedNode) -> Result<IndexSet<NamedNode>> {
    let mut found = IndexSet::new();
    let mut queue = VecDeque::from([class.clone()]);
    while let Some(current) = queue.pop_front() {
        if !found.insert(current.clone()) {
            continue;
        }
        for subject in subjects(store, rdfs::SUB_CLASS_OF, current.as_ref().into())? {
            if let NamedOrBlankNode::NamedNode(subclass) = subject {
                queue.push_back(subclass);
            }
        }
    }
    Ok(found)
}

fn storage_error(error: impl fmt::Display) -> Error {
    Error::Storage(error.to_string())
}
