use super::{CommandOutcome, Pipeline};
use crate::annotations::Annotation;
use crate::error::Error;
use crate::graph::parse_turtle;
use crate::ontology::ShapeValidator;
use crate::reasoning::{FixpointEngine, ReasoningConfig, SchemaExtractor};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Outcome of a batch syntax check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxReport {
    pub checked: Vec<PathBuf>,
    pub failures: Vec<Annotation>,
}

impl SyntaxReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Turtle files under `root`, sorted by path
fn turtle_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to scan {}", root.display()))?;
        let is_turtle = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ttl"));
        if entry.file_type().is_file() && is_turtle {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn check_file(path: &Path) -> Option<Annotation> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => return Some(Annotation::syntax_error(path, None, &error.to_string())),
    };
    match parse_turtle(&content, path) {
        Ok(document) => {
            debug!(path = %path.display(), triples = document.store.size(), "valid");
            None
        }
        Err(error) => {
            warn!(path = %path.display(), category = error.category(), error = %error, "syntax error");
            let message = match &error {
                Error::Parse { message, .. } => message.clone(),
                other => other.to_string(),
            };
            Some(Annotation::syntax_error(path, error.line(), &message))
        }
    }
}

impl Pipeline {
    /// Parse every `*.ttl` under `root`, printing progress and a CI
    /// annotation per failure. Scanning continues past failures.
    pub fn validate_syntax(
        &self,
        root: &Path,
        recursive: bool,
        out: &mut impl Write,
    ) -> Result<CommandOutcome> {
        anyhow::ensure!(root.is_dir(), "{} is not a directory", root.display());

        let files = turtle_files(root, recursive)?;
        if files.is_empty() {
            writeln!(out, "No Turtle files found in '{}'.", root.display())?;
            return Ok(CommandOutcome::Success);
        }

        let mut report = SyntaxReport::default();
        for file in files {
            writeln!(out, "Validating {}...", file.display())?;
            if let Some(annotation) = check_file(&file) {
                writeln!(out, "{annotation}")?;
                report.failures.push(annotation);
            }
            report.checked.push(file);
        }

        if report.is_valid() {
            writeln!(out, "All Turtle files are valid!")?;
        } else {
            writeln!(out, "Some Turtle files have syntax errors.")?;
        }
        Ok(CommandOutcome::from_success(report.is_valid()))
    }

    /// Validate `data` against the SHACL shapes in `shapes`.
    ///
    /// With `infer`, the data graph is first closed under the structural
    /// rules using the schema it carries itself.
    pub fn validate_shape(
        &self,
        data: &Path,
        shapes: &Path,
        infer: bool,
        out: &mut impl Write,
    ) -> Result<CommandOutcome> {
        let mut data_graph = self.load(data)?;
        let shapes_graph = self.load(shapes)?;

        if infer {
            let metadata = SchemaExtractor::extract(&data_graph.store);
            let reasoning = ReasoningConfig {
                structural_rules: true,
                ..self.config.reasoning.clone()
            };
            FixpointEngine::new(metadata, &reasoning)
                .context("invalid reasoning configuration")?
                .run(&mut data_graph.store)
                .context("inference before validation did not converge")?;
        }

        let validator = ShapeValidator::from_store(&shapes_graph.store)
            .with_context(|| format!("failed to read shapes from {}", shapes.display()))?;
        let report = validator
            .validate(&data_graph.store)
            .context("shape validation failed to run")?;

        writeln!(out, "Conforms: {}", report.conforms())?;
        if !report.conforms() {
            writeln!(out, "{}", report.render_text())?;
        }
        Ok(CommandOutcome::from_success(report.conforms()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaterializerConfig;

    fn pipeline() -> Pipeline {
        Pipeline::new(MaterializerConfig::default())
    }

    #[test]
    fn collects_every_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ttl"), "<http://e/a> <http://e/p> <http://e/b> .").unwrap();
        fs::write(dir.path().join("b.ttl"), "<http://e/a> <http://e/p> .").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.ttl"), "@prefix broken").unwrap();
        fs::write(dir.path().join("notes.txt"), "not turtle").unwrap();

        let mut out = Vec::new();
        let outcome = pipeline()
            .validate_syntax(dir.path(), true, &mut out)
            .unwrap();
        let printed = String::from_utf8(out).unwrap();

        assert_eq!(outcome, CommandOutcome::Failure);
        assert_eq!(printed.matches("Validating ").count(), 3);
        assert_eq!(printed.matches("::error file=").count(), 2);
        assert!(printed.contains("Some Turtle files have syntax errors."));
    }

    #[test]
    fn non_recursive_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ttl"), "<http://e/a> <http://e/p> <http://e/b> .").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.ttl"), "@prefix broken").unwrap();

        let mut out = Vec::new();
        let outcome = pipeline()
            .validate_syntax(dir.path(), false, &mut out)
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Success);
        assert!(String::from_utf8(out).unwrap().contains("All Turtle files are valid!"));
    }

    #[test]
    fn empty_directory_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let outcome = pipeline()
            .validate_syntax(dir.path(), true, &mut out)
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Success);
        assert!(String::from_utf8(out).unwrap().starts_with("No Turtle files found"));
    }

    #[test]
    fn file_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ttl");
        fs::write(&file, "").unwrap();
        assert!(pipeline().validate_syntax(&file, true, &mut Vec::new()).is_err());
    }

    const SHAPES: &str = r#"
@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.org/> .

ex:AnimalShape a sh:NodeShape ;
    sh:targetClass ex:Animal ;
    sh:property [ sh:path ex:name ; sh:minCount 1 ] .
"#;

    #[test]
    fn inference_exposes_entailed_instances_to_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("graph.ttl");
        let shapes = dir.path().join("shape.ttl");
        fs::write(
            &data,
            "@prefix ex: <http://example.org/> .\n\
             @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
             ex:owns rdfs:range ex:Animal .\n\
             ex:alice ex:owns ex:rex .\n",
        )
        .unwrap();
        fs::write(&shapes, SHAPES).unwrap();

        let mut plain = Vec::new();
        let outcome = pipeline()
            .validate_shape(&data, &shapes, false, &mut plain)
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Success);

        let mut inferred = Vec::new();
        let outcome = pipeline()
            .validate_shape(&data, &shapes, true, &mut inferred)
            .unwrap();
        let printed = String::from_utf8(inferred).unwrap();

        assert_eq!(outcome, CommandOutcome::Failure);
        assert!(printed.starts_with("Conforms: false\n"));
        assert!(printed.contains("Validation Report"));
    }

    #[test]
    fn conforming_graph_prints_true_only() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("graph.ttl");
        let shapes = dir.path().join("shape.ttl");
        fs::write(
            &data,
            "@prefix ex: <http://example.org/> .\nex:rex a ex:Animal ; ex:name \"Rex\" .\n",
        )
        .unwrap();
        fs::write(&shapes, SHAPES).unwrap();

        let mut out = Vec::new();
        let outcome = pipeline()
            .validate_shape(&data, &shapes, false, &mut out)
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Success);
        assert_eq!(String::from_utf8(out).unwrap(), "Conforms: true\n");
    }
}
