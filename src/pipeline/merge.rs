use super::{CommandOutcome, Pipeline};
use anyhow::Result;
use std::path::{Path, PathBuf};

impl Pipeline {
    /// Merge `inputs` into one canonically sorted `output`
    pub fn merge(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        rewrite_inputs: bool,
    ) -> Result<CommandOutcome> {
        anyhow::ensure!(!inputs.is_empty(), "at least one input file is required");
        let paths = inputs.iter().map(PathBuf::as_path).collect::<Vec<_>>();
        let merged = self.load_merged(&paths, rewrite_inputs)?;
        self.write(&merged, output)?;
        Ok(CommandOutcome::Success)
    }

    /// Canonicalize `file` in place
    pub fn sort(&self, file: &Path) -> Result<CommandOutcome> {
        let document = self.load(file)?;
        self.write(&document, file)?;
        Ok(CommandOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaterializerConfig;
    use std::fs;

    fn pipeline() -> Pipeline {
        Pipeline::new(MaterializerConfig::default())
    }

    #[test]
    fn merge_writes_union_and_leaves_inputs_alone() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.ttl");
        let b = dir.path().join("b.ttl");
        let a_text = "@prefix ex: <http://example.org/> .\nex:b ex:p ex:c .\n";
        fs::write(&a, a_text).unwrap();
        fs::write(&b, "<http://example.org/a> <http://example.org/p> <http://example.org/b> .\n")
            .unwrap();
        let output = dir.path().join("out/graph.ttl");

        let outcome = pipeline()
            .merge(&[a.clone(), b.clone()], &output, false)
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Success);
        let written = fs::read_to_string(&output).unwrap();
        let first = written.find("ex:a ex:p").unwrap();
        let second = written.find("ex:b ex:p").unwrap();
        assert!(first < second);
        assert_eq!(fs::read_to_string(&a).unwrap(), a_text);
    }

    #[test]
    fn rewrite_inputs_canonicalizes_each_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.ttl");
        fs::write(
            &a,
            "@prefix ex: <http://example.org/> .\nex:z ex:p ex:y .\nex:a ex:p ex:b .\n",
        )
        .unwrap();
        let output = dir.path().join("graph.ttl");

        pipeline().merge(&[a.clone()], &output, true).unwrap();

        assert_eq!(
            fs::read_to_string(&a).unwrap(),
            fs::read_to_string(&output).unwrap()
        );
    }

    #[test]
    fn unparsable_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.ttl");
        fs::write(&a, "this is not turtle").unwrap();
        let result = pipeline().merge(&[a], &dir.path().join("out.ttl"), false);
        assert!(result.is_err());
        assert!(!dir.path().join("out.ttl").exists());
    }

    #[test]
    fn sort_is_stable_on_second_run() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.ttl");
        fs::write(
            &file,
            "@prefix schema1: <http://schema.org/> .\n<http://example.org/b> schema1:name \"B\" .\n<http://example.org/a> schema1:name \"A\" .\n",
        )
        .unwrap();

        pipeline().sort(&file).unwrap();
        let first = fs::read_to_string(&file).unwrap();
        pipeline().sort(&file).unwrap();
        let second = fs::read_to_string(&file).unwrap();

        assert_eq!(first, second);
        assert!(first.contains("@prefix schema: <http://schema.org/>"));
        assert!(!first.contains("schema1:"));
    }
}
