//! CI failure annotations.
//!
//! Syntax errors are printed as GitHub Actions workflow commands so the CI
//! run surfaces them inline on the offending file:
//!
//! ```text
//! ::error file=rdf/data.ttl,line=3::Syntax error in rdf/data.ttl: unexpected end of file
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

/// A single `::error` workflow command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub file: PathBuf,
    pub line: u64,
    pub message: String,
}

impl Annotation {
    /// Line defaults to 1 when the parser did not report one
    pub fn syntax_error(file: &Path, line: Option<u64>, message: &str) -> Self {
        Self {
            file: file.to_path_buf(),
            line: line.unwrap_or(1).max(1),
            message: format!("Syntax error in {}: {message}", file.display()),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file.display().to_string();
        write!(
            f,
            "::error file={},line={}::{}",
            escape_property(&file),
            self.line,
            escape_data(&self.message)
        )
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
