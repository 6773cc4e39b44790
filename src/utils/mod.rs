//! Utilities (source file loading, unicode helpers).

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

pub mod unicode;

/// Read a source file for the editor, with readable errors for the usual
/// mistakes (missing path, directory instead of file).
pub fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("Source file '{}' does not exist", path.display());
    }
    if !path.is_file() {
        bail!("'{}' is not a file", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_source_reports_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(dir.path()).unwrap_err();
        assert!(err.to_string().contains("is not a file"));
    }

    #[test]
    fn read_source_returns_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        fs::write(&path, "print('hi')\n").unwrap();
        assert_eq!(read_source(&path).unwrap(), "print('hi')\n");
    }
}
