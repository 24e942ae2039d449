use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Where a stage's GLSL text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    /// Read from disk at build time.
    File(PathBuf),
    /// Already in memory.
    Inline(String),
}

impl ShaderSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ShaderSource::File(path.into())
    }

    pub fn inline(source: impl Into<String>) -> Self {
        ShaderSource::Inline(source.into())
    }

    /// Returns the source text, reading the file if needed.
    pub fn text(&self) -> Result<Cow<'_, str>> {
        match self {
            ShaderSource::Inline(source) => Ok(Cow::Borrowed(source)),
            ShaderSource::File(path) => read_source(path).map(Cow::Owned),
        }
    }
}

impl From<&str> for ShaderSource {
    fn from(source: &str) -> Self {
        ShaderSource::Inline(source.to_string())
    }
}

impl From<&Path> for ShaderSource {
    fn from(path: &Path) -> Self {
        ShaderSource::File(path.to_path_buf())
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| {
        log::error!("couldn't read shader source {}: {source}", path.display());
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_borrows() {
        let src = ShaderSource::inline("void main() {}");
        assert!(matches!(src.text().unwrap(), Cow::Borrowed("void main() {}")));
    }

    #[test]
    fn file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.glsl");
        std::fs::write(&path, "void main() {}\n").unwrap();
        assert_eq!(ShaderSource::file(&path).text().unwrap(), "void main() {}\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShaderSource::file(dir.path().join("nope.glsl")).text().unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
