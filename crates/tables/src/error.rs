use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum TableError {
    /// Input file or folder does not exist.
    NotFound(PathBuf),
    /// Extension is not one of csv / xlsx / xls (or not writable).
    UnsupportedFormat(PathBuf),
    Io { path: PathBuf, source: std::io::Error },
    /// File exists but its contents could not be read as a table.
    Decode { path: PathBuf, message: String },
    /// Table could not be encoded for the destination format.
    Encode { path: PathBuf, message: String },
}

impl TableError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io { path: path.to_path_buf(), source }
        }
    }

    pub(crate) fn decode(path: &Path, message: impl Into<String>) -> Self {
        Self::Decode { path: path.to_path_buf(), message: message.into() }
    }

    pub(crate) fn encode(path: &Path, message: impl Into<String>) -> Self {
        Self::Encode { path: path.to_path_buf(), message: message.into() }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::UnsupportedFormat(path) => path,
            Self::Io { path, .. } | Self::Decode { path, .. } | Self::Encode { path, .. } => path,
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "not found: {}", path.display()),
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported file type: {}", path.display())
            }
            Self::Io { path, source } => write!(f, "cannot access {}: {source}", path.display()),
            Self::Decode { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            Self::Encode { path, message } => {
                write!(f, "cannot write {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
