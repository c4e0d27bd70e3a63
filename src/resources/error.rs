//! Error types for scene import.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported model format '{0}'")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The importer rejected the file.
    #[error("Failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("'{0}' contains no scene to import")]
    MissingRoot(PathBuf),

    /// A primitive lacks the data needed to build a mesh from it.
    #[error("Incomplete mesh '{mesh}' in '{path}': {reason}")]
    Incomplete {
        path: PathBuf,
        mesh: String,
        reason: String,
    },
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
