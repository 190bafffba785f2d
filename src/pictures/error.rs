//! Error kinds produced by the picture library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Every filesystem failure is converted to one of these before it reaches a handler.
#[derive(Debug, Error)]
pub enum PictureError {
    /// The configured root is missing or is not a directory.
    #[error("pictures directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The requested name does not resolve to a regular file inside the root.
    #[error("picture not found: {name}")]
    NotFound { name: String },

    /// The requested name resolves outside the root.
    #[error("access to '{name}' is forbidden")]
    Forbidden { name: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl PictureError {
    pub fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
        }
    }

    pub fn forbidden(name: &str) -> Self {
        Self::Forbidden {
            name: name.to_string(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Message safe to hand to a client; I/O details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::DirectoryNotFound { .. } => {
                "Pictures directory not found. Please create the configured pictures directory."
                    .to_string()
            }
            Self::NotFound { .. } | Self::Forbidden { .. } => self.to_string(),
            Self::Io { .. } => "Internal server error".to_string(),
        }
    }
}
