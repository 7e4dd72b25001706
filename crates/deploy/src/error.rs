//! Error taxonomy for a deployment run.

use std::path::PathBuf;

use crate::{chains::ChainName, warp::ValidationError};

/// Errors surfaced by the deployment core.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Invalid or contradictory user input, detected before any side effect.
    #[error("Invalid configuration for `{field}`: {message}")]
    Configuration { field: String, message: String },

    /// A persisted artifact exists but cannot be interpreted.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The underlying deployer failed on a chain.
    #[error("Deployment to {chain} failed: {source:#}")]
    Deployment {
        chain: ChainName,
        #[source]
        source: anyhow::Error,
    },

    /// A warp route config violates the schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The signer could not produce an owner address.
    #[error("Failed to resolve owner address: {0:#}")]
    Signer(anyhow::Error),
}

impl DeployError {
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error was raised before anything was written or sent.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Validation(_))
    }
}

pub type Result<T, E = DeployError> = std::result::Result<T, E>;
