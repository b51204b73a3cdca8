//! Per-query failures.
//!
//! Every variant is recoverable: the console loop reports it and reads the
//! next line. Configuration problems live in [`crate::config::ConfigError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Transport failure, timeout or a non-success status from the service.
    #[error(transparent)]
    Service(#[from] anyhow::Error),

    /// The service answered without any choices.
    #[error("no response")]
    NoResponse,

    /// The model asked for a capability that is not registered.
    #[error("capability not registered: {name}")]
    UnregisteredCapability { name: String },

    #[error("failed to decode arguments {raw:?}: {source}")]
    ArgumentDecode {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}
