pub mod models;
pub mod providers;

use crate::access::AccessCredential;
use async_trait::async_trait;
use models::{GenerationRequest, SqlResult};
use std::error::Error;
use std::fmt;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum GeneratorError {
    /// The caller cancelled the request before it resolved.
    Cancelled,
    /// The service answered with a non-2xx status.
    Server { status: u16, body: String },
    ConnectionError(String),
    DecodeError(String),
    ConfigError(String),
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::Cancelled => write!(f, "SQL generation cancelled"),
            GeneratorError::Server { status, body } => {
                write!(f, "SQL service responded with status {}: {}", status, body)
            }
            GeneratorError::ConnectionError(msg) => write!(f, "SQL service connection error: {}", msg),
            GeneratorError::DecodeError(msg) => write!(f, "SQL service response error: {}", msg),
            GeneratorError::ConfigError(msg) => write!(f, "SQL service configuration error: {}", msg),
        }
    }
}

impl Error for GeneratorError {}

/// Client side of the remote SQL generation service.
///
/// Implementations must attach the credential on every call and must abort
/// the underlying transport when `cancel` fires.
#[async_trait]
pub trait RemoteGenerator: Send + Sync {
    async fn submit(
        &self,
        request: &GenerationRequest,
        credential: &AccessCredential,
        cancel: CancellationToken,
    ) -> Result<SqlResult, GeneratorError>;
}
