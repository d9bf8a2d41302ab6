//! Error types returned from operation execution

use sphynx_graph_algorithms::EngineError;
use thiserror::Error;

/// Errors that can occur while executing an operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SphynxError {
    #[error("missing input '{name}': {reason}")]
    MissingInput { name: String, reason: String },

    #[error("parameter '{key}' should be {expected}, got {found}")]
    ParameterType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("unsupported algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("engine failure: {0}")]
    ExternalEngineFailure(String),

    #[error("operation '{0}' is already registered")]
    DuplicateOperation(String),

    #[error("output '{0}' was already published")]
    DuplicateOutput(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A handler panicked; the panic message is kept verbatim
    #[error("{0}")]
    HandlerPanicked(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("server is not accepting operations")]
    ServerClosed,
}

impl SphynxError {
    pub fn missing_input(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SphynxError::MissingInput {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<EngineError> for SphynxError {
    fn from(e: EngineError) -> Self {
        SphynxError::ExternalEngineFailure(e.to_string())
    }
}

pub type SphynxResult<T> = Result<T, SphynxError>;
