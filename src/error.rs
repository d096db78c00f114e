use crate::domain::interaction::ErrorInfo;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors produced by the checkout core itself.
///
/// Configuration errors indicate host/merchant misconfiguration and are always
/// terminal; they are surfaced to the user as a generic failure. Illegal state
/// errors are programming errors in the caller, never shown to the user.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Illegal state: {0}")]
    IllegalState(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the payment gateway collaborator.
///
/// A transport failure never reached the processor and is recoverable by user
/// choice; a processor error is a business response and terminal.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport failure: {0}")]
    Transport(String),
    #[error("Processor error: {}", .0.result_info)]
    Processor(ErrorInfo),
}
