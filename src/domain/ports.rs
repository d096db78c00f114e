use crate::domain::interaction::Interaction;
use crate::domain::operation::{DeletionRequest, Operation};
use crate::domain::redirect::RedirectRequest;
use crate::domain::session::Session;
use crate::error::{GatewayError, Result};
use crate::interfaces::processor::{ListResponse, OperationResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Transport to the remote payment processor. Implementations own timeouts
/// and connection handling; the core only distinguishes a transport failure
/// from a business response.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn load_session(&self, url: &Url) -> GatewayResult<ListResponse>;
    async fn submit_operation(&self, operation: &Operation) -> GatewayResult<OperationResult>;
    async fn delete_account(&self, request: &DeletionRequest) -> GatewayResult<OperationResult>;
}

/// Hand-off to an external page/app. `perform` is fire-and-forget; the result
/// arrives later, out-of-band, keyed by the request's correlation id.
#[async_trait]
pub trait RedirectBridge: Send + Sync {
    fn supports(&self, request: &RedirectRequest) -> bool;
    async fn perform(&self, request: &RedirectRequest) -> Result<()>;
}

/// Durable storage for the single pending redirect request, owned by the
/// host. Must survive process death so a recreated orchestrator can resume.
#[async_trait]
pub trait RedirectStore: Send + Sync {
    async fn save(&self, request: &RedirectRequest) -> Result<()>;
    async fn load(&self) -> Result<Option<RedirectRequest>>;
    async fn clear(&self) -> Result<()>;
}

/// Outcome of a host dialog, as a single awaited value instead of three
/// nested callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptChoice {
    Positive,
    Negative,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCode {
    Proceed,
    Error,
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseCode::Proceed => f.write_str("PROCEED"),
            CloseCode::Error => f.write_str("ERROR"),
        }
    }
}

/// Structured result the screen closes with.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseResult {
    pub code: CloseCode,
    pub result_info: String,
    pub interaction: Option<Interaction>,
}

impl CloseResult {
    pub fn proceed(result_info: impl Into<String>, interaction: Interaction) -> Self {
        Self {
            code: CloseCode::Proceed,
            result_info: result_info.into(),
            interaction: Some(interaction),
        }
    }

    pub fn error(result_info: impl Into<String>, interaction: Option<Interaction>) -> Self {
        Self {
            code: CloseCode::Error,
            result_info: result_info.into(),
            interaction,
        }
    }
}

/// Command sink of the host screen. Everything the user ever sees is one of
/// these calls.
#[async_trait]
pub trait CheckoutView: Send + Sync {
    fn show_progress(&self, visible: bool);
    /// Retry/cancel decision after a transport failure.
    async fn prompt_retry(&self, reason: &str) -> PromptChoice;
    /// Acknowledged notice that the operation is pending on the processor.
    async fn show_pending_notice(&self);
    fn show_interaction_message(&self, interaction: &Interaction);
    fn show_session(&self, session: &Session);
    fn close(&self, result: &CloseResult);
}

pub type GatewayBox = Box<dyn PaymentGateway>;
pub type RedirectBridgeBox = Box<dyn RedirectBridge>;
pub type RedirectStoreBox = Box<dyn RedirectStore>;
pub type CheckoutViewBox = Box<dyn CheckoutView>;
