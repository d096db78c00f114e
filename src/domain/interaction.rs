use serde::{Deserialize, Serialize};

/// Reason returned with a successful outcome.
pub const REASON_OK: &str = "OK";
/// Reason returned while the processor is still settling the operation.
pub const REASON_PENDING: &str = "PENDING";
/// Reason attached to interactions synthesized on the client, e.g. for an
/// abandoned redirect.
pub const REASON_CLIENT_ABORT: &str = "CLIENT_ABORT";

/// Processor-returned code steering the next client action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionCode {
    Proceed,
    Abort,
    Retry,
    TryOtherNetwork,
    TryOtherAccount,
    Reload,
    Verify,
}

/// (code, reason) pair returned after every load, submit and delete call.
///
/// The reason is processor-defined free text; only [`REASON_OK`] and
/// [`REASON_PENDING`] carry meaning inside the core. No retry count is
/// carried here, the orchestrator tracks attempt state itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub code: InteractionCode,
    pub reason: String,
}

impl Interaction {
    pub fn new(code: InteractionCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.reason == REASON_OK
    }

    pub fn is_pending(&self) -> bool {
        self.reason == REASON_PENDING
    }
}

/// Error payload attached to a non-2xx processor response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub result_info: String,
    #[serde(default)]
    pub interaction: Option<Interaction>,
}
