use crate::domain::interaction::Interaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Request code stamped on every redirect hand-off issued by this core.
pub const REDIRECT_REQUEST_CODE: u32 = 1291;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectMethod {
    Get,
    Post,
}

/// Opaque descriptor of an external hand-off (3-D Secure challenge, wallet
/// provider page).
///
/// The host may be torn down and recreated before the result returns, so the
/// request is fully serializable and correlation relies purely on the
/// persisted data — never on in-memory identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRequest {
    pub correlation_id: String,
    pub request_code: u32,
    pub destination: Url,
    pub method: RedirectMethod,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// Outcome of an external hand-off, delivered out-of-band and matched to its
/// request by correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectResult {
    pub correlation_id: String,
    pub interaction: Interaction,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl RedirectResult {
    pub fn matches(&self, request: &RedirectRequest) -> bool {
        self.correlation_id == request.correlation_id
    }
}
