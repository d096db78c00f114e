use crate::domain::session::{AccountCard, Network, OperationType, PaymentMethod, SavedAccount};
use crate::error::{FlowError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// Browser fingerprint forwarded to the processor for risk scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserData {
    pub java_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone_offset: Option<i32>,
}

/// The outgoing request being assembled while the user fills the form.
///
/// Built fresh per attempt; the orchestrator never mutates it, so a RETRY
/// interaction can resubmit the very same instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    network_code: String,
    method: PaymentMethod,
    operation_type: OperationType,
    url: Url,
    account: BTreeMap<String, String>,
    auto_registration: Option<bool>,
    allow_recurrence: Option<bool>,
    browser_data: Option<BrowserData>,
}

impl Operation {
    pub fn for_network(network: &Network, operation_type: OperationType) -> Self {
        Self {
            network_code: network.code.clone(),
            method: network.method.clone(),
            operation_type,
            url: network.operation_url.clone(),
            account: BTreeMap::new(),
            auto_registration: None,
            allow_recurrence: None,
            browser_data: None,
        }
    }

    pub fn for_account(account: &SavedAccount, operation_type: OperationType) -> Self {
        Self {
            network_code: account.network_code.clone(),
            method: account.method.clone(),
            operation_type,
            url: account.operation_url.clone(),
            account: BTreeMap::new(),
            auto_registration: None,
            allow_recurrence: None,
            browser_data: None,
        }
    }

    pub fn put_account_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.account.insert(name.into(), value.into());
    }

    pub fn set_auto_registration(&mut self, value: bool) {
        self.auto_registration = Some(value);
    }

    pub fn set_allow_recurrence(&mut self, value: bool) {
        self.allow_recurrence = Some(value);
    }

    pub fn set_browser_data(&mut self, data: BrowserData) {
        self.browser_data = Some(data);
    }

    pub fn network_code(&self) -> &str {
        &self.network_code
    }

    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Serializable request body in the processor's operation schema.
    pub fn body(&self) -> OperationBody<'_> {
        OperationBody {
            account: &self.account,
            auto_registration: self.auto_registration,
            allow_recurrence: self.allow_recurrence,
            browser_data: self.browser_data.as_ref(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationBody<'a> {
    pub account: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_registration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_recurrence: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_data: Option<&'a BrowserData>,
}

/// Request to remove a saved account from the list.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionRequest {
    pub account_id: String,
    pub url: Url,
}

impl DeletionRequest {
    /// Missing deletion URLs are merchant misconfiguration, reported before
    /// anything leaves the device.
    pub fn for_account(card: &AccountCard) -> Result<Self> {
        if !card.deletable {
            return Err(FlowError::IllegalState(format!(
                "account {} is not deletable",
                card.account.account_id
            )));
        }
        let url = card.account.deletion_url.clone().ok_or_else(|| {
            FlowError::Configuration(format!(
                "account {} has no deletion link",
                card.account.account_id
            ))
        })?;
        Ok(Self {
            account_id: card.account.account_id.clone(),
            url,
        })
    }
}
