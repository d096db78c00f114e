//! Serde mapping of the processor's list/operation schema. The core consumes
//! these types as returned by the gateway; it owns no wire protocol of its
//! own.

use crate::domain::interaction::Interaction;
use crate::domain::redirect::RedirectMethod;
use crate::domain::registration::RegistrationRule;
use crate::domain::session::{InputElement, OperationType, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

pub const LINK_SELF: &str = "self";
pub const LINK_OPERATION: &str = "operation";
pub const LINK_DELETION: &str = "deletion";

/// Result of loading a checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub links: HashMap<String, Url>,
    pub result_info: String,
    pub interaction: Interaction,
    pub operation_type: OperationType,
    #[serde(default)]
    pub refreshable: bool,
    #[serde(default)]
    pub allow_delete: Option<bool>,
    #[serde(default)]
    pub payment: Option<PaymentInfo>,
    pub networks: NetworkCatalog,
    #[serde(default)]
    pub accounts: Vec<AccountRegistration>,
    #[serde(default)]
    pub preset_account: Option<PresetAccountDto>,
}

impl ListResponse {
    pub fn self_url(&self) -> Option<&Url> {
        self.links.get(LINK_SELF)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCatalog {
    #[serde(default)]
    pub applicable: Vec<ApplicableNetwork>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicableNetwork {
    pub code: String,
    pub label: String,
    pub method: PaymentMethod,
    pub registration: RegistrationRule,
    pub recurrence: RegistrationRule,
    #[serde(default)]
    pub input_elements: Vec<InputElement>,
    #[serde(default)]
    pub links: HashMap<String, Url>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRegistration {
    pub account_id: String,
    pub network_code: String,
    pub label: String,
    #[serde(default)]
    pub masked_number: Option<String>,
    pub method: PaymentMethod,
    #[serde(default)]
    pub input_elements: Vec<InputElement>,
    #[serde(default)]
    pub links: HashMap<String, Url>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetAccountDto {
    pub network_code: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub masked_number: Option<String>,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub registered: bool,
    #[serde(default)]
    pub registration: Option<RegistrationRule>,
    #[serde(default)]
    pub recurrence: Option<RegistrationRule>,
    #[serde(default)]
    pub links: HashMap<String, Url>,
}

/// Result of submitting an operation or deleting an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub result_info: String,
    pub interaction: Interaction,
    #[serde(default)]
    pub redirect: Option<RedirectDto>,
    #[serde(default)]
    pub identification: Option<Identification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub long_id: String,
    #[serde(default)]
    pub short_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectDto {
    pub url: Url,
    pub method: RedirectMethod,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// Host-side grouping configuration: networks sharing one card, each with the
/// selection pattern the disambiguator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRule {
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub code: String,
    #[serde(default)]
    pub pattern: Option<String>,
}
