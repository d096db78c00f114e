//! Scenario files for the replay harness: a scripted processor, the host
//! configuration and the user actions to drive through the flow.

use crate::domain::ports::PromptChoice;
use crate::domain::session::PaymentMethod;
use crate::error::{FlowError, Result};
use crate::infrastructure::scripted::ScriptedResponse;
use crate::interfaces::processor::GroupRule;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScreenKind {
    PaymentList,
    AccountUpdate,
}

/// One user action replayed against the orchestrator, in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    /// Type into the shared account-number field of a grouped card.
    TypeNumber {
        section: usize,
        card: usize,
        value: String,
    },
    /// Submit the card presenting the given network, with the typed fields.
    Submit {
        network: String,
        #[serde(default)]
        account: BTreeMap<String, String>,
    },
    /// Delete the saved account with the given id.
    Delete { account_id: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub list_url: Url,
    pub screen: ScreenKind,
    #[serde(default)]
    pub grouping_rules: Vec<GroupRule>,
    /// Methods the pretend host can render; empty supports everything.
    #[serde(default)]
    pub supported_methods: Vec<PaymentMethod>,
    pub responses: Vec<ScriptedResponse>,
    #[serde(default)]
    pub prompt_answers: Vec<PromptChoice>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Reads a scenario from any `Read` source (e.g. File, Stdin).
pub struct ScenarioReader<R: Read> {
    source: R,
}

impl<R: Read> ScenarioReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn read(self) -> Result<Scenario> {
        serde_json::from_reader(self.source).map_err(FlowError::from)
    }
}
