use async_trait::async_trait;
use payflow::domain::interaction::{Interaction, InteractionCode, REASON_OK};
use payflow::domain::operation::Operation;
use payflow::domain::ports::{
    CheckoutView, CheckoutViewBox, CloseResult, PromptChoice, RedirectBridge, RedirectBridgeBox,
};
use payflow::domain::redirect::RedirectRequest;
use payflow::domain::registration::RegistrationRule;
use payflow::domain::session::{
    InputElement, InputElementKind, OperationType, PaymentMethod, Session,
};
use payflow::interfaces::processor::{
    AccountRegistration, ApplicableNetwork, GroupMember, GroupRule, Identification, ListResponse,
    NetworkCatalog, OperationResult, Parameter, RedirectDto,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use url::Url;

pub fn list_url() -> Url {
    Url::parse("https://api.example.net/lists/1").unwrap()
}

pub fn card_elements() -> Vec<InputElement> {
    vec![
        InputElement {
            name: "number".to_string(),
            kind: InputElementKind::Numeric,
        },
        InputElement {
            name: "holderName".to_string(),
            kind: InputElementKind::Text,
        },
    ]
}

pub fn network(
    code: &str,
    registration: RegistrationRule,
    recurrence: RegistrationRule,
) -> ApplicableNetwork {
    ApplicableNetwork {
        code: code.to_string(),
        label: code.to_string(),
        method: PaymentMethod::new("CREDIT_CARD"),
        registration,
        recurrence,
        input_elements: card_elements(),
        links: HashMap::from([(
            "operation".to_string(),
            Url::parse(&format!("https://api.example.net/charge/{code}")).unwrap(),
        )]),
    }
}

pub fn account(id: &str, network_code: &str, method: &str) -> AccountRegistration {
    AccountRegistration {
        account_id: id.to_string(),
        network_code: network_code.to_string(),
        label: format!("{network_code} ending 0003"),
        masked_number: Some("41xx xxxx xxxx 0003".to_string()),
        method: PaymentMethod::new(method),
        input_elements: vec![],
        links: HashMap::from([
            (
                "operation".to_string(),
                Url::parse(&format!("https://api.example.net/accounts/{id}/charge")).unwrap(),
            ),
            (
                "deletion".to_string(),
                Url::parse(&format!("https://api.example.net/accounts/{id}")).unwrap(),
            ),
        ]),
    }
}

pub fn list_response(
    operation_type: OperationType,
    networks: Vec<ApplicableNetwork>,
) -> ListResponse {
    ListResponse {
        links: HashMap::from([("self".to_string(), list_url())]),
        result_info: "list of applicable networks".to_string(),
        interaction: Interaction::new(InteractionCode::Proceed, REASON_OK),
        operation_type,
        refreshable: false,
        allow_delete: None,
        payment: None,
        networks: NetworkCatalog {
            applicable: networks,
        },
        accounts: vec![],
        preset_account: None,
    }
}

pub fn operation_result(code: InteractionCode, reason: &str) -> OperationResult {
    OperationResult {
        result_info: format!("{code:?}/{reason}"),
        interaction: Interaction::new(code, reason),
        redirect: None,
        identification: None,
    }
}

pub fn redirecting_result(correlation_id: &str) -> OperationResult {
    OperationResult {
        result_info: "challenge required".to_string(),
        interaction: Interaction::new(InteractionCode::Proceed, "PENDING"),
        redirect: Some(RedirectDto {
            url: Url::parse("https://acs.example.net/challenge").unwrap(),
            method: payflow::domain::redirect::RedirectMethod::Post,
            parameters: vec![Parameter {
                name: "MD".to_string(),
                value: "token".to_string(),
            }],
        }),
        identification: Some(Identification {
            long_id: correlation_id.to_string(),
            short_id: None,
            transaction_id: None,
        }),
    }
}

pub fn group_rule(members: &[(&str, &str)]) -> GroupRule {
    GroupRule {
        members: members
            .iter()
            .map(|&(code, pattern)| GroupMember {
                code: code.to_string(),
                pattern: Some(pattern.to_string()),
            })
            .collect(),
    }
}

/// Builds a submit-ready operation off the built session, the way a screen
/// would.
pub fn operation_for(session: &Session, code: &str) -> Operation {
    let (_, _, card) = session
        .find_network_card(code)
        .unwrap_or_else(|| panic!("network {code} not in session"));
    let network = card
        .networks()
        .iter()
        .find(|n| n.code == code)
        .unwrap_or_else(|| panic!("network {code} not on card"));
    let mut operation = Operation::for_network(network, session.operation_type);
    operation.put_account_field("number", "4111111111111111");
    operation
}

/// Every command the orchestrator issued to its host screen, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Progress(bool),
    RetryPrompt(String),
    PendingNotice,
    Message(InteractionCode),
    Session { cards: usize },
    Close(CloseResult),
}

#[derive(Clone, Default)]
pub struct RecordingView {
    events: Arc<Mutex<Vec<ViewEvent>>>,
    answers: Arc<Mutex<VecDeque<PromptChoice>>>,
}

impl RecordingView {
    pub fn new(answers: impl IntoIterator<Item = PromptChoice>) -> Self {
        Self {
            events: Arc::default(),
            answers: Arc::new(Mutex::new(answers.into_iter().collect())),
        }
    }

    pub fn boxed(&self) -> CheckoutViewBox {
        Box::new(self.clone())
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn close_result(&self) -> Option<CloseResult> {
        self.events().into_iter().find_map(|event| match event {
            ViewEvent::Close(result) => Some(result),
            _ => None,
        })
    }

    pub fn session_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, ViewEvent::Session { .. }))
            .count()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl CheckoutView for RecordingView {
    fn show_progress(&self, visible: bool) {
        self.push(ViewEvent::Progress(visible));
    }

    async fn prompt_retry(&self, reason: &str) -> PromptChoice {
        self.push(ViewEvent::RetryPrompt(reason.to_string()));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(PromptChoice::Negative)
    }

    async fn show_pending_notice(&self) {
        self.push(ViewEvent::PendingNotice);
    }

    fn show_interaction_message(&self, interaction: &Interaction) {
        self.push(ViewEvent::Message(interaction.code));
    }

    fn show_session(&self, session: &Session) {
        self.push(ViewEvent::Session {
            cards: session.card_count(),
        });
    }

    fn close(&self, result: &CloseResult) {
        self.push(ViewEvent::Close(result.clone()));
    }
}

#[derive(Clone)]
pub struct RecordingBridge {
    performed: Arc<Mutex<Vec<RedirectRequest>>>,
    supported: bool,
}

impl RecordingBridge {
    pub fn new(supported: bool) -> Self {
        Self {
            performed: Arc::default(),
            supported,
        }
    }

    pub fn boxed(&self) -> RedirectBridgeBox {
        Box::new(self.clone())
    }

    pub fn performed(&self) -> Vec<RedirectRequest> {
        self.performed.lock().unwrap().clone()
    }
}

#[async_trait]
impl RedirectBridge for RecordingBridge {
    fn supports(&self, _request: &RedirectRequest) -> bool {
        self.supported
    }

    async fn perform(&self, request: &RedirectRequest) -> payflow::error::Result<()> {
        self.performed.lock().unwrap().push(request.clone());
        Ok(())
    }
}
