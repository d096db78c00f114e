use crate::domain::registration::ResolvedRegistration;
use crate::domain::smart_switch::NetworkDisambiguator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Kind of payment attempt the whole session stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Charge,
    Preset,
    Update,
    Payout,
}

impl OperationType {
    /// Terminal operation types close the screen on a successful submission;
    /// UPDATE flows reload instead.
    pub fn is_terminal(self) -> bool {
        self != OperationType::Update
    }
}

/// Payment method family as named by the processor (CREDIT_CARD, WALLET, ...).
/// Kept opaque; the host decides which families it can render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputElementKind {
    #[serde(rename = "string")]
    Text,
    Numeric,
    Integer,
    Select,
    Checkbox,
}

/// One form field definition. Structural identity (name, order, type) decides
/// whether networks may share a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputElement {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InputElementKind,
}

/// Identical in name, order and type.
pub fn same_shape(a: &[InputElement], b: &[InputElement]) -> bool {
    a == b
}

/// One concrete payment network, fully resolved for presentation.
#[derive(Debug, Clone)]
pub struct Network {
    pub code: String,
    pub label: String,
    pub method: PaymentMethod,
    pub input_elements: Vec<InputElement>,
    pub registration: ResolvedRegistration,
    pub operation_url: Url,
}

/// Card presenting 1..N networks behind a single form. Grouped cards own the
/// disambiguator narrowing the active network as the user types.
#[derive(Debug, Clone)]
pub struct NetworkCard {
    networks: Vec<Network>,
    switch: Option<NetworkDisambiguator>,
}

impl NetworkCard {
    pub fn single(network: Network) -> Self {
        Self {
            networks: vec![network],
            switch: None,
        }
    }

    /// Precondition: the networks' input-element lists are structurally
    /// identical and the disambiguator carries a pattern per network.
    pub fn grouped(networks: Vec<Network>, switch: NetworkDisambiguator) -> Self {
        Self {
            networks,
            switch: Some(switch),
        }
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn is_grouped(&self) -> bool {
        self.switch.is_some()
    }

    /// Feeds the shared account-number field value into the disambiguator.
    /// Returns whether the selection set changed. A no-op `false` on
    /// ungrouped cards.
    pub fn evaluate_input(&mut self, value: &str) -> bool {
        match &mut self.switch {
            Some(switch) => switch.evaluate(value),
            None => false,
        }
    }

    pub fn reset_switch(&mut self) {
        if let Some(switch) = &mut self.switch {
            switch.reset();
        }
    }

    /// The network a submission would target right now. `None` while the
    /// typed input rules out every grouped network; submission must be
    /// blocked until the input determines one again.
    pub fn active_network(&self) -> Option<&Network> {
        match &self.switch {
            Some(switch) => {
                let code = switch.active_network()?;
                self.networks.iter().find(|n| n.code == code)
            }
            None => self.networks.first(),
        }
    }

    pub fn input_elements(&self) -> &[InputElement] {
        self.networks
            .first()
            .map(|n| n.input_elements.as_slice())
            .unwrap_or_default()
    }
}

/// A registered account the user may charge again.
#[derive(Debug, Clone)]
pub struct SavedAccount {
    pub account_id: String,
    pub network_code: String,
    pub label: String,
    pub masked_number: Option<String>,
    pub method: PaymentMethod,
    pub input_elements: Vec<InputElement>,
    pub operation_url: Url,
    pub deletion_url: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct AccountCard {
    pub account: SavedAccount,
    pub deletable: bool,
}

/// A merchant-preselected account charged without user choice.
#[derive(Debug, Clone)]
pub struct PresetAccount {
    pub network_code: String,
    pub label: String,
    pub masked_number: Option<String>,
    pub method: Option<PaymentMethod>,
    pub operation_url: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct PresetCard {
    pub account: PresetAccount,
    /// Set when the preset account is neither registered nor configured for
    /// auto-registration/recurrence.
    pub warning: bool,
}

/// Everything the list can display, dispatched by pattern match.
#[derive(Debug, Clone)]
pub enum Card {
    Network(NetworkCard),
    Account(AccountCard),
    Preset(PresetCard),
}

impl Card {
    pub fn network_codes(&self) -> Vec<&str> {
        match self {
            Card::Network(card) => card.networks().iter().map(|n| n.code.as_str()).collect(),
            Card::Account(card) => vec![card.account.network_code.as_str()],
            Card::Preset(card) => vec![card.account.network_code.as_str()],
        }
    }

    /// Submission target of the card in its current state.
    pub fn operation_url(&self) -> Option<&Url> {
        match self {
            Card::Network(card) => card.active_network().map(|n| &n.operation_url),
            Card::Account(card) => Some(&card.account.operation_url),
            Card::Preset(card) => card.account.operation_url.as_ref(),
        }
    }

    pub fn deletion_url(&self) -> Option<&Url> {
        match self {
            Card::Account(card) if card.deletable => card.account.deletion_url.as_ref(),
            _ => None,
        }
    }

    pub fn is_deletable(&self) -> bool {
        self.deletion_url().is_some()
    }

    pub fn input_elements(&self) -> &[InputElement] {
        match self {
            Card::Network(card) => card.input_elements(),
            Card::Account(card) => &card.account.input_elements,
            Card::Preset(_) => &[],
        }
    }

    pub fn method(&self) -> Option<&PaymentMethod> {
        match self {
            Card::Network(card) => card.active_network().map(|n| &n.method),
            Card::Account(card) => Some(&card.account.method),
            Card::Preset(card) => card.account.method.as_ref(),
        }
    }

    /// Registration checkboxes shown with the card, if any.
    pub fn registration(&self) -> Option<&ResolvedRegistration> {
        match self {
            Card::Network(card) => card.active_network().map(|n| &n.registration),
            Card::Account(_) | Card::Preset(_) => None,
        }
    }

    /// Whether the card renders at least one checkbox the user can toggle.
    pub fn has_interactive_checkbox(&self) -> bool {
        self.registration().is_some_and(|r| {
            r.registration.mode.is_interactive() || r.recurrence.mode.is_interactive()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Preset,
    SavedAccounts,
    Networks,
}

impl SectionKind {
    pub fn label_key(self) -> &'static str {
        match self {
            SectionKind::Preset => "section.preset.title",
            SectionKind::SavedAccounts => "section.accounts.title",
            SectionKind::Networks => "section.networks.title",
        }
    }
}

/// Titled group of cards; order is fixed by construction order.
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub cards: Vec<Card>,
}

/// What the user is asked to pay.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSummary {
    pub amount: Decimal,
    pub currency: String,
    pub reference: Option<String>,
}

/// The fully built domain model of one checkout list. Rebuilt wholesale on
/// every (re)load, never field-mutated — only the disambiguators inside
/// network cards move as the user types.
#[derive(Debug, Clone)]
pub struct Session {
    pub operation_type: OperationType,
    pub sections: Vec<Section>,
    pub payment: Option<PaymentSummary>,
    pub refreshable: bool,
    pub self_url: Url,
}

impl Session {
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.sections.iter().flat_map(|s| s.cards.iter())
    }

    pub fn card_count(&self) -> usize {
        self.sections.iter().map(|s| s.cards.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.card_count() == 0
    }

    /// First network card presenting the given code, together with its
    /// section/card position.
    pub fn find_network_card(&self, code: &str) -> Option<(usize, usize, &NetworkCard)> {
        for (section_index, section) in self.sections.iter().enumerate() {
            for (card_index, card) in section.cards.iter().enumerate() {
                if let Card::Network(network_card) = card
                    && network_card.networks().iter().any(|n| n.code == code)
                {
                    return Some((section_index, card_index, network_card));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::{RegistrationPolicy, RegistrationRule};

    fn element(name: &str, kind: InputElementKind) -> InputElement {
        InputElement {
            name: name.to_string(),
            kind,
        }
    }

    fn network(code: &str) -> Network {
        Network {
            code: code.to_string(),
            label: code.to_string(),
            method: PaymentMethod::new("CREDIT_CARD"),
            input_elements: vec![element("number", InputElementKind::Numeric)],
            registration: RegistrationPolicy::resolve(
                OperationType::Charge,
                RegistrationRule::None,
                RegistrationRule::None,
            )
            .unwrap(),
            operation_url: Url::parse("https://api.example.net/charge").unwrap(),
        }
    }

    #[test]
    fn test_same_shape_requires_name_order_and_type() {
        let a = vec![
            element("number", InputElementKind::Numeric),
            element("expiryMonth", InputElementKind::Integer),
        ];
        let reordered = vec![
            element("expiryMonth", InputElementKind::Integer),
            element("number", InputElementKind::Numeric),
        ];
        let retyped = vec![
            element("number", InputElementKind::Text),
            element("expiryMonth", InputElementKind::Integer),
        ];
        assert!(same_shape(&a, &a.clone()));
        assert!(!same_shape(&a, &reordered));
        assert!(!same_shape(&a, &retyped));
    }

    #[test]
    fn test_ungrouped_card_always_exposes_its_network() {
        let mut card = NetworkCard::single(network("VISA"));
        assert_eq!(card.active_network().unwrap().code, "VISA");
        assert!(!card.evaluate_input("5123"));
        assert_eq!(card.active_network().unwrap().code, "VISA");
    }

    #[test]
    fn test_grouped_card_follows_the_switch() {
        let mut switch = NetworkDisambiguator::new();
        switch.add_selection_pattern("VISA", "4").unwrap();
        switch.add_selection_pattern("MASTERCARD", "5[1-5]").unwrap();
        let mut card = NetworkCard::grouped(vec![network("VISA"), network("MASTERCARD")], switch);

        assert_eq!(card.active_network().unwrap().code, "VISA");
        assert!(card.evaluate_input("52"));
        assert_eq!(card.active_network().unwrap().code, "MASTERCARD");
        assert!(card.evaluate_input("9"));
        assert!(card.active_network().is_none());
        card.reset_switch();
        assert_eq!(card.active_network().unwrap().code, "VISA");
    }

    #[test]
    fn test_deletion_url_respects_deletable_flag() {
        let account = SavedAccount {
            account_id: "acc-1".to_string(),
            network_code: "VISA".to_string(),
            label: "VISA ending 0003".to_string(),
            masked_number: Some("41xx xxxx xxxx 0003".to_string()),
            method: PaymentMethod::new("CREDIT_CARD"),
            input_elements: vec![],
            operation_url: Url::parse("https://api.example.net/accounts/acc-1/charge").unwrap(),
            deletion_url: Some(Url::parse("https://api.example.net/accounts/acc-1").unwrap()),
        };
        let deletable = Card::Account(AccountCard {
            account: account.clone(),
            deletable: true,
        });
        let locked = Card::Account(AccountCard {
            account,
            deletable: false,
        });
        assert!(deletable.is_deletable());
        assert!(!locked.is_deletable());
    }
}
