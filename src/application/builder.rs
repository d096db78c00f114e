use crate::domain::registration::{RegistrationPolicy, RegistrationRule};
use crate::domain::session::{
    AccountCard, Card, Network, NetworkCard, OperationType, PaymentMethod, PaymentSummary,
    PresetAccount, PresetCard, SavedAccount, Section, SectionKind, Session, same_shape,
};
use crate::domain::smart_switch::NetworkDisambiguator;
use crate::error::{FlowError, Result};
use crate::interfaces::processor::{
    AccountRegistration, ApplicableNetwork, GroupMember, GroupRule, LINK_DELETION, LINK_OPERATION,
    LINK_SELF, ListResponse, PresetAccountDto,
};
use std::collections::HashSet;

/// Explicit build-time context, passed in instead of read from process-wide
/// state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Payment method families the host can render. Empty means every method
    /// is acceptable.
    pub supported_methods: HashSet<PaymentMethod>,
}

impl SessionContext {
    pub fn new(supported_methods: impl IntoIterator<Item = PaymentMethod>) -> Self {
        Self {
            supported_methods: supported_methods.into_iter().collect(),
        }
    }

    pub fn supports(&self, method: &PaymentMethod) -> bool {
        self.supported_methods.is_empty() || self.supported_methods.contains(method)
    }
}

/// Transforms a raw list response into the section/card domain model,
/// applying grouping rules and the registration policy.
pub struct SessionModelBuilder;

impl SessionModelBuilder {
    pub fn build(
        list: &ListResponse,
        grouping_rules: &[GroupRule],
        context: &SessionContext,
    ) -> Result<Session> {
        let operation_type = list.operation_type;
        let self_url = list
            .links
            .get(LINK_SELF)
            .cloned()
            .ok_or_else(|| FlowError::Configuration("list response missing self link".into()))?;

        let mut sections = Vec::new();

        if let Some(preset) = &list.preset_account {
            sections.push(Section {
                kind: SectionKind::Preset,
                cards: vec![Card::Preset(Self::build_preset(preset))],
            });
        }

        let account_cards = Self::build_accounts(list, context)?;
        if !account_cards.is_empty() {
            sections.push(Section {
                kind: SectionKind::SavedAccounts,
                cards: account_cards,
            });
        }

        let network_cards = Self::build_networks(list, grouping_rules)?;
        if !network_cards.is_empty() {
            sections.push(Section {
                kind: SectionKind::Networks,
                cards: network_cards,
            });
        }

        Ok(Session {
            operation_type,
            sections,
            payment: list.payment.as_ref().map(|p| PaymentSummary {
                amount: p.amount,
                currency: p.currency.clone(),
                reference: p.reference.clone(),
            }),
            refreshable: list.refreshable,
            self_url,
        })
    }

    fn build_preset(preset: &PresetAccountDto) -> PresetCard {
        let configured = preset.registration.is_some_and(|r| r != RegistrationRule::None)
            || preset.recurrence.is_some_and(|r| r != RegistrationRule::None);
        let warning = !preset.registered && !configured;
        if warning {
            log::warn!(
                "preset account {} is neither registered nor configured for registration/recurrence",
                preset.network_code
            );
        }
        PresetCard {
            account: PresetAccount {
                network_code: preset.network_code.clone(),
                label: preset
                    .label
                    .clone()
                    .unwrap_or_else(|| preset.network_code.clone()),
                masked_number: preset.masked_number.clone(),
                method: preset.method.clone(),
                operation_url: preset.links.get(LINK_OPERATION).cloned(),
            },
            warning,
        }
    }

    /// Saved accounts the host cannot render are dropped silently; the list
    /// keeps working with the remainder.
    fn build_accounts(list: &ListResponse, context: &SessionContext) -> Result<Vec<Card>> {
        let allow_delete = list
            .allow_delete
            .unwrap_or(list.operation_type == OperationType::Update);
        list.accounts
            .iter()
            .filter(|account| {
                let supported = context.supports(&account.method);
                if !supported {
                    log::debug!(
                        "dropping saved account {}: method {} not supported by host",
                        account.account_id,
                        account.method
                    );
                }
                supported
            })
            .map(|account| Self::build_account(account, allow_delete).map(Card::Account))
            .collect()
    }

    fn build_account(account: &AccountRegistration, allow_delete: bool) -> Result<AccountCard> {
        let operation_url = account.links.get(LINK_OPERATION).cloned().ok_or_else(|| {
            FlowError::Configuration(format!(
                "account {} missing operation link",
                account.account_id
            ))
        })?;
        let deletion_url = account.links.get(LINK_DELETION).cloned();
        Ok(AccountCard {
            deletable: allow_delete && deletion_url.is_some(),
            account: SavedAccount {
                account_id: account.account_id.clone(),
                network_code: account.network_code.clone(),
                label: account.label.clone(),
                masked_number: account.masked_number.clone(),
                method: account.method.clone(),
                input_elements: account.input_elements.clone(),
                operation_url,
                deletion_url,
            },
        })
    }

    fn build_networks(list: &ListResponse, grouping_rules: &[GroupRule]) -> Result<Vec<Card>> {
        let networks: Vec<Network> = list
            .networks
            .applicable
            .iter()
            .filter(|network| !Self::suppressed(list.operation_type, network))
            .map(|network| Self::to_network(list.operation_type, network))
            .collect::<Result<_>>()?;
        Self::group_networks(networks, grouping_rules)
    }

    /// In UPDATE flows a network with nothing to register or recur has
    /// nothing to update either.
    fn suppressed(operation_type: OperationType, network: &ApplicableNetwork) -> bool {
        operation_type == OperationType::Update
            && network.registration == RegistrationRule::None
            && network.recurrence == RegistrationRule::None
    }

    fn to_network(operation_type: OperationType, network: &ApplicableNetwork) -> Result<Network> {
        let registration = RegistrationPolicy::resolve(
            operation_type,
            network.registration,
            network.recurrence,
        )?;
        let operation_url = network.links.get(LINK_OPERATION).cloned().ok_or_else(|| {
            FlowError::Configuration(format!("network {} missing operation link", network.code))
        })?;
        Ok(Network {
            code: network.code.clone(),
            label: network.label.clone(),
            method: network.method.clone(),
            input_elements: network.input_elements.clone(),
            registration,
            operation_url,
        })
    }

    /// Applies each grouping rule to the applicable networks. A rule groups
    /// only when at least two members are present and their input elements
    /// are structurally identical; otherwise every member stays a standalone
    /// card. Card order follows the network order of the list.
    fn group_networks(networks: Vec<Network>, rules: &[GroupRule]) -> Result<Vec<Card>> {
        let mut consumed = vec![false; networks.len()];
        // Anchor position -> formed group, emitted where its first member sat.
        let mut groups: Vec<Option<(Vec<usize>, NetworkDisambiguator)>> =
            vec![None; networks.len()];

        for rule in rules {
            let members: Vec<(usize, &GroupMember)> = rule
                .members
                .iter()
                .filter_map(|member| {
                    networks
                        .iter()
                        .position(|n| n.code == member.code)
                        .filter(|&i| !consumed[i])
                        .map(|i| (i, member))
                })
                .collect();
            if members.len() < 2 {
                continue;
            }

            let shape = &networks[members[0].0].input_elements;
            if !members
                .iter()
                .all(|&(i, _)| same_shape(&networks[i].input_elements, shape))
            {
                log::warn!(
                    "grouping rule {:?} spans structurally different forms; keeping standalone cards",
                    members.iter().map(|&(_, m)| &m.code).collect::<Vec<_>>()
                );
                continue;
            }

            let mut switch = NetworkDisambiguator::new();
            for &(_, member) in &members {
                let pattern = member.pattern.as_deref().ok_or_else(|| {
                    FlowError::Configuration(format!(
                        "grouped network {} has no selection pattern",
                        member.code
                    ))
                })?;
                switch.add_selection_pattern(&member.code, pattern)?;
            }

            let indices: Vec<usize> = members.iter().map(|&(i, _)| i).collect();
            for &i in &indices {
                consumed[i] = true;
            }
            let anchor = indices.iter().copied().min().unwrap_or(0);
            groups[anchor] = Some((indices, switch));
        }

        let mut cards = Vec::new();
        for (index, network) in networks.iter().enumerate() {
            if let Some((member_indices, switch)) = groups[index].take() {
                let grouped = member_indices
                    .iter()
                    .map(|&i| networks[i].clone())
                    .collect();
                cards.push(Card::Network(NetworkCard::grouped(grouped, switch)));
            } else if !consumed[index] {
                cards.push(Card::Network(NetworkCard::single(network.clone())));
            }
        }
        Ok(cards)
    }
}
