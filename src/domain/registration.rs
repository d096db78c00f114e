use crate::domain::session::OperationType;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};

/// Raw rule string sent by the processor for each policy axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationRule {
    None,
    Forced,
    ForcedDisplayed,
    Optional,
    OptionalPreselected,
}

/// How the checkbox for one policy axis is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxMode {
    /// Not rendered, value off.
    Hidden,
    /// Value on, not rendered.
    Forced,
    /// Value on, rendered but locked.
    ForcedDisplayed,
    /// Rendered, interactive, initially unchecked.
    Optional,
    /// Rendered, interactive, initially checked.
    OptionalPreselected,
}

impl CheckboxMode {
    pub fn initial_value(self) -> bool {
        matches!(
            self,
            CheckboxMode::Forced | CheckboxMode::ForcedDisplayed | CheckboxMode::OptionalPreselected
        )
    }

    pub fn is_visible(self) -> bool {
        matches!(
            self,
            CheckboxMode::ForcedDisplayed | CheckboxMode::Optional | CheckboxMode::OptionalPreselected
        )
    }

    pub fn is_interactive(self) -> bool {
        matches!(self, CheckboxMode::Optional | CheckboxMode::OptionalPreselected)
    }
}

pub const LABEL_REGISTRATION: &str = "networks.registration.label";
pub const LABEL_RECURRENCE: &str = "networks.recurrence.label";

/// Resolved presentation for one policy axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationDecision {
    pub mode: CheckboxMode,
    pub label_key: &'static str,
}

/// Resolved presentation for both axes, derived once at model-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRegistration {
    pub registration: RegistrationDecision,
    pub recurrence: RegistrationDecision,
}

/// Table-driven resolution of the registration/recurrence policy.
///
/// Two fixed tables (UPDATE vs. all other operation types) cover every legal
/// rule pair. In UPDATE flows neither axis is user-togglable, so every
/// non-NONE rule collapses to a forced, invisible checkbox; in the default
/// flow the OPTIONAL variants stay interactive.
pub struct RegistrationPolicy;

impl RegistrationPolicy {
    pub fn resolve(
        operation_type: OperationType,
        registration: RegistrationRule,
        recurrence: RegistrationRule,
    ) -> Result<ResolvedRegistration> {
        if !Self::is_legal_pair(registration, recurrence) {
            return Err(FlowError::Configuration(format!(
                "unsupported registration combination {registration:?}/{recurrence:?}"
            )));
        }
        let mode = if operation_type == OperationType::Update {
            Self::update_mode
        } else {
            Self::default_mode
        };
        Ok(ResolvedRegistration {
            registration: RegistrationDecision {
                mode: mode(registration),
                label_key: LABEL_REGISTRATION,
            },
            recurrence: RegistrationDecision {
                mode: mode(recurrence),
                label_key: LABEL_RECURRENCE,
            },
        })
    }

    /// Recurrence may never be stronger than registration, and the forced and
    /// optional families do not mix.
    fn is_legal_pair(registration: RegistrationRule, recurrence: RegistrationRule) -> bool {
        use RegistrationRule as Rule;
        matches!(
            (registration, recurrence),
            (Rule::None, Rule::None)
                | (Rule::Forced, Rule::None)
                | (Rule::Forced, Rule::Forced)
                | (Rule::ForcedDisplayed, Rule::None)
                | (Rule::ForcedDisplayed, Rule::Forced)
                | (Rule::ForcedDisplayed, Rule::ForcedDisplayed)
                | (Rule::Optional, Rule::None)
                | (Rule::Optional, Rule::Optional)
                | (Rule::OptionalPreselected, Rule::None)
                | (Rule::OptionalPreselected, Rule::Optional)
                | (Rule::OptionalPreselected, Rule::OptionalPreselected)
        )
    }

    fn default_mode(rule: RegistrationRule) -> CheckboxMode {
        match rule {
            RegistrationRule::None => CheckboxMode::Hidden,
            RegistrationRule::Forced => CheckboxMode::Forced,
            RegistrationRule::ForcedDisplayed => CheckboxMode::ForcedDisplayed,
            RegistrationRule::Optional => CheckboxMode::Optional,
            RegistrationRule::OptionalPreselected => CheckboxMode::OptionalPreselected,
        }
    }

    fn update_mode(rule: RegistrationRule) -> CheckboxMode {
        match rule {
            RegistrationRule::None => CheckboxMode::Hidden,
            _ => CheckboxMode::Forced,
        }
    }
}
