use crate::application::builder::{SessionContext, SessionModelBuilder};
use crate::domain::interaction::{Interaction, InteractionCode, REASON_CLIENT_ABORT};
use crate::domain::operation::{DeletionRequest, Operation};
use crate::domain::ports::{
    CheckoutViewBox, CloseResult, GatewayBox, PromptChoice, RedirectBridgeBox, RedirectStoreBox,
};
use crate::domain::redirect::{REDIRECT_REQUEST_CODE, RedirectRequest, RedirectResult};
use crate::domain::session::{Card, Session};
use crate::error::{FlowError, GatewayError, Result};
use crate::interfaces::processor::{GroupRule, ListResponse, OperationResult, RedirectDto};
use tokio::sync::Mutex;
use url::Url;

/// Logical state of one payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Loading,
    Ready,
    Submitting,
    AwaitingRedirect,
    Closed,
}

/// What TRY_OTHER_NETWORK / TRY_OTHER_ACCOUNT does after showing its message.
/// The two host screens behave differently here, so the choice is explicit
/// per-screen configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryOtherBehavior {
    ReloadSession,
    RedisplaySession,
}

#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub list_url: Url,
    pub try_other: TryOtherBehavior,
    pub grouping_rules: Vec<GroupRule>,
    pub context: SessionContext,
}

impl FlowConfig {
    /// Configuration of the payment-list screen.
    pub fn payment_list(
        list_url: Url,
        grouping_rules: Vec<GroupRule>,
        context: SessionContext,
    ) -> Self {
        Self {
            list_url,
            try_other: TryOtherBehavior::ReloadSession,
            grouping_rules,
            context,
        }
    }

    /// Configuration of the account-update screen.
    pub fn account_update(
        list_url: Url,
        grouping_rules: Vec<GroupRule>,
        context: SessionContext,
    ) -> Self {
        Self {
            list_url,
            try_other: TryOtherBehavior::RedisplaySession,
            grouping_rules,
            context,
        }
    }
}

/// Result of feeding account-number input into a grouped card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub selection_changed: bool,
    pub active_network: Option<String>,
}

#[derive(Debug)]
struct Inner {
    state: FlowState,
    session: Option<Session>,
    result: Option<CloseResult>,
    /// Bumped by `stop()`; a gateway result observed under a stale generation
    /// is dropped without touching state.
    generation: u64,
    /// At most one load or submission may be outstanding.
    busy: bool,
}

enum OutcomeKind {
    Submission,
    Deletion,
}

/// The central state machine driving a single payment attempt, from "list
/// loaded" to "attempt resolved".
///
/// All transitions are serialized through the inner mutex; background work is
/// awaited gateway calls delivering exactly one result each. The orchestrator
/// is created once per screen; a pending redirect may outlive it through the
/// [`RedirectStore`](crate::domain::ports::RedirectStore) and is replayed into
/// a freshly constructed instance by [`start`](Self::start).
pub struct CheckoutOrchestrator {
    config: FlowConfig,
    gateway: GatewayBox,
    bridge: RedirectBridgeBox,
    store: RedirectStoreBox,
    view: CheckoutViewBox,
    inner: Mutex<Inner>,
}

impl CheckoutOrchestrator {
    pub fn new(
        config: FlowConfig,
        gateway: GatewayBox,
        bridge: RedirectBridgeBox,
        store: RedirectStoreBox,
        view: CheckoutViewBox,
    ) -> Self {
        Self {
            config,
            gateway,
            bridge,
            store,
            view,
            inner: Mutex::new(Inner {
                state: FlowState::Idle,
                session: None,
                result: None,
                generation: 0,
                busy: false,
            }),
        }
    }

    pub async fn state(&self) -> FlowState {
        self.inner.lock().await.state
    }

    /// The structured result the screen closed with, once CLOSED.
    pub async fn result(&self) -> Option<CloseResult> {
        self.inner.lock().await.result.clone()
    }

    /// Snapshot of the current session model, if one is loaded.
    pub async fn session(&self) -> Option<Session> {
        self.inner.lock().await.session.clone()
    }

    /// Brings a freshly constructed orchestrator to life. A persisted
    /// redirect request is replayed first — as though its result had just
    /// arrived — before any other input is processed; without one, this is a
    /// plain initial load.
    pub async fn start(&self, pending: Option<RedirectResult>) -> Result<()> {
        {
            let inner = self.inner.lock().await;
            if inner.state != FlowState::Idle {
                return Err(FlowError::IllegalState(
                    "start on an already running flow".into(),
                ));
            }
        }
        match self.store.load().await? {
            Some(request) => {
                self.store.clear().await?;
                match pending {
                    Some(result) if result.matches(&request) => {
                        log::info!("resuming flow from redirect {}", request.correlation_id);
                        {
                            let mut inner = self.inner.lock().await;
                            inner.state = FlowState::Submitting;
                            inner.busy = true;
                        }
                        let outcome = OperationResult {
                            result_info: format!(
                                "redirect result for {}",
                                request.correlation_id
                            ),
                            interaction: result.interaction,
                            redirect: None,
                            identification: None,
                        };
                        self.apply_operation_outcome(outcome, OutcomeKind::Submission)
                            .await
                    }
                    _ => {
                        log::warn!("redirect {} was abandoned", request.correlation_id);
                        self.close(CloseResult::error(
                            "redirect abandoned before a result arrived",
                            Some(Interaction::new(InteractionCode::Abort, REASON_CLIENT_ABORT)),
                        ))
                        .await;
                        Ok(())
                    }
                }
            }
            None => self.load().await,
        }
    }

    /// Loads (or reloads) the session. A transport failure asks the user to
    /// retry or cancel; any processor interaction other than PROCEED closes
    /// the screen with the processor's payload.
    pub async fn load(&self) -> Result<()> {
        let generation = self.begin(FlowState::Loading, "load").await?;
        loop {
            self.view.show_progress(true);
            let response = self.gateway.load_session(&self.config.list_url).await;
            if self.is_stale(generation).await {
                return Ok(());
            }
            self.view.show_progress(false);
            match response {
                Ok(list) => return self.apply_list(list).await,
                Err(GatewayError::Processor(info)) => {
                    self.close(CloseResult::error(info.result_info, info.interaction))
                        .await;
                    return Ok(());
                }
                Err(GatewayError::Transport(reason)) => {
                    log::warn!("session load failed: {reason}");
                    match self.view.prompt_retry(&reason).await {
                        PromptChoice::Positive => continue,
                        PromptChoice::Negative | PromptChoice::Dismissed => {
                            self.close(CloseResult::error(
                                format!("connection failure: {reason}"),
                                None,
                            ))
                            .await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Submits the assembled operation. On RETRY the very same instance stays
    /// valid for resubmission; the orchestrator never mutates it.
    pub async fn submit(&self, operation: &Operation) -> Result<()> {
        let generation = self.begin_from_ready("submit").await?;
        loop {
            self.view.show_progress(true);
            let response = self.gateway.submit_operation(operation).await;
            if self.is_stale(generation).await {
                return Ok(());
            }
            self.view.show_progress(false);
            match response {
                Ok(result) => {
                    return self
                        .apply_operation_outcome(result, OutcomeKind::Submission)
                        .await;
                }
                Err(GatewayError::Processor(info)) => {
                    self.close(CloseResult::error(info.result_info, info.interaction))
                        .await;
                    return Ok(());
                }
                Err(GatewayError::Transport(reason)) => {
                    log::warn!(
                        "submission for {} failed: {reason}",
                        operation.network_code()
                    );
                    match self.view.prompt_retry(&reason).await {
                        // Resubmit the same operation instance.
                        PromptChoice::Positive => continue,
                        PromptChoice::Negative | PromptChoice::Dismissed => {
                            self.close(CloseResult::error(
                                format!("connection failure: {reason}"),
                                None,
                            ))
                            .await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Deletes a saved account. Outcomes are interpreted like submissions,
    /// except that a successful deletion always reloads — the list changed.
    pub async fn delete_account(&self, request: &DeletionRequest) -> Result<()> {
        let generation = self.begin_from_ready("delete").await?;
        loop {
            self.view.show_progress(true);
            let response = self.gateway.delete_account(request).await;
            if self.is_stale(generation).await {
                return Ok(());
            }
            self.view.show_progress(false);
            match response {
                Ok(result) => {
                    return self
                        .apply_operation_outcome(result, OutcomeKind::Deletion)
                        .await;
                }
                Err(GatewayError::Processor(info)) => {
                    self.close(CloseResult::error(info.result_info, info.interaction))
                        .await;
                    return Ok(());
                }
                Err(GatewayError::Transport(reason)) => {
                    log::warn!("deletion of {} failed: {reason}", request.account_id);
                    match self.view.prompt_retry(&reason).await {
                        PromptChoice::Positive => continue,
                        PromptChoice::Negative | PromptChoice::Dismissed => {
                            self.close(CloseResult::error(
                                format!("connection failure: {reason}"),
                                None,
                            ))
                            .await;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Feeds account-number input into the grouped card at the given
    /// position. Mutates the disambiguator synchronously on the calling
    /// thread.
    pub async fn smart_switch_input(
        &self,
        section: usize,
        card: usize,
        value: &str,
    ) -> Result<SwitchOutcome> {
        let mut inner = self.inner.lock().await;
        let session = inner
            .session
            .as_mut()
            .ok_or_else(|| FlowError::IllegalState("no session loaded".into()))?;
        let card = session
            .sections
            .get_mut(section)
            .and_then(|s| s.cards.get_mut(card))
            .ok_or_else(|| FlowError::IllegalState(format!("no card at {section}/{card}")))?;
        match card {
            Card::Network(network_card) => {
                let selection_changed = network_card.evaluate_input(value);
                Ok(SwitchOutcome {
                    selection_changed,
                    active_network: network_card.active_network().map(|n| n.code.clone()),
                })
            }
            Card::Account(_) | Card::Preset(_) => Err(FlowError::IllegalState(
                "card carries no network selection".into(),
            )),
        }
    }

    /// Detaches from in-flight work when the host screen pauses. Logical
    /// state is untouched; a late gateway result is dropped silently.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.busy = false;
        log::debug!("flow stopped; in-flight work detached");
    }

    async fn begin(&self, target: FlowState, what: &str) -> Result<u64> {
        let mut inner = self.inner.lock().await;
        if inner.state == FlowState::Closed {
            return Err(FlowError::IllegalState(format!("{what} after close")));
        }
        if inner.busy {
            return Err(FlowError::IllegalState(format!(
                "{what} while another request is outstanding"
            )));
        }
        inner.busy = true;
        inner.state = target;
        Ok(inner.generation)
    }

    async fn begin_from_ready(&self, what: &str) -> Result<u64> {
        {
            let inner = self.inner.lock().await;
            if inner.state != FlowState::Ready {
                return Err(FlowError::IllegalState(format!(
                    "{what} outside READY (state {:?})",
                    inner.state
                )));
            }
        }
        self.begin(FlowState::Submitting, what).await
    }

    async fn is_stale(&self, generation: u64) -> bool {
        self.inner.lock().await.generation != generation
    }

    async fn apply_list(&self, list: ListResponse) -> Result<()> {
        if list.interaction.code != InteractionCode::Proceed {
            self.close(CloseResult::error(list.result_info, Some(list.interaction)))
                .await;
            return Ok(());
        }
        match SessionModelBuilder::build(&list, &self.config.grouping_rules, &self.config.context)
        {
            Ok(session) => {
                let mut inner = self.inner.lock().await;
                inner.busy = false;
                inner.state = FlowState::Ready;
                inner.session = Some(session);
                if let Some(session) = inner.session.as_ref() {
                    self.view.show_session(session);
                }
                Ok(())
            }
            Err(error) => {
                log::error!("session construction failed: {error}");
                self.close(CloseResult::error(
                    format!("session construction failed: {error}"),
                    None,
                ))
                .await;
                Ok(())
            }
        }
    }

    async fn apply_operation_outcome(
        &self,
        result: OperationResult,
        kind: OutcomeKind,
    ) -> Result<()> {
        if result.interaction.code == InteractionCode::Proceed
            && let Some(redirect) = &result.redirect
        {
            return self.begin_redirect(redirect.clone(), &result).await;
        }

        match result.interaction.code {
            InteractionCode::Proceed => match kind {
                OutcomeKind::Deletion => self.reload().await,
                OutcomeKind::Submission => {
                    let operation_type = {
                        let inner = self.inner.lock().await;
                        inner.session.as_ref().map(|s| s.operation_type)
                    };
                    match operation_type {
                        Some(operation_type) if !operation_type.is_terminal() => {
                            if result.interaction.is_pending() {
                                self.view.show_pending_notice().await;
                                self.reload().await
                            } else if result.interaction.is_ok() {
                                self.reload().await
                            } else {
                                self.close(CloseResult::proceed(
                                    result.result_info,
                                    result.interaction,
                                ))
                                .await;
                                Ok(())
                            }
                        }
                        // Terminal operation types, or a flow resumed from a
                        // redirect with no session to return to.
                        _ => {
                            self.close(CloseResult::proceed(
                                result.result_info,
                                result.interaction,
                            ))
                            .await;
                            Ok(())
                        }
                    }
                }
            },
            InteractionCode::Reload => self.reload().await,
            InteractionCode::Retry => {
                self.view.show_interaction_message(&result.interaction);
                let mut inner = self.inner.lock().await;
                inner.busy = false;
                inner.state = FlowState::Ready;
                Ok(())
            }
            InteractionCode::TryOtherNetwork | InteractionCode::TryOtherAccount => {
                self.view.show_interaction_message(&result.interaction);
                match self.config.try_other {
                    TryOtherBehavior::ReloadSession => self.reload().await,
                    TryOtherBehavior::RedisplaySession => {
                        let redisplayed = {
                            let mut inner = self.inner.lock().await;
                            if inner.session.is_some() {
                                inner.busy = false;
                                inner.state = FlowState::Ready;
                                if let Some(session) = inner.session.as_ref() {
                                    self.view.show_session(session);
                                }
                                true
                            } else {
                                false
                            }
                        };
                        if redisplayed { Ok(()) } else { self.reload().await }
                    }
                }
            }
            InteractionCode::Abort | InteractionCode::Verify => {
                self.close(CloseResult::error(result.result_info, Some(result.interaction)))
                    .await;
                Ok(())
            }
        }
    }

    /// Persists the redirect request, hands control to the bridge and parks
    /// the flow until the out-of-band result returns — possibly into a future
    /// orchestrator instance.
    async fn begin_redirect(&self, redirect: RedirectDto, result: &OperationResult) -> Result<()> {
        let Some(identification) = &result.identification else {
            self.close(CloseResult::error(
                "redirect instruction without identification",
                None,
            ))
            .await;
            return Ok(());
        };
        let request = RedirectRequest {
            correlation_id: identification.long_id.clone(),
            request_code: REDIRECT_REQUEST_CODE,
            destination: redirect.url,
            method: redirect.method,
            parameters: redirect
                .parameters
                .into_iter()
                .map(|p| (p.name, p.value))
                .collect(),
        };
        if !self.bridge.supports(&request) {
            self.close(CloseResult::error(
                format!("host cannot perform redirect to {}", request.destination),
                None,
            ))
            .await;
            return Ok(());
        }
        if let Err(error) = self.store.save(&request).await {
            self.close(CloseResult::error(
                format!("failed to persist redirect request: {error}"),
                None,
            ))
            .await;
            return Ok(());
        }
        {
            let mut inner = self.inner.lock().await;
            inner.busy = false;
            inner.state = FlowState::AwaitingRedirect;
        }
        log::info!(
            "awaiting redirect {} via {}",
            request.correlation_id,
            request.destination
        );
        if let Err(error) = self.bridge.perform(&request).await {
            self.close(CloseResult::error(
                format!("redirect hand-off failed: {error}"),
                None,
            ))
            .await;
        }
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        {
            let mut inner = self.inner.lock().await;
            inner.busy = false;
        }
        self.load().await
    }

    async fn close(&self, result: CloseResult) {
        {
            let mut inner = self.inner.lock().await;
            inner.busy = false;
            inner.state = FlowState::Closed;
            inner.result = Some(result.clone());
        }
        log::info!("flow closed: {} ({})", result.code, result.result_info);
        self.view.close(&result);
    }
}
