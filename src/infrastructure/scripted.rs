//! Scripted collaborators backing the replay harness and the CLI tests: a
//! gateway answering from a queue, a console view printing the command trace,
//! and a bridge that only logs the hand-off.

use crate::domain::interaction::{ErrorInfo, Interaction};
use crate::domain::operation::{DeletionRequest, Operation};
use crate::domain::ports::{
    CheckoutView, CloseResult, GatewayResult, PaymentGateway, PromptChoice, RedirectBridge,
};
use crate::domain::redirect::RedirectRequest;
use crate::domain::session::Session;
use crate::error::GatewayError;
use crate::interfaces::processor::{ListResponse, OperationResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// One scripted gateway answer, consumed in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScriptedResponse {
    List(ListResponse),
    Operation(OperationResult),
    TransportFailure { message: String },
    ProcessorError(ErrorInfo),
}

/// Gateway that pops scripted responses instead of talking to a processor.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<ScriptedResponse>>,
}

impl ScriptedGateway {
    pub fn new(script: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    async fn pop(&self) -> Option<ScriptedResponse> {
        self.script.lock().await.pop_front()
    }

    fn exhausted() -> GatewayError {
        GatewayError::Transport("response script exhausted".into())
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn load_session(&self, _url: &url::Url) -> GatewayResult<ListResponse> {
        match self.pop().await {
            Some(ScriptedResponse::List(list)) => Ok(list),
            Some(ScriptedResponse::TransportFailure { message }) => {
                Err(GatewayError::Transport(message))
            }
            Some(ScriptedResponse::ProcessorError(info)) => Err(GatewayError::Processor(info)),
            Some(ScriptedResponse::Operation(_)) | None => Err(Self::exhausted()),
        }
    }

    async fn submit_operation(&self, _operation: &Operation) -> GatewayResult<OperationResult> {
        self.operation_response().await
    }

    async fn delete_account(&self, _request: &DeletionRequest) -> GatewayResult<OperationResult> {
        self.operation_response().await
    }
}

impl ScriptedGateway {
    async fn operation_response(&self) -> GatewayResult<OperationResult> {
        match self.pop().await {
            Some(ScriptedResponse::Operation(result)) => Ok(result),
            Some(ScriptedResponse::TransportFailure { message }) => {
                Err(GatewayError::Transport(message))
            }
            Some(ScriptedResponse::ProcessorError(info)) => Err(GatewayError::Processor(info)),
            Some(ScriptedResponse::List(_)) | None => Err(Self::exhausted()),
        }
    }
}

/// View that prints every command as one grep-able line and answers prompts
/// from a script (Negative once the script runs dry).
pub struct ConsoleView {
    answers: Mutex<VecDeque<PromptChoice>>,
}

impl ConsoleView {
    pub fn new(answers: impl IntoIterator<Item = PromptChoice>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
        }
    }
}

#[async_trait]
impl CheckoutView for ConsoleView {
    fn show_progress(&self, visible: bool) {
        println!("PROGRESS {}", if visible { "on" } else { "off" });
    }

    async fn prompt_retry(&self, reason: &str) -> PromptChoice {
        let answer = self
            .answers
            .lock()
            .await
            .pop_front()
            .unwrap_or(PromptChoice::Negative);
        println!("PROMPT retry ({reason}) -> {answer:?}");
        answer
    }

    async fn show_pending_notice(&self) {
        println!("NOTICE payment pending");
    }

    fn show_interaction_message(&self, interaction: &Interaction) {
        println!("MESSAGE {:?} {}", interaction.code, interaction.reason);
    }

    fn show_session(&self, session: &Session) {
        println!(
            "SESSION {:?} {} section(s) {} card(s)",
            session.operation_type,
            session.sections.len(),
            session.card_count()
        );
    }

    fn close(&self, result: &CloseResult) {
        println!("CLOSE {} {}", result.code, result.result_info);
    }
}

/// Bridge for environments without a real external hand-off; it accepts every
/// request and records the destination in the trace.
pub struct LoggingBridge;

#[async_trait]
impl RedirectBridge for LoggingBridge {
    fn supports(&self, _request: &RedirectRequest) -> bool {
        true
    }

    async fn perform(&self, request: &RedirectRequest) -> crate::error::Result<()> {
        println!(
            "REDIRECT {} {}",
            request.correlation_id, request.destination
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interaction::{InteractionCode, REASON_OK};
    use url::Url;

    #[tokio::test]
    async fn test_scripted_gateway_pops_in_order() {
        let gateway = ScriptedGateway::new([
            ScriptedResponse::TransportFailure {
                message: "offline".into(),
            },
            ScriptedResponse::Operation(OperationResult {
                result_info: "approved".into(),
                interaction: Interaction::new(InteractionCode::Proceed, REASON_OK),
                redirect: None,
                identification: None,
            }),
        ]);
        let url = Url::parse("https://api.example.net/lists/1").unwrap();
        assert!(matches!(
            gateway.load_session(&url).await,
            Err(GatewayError::Transport(_))
        ));
        let result = gateway.operation_response().await.unwrap();
        assert_eq!(result.result_info, "approved");
        assert!(matches!(
            gateway.operation_response().await,
            Err(GatewayError::Transport(_))
        ));
    }
}
