mod common;

use common::*;
use payflow::application::builder::SessionContext;
use payflow::application::orchestrator::{CheckoutOrchestrator, FlowConfig, FlowState};
use payflow::domain::interaction::{Interaction, InteractionCode, REASON_OK};
use payflow::domain::ports::{CloseCode, RedirectStore};
use payflow::domain::redirect::RedirectResult;
use payflow::domain::registration::RegistrationRule;
use payflow::domain::session::OperationType;
use payflow::infrastructure::in_memory::InMemoryRedirectStore;
use payflow::infrastructure::scripted::{ScriptedGateway, ScriptedResponse};
use std::collections::HashMap;

fn charge_list() -> ScriptedResponse {
    ScriptedResponse::List(list_response(
        OperationType::Charge,
        vec![network("VISA", RegistrationRule::None, RegistrationRule::None)],
    ))
}

fn orchestrator_with(
    responses: Vec<ScriptedResponse>,
    bridge: &RecordingBridge,
    store: InMemoryRedirectStore,
    view: &RecordingView,
) -> CheckoutOrchestrator {
    CheckoutOrchestrator::new(
        FlowConfig::payment_list(list_url(), vec![], SessionContext::default()),
        Box::new(ScriptedGateway::new(responses)),
        bridge.boxed(),
        Box::new(store),
        view.boxed(),
    )
}

fn redirect_result(correlation_id: &str, code: InteractionCode, reason: &str) -> RedirectResult {
    RedirectResult {
        correlation_id: correlation_id.to_string(),
        interaction: Interaction::new(code, reason),
        parameters: HashMap::new(),
    }
}

#[tokio::test]
async fn test_redirect_is_persisted_and_handed_to_the_bridge() {
    let bridge = RecordingBridge::new(true);
    let store = InMemoryRedirectStore::new();
    let view = RecordingView::default();
    let flow = orchestrator_with(
        vec![
            charge_list(),
            ScriptedResponse::Operation(redirecting_result("op-42")),
        ],
        &bridge,
        store.clone(),
        &view,
    );

    flow.start(None).await.unwrap();
    let operation = operation_for(&flow.session().await.unwrap(), "VISA");
    flow.submit(&operation).await.unwrap();

    assert_eq!(flow.state().await, FlowState::AwaitingRedirect);
    assert!(view.close_result().is_none());

    let performed = bridge.performed();
    assert_eq!(performed.len(), 1);
    assert_eq!(performed[0].correlation_id, "op-42");
    assert_eq!(performed[0].parameters.get("MD").map(String::as_str), Some("token"));

    let persisted = store.load().await.unwrap();
    assert_eq!(persisted.unwrap().correlation_id, "op-42");
}

#[tokio::test]
async fn test_redirect_survives_restart() {
    let bridge = RecordingBridge::new(true);
    let store = InMemoryRedirectStore::new();
    let first_view = RecordingView::default();
    let first = orchestrator_with(
        vec![
            charge_list(),
            ScriptedResponse::Operation(redirecting_result("op-42")),
        ],
        &bridge,
        store.clone(),
        &first_view,
    );
    first.start(None).await.unwrap();
    let operation = operation_for(&first.session().await.unwrap(), "VISA");
    first.submit(&operation).await.unwrap();
    drop(first);

    // The host process is torn down and recreated; only the store survives.
    let second_view = RecordingView::default();
    let second = orchestrator_with(vec![], &bridge, store.clone(), &second_view);
    second
        .start(Some(redirect_result("op-42", InteractionCode::Proceed, REASON_OK)))
        .await
        .unwrap();

    assert_eq!(second.state().await, FlowState::Closed);
    let result = second_view.close_result().unwrap();
    assert_eq!(result.code, CloseCode::Proceed);
    // Nothing pending anymore.
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_mismatched_redirect_result_is_treated_as_abandoned() {
    let bridge = RecordingBridge::new(true);
    let store = InMemoryRedirectStore::new();
    let view = RecordingView::default();
    let first = orchestrator_with(
        vec![
            charge_list(),
            ScriptedResponse::Operation(redirecting_result("op-42")),
        ],
        &bridge,
        store.clone(),
        &view,
    );
    first.start(None).await.unwrap();
    let operation = operation_for(&first.session().await.unwrap(), "VISA");
    first.submit(&operation).await.unwrap();
    drop(first);

    let second_view = RecordingView::default();
    let second = orchestrator_with(vec![], &bridge, store.clone(), &second_view);
    second
        .start(Some(redirect_result("op-99", InteractionCode::Proceed, REASON_OK)))
        .await
        .unwrap();

    let result = second_view.close_result().unwrap();
    assert_eq!(result.code, CloseCode::Error);
    assert_eq!(result.interaction.unwrap().code, InteractionCode::Abort);
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_restart_without_result_is_treated_as_abandoned() {
    let bridge = RecordingBridge::new(true);
    let store = InMemoryRedirectStore::new();
    let first = orchestrator_with(
        vec![
            charge_list(),
            ScriptedResponse::Operation(redirecting_result("op-42")),
        ],
        &bridge,
        store.clone(),
        &RecordingView::default(),
    );
    first.start(None).await.unwrap();
    let operation = operation_for(&first.session().await.unwrap(), "VISA");
    first.submit(&operation).await.unwrap();
    drop(first);

    let view = RecordingView::default();
    let second = orchestrator_with(vec![], &bridge, store.clone(), &view);
    second.start(None).await.unwrap();

    assert_eq!(view.close_result().unwrap().code, CloseCode::Error);
}

#[tokio::test]
async fn test_failed_redirect_result_closes_with_error() {
    let bridge = RecordingBridge::new(true);
    let store = InMemoryRedirectStore::new();
    let first = orchestrator_with(
        vec![
            charge_list(),
            ScriptedResponse::Operation(redirecting_result("op-42")),
        ],
        &bridge,
        store.clone(),
        &RecordingView::default(),
    );
    first.start(None).await.unwrap();
    let operation = operation_for(&first.session().await.unwrap(), "VISA");
    first.submit(&operation).await.unwrap();

    let view = RecordingView::default();
    let second = orchestrator_with(vec![], &bridge, store.clone(), &view);
    second
        .start(Some(redirect_result("op-42", InteractionCode::Abort, "USER_CANCELLED")))
        .await
        .unwrap();

    let result = view.close_result().unwrap();
    assert_eq!(result.code, CloseCode::Error);
    assert_eq!(result.interaction.unwrap().code, InteractionCode::Abort);
}

#[tokio::test]
async fn test_unsupported_redirect_fails_fast_without_persisting() {
    let bridge = RecordingBridge::new(false);
    let store = InMemoryRedirectStore::new();
    let view = RecordingView::default();
    let flow = orchestrator_with(
        vec![
            charge_list(),
            ScriptedResponse::Operation(redirecting_result("op-42")),
        ],
        &bridge,
        store.clone(),
        &view,
    );

    flow.start(None).await.unwrap();
    let operation = operation_for(&flow.session().await.unwrap(), "VISA");
    flow.submit(&operation).await.unwrap();

    assert_eq!(view.close_result().unwrap().code, CloseCode::Error);
    assert!(bridge.performed().is_empty());
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_redirect_without_identification_is_configuration_failure() {
    let bridge = RecordingBridge::new(true);
    let store = InMemoryRedirectStore::new();
    let view = RecordingView::default();
    let mut result = redirecting_result("unused");
    result.identification = None;
    let flow = orchestrator_with(
        vec![charge_list(), ScriptedResponse::Operation(result)],
        &bridge,
        store.clone(),
        &view,
    );

    flow.start(None).await.unwrap();
    let operation = operation_for(&flow.session().await.unwrap(), "VISA");
    flow.submit(&operation).await.unwrap();

    assert_eq!(view.close_result().unwrap().code, CloseCode::Error);
    assert!(bridge.performed().is_empty());
}
