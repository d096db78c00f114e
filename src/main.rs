use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payflow::application::builder::SessionContext;
use payflow::application::orchestrator::{CheckoutOrchestrator, FlowConfig};
use payflow::domain::operation::{DeletionRequest, Operation};
use payflow::domain::ports::RedirectStoreBox;
use payflow::domain::registration::CheckboxMode;
use payflow::domain::session::{Card, Session};
use payflow::infrastructure::file_store::FileRedirectStore;
use payflow::infrastructure::in_memory::InMemoryRedirectStore;
use payflow::infrastructure::scripted::{ConsoleView, LoggingBridge, ScriptedGateway};
use payflow::interfaces::scenario::{Action, ScenarioReader, ScreenKind};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario file driving the scripted processor
    scenario: PathBuf,

    /// Path to the persisted redirect request (optional). If provided, uses
    /// the file-backed store so a rerun resumes the redirect.
    #[arg(long)]
    redirect_store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let file = File::open(cli.scenario).into_diagnostic()?;
    let scenario = ScenarioReader::new(file).read().into_diagnostic()?;

    let store: RedirectStoreBox = match cli.redirect_store {
        Some(path) => Box::new(FileRedirectStore::new(path)),
        None => Box::new(InMemoryRedirectStore::new()),
    };
    let context = SessionContext::new(scenario.supported_methods.iter().cloned());
    let config = match scenario.screen {
        ScreenKind::PaymentList => FlowConfig::payment_list(
            scenario.list_url.clone(),
            scenario.grouping_rules.clone(),
            context,
        ),
        ScreenKind::AccountUpdate => FlowConfig::account_update(
            scenario.list_url.clone(),
            scenario.grouping_rules.clone(),
            context,
        ),
    };

    let orchestrator = CheckoutOrchestrator::new(
        config,
        Box::new(ScriptedGateway::new(scenario.responses)),
        Box::new(LoggingBridge),
        store,
        Box::new(ConsoleView::new(scenario.prompt_answers)),
    );

    orchestrator.start(None).await.into_diagnostic()?;

    for action in scenario.actions {
        match action {
            Action::TypeNumber {
                section,
                card,
                value,
            } => match orchestrator.smart_switch_input(section, card, &value).await {
                Ok(outcome) => println!(
                    "SWITCH {} -> {}",
                    value,
                    outcome.active_network.as_deref().unwrap_or("undetermined")
                ),
                Err(e) => eprintln!("Error evaluating input: {e}"),
            },
            Action::Submit { network, account } => {
                let Some(session) = orchestrator.session().await else {
                    eprintln!("Error: no session to submit against");
                    continue;
                };
                match build_operation(&session, &network, account) {
                    Some(operation) => {
                        if let Err(e) = orchestrator.submit(&operation).await {
                            eprintln!("Error submitting operation: {e}");
                        }
                    }
                    None => eprintln!("Error: network {network} not present in session"),
                }
            }
            Action::Delete { account_id } => {
                let Some(session) = orchestrator.session().await else {
                    eprintln!("Error: no session to delete from");
                    continue;
                };
                match build_deletion(&session, &account_id) {
                    Some(Ok(request)) => {
                        if let Err(e) = orchestrator.delete_account(&request).await {
                            eprintln!("Error deleting account: {e}");
                        }
                    }
                    Some(Err(e)) => eprintln!("Error preparing deletion: {e}"),
                    None => eprintln!("Error: account {account_id} not present in session"),
                }
            }
        }
    }

    Ok(())
}

fn build_operation(
    session: &Session,
    network_code: &str,
    account: std::collections::BTreeMap<String, String>,
) -> Option<Operation> {
    let (_, _, card) = session.find_network_card(network_code)?;
    let network = card.networks().iter().find(|n| n.code == network_code)?;
    let mut operation = Operation::for_network(network, session.operation_type);
    for (name, value) in account {
        operation.put_account_field(name, value);
    }
    let registration = &network.registration;
    if registration.registration.mode != CheckboxMode::Hidden {
        operation.set_auto_registration(registration.registration.mode.initial_value());
    }
    if registration.recurrence.mode != CheckboxMode::Hidden {
        operation.set_allow_recurrence(registration.recurrence.mode.initial_value());
    }
    Some(operation)
}

fn build_deletion(
    session: &Session,
    account_id: &str,
) -> Option<payflow::error::Result<DeletionRequest>> {
    session.cards().find_map(|card| match card {
        Card::Account(account_card) if account_card.account.account_id == account_id => {
            Some(DeletionRequest::for_account(account_card))
        }
        _ => None,
    })
}
