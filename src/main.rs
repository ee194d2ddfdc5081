use chrono::Utc;
use clap::Parser;
use triage_etl::config::{self, Cli, CliConfig, Command, ListConfig, ResolveConfig, ReviewAction};
use triage_etl::domain::model::{sla_breach_count, Session, Ticket};
use triage_etl::utils::{logger, validation::Validate};
use triage_etl::{KnowledgeEntry, LocalStorage, TriageApi, TriageEngine, TriageError, UploadPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ingest(config) => run_ingest(config).await,
        Command::Pending(config) => list_tickets(config, true).await,
        Command::Resolved(config) => list_tickets(config, false).await,
        Command::Resolve(config) => run_resolve(config).await,
    }
}

async fn run_ingest(config: CliConfig) -> anyhow::Result<()> {
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting triage ingest");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }
    validate_or_exit(&config);

    let storage = LocalStorage::current_dir();
    let pipeline = UploadPipeline::new(storage, config);
    let engine = TriageEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("Triage ingest completed");
            println!(
                "Done: {} rows parsed, {} valid, {} invalid, {} submitted",
                summary.total_rows, summary.valid_rows, summary.invalid_rows, summary.submitted
            );
            if !summary.ticket_ids.is_empty() {
                println!("Created tickets: {}", summary.ticket_ids.join(", "));
            }
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}

async fn list_tickets(config: ListConfig, pending: bool) -> anyhow::Result<()> {
    logger::init_cli_logger(config.verbose);
    validate_or_exit(&config);

    let api = TriageApi::new(config.api_endpoint.clone());
    let session = Session::new(
        config.agent_id.clone().unwrap_or_else(|| "cli".to_string()),
        config::resolve_token(config.token.as_deref()),
    );

    let result = if pending {
        api.pending_tickets(&session, config.agent_id.as_deref()).await
    } else {
        api.resolved_tickets(&session, config.agent_id.as_deref()).await
    };

    match result {
        Ok(tickets) => {
            if pending {
                print_pending(&tickets);
            } else {
                print_resolved(&tickets);
            }
        }
        Err(e) => report_failure(&e),
    }

    Ok(())
}

fn print_pending(tickets: &[Ticket]) {
    let now = Utc::now();
    for ticket in tickets {
        let sla = if ticket.is_sla_breached(now) {
            "SLA BREACH"
        } else {
            "within SLA"
        };
        println!(
            "{}  {}  [{}]  {}",
            ticket.ticket_id,
            ticket.product.as_deref().unwrap_or("-"),
            sla,
            ticket.ai_resolution.as_deref().unwrap_or("(no AI resolution)")
        );
    }
    println!(
        "{} pending, {} past the SLA window",
        tickets.len(),
        sla_breach_count(tickets, now)
    );
}

fn print_resolved(tickets: &[Ticket]) {
    for ticket in tickets {
        println!(
            "{}  {}  {}",
            ticket.ticket_id,
            ticket.status,
            ticket
                .edited_resolution
                .as_deref()
                .or(ticket.ai_resolution.as_deref())
                .unwrap_or("-")
        );
    }
    println!("{} resolved", tickets.len());
}

async fn run_resolve(config: ResolveConfig) -> anyhow::Result<()> {
    logger::init_cli_logger(config.verbose);
    validate_or_exit(&config);

    let api = TriageApi::new(config.api_endpoint.clone());
    let session = Session::new(
        config.user_id.clone(),
        config::resolve_token(config.token.as_deref()),
    );

    let status = config.action.status();
    let ticket = match api
        .update_status(
            &session,
            &config.ticket_id,
            status,
            config.resolution.as_deref(),
        )
        .await
    {
        Ok(ticket) => ticket,
        Err(e) => report_failure(&e),
    };
    println!("{} is now {}", ticket.ticket_id, ticket.status);

    if config.publish && config.action == ReviewAction::Approve {
        let resolution = config
            .resolution
            .clone()
            .or_else(|| ticket.edited_resolution.clone())
            .or_else(|| ticket.ai_resolution.clone())
            .unwrap_or_default();
        let product = ticket.product.clone().unwrap_or_default();
        let entry = KnowledgeEntry {
            ticket_id: ticket.ticket_id.clone(),
            issue_summary: ticket.conversation_id.clone().unwrap_or_default(),
            resolution,
            category: product.clone(),
            product: product.clone(),
            root_cause: String::new(),
            tags: product,
        };
        match api.add_to_knowledge_base(&session, &entry).await {
            Ok(response) if response.success => {
                println!("Published resolution to the knowledge base");
            }
            Ok(_) => {
                tracing::warn!("Knowledge base declined the entry");
            }
            Err(e) => report_failure(&e),
        }
    }

    Ok(())
}

fn validate_or_exit(config: &impl Validate) {
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e.user_friendly_message());
        eprintln!("Suggestion: {}", e.recovery_suggestion());
        std::process::exit(2);
    }
}

fn report_failure(e: &TriageError) -> ! {
    tracing::error!("Command failed: {}", e);
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
    std::process::exit(1);
}
