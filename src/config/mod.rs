pub mod cli;

use crate::core::ConfigProvider;
use crate::domain::model::TicketStatus;
use crate::utils::error::{Result, TriageError};
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Parser)]
#[command(name = "triage-etl")]
#[command(about = "Support-ticket triage: spreadsheet ingestion and agent review")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest a spreadsheet and submit valid tickets for triage
    Ingest(CliConfig),
    /// List pending tickets with SLA-breach flags
    Pending(ListConfig),
    /// List resolved (approved/rejected) tickets
    Resolved(ListConfig),
    /// Approve, reject, or edit a ticket's resolution
    Resolve(ResolveConfig),
}

/// Resolves the backend token: explicit flag first, then TRIAGE_API_TOKEN.
pub fn resolve_token(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var("TRIAGE_API_TOKEN").ok())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct CliConfig {
    /// Spreadsheet of exported support conversations (.xlsx or .csv)
    pub input_file: String,

    /// Triage backend base URL, e.g. http://localhost:8000/api.
    /// Omit for a report-only run (nothing is submitted).
    #[arg(long)]
    pub api_endpoint: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// User id recorded as submitted_by on uploaded tickets
    #[arg(long, default_value = "unknown")]
    pub submitted_by: String,

    /// Bearer token for the backend; falls back to TRIAGE_API_TOKEN
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn input_file(&self) -> &str {
        &self.input_file
    }

    fn api_endpoint(&self) -> Option<&str> {
        self.api_endpoint.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn submitted_by(&self) -> &str {
        &self.submitted_by
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input_file", &self.input_file)?;
        validation::validate_file_extensions(
            "input_file",
            std::slice::from_ref(&self.input_file),
            &["xlsx", "csv"],
        )?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("submitted_by", &self.submitted_by)?;

        if let Some(endpoint) = &self.api_endpoint {
            validation::validate_url("api_endpoint", endpoint)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct ListConfig {
    /// Triage backend base URL, e.g. http://localhost:8000/api
    #[arg(long)]
    pub api_endpoint: String,

    /// Only tickets assigned to this agent, e.g. agent1
    #[arg(long)]
    pub agent_id: Option<String>,

    /// Bearer token for the backend; falls back to TRIAGE_API_TOKEN
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for ListConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Args)]
pub struct ResolveConfig {
    /// Ticket id, e.g. CS-1001
    pub ticket_id: String,

    /// Review action to apply
    #[arg(long, value_enum)]
    pub action: ReviewAction,

    /// Edited resolution text (required for edit)
    #[arg(long)]
    pub resolution: Option<String>,

    /// On approval, also publish the resolution to the knowledge base
    #[arg(long)]
    pub publish: bool,

    /// Triage backend base URL, e.g. http://localhost:8000/api
    #[arg(long)]
    pub api_endpoint: String,

    /// User id recorded on knowledge-base entries
    #[arg(long, default_value = "unknown")]
    pub user_id: String,

    /// Bearer token for the backend; falls back to TRIAGE_API_TOKEN
    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for ResolveConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("ticket_id", &self.ticket_id)?;
        validation::validate_url("api_endpoint", &self.api_endpoint)?;

        if self.action == ReviewAction::Edit && self.resolution.is_none() {
            return Err(TriageError::MissingConfigError {
                field: "resolution".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ReviewAction {
    Approve,
    Reject,
    Edit,
}

impl ReviewAction {
    pub fn status(self) -> TicketStatus {
        match self {
            ReviewAction::Approve => TicketStatus::Approved,
            ReviewAction::Reject => TicketStatus::Rejected,
            ReviewAction::Edit => TicketStatus::Edited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config() -> CliConfig {
        CliConfig {
            input_file: "conversations.xlsx".to_string(),
            api_endpoint: Some("http://localhost:8000/api".to_string()),
            output_path: "./output".to_string(),
            submitted_by: "user-7".to_string(),
            token: None,
            verbose: false,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_report_only_config_needs_no_endpoint() {
        let mut config = config();
        config.api_endpoint = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unsupported_input_extension() {
        let mut config = config();
        config.input_file = "conversations.pdf".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let mut config = config();
        config.api_endpoint = Some("not a url".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_parses_ingest_subcommand() {
        let cli = Cli::try_parse_from([
            "triage-etl",
            "ingest",
            "conversations.xlsx",
            "--api-endpoint",
            "http://localhost:8000/api",
            "--submitted-by",
            "user-7",
        ])
        .unwrap();

        match cli.command {
            Command::Ingest(config) => {
                assert_eq!(config.input_file, "conversations.xlsx");
                assert_eq!(
                    config.api_endpoint.as_deref(),
                    Some("http://localhost:8000/api")
                );
                assert_eq!(config.submitted_by, "user-7");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_pending_subcommand() {
        let cli = Cli::try_parse_from([
            "triage-etl",
            "pending",
            "--api-endpoint",
            "http://localhost:8000/api",
            "--agent-id",
            "agent1",
        ])
        .unwrap();

        match cli.command {
            Command::Pending(config) => {
                assert_eq!(config.agent_id.as_deref(), Some("agent1"));
                assert!(config.validate().is_ok());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_resolve_subcommand() {
        let cli = Cli::try_parse_from([
            "triage-etl",
            "resolve",
            "CS-1001",
            "--action",
            "approve",
            "--publish",
            "--api-endpoint",
            "http://localhost:8000/api",
        ])
        .unwrap();

        match cli.command {
            Command::Resolve(config) => {
                assert_eq!(config.ticket_id, "CS-1001");
                assert_eq!(config.action, ReviewAction::Approve);
                assert!(config.publish);
                assert!(config.validate().is_ok());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_edit_action_requires_resolution_text() {
        let config = ResolveConfig {
            ticket_id: "CS-1001".to_string(),
            action: ReviewAction::Edit,
            resolution: None,
            publish: false,
            api_endpoint: "http://localhost:8000/api".to_string(),
            user_id: "agent1".to_string(),
            token: None,
            verbose: false,
        };
        assert!(config.validate().is_err());

        let mut config = config;
        config.resolution = Some("Clear the cache".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_token_wins_over_environment() {
        assert_eq!(resolve_token(Some("token-abc")), "token-abc");
    }

    #[test]
    fn test_review_action_maps_to_ticket_status() {
        assert_eq!(ReviewAction::Approve.status(), TicketStatus::Approved);
        assert_eq!(ReviewAction::Reject.status(), TicketStatus::Rejected);
        assert_eq!(ReviewAction::Edit.status(), TicketStatus::Edited);
    }
}
