pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::backend::{KnowledgeEntry, TriageApi};
pub use config::{cli::LocalStorage, Cli, CliConfig, Command};
pub use core::{etl::TriageEngine, pipeline::UploadPipeline};
pub use domain::model::{ParseReport, Session, TicketField, TicketRecord};
pub use utils::error::{Result, TriageError};
