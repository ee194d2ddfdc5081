pub mod etl;
pub mod ingest;
pub mod pipeline;

pub use crate::domain::model::{ParseReport, RunSummary, SheetGrid, TicketRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
