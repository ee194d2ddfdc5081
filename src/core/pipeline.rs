use crate::adapters::backend::TriageApi;
use crate::core::ingest;
use crate::core::{ConfigProvider, ParseReport, Pipeline, RunSummary, SheetGrid, Storage};
use crate::domain::model::{Session, TicketField, TicketRecord};
use crate::utils::error::{Result, TriageError};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_BUNDLE_NAME: &str = "triage_report.zip";

/// Read → validate → report/submit pipeline for one uploaded spreadsheet.
///
/// When no API endpoint is configured the run is report-only: the bundle is
/// still written, nothing leaves the machine.
pub struct UploadPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    api: Option<TriageApi>,
}

impl<S: Storage, C: ConfigProvider> UploadPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let api = config.api_endpoint().map(TriageApi::new);
        Self {
            storage,
            config,
            api,
        }
    }

    fn session(&self) -> Session {
        let token = crate::config::resolve_token(self.config.token());
        Session::new(self.config.submitted_by(), token)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for UploadPipeline<S, C> {
    async fn extract(&self) -> Result<SheetGrid> {
        tracing::debug!("Reading spreadsheet: {}", self.config.input_file());
        let bytes = self.storage.read_file(self.config.input_file()).await?;

        let grid = ingest::decode_workbook(&bytes)?;
        tracing::debug!("Decoded {} rows from {} bytes", grid.len(), bytes.len());
        Ok(grid)
    }

    async fn transform(&self, grid: SheetGrid) -> Result<ParseReport> {
        let report = ingest::parse_grid(&grid)?;
        tracing::info!(
            "Validated {} rows: {} valid, {} invalid",
            report.total_rows,
            report.valid_rows,
            report.invalid_rows
        );
        for record in report.invalid() {
            tracing::debug!(
                "Row {} missing: {}",
                record.row,
                record
                    .missing_fields
                    .iter()
                    .map(|f| f.report_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(report)
    }

    async fn load(&self, report: ParseReport) -> Result<RunSummary> {
        let bundle = build_report_bundle(&report)?;
        let report_path = format!("{}/{}", self.config.output_path(), REPORT_BUNDLE_NAME);
        tracing::debug!("Writing report bundle ({} bytes)", bundle.len());
        self.storage.write_file(&report_path, &bundle).await?;

        let mut submitted = 0;
        let mut ticket_ids = Vec::new();
        if let Some(api) = &self.api {
            let valid: Vec<TicketRecord> = report.valid().cloned().collect();
            if valid.is_empty() {
                tracing::warn!("No valid rows to submit, skipping upload");
            } else {
                let session = self.session();
                let response = api.upload_tickets(&session, &valid).await?;
                submitted = response.total_processed;
                ticket_ids = response
                    .tickets
                    .iter()
                    .map(|t| t.ticket_id.clone())
                    .collect();
                tracing::info!("Backend created {} tickets", submitted);
            }
        }

        Ok(RunSummary {
            report_path,
            total_rows: report.total_rows,
            valid_rows: report.valid_rows,
            invalid_rows: report.invalid_rows,
            submitted,
            ticket_ids,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectedRow<'a> {
    row: usize,
    missing_fields: &'a [TicketField],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BundleSummary {
    total_rows: usize,
    valid_rows: usize,
    invalid_rows: usize,
}

/// Bundles the run outcome: valid rows in canonical column order as CSV, the
/// per-row reject list and the counts as JSON.
fn build_report_bundle(report: &ParseReport) -> Result<Vec<u8>> {
    let csv_bytes = {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(TicketField::ALL.iter().map(|f| f.column_header()))?;
        for record in report.valid() {
            writer.write_record(TicketField::ALL.iter().map(|f| record.field(*f)))?;
        }
        writer.into_inner().map_err(|e| {
            TriageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                e.to_string(),
            ))
        })?
    };

    let rejected: Vec<RejectedRow> = report
        .invalid()
        .map(|record| RejectedRow {
            row: record.row,
            missing_fields: &record.missing_fields,
        })
        .collect();
    let summary = BundleSummary {
        total_rows: report.total_rows,
        valid_rows: report.valid_rows,
        invalid_rows: report.invalid_rows,
    };

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>("valid_tickets.csv", FileOptions::default())?;
    zip.write_all(&csv_bytes)?;

    zip.start_file::<_, ()>("rejected_rows.json", FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(&rejected)?.as_bytes())?;

    zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
