use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;

pub struct TriageEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> TriageEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        println!("Starting triage ingest...");

        println!("Reading spreadsheet...");
        let grid = self.pipeline.extract().await?;
        println!("Decoded {} rows", grid.len());

        println!("Validating rows...");
        let report = self.pipeline.transform(grid).await?;
        println!(
            "Validated {} rows ({} valid, {} invalid)",
            report.total_rows, report.valid_rows, report.invalid_rows
        );

        println!("Writing report...");
        let summary = self.pipeline.load(report).await?;
        println!("Report saved to: {}", summary.report_path);

        Ok(summary)
    }
}
