use crate::domain::model::{ParseReport, RunSummary, SheetGrid};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_file(&self) -> &str;
    fn api_endpoint(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn submitted_by(&self) -> &str;
    fn token(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SheetGrid>;
    async fn transform(&self, grid: SheetGrid) -> Result<ParseReport>;
    async fn load(&self, report: ParseReport) -> Result<RunSummary>;
}
