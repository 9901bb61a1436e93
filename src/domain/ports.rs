use crate::domain::model::{LeapFilter, MissingPolicy, RawYearRow, TransformResult, YearGroups};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Destination for pipeline outputs, addressed by paths relative to the
/// output location. Input datasets are read by path in `Pipeline::extract`.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// CSV file to load; `None` means the built-in sample dataset.
    fn input_path(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn sample_range(&self) -> (i64, i64);
    fn missing_policy(&self) -> MissingPolicy;
    fn filter(&self) -> LeapFilter;
    fn year_groups(&self) -> YearGroups;
    fn output_formats(&self) -> &[String];
    /// Archive file name, or `None` to write loose files.
    fn archive_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawYearRow>>;
    async fn transform(&self, data: Vec<RawYearRow>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
