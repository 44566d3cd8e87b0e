use crate::error::ReportError;
use crate::models::Report;

/// Persistence seam for reports. Each report is one document; its disputes
/// are stored inside it.
///
/// A worker invocation runs on a single thread, so implementations are not
/// required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait ReportStore {
    async fn insert(&self, report: &Report) -> Result<(), ReportError>;
    async fn find(&self, id: &str) -> Result<Option<Report>, ReportError>;
    /// Overwrite the stored document. Last write wins.
    async fn save(&self, report: &Report) -> Result<(), ReportError>;
    async fn list_newest_first(&self) -> Result<Vec<Report>, ReportError>;
}
