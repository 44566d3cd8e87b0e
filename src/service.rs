//! Report operations against a [`ReportStore`].
//!
//! Each operation is one read-modify-write. Callers supply the id of a new
//! report and the current time, so nothing here touches the JS runtime.

use crate::error::ReportError;
use crate::models::{Dispute, NewDispute, NewReport, Report};
use crate::report::sort_newest_first;
use crate::store::ReportStore;

pub async fn create_report<S: ReportStore>(
    store: &S,
    id: String,
    input: NewReport,
    image: Option<String>,
    now: &str,
) -> Result<Report, ReportError> {
    let report = Report::file(id, input, image, now)?;
    store.insert(&report).await?;
    Ok(report)
}

/// All reports, most recently created first.
pub async fn list_reports<S: ReportStore>(store: &S) -> Result<Vec<Report>, ReportError> {
    let mut reports = store.list_newest_first().await?;
    sort_newest_first(&mut reports);
    Ok(reports)
}

pub async fn resolve_report<S: ReportStore>(
    store: &S,
    id: &str,
    resolved_by: Option<&str>,
    now: &str,
) -> Result<Report, ReportError> {
    let mut report = load(store, id).await?;
    report.resolve(resolved_by, now);
    store.save(&report).await?;
    Ok(report)
}

pub async fn raise_dispute<S: ReportStore>(
    store: &S,
    id: &str,
    input: NewDispute,
    image: Option<String>,
    now: &str,
) -> Result<(Report, Dispute), ReportError> {
    let mut report = load(store, id).await?;
    let dispute = report
        .raise_dispute(input.raised_by.as_deref(), input.reason.as_deref(), image, now)
        .clone();
    store.save(&report).await?;
    Ok((report, dispute))
}

async fn load<S: ReportStore>(store: &S, id: &str) -> Result<Report, ReportError> {
    store
        .find(id)
        .await?
        .ok_or_else(|| ReportError::NotFound { id: id.to_string() })
}
