use crate::error::ReportError;
use crate::models::{self, Report, ReportStatus, Resolution};
use crate::store::ReportStore;
use wasm_bindgen::JsValue;
use worker::*;

fn opt_str(s: &Option<String>) -> JsValue {
    match s {
        Some(s) => JsValue::from_str(s),
        None => JsValue::NULL,
    }
}

/// Reports live in the `reports` table (see `migrations/`). Disputes are a
/// JSON array column so they stay owned by their report.
pub struct D1ReportStore {
    db: D1Database,
}

impl D1ReportStore {
    pub fn new(db: D1Database) -> Self {
        Self { db }
    }
}

fn disputes_json(report: &Report) -> std::result::Result<String, ReportError> {
    serde_json::to_string(report.disputes())
        .map_err(|e| ReportError::Storage(format!("serialize disputes: {e}")))
}

fn resolution_columns(report: &Report) -> (JsValue, JsValue) {
    match report.resolution() {
        Some(r) => (
            JsValue::from_str(&r.resolved_by),
            JsValue::from_str(&r.resolved_at),
        ),
        None => (JsValue::NULL, JsValue::NULL),
    }
}

impl ReportStore for D1ReportStore {
    async fn insert(&self, report: &Report) -> std::result::Result<(), ReportError> {
        let disputes = disputes_json(report)?;
        let (resolved_by, resolved_at) = resolution_columns(report);

        self.db
            .prepare(
                "INSERT INTO reports (id, location, description, reporter_name, reporter_contact, image, status, resolved_by, resolved_at, disputes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )
            .bind(&[
                JsValue::from_str(&report.id),
                JsValue::from_str(&report.location),
                opt_str(&report.description),
                JsValue::from_str(&report.reporter_name),
                JsValue::from_str(&report.reporter_contact),
                opt_str(&report.image),
                JsValue::from_str(report.status().as_str()),
                resolved_by,
                resolved_at,
                JsValue::from_str(&disputes),
                JsValue::from_str(&report.created_at),
                JsValue::from_str(&report.updated_at),
            ])?
            .run()
            .await?;
        Ok(())
    }

    async fn find(&self, id: &str) -> std::result::Result<Option<Report>, ReportError> {
        let row: Option<ReportRow> = self
            .db
            .prepare("SELECT * FROM reports WHERE id = ?1")
            .bind(&[JsValue::from_str(id)])?
            .first(None)
            .await?;
        row.map(ReportRow::into_report).transpose()
    }

    async fn save(&self, report: &Report) -> std::result::Result<(), ReportError> {
        let disputes = disputes_json(report)?;
        let (resolved_by, resolved_at) = resolution_columns(report);

        let res: D1Result = self
            .db
            .prepare(
                "UPDATE reports SET status = ?1, resolved_by = ?2, resolved_at = ?3, disputes = ?4, updated_at = ?5 WHERE id = ?6",
            )
            .bind(&[
                JsValue::from_str(report.status().as_str()),
                resolved_by,
                resolved_at,
                JsValue::from_str(&disputes),
                JsValue::from_str(&report.updated_at),
                JsValue::from_str(&report.id),
            ])?
            .run()
            .await?;

        let changed = res
            .meta()?
            .map(|m| m.changes.unwrap_or(0) > 0)
            .unwrap_or(false);
        if changed {
            Ok(())
        } else {
            Err(ReportError::NotFound {
                id: report.id.clone(),
            })
        }
    }

    async fn list_newest_first(&self) -> std::result::Result<Vec<Report>, ReportError> {
        let result: D1Result = self
            .db
            .prepare("SELECT * FROM reports ORDER BY created_at DESC, rowid DESC")
            .bind(&[])?
            .all()
            .await?;
        let rows: Vec<ReportRow> = result.results()?;
        rows.into_iter().map(ReportRow::into_report).collect()
    }
}

// ── Row types ───────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct ReportRow {
    pub id: String,
    pub location: String,
    pub description: Option<String>,
    pub reporter_name: String,
    pub reporter_contact: String,
    pub image: Option<String>,
    pub status: String,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<String>,
    pub disputes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ReportRow {
    /// Decode a stored row. A row that breaks the report invariants is a
    /// storage error rather than something to patch over.
    pub fn into_report(self) -> std::result::Result<Report, ReportError> {
        let status = ReportStatus::parse(&self.status).ok_or_else(|| {
            ReportError::Storage(format!("report {}: unknown status {:?}", self.id, self.status))
        })?;
        let resolution = match (self.resolved_by, self.resolved_at) {
            (Some(resolved_by), Some(resolved_at)) => Some(Resolution {
                resolved_by,
                resolved_at,
            }),
            (None, None) => None,
            _ => {
                return Err(ReportError::Storage(format!(
                    "report {}: partial resolution",
                    self.id
                )))
            }
        };
        let disputes: Vec<models::Dispute> = match self.disputes.as_deref() {
            None | Some("") => Vec::new(),
            Some(json) => serde_json::from_str(json).map_err(|e| {
                ReportError::Storage(format!("report {}: bad disputes: {e}", self.id))
            })?,
        };

        Ok(Report {
            id: self.id,
            location: self.location,
            description: self.description,
            reporter_name: self.reporter_name,
            reporter_contact: self.reporter_contact,
            image: self.image,
            status,
            resolution,
            disputes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
