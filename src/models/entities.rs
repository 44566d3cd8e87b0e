use serde::{Deserialize, Serialize};

// ── Report lifecycle ────────────────────────────────────────────

/// Status of a report. Only `report::Report::resolve` and
/// `report::Report::raise_dispute` move a report between these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Reported,
    Resolved,
    Disputed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Reported => "reported",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Disputed => "disputed",
        }
    }

    pub fn parse(v: &str) -> Option<Self> {
        match v {
            "reported" => Some(ReportStatus::Reported),
            "resolved" => Some(ReportStatus::Resolved),
            "disputed" => Some(ReportStatus::Disputed),
            _ => None,
        }
    }
}

/// Review state of a dispute. Every dispute is raised `Open`; nothing in
/// this service reviews or rejects one, the other variants only decode
/// documents written by another tool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    Open,
    Reviewed,
    Rejected,
}

// ── Report ──────────────────────────────────────────────────────

/// Who resolved a report and when. Both halves are always present together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub resolved_by: String,
    pub resolved_at: String,
}

/// A citizen-filed garbage report with its embedded dispute history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub reporter_name: String,
    pub reporter_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub(crate) status: ReportStatus,
    #[serde(flatten)]
    pub(crate) resolution: Option<Resolution>,
    #[serde(default)]
    pub(crate) disputes: Vec<Dispute>,
    pub created_at: String,
    pub updated_at: String,
}

impl Report {
    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Disputes in the order they were raised.
    pub fn disputes(&self) -> &[Dispute] {
        &self.disputes
    }
}

// ── Dispute ─────────────────────────────────────────────────────

/// A challenge to a report's resolution. Owned by its report; has no
/// identity of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dispute {
    pub raised_by: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub status: DisputeStatus,
    pub created_at: String,
}
