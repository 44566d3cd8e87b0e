use serde::{Deserialize, Serialize};

use super::entities::Dispute;

// ── API request/response types ──────────────────────────────────

/// Fields of a new report, as decoded from the submission form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewReport {
    pub location: String,
    pub description: Option<String>,
    pub reporter_name: String,
    pub reporter_contact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReport {
    pub resolved_by: Option<String>,
}

/// Fields of a dispute submission. The image travels separately as a blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDispute {
    pub raised_by: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DisputeRaised {
    pub message: String,
    pub dispute: Dispute,
}

// ── Generic response envelopes ──────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub service: &'a str,
    pub status: &'a str,
}
