//! Report state machine.
//!
//! A report starts `reported`. `resolve` moves it to `resolved` and
//! `raise_dispute` moves it to `disputed`; both are allowed from any state,
//! so a disputed report can be resolved again. There is no other way to
//! change a report's status.

use crate::error::{ReportError, RequiredField};
use crate::models::{Dispute, DisputeStatus, NewReport, Report, ReportStatus, Resolution};

/// Resolver recorded when none is named.
pub const DEFAULT_RESOLVER: &str = "municipality";
/// Dispute author recorded when none is named.
pub const ANONYMOUS: &str = "anonymous";

fn is_blank(v: &str) -> bool {
    v.trim().is_empty()
}

/// Treat absent and blank optional text the same way.
fn non_blank(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !is_blank(s))
}

impl NewReport {
    /// Check required fields in form order; the first missing one is reported.
    pub fn validate(&self) -> Result<(), ReportError> {
        let required = [
            (RequiredField::Location, &self.location),
            (RequiredField::ReporterName, &self.reporter_name),
            (RequiredField::ReporterContact, &self.reporter_contact),
        ];
        match required.into_iter().find(|(_, v)| is_blank(v)) {
            Some((field, _)) => Err(ReportError::Validation { field }),
            None => Ok(()),
        }
    }
}

impl Report {
    /// Build a freshly filed report. Validation runs first; nothing is
    /// constructed for an invalid submission.
    pub fn file(
        id: String,
        input: NewReport,
        image: Option<String>,
        now: &str,
    ) -> Result<Self, ReportError> {
        input.validate()?;
        Ok(Self {
            id,
            location: input.location,
            description: input.description.filter(|d| !d.is_empty()),
            reporter_name: input.reporter_name,
            reporter_contact: input.reporter_contact,
            image,
            status: ReportStatus::Reported,
            resolution: None,
            disputes: Vec::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    /// Mark the report resolved. Calling it again overwrites who and when.
    pub fn resolve(&mut self, resolved_by: Option<&str>, now: &str) {
        let resolved_by = non_blank(resolved_by).unwrap_or(DEFAULT_RESOLVER);
        self.status = ReportStatus::Resolved;
        self.resolution = Some(Resolution {
            resolved_by: resolved_by.to_string(),
            resolved_at: now.to_string(),
        });
        self.updated_at = now.to_string();
    }

    /// Append a dispute and mark the report disputed, whatever its status.
    /// Returns the dispute as appended.
    pub fn raise_dispute(
        &mut self,
        raised_by: Option<&str>,
        reason: Option<&str>,
        image: Option<String>,
        now: &str,
    ) -> &Dispute {
        self.disputes.push(Dispute {
            raised_by: non_blank(raised_by).unwrap_or(ANONYMOUS).to_string(),
            reason: reason.unwrap_or_default().to_string(),
            image,
            status: DisputeStatus::Open,
            created_at: now.to_string(),
        });
        self.status = ReportStatus::Disputed;
        self.updated_at = now.to_string();
        &self.disputes[self.disputes.len() - 1]
    }
}

/// Order reports newest first. The sort is stable, so reports sharing a
/// `created_at` keep their relative input order.
pub fn sort_newest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: &str = "2026-03-01T08:00:00.000Z";
    const T1: &str = "2026-03-01T09:30:00.000Z";
    const T2: &str = "2026-03-02T17:45:12.250Z";

    fn input() -> NewReport {
        NewReport {
            location: "Main St".into(),
            description: None,
            reporter_name: "Alice".into(),
            reporter_contact: "a@x.com".into(),
        }
    }

    fn filed() -> Report {
        Report::file("r1".into(), input(), None, T0).unwrap()
    }

    // ── file ───────────────────────────────────────────────────

    #[test]
    fn new_report_starts_reported_with_no_history() {
        let report = filed();
        assert_eq!(report.id, "r1");
        assert_eq!(report.status(), ReportStatus::Reported);
        assert!(report.disputes().is_empty());
        assert!(report.resolution().is_none());
        assert_eq!(report.created_at, T0);
        assert_eq!(report.updated_at, T0);
    }

    #[test]
    fn blank_required_fields_are_rejected_by_name() {
        let cases = [
            (RequiredField::Location, NewReport { location: "".into(), ..input() }),
            (RequiredField::Location, NewReport { location: "  \t".into(), ..input() }),
            (RequiredField::ReporterName, NewReport { reporter_name: " ".into(), ..input() }),
            (
                RequiredField::ReporterContact,
                NewReport { reporter_contact: "\n".into(), ..input() },
            ),
        ];
        for (field, bad) in cases {
            assert_eq!(
                Report::file("r1".into(), bad, None, T0),
                Err(ReportError::Validation { field })
            );
        }
    }

    #[test]
    fn first_missing_field_wins() {
        let bad = NewReport::default();
        assert_eq!(
            bad.validate(),
            Err(ReportError::Validation {
                field: RequiredField::Location
            })
        );
    }

    #[test]
    fn empty_description_is_dropped_and_image_kept() {
        let report = Report::file(
            "r1".into(),
            NewReport {
                description: Some(String::new()),
                ..input()
            },
            Some("/uploads/1-2.jpg".into()),
            T0,
        )
        .unwrap();
        assert_eq!(report.description, None);
        assert_eq!(report.image.as_deref(), Some("/uploads/1-2.jpg"));
    }

    // ── resolve ────────────────────────────────────────────────

    #[test]
    fn resolve_defaults_to_municipality() {
        let mut report = filed();
        report.resolve(None, T1);
        assert_eq!(report.status(), ReportStatus::Resolved);
        let resolution = report.resolution().unwrap();
        assert_eq!(resolution.resolved_by, DEFAULT_RESOLVER);
        assert_eq!(resolution.resolved_at, T1);
        assert_eq!(report.updated_at, T1);
    }

    #[test]
    fn resolve_records_named_resolver() {
        let mut report = filed();
        report.resolve(Some("city-hall"), T1);
        assert_eq!(report.resolution().unwrap().resolved_by, "city-hall");
    }

    #[test]
    fn blank_resolver_falls_back_to_default() {
        let mut report = filed();
        report.resolve(Some("   "), T1);
        assert_eq!(report.resolution().unwrap().resolved_by, DEFAULT_RESOLVER);
    }

    #[test]
    fn repeated_resolve_refreshes_metadata() {
        let mut report = filed();
        report.resolve(Some("crew-7"), T1);
        report.resolve(None, T2);
        assert_eq!(report.status(), ReportStatus::Resolved);
        let resolution = report.resolution().unwrap();
        assert_eq!(resolution.resolved_by, DEFAULT_RESOLVER);
        assert_eq!(resolution.resolved_at, T2);
    }

    // ── raise_dispute ──────────────────────────────────────────

    #[test]
    fn dispute_defaults() {
        let mut report = filed();
        let dispute = report.raise_dispute(None, None, None, T1).clone();
        assert_eq!(dispute.raised_by, ANONYMOUS);
        assert_eq!(dispute.reason, "");
        assert_eq!(dispute.status, DisputeStatus::Open);
        assert_eq!(dispute.created_at, T1);
        assert_eq!(report.status(), ReportStatus::Disputed);
        assert_eq!(report.disputes(), &[dispute]);
    }

    #[test]
    fn dispute_from_any_status_forces_disputed() {
        let mut reported = filed();
        reported.raise_dispute(Some("bob"), Some("still there"), None, T1);
        assert_eq!(reported.status(), ReportStatus::Disputed);

        let mut resolved = filed();
        resolved.resolve(None, T1);
        resolved.raise_dispute(Some("bob"), None, None, T2);
        assert_eq!(resolved.status(), ReportStatus::Disputed);
        // The earlier resolution is kept alongside the dispute.
        assert_eq!(resolved.resolution().unwrap().resolved_at, T1);

        let mut disputed = filed();
        disputed.raise_dispute(None, None, None, T1);
        disputed.raise_dispute(None, None, None, T2);
        assert_eq!(disputed.status(), ReportStatus::Disputed);
    }

    #[test]
    fn disputes_append_in_call_order() {
        let mut report = filed();
        report.raise_dispute(Some("first"), Some("a"), None, T1);
        report.raise_dispute(Some("second"), Some("b"), Some("/uploads/x.png".into()), T2);
        let authors: Vec<_> = report.disputes().iter().map(|d| d.raised_by.as_str()).collect();
        assert_eq!(authors, ["first", "second"]);
        assert_eq!(report.disputes()[1].image.as_deref(), Some("/uploads/x.png"));
    }

    #[test]
    fn disputed_report_can_be_resolved_again() {
        let mut report = filed();
        report.resolve(None, T0);
        report.raise_dispute(None, Some("not cleaned"), None, T1);
        report.resolve(Some("crew-2"), T2);
        assert_eq!(report.status(), ReportStatus::Resolved);
        assert_eq!(report.disputes().len(), 1);
        assert_eq!(report.resolution().unwrap().resolved_by, "crew-2");
    }

    // ── ordering ───────────────────────────────────────────────

    #[test]
    fn sort_newest_first_orders_by_created_at_desc() {
        let at = |id: &str, ts: &str| Report::file(id.into(), input(), None, ts).unwrap();
        let mut reports = vec![at("b", T1), at("a", T0), at("c", T2)];
        sort_newest_first(&mut reports);
        let ids: Vec<_> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }
}
