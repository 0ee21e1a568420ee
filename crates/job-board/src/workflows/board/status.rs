//! Application status codes and the employer-facing relabeling workflow.
//!
//! Statuses are stored as short canonical codes. Clients may send either the code or one of the
//! human-readable aliases; aliases are resolved through [`STATUS_ALIASES`] before the result is
//! validated against the canonical set. Any status may move to any other status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "P")]
    Pending,
    #[serde(rename = "RV")]
    Reviewed,
    #[serde(rename = "AC")]
    Shortlisted,
    #[serde(rename = "RJ")]
    Rejected,
    #[serde(rename = "HR")]
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "P",
            ApplicationStatus::Reviewed => "RV",
            ApplicationStatus::Shortlisted => "AC",
            ApplicationStatus::Rejected => "RJ",
            ApplicationStatus::Hired => "HR",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "review",
            ApplicationStatus::Shortlisted => "shortlist",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }
}

/// Alias table consulted before canonical validation. Matching ignores ASCII case.
pub const STATUS_ALIASES: &[(&str, ApplicationStatus)] = &[
    ("pending", ApplicationStatus::Pending),
    ("review", ApplicationStatus::Reviewed),
    ("reviewed", ApplicationStatus::Reviewed),
    ("in_review", ApplicationStatus::Reviewed),
    ("shortlist", ApplicationStatus::Shortlisted),
    ("shortlisted", ApplicationStatus::Shortlisted),
    ("accepted", ApplicationStatus::Shortlisted),
    ("rejected", ApplicationStatus::Rejected),
    ("hired", ApplicationStatus::Hired),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized application status '{0}'")]
pub struct UnknownStatus(pub String);

/// Map an alias to its canonical code, leaving unmapped labels untouched.
pub fn normalize_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    match STATUS_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
    {
        Some((_, status)) => status.code(),
        None => trimmed,
    }
}

pub fn resolve_status(raw: &str) -> Result<ApplicationStatus, UnknownStatus> {
    ApplicationStatus::from_code(normalize_label(raw)).ok_or_else(|| UnknownStatus(raw.to_string()))
}

/// Record of a successful relabeling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub application_id: ApplicationId,
    pub previous: ApplicationStatus,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub updated_at: DateTime<Utc>,
}

/// Relabel `application` and stamp the update time. Same-status writes still refresh the stamp.
pub fn transition(
    application: &mut Application,
    target: ApplicationStatus,
    now: DateTime<Utc>,
) -> StatusChange {
    let previous = application.status;
    application.status = target;
    application.updated_at = now;

    StatusChange {
        application_id: application.id,
        previous,
        status: target,
        status_label: target.label(),
        updated_at: now,
    }
}
