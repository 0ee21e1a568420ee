use std::cmp::Reverse;

use serde::Serialize;

use super::domain::Application;
use super::status::ApplicationStatus;

/// Employer dashboard bucket; each maps to exactly one stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationBucket {
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationBucket {
    pub const ALL: [ApplicationBucket; 5] = [
        ApplicationBucket::Pending,
        ApplicationBucket::Reviewed,
        ApplicationBucket::Shortlisted,
        ApplicationBucket::Rejected,
        ApplicationBucket::Hired,
    ];

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "review" | "reviewed" => Some(Self::Reviewed),
            "shortlist" | "shortlisted" => Some(Self::Shortlisted),
            "rejected" => Some(Self::Rejected),
            "hired" => Some(Self::Hired),
            _ => None,
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            ApplicationBucket::Pending => "pending",
            ApplicationBucket::Reviewed => "reviewed",
            ApplicationBucket::Shortlisted => "shortlist",
            ApplicationBucket::Rejected => "rejected",
            ApplicationBucket::Hired => "hired",
        }
    }

    pub const fn status(self) -> ApplicationStatus {
        match self {
            ApplicationBucket::Pending => ApplicationStatus::Pending,
            ApplicationBucket::Reviewed => ApplicationStatus::Reviewed,
            ApplicationBucket::Shortlisted => ApplicationStatus::Shortlisted,
            ApplicationBucket::Rejected => ApplicationStatus::Rejected,
            ApplicationBucket::Hired => ApplicationStatus::Hired,
        }
    }

    pub const fn of(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Pending => ApplicationBucket::Pending,
            ApplicationStatus::Reviewed => ApplicationBucket::Reviewed,
            ApplicationStatus::Shortlisted => ApplicationBucket::Shortlisted,
            ApplicationStatus::Rejected => ApplicationBucket::Rejected,
            ApplicationStatus::Hired => ApplicationBucket::Hired,
        }
    }
}

/// Per-bucket totals shown on the employer dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub pending: usize,
    pub reviewed: usize,
    pub shortlisted: usize,
    pub rejected: usize,
    pub hired: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: ApplicationBucket) -> usize {
        match bucket {
            ApplicationBucket::Pending => self.pending,
            ApplicationBucket::Reviewed => self.reviewed,
            ApplicationBucket::Shortlisted => self.shortlisted,
            ApplicationBucket::Rejected => self.rejected,
            ApplicationBucket::Hired => self.hired,
        }
    }

    pub fn total(&self) -> usize {
        ApplicationBucket::ALL
            .into_iter()
            .map(|bucket| self.get(bucket))
            .sum()
    }

    fn slot(&mut self, bucket: ApplicationBucket) -> &mut usize {
        match bucket {
            ApplicationBucket::Pending => &mut self.pending,
            ApplicationBucket::Reviewed => &mut self.reviewed,
            ApplicationBucket::Shortlisted => &mut self.shortlisted,
            ApplicationBucket::Rejected => &mut self.rejected,
            ApplicationBucket::Hired => &mut self.hired,
        }
    }
}

/// Newest first; ids break ties between identical timestamps.
pub fn newest_first(applications: &mut [Application]) {
    applications.sort_by_key(|application| Reverse((application.created_at, application.id)));
}

pub fn bucket(applications: Vec<Application>, bucket: ApplicationBucket) -> Vec<Application> {
    let mut selected: Vec<Application> = applications
        .into_iter()
        .filter(|application| application.status == bucket.status())
        .collect();
    newest_first(&mut selected);
    selected
}

pub fn counts(applications: &[Application]) -> BucketCounts {
    let mut counts = BucketCounts::default();
    for application in applications {
        *counts.slot(ApplicationBucket::of(application.status)) += 1;
    }
    counts
}

pub fn recent(mut applications: Vec<Application>, limit: usize) -> Vec<Application> {
    newest_first(&mut applications);
    applications.truncate(limit);
    applications
}
