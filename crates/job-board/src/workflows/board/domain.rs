use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::status::ApplicationStatus;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a job posting.
    JobId
);
numeric_id!(
    /// Identifier of a submitted application.
    ApplicationId
);
numeric_id!(
    /// Identifier of an employer profile.
    EmployerId
);
numeric_id!(
    /// Identifier of a job seeker profile.
    SeekerId
);
numeric_id!(CategoryId);
numeric_id!(
    /// Identifier of a seeker's bookmark on a job.
    SavedJobId
);

/// Identity issued by the upstream identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employer,
    Seeker,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "employer" => Some(Self::Employer),
            "seeker" | "jobseeker" | "job_seeker" => Some(Self::Seeker),
            _ => None,
        }
    }
}

/// Authenticated caller passed explicitly into every board operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
    pub is_staff: bool,
}

impl Caller {
    pub fn employer(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role: Role::Employer,
            is_staff: false,
        }
    }

    pub fn seeker(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role: Role::Seeker,
            is_staff: false,
        }
    }

    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }

    /// Staff and employers may manage postings and categories.
    pub fn can_manage_postings(&self) -> bool {
        self.is_staff || self.role == Role::Employer
    }
}

/// Listing priority controlling search ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPriority {
    #[default]
    Normal,
    Urgent,
    Featured,
}

impl JobPriority {
    pub const fn rank(self) -> u8 {
        match self {
            JobPriority::Featured => 3,
            JobPriority::Urgent => 2,
            JobPriority::Normal => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            JobPriority::Normal => "Normal",
            JobPriority::Urgent => "Urgent",
            JobPriority::Featured => "Featured",
        }
    }
}

/// A posting owned by exactly one employer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub employer_id: EmployerId,
    pub category_id: Option<CategoryId>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub priority: JobPriority,
    pub salary: Option<u32>,
    /// Values of zero or below mean unlimited.
    pub max_applicants: Option<i32>,
    pub deadline: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Positive applicant cap, if one is configured.
    pub fn capacity(&self) -> Option<u32> {
        self.max_applicants
            .filter(|limit| *limit > 0)
            .map(|limit| limit as u32)
    }

    /// A deadline of today still accepts applications.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.deadline.is_some_and(|deadline| deadline < today)
    }

    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.is_active && !self.is_expired(today)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub employer_id: EmployerId,
    pub category_id: Option<CategoryId>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub priority: JobPriority,
    pub salary: Option<u32>,
    pub max_applicants: Option<i32>,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Payload accepted when an employer posts a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub priority: JobPriority,
    #[serde(default)]
    pub salary: Option<u32>,
    #[serde(default)]
    pub max_applicants: Option<i32>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub category: Option<CategoryId>,
}

/// Partial update; absent fields keep their stored value. The nullable fields take an
/// explicit `null` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub priority: Option<JobPriority>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub salary: Option<Option<u32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub max_applicants: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<CategoryId>>,
    pub is_active: Option<bool>,
}

/// A present field, `null` included, becomes `Some`; serde's `default` covers absence.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One seeker's submission against one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub seeker_id: SeekerId,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job_id: JobId,
    pub seeker_id: SeekerId,
    pub cover_letter: String,
    pub created_at: DateTime<Utc>,
}

/// A job bookmarked by a seeker. At most one per (seeker, job) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedJob {
    pub id: SavedJobId,
    pub seeker_id: SeekerId,
    pub job_id: JobId,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSavedJob {
    pub seeker_id: SeekerId,
    pub job_id: JobId,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRequest {
    #[serde(default, alias = "cover_letter_text")]
    pub cover_letter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(alias = "new_status")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCategory {
    pub id: CategoryId,
    pub owner: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub owner: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerProfile {
    pub id: EmployerId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub city: String,
    pub phone: Option<String>,
    pub size: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub founded_year: Option<u16>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload for an employer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub business_name: String,
    pub city: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub founded_year: Option<u16>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub business_name: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub size: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub founded_year: Option<u16>,
    pub contact_email: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerProfile {
    pub id: SeekerId,
    pub user_id: UserId,
    pub full_name: String,
    pub headline: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeekerRegistration {
    pub full_name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Keyword and location filters for job search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSearch {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub loc: Option<String>,
}
