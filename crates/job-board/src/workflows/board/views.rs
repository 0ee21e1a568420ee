use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{
    Application, ApplicationId, CategoryId, EmployerId, EmployerProfile, Job, JobCategory, JobId,
    JobPriority, SavedJob, SavedJobId, SeekerId, SeekerProfile,
};
use super::segmentation::BucketCounts;
use super::status::ApplicationStatus;

/// Job as exposed over the API, with employer and category names resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub id: JobId,
    pub employer_id: EmployerId,
    pub employer: String,
    pub category: Option<CategoryId>,
    pub category_name: Option<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub job_type: String,
    pub priority: JobPriority,
    pub priority_display: &'static str,
    pub salary: Option<u32>,
    pub max_applicants: Option<i32>,
    pub deadline: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobView {
    pub fn new(job: Job, employer: Option<&EmployerProfile>, category: Option<&JobCategory>) -> Self {
        Self {
            id: job.id,
            employer_id: job.employer_id,
            employer: employer
                .map(|profile| profile.business_name.clone())
                .unwrap_or_default(),
            category: job.category_id,
            category_name: category.map(|category| category.name.clone()),
            title: job.title,
            description: job.description,
            location: job.location,
            job_type: job.job_type,
            priority: job.priority,
            priority_display: job.priority.label(),
            salary: job.salary,
            max_applicants: job.max_applicants,
            deadline: job.deadline,
            is_active: job.is_active,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Application with the job and seeker context employers and seekers both need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job_title: String,
    pub employer: String,
    pub seeker_id: SeekerId,
    pub seeker_name: String,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub cover_letter: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationView {
    pub fn new(
        application: Application,
        job: Option<&Job>,
        employer: Option<&EmployerProfile>,
        seeker: Option<&SeekerProfile>,
    ) -> Self {
        Self {
            id: application.id,
            job_id: application.job_id,
            job_title: job.map(|job| job.title.clone()).unwrap_or_default(),
            employer: employer
                .map(|profile| profile.business_name.clone())
                .unwrap_or_default(),
            seeker_id: application.seeker_id,
            seeker_name: seeker
                .map(|profile| profile.full_name.clone())
                .unwrap_or_default(),
            status: application.status,
            status_label: application.status.label(),
            cover_letter: application.cover_letter,
            applied_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}

/// A seeker's bookmark together with the job it points at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedJobView {
    pub id: SavedJobId,
    pub job: JobView,
    pub saved_at: DateTime<Utc>,
}

impl SavedJobView {
    pub fn new(saved: SavedJob, job: JobView) -> Self {
        Self {
            id: saved.id,
            job,
            saved_at: saved.saved_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyView {
    pub id: EmployerId,
    pub business_name: String,
    pub city: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub size: Option<String>,
    pub job_count: usize,
}

impl CompanyView {
    pub fn new(profile: &EmployerProfile, job_count: usize) -> Self {
        Self {
            id: profile.id,
            business_name: profile.business_name.clone(),
            city: profile.city.clone(),
            industry: profile.industry.clone(),
            website: profile.website.clone(),
            size: profile.size.clone(),
            job_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyJobsView {
    pub company: CompanyView,
    pub jobs: Vec<JobView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub total_jobs: usize,
    pub total_applications: usize,
    pub active_jobs: usize,
    pub expired_jobs: usize,
    pub applications_by_status: BucketCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: JobId,
    pub title: String,
    pub location: String,
    pub category_name: Option<String>,
    pub priority: JobPriority,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub results: Vec<SearchHit>,
}
