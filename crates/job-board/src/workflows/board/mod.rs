//! Job board application workflow: postings, applications, saved jobs, the capacity and deadline
//! guard, the status workflow, and the employer-facing segmentation views.
//!
//! Every operation receives the caller explicitly and runs inside a single store transaction, so
//! admission checks, inserts, and capacity deactivation commit together.

pub mod capacity;
pub mod clock;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod segmentation;
pub mod service;
pub mod status;
pub mod views;

#[cfg(test)]
mod tests;

pub use capacity::{AdmissionContext, AdmissionRejection, CapacityGuard};
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    Application, ApplicationId, ApplyRequest, Caller, CategoryId, CategoryInput, EmployerId,
    EmployerPatch, EmployerProfile, EmployerRegistration, Job, JobCategory, JobId, JobInput,
    JobPatch, JobPriority, JobSearch, Role, SavedJob, SavedJobId, SeekerId, SeekerProfile,
    SeekerRegistration, StatusUpdateRequest, UserId,
};
pub use memory::InMemoryBoardStore;
pub use repository::{BoardStore, BoardTransaction, RepositoryError};
pub use router::{board_router, caller_from_headers};
pub use segmentation::{ApplicationBucket, BucketCounts};
pub use service::{BoardError, JobBoardService};
pub use status::{resolve_status, ApplicationStatus, StatusChange, UnknownStatus, STATUS_ALIASES};
pub use views::{
    ApplicationView, CompanyJobsView, CompanyView, DashboardView, JobView, SavedJobView,
    SearchHit, SearchResults,
};
