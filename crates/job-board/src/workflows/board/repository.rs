use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, CategoryId, EmployerId, EmployerProfile, EmployerRegistration,
    Job, JobCategory, JobId, NewApplication, NewCategory, NewJob, NewSavedJob, SavedJob,
    SavedJobId, SeekerId, SeekerProfile, SeekerRegistration, UserId,
};

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write.
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Row-level access inside one unit of work.
///
/// Reads take `&self` so the same handle serves read-only snapshots; writes take `&mut self` and
/// are only visible to other callers once the surrounding transaction commits.
pub trait BoardTransaction {
    fn employer(&self, id: EmployerId) -> Result<Option<EmployerProfile>, RepositoryError>;
    fn employer_by_user(&self, user: &UserId) -> Result<Option<EmployerProfile>, RepositoryError>;
    fn employers(&self) -> Result<Vec<EmployerProfile>, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] when the user already owns an employer profile.
    fn insert_employer(
        &mut self,
        user: UserId,
        registration: EmployerRegistration,
        created_at: DateTime<Utc>,
    ) -> Result<EmployerProfile, RepositoryError>;
    fn update_employer(&mut self, profile: EmployerProfile) -> Result<(), RepositoryError>;

    fn seeker(&self, id: SeekerId) -> Result<Option<SeekerProfile>, RepositoryError>;
    fn seeker_by_user(&self, user: &UserId) -> Result<Option<SeekerProfile>, RepositoryError>;
    /// Fails with [`RepositoryError::Conflict`] when the user already owns a seeker profile.
    fn insert_seeker(
        &mut self,
        user: UserId,
        registration: SeekerRegistration,
        created_at: DateTime<Utc>,
    ) -> Result<SeekerProfile, RepositoryError>;

    fn category(&self, id: CategoryId) -> Result<Option<JobCategory>, RepositoryError>;
    fn categories(&self) -> Result<Vec<JobCategory>, RepositoryError>;
    fn insert_category(&mut self, category: NewCategory) -> Result<JobCategory, RepositoryError>;
    fn update_category(&mut self, category: JobCategory) -> Result<(), RepositoryError>;
    /// Removes the category and clears it from every job that referenced it.
    fn delete_category(&mut self, id: CategoryId) -> Result<bool, RepositoryError>;

    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    fn jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    fn insert_job(&mut self, job: NewJob) -> Result<Job, RepositoryError>;
    fn update_job(&mut self, job: Job) -> Result<(), RepositoryError>;
    /// Removes the job together with its applications and bookmarks.
    fn delete_job(&mut self, id: JobId) -> Result<bool, RepositoryError>;

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn application_for(
        &self,
        job: JobId,
        seeker: SeekerId,
    ) -> Result<Option<Application>, RepositoryError>;
    fn applications(&self) -> Result<Vec<Application>, RepositoryError>;
    fn applications_for_job(&self, job: JobId) -> Result<Vec<Application>, RepositoryError>;
    fn applications_for_seeker(&self, seeker: SeekerId)
        -> Result<Vec<Application>, RepositoryError>;
    fn count_applications(&self, job: JobId) -> Result<usize, RepositoryError>;
    /// Enforces one application per (job, seeker) pair with [`RepositoryError::Conflict`].
    fn insert_application(
        &mut self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError>;
    fn update_application(&mut self, application: Application) -> Result<(), RepositoryError>;
    fn delete_application(&mut self, id: ApplicationId) -> Result<bool, RepositoryError>;

    fn saved_job(&self, id: SavedJobId) -> Result<Option<SavedJob>, RepositoryError>;
    fn saved_jobs_for_seeker(&self, seeker: SeekerId) -> Result<Vec<SavedJob>, RepositoryError>;
    /// Enforces one bookmark per (seeker, job) pair with [`RepositoryError::Conflict`].
    fn insert_saved_job(&mut self, saved: NewSavedJob) -> Result<SavedJob, RepositoryError>;
    fn delete_saved_job(&mut self, id: SavedJobId) -> Result<bool, RepositoryError>;
}

/// Storage abstraction so the service can be exercised against any backend.
pub trait BoardStore: Send + Sync {
    /// Run `work` against a consistent snapshot without writing.
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn BoardTransaction) -> Result<T, E>,
        E: From<RepositoryError>;

    /// Run `work` as one atomic unit: its writes commit only if it returns `Ok`.
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardTransaction) -> Result<T, E>,
        E: From<RepositoryError>;
}
