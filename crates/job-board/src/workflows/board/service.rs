use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::BoardConfig;

use super::capacity::{AdmissionContext, AdmissionRejection, CapacityGuard};
use super::clock::Clock;
use super::domain::{
    Application, ApplicationId, ApplyRequest, Caller, CategoryId, CategoryInput, EmployerId,
    EmployerPatch, EmployerProfile, EmployerRegistration, Job, JobCategory, JobId, JobInput,
    JobPatch, JobSearch, NewApplication, NewCategory, NewJob, NewSavedJob, Role, SavedJob,
    SavedJobId, SeekerProfile, SeekerRegistration,
};
use super::repository::{BoardStore, BoardTransaction, RepositoryError};
use super::segmentation::{self, ApplicationBucket};
use super::status::{self, StatusChange};
use super::views::{
    ApplicationView, CompanyJobsView, CompanyView, DashboardView, JobView, SavedJobView,
    SearchHit, SearchResults,
};

const SEARCH_RESULT_LIMIT: usize = 30;
const MAX_TITLE_LEN: usize = 255;
const MAX_NAME_LEN: usize = 100;

/// Error raised by the job board service. Every variant carries a stable [`BoardError::code`].
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("caller identity missing or malformed: {0}")]
    Unauthenticated(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("you have already applied to this job")]
    DuplicateApplication,
    #[error("you have already saved this job")]
    AlreadySaved,
    #[error("job has reached its limit of {capacity} applicants")]
    JobFull { capacity: u32 },
    #[error("this job is no longer accepting applications")]
    JobClosed,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("unrecognized application status '{0}'")]
    InvalidStatus(String),
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("{0} profile already exists for this user")]
    ProfileExists(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl BoardError {
    pub const fn code(&self) -> &'static str {
        match self {
            BoardError::Unauthenticated(_) => "UNAUTHENTICATED",
            BoardError::NotFound(_) => "NOT_FOUND",
            BoardError::DuplicateApplication => "ALREADY_APPLIED",
            BoardError::AlreadySaved => "ALREADY_SAVED",
            BoardError::JobFull { .. } => "JOB_FULL",
            BoardError::JobClosed => "JOB_CLOSED",
            BoardError::Forbidden(_) => "FORBIDDEN",
            BoardError::InvalidStatus(_) => "INVALID_STATUS",
            BoardError::ValidationFailed(_) => "VALIDATION_FAILED",
            BoardError::ProfileExists(_) => "PROFILE_EXISTS",
            BoardError::Repository(RepositoryError::Conflict) => "CONFLICT",
            BoardError::Repository(RepositoryError::NotFound) => "NOT_FOUND",
            BoardError::Repository(RepositoryError::Unavailable(_)) => "STORE_UNAVAILABLE",
        }
    }
}

impl From<AdmissionRejection> for BoardError {
    fn from(rejection: AdmissionRejection) -> Self {
        match rejection {
            AdmissionRejection::Duplicate => BoardError::DuplicateApplication,
            AdmissionRejection::Full { capacity } => BoardError::JobFull { capacity },
            AdmissionRejection::Expired { .. } | AdmissionRejection::Inactive => {
                BoardError::JobClosed
            }
        }
    }
}

enum ApplyOutcome {
    Accepted {
        view: ApplicationView,
        closed: bool,
    },
    Rejected {
        rejection: AdmissionRejection,
        closed: bool,
    },
}

/// Service composing the store, clock, and capacity guard behind caller-scoped operations.
pub struct JobBoardService<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    guard: CapacityGuard,
    config: BoardConfig,
}

impl<S, C> JobBoardService<S, C>
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_config(store, clock, BoardConfig::default())
    }

    pub fn with_config(store: Arc<S>, clock: Arc<C>, config: BoardConfig) -> Self {
        Self {
            store,
            clock,
            guard: CapacityGuard,
            config,
        }
    }

    // ---- profiles ----

    pub fn register_employer(
        &self,
        caller: &Caller,
        registration: EmployerRegistration,
    ) -> Result<EmployerProfile, BoardError> {
        if caller.role != Role::Employer {
            return Err(BoardError::Forbidden(
                "only employer accounts can register an employer profile",
            ));
        }
        require_text("first_name", &registration.first_name, MAX_NAME_LEN)?;
        require_text("last_name", &registration.last_name, MAX_NAME_LEN)?;
        require_text("business_name", &registration.business_name, MAX_TITLE_LEN)?;
        require_text("city", &registration.city, MAX_NAME_LEN)?;

        let now = self.clock.now();
        let profile = self.store.transaction(|tx| {
            tx.insert_employer(caller.user_id.clone(), registration, now)
                .map_err(|err| profile_conflict(err, "employer"))
        })?;

        info!(employer_id = %profile.id, user_id = %caller.user_id, "employer profile registered");
        Ok(profile)
    }

    pub fn employer_profile(&self, caller: &Caller) -> Result<EmployerProfile, BoardError> {
        self.store.read(|tx| require_employer(tx, caller))
    }

    pub fn update_employer_profile(
        &self,
        caller: &Caller,
        patch: EmployerPatch,
    ) -> Result<EmployerProfile, BoardError> {
        let now = self.clock.now();
        self.store.transaction(|tx| {
            let mut profile = require_employer(tx, caller)?;
            apply_employer_patch(&mut profile, patch)?;
            profile.updated_at = now;
            tx.update_employer(profile.clone())?;
            Ok(profile)
        })
    }

    pub fn register_seeker(
        &self,
        caller: &Caller,
        registration: SeekerRegistration,
    ) -> Result<SeekerProfile, BoardError> {
        if caller.role != Role::Seeker {
            return Err(BoardError::Forbidden(
                "only job seeker accounts can register a seeker profile",
            ));
        }
        require_text("full_name", &registration.full_name, MAX_TITLE_LEN)?;

        let now = self.clock.now();
        let profile = self.store.transaction(|tx| {
            tx.insert_seeker(caller.user_id.clone(), registration, now)
                .map_err(|err| profile_conflict(err, "seeker"))
        })?;

        info!(seeker_id = %profile.id, user_id = %caller.user_id, "seeker profile registered");
        Ok(profile)
    }

    pub fn seeker_profile(&self, caller: &Caller) -> Result<SeekerProfile, BoardError> {
        self.store.read(|tx| require_seeker(tx, caller))
    }

    // ---- companies ----

    pub fn companies(&self) -> Result<Vec<CompanyView>, BoardError> {
        self.store.read(|tx| {
            let mut job_counts: BTreeMap<EmployerId, usize> = BTreeMap::new();
            for job in tx.jobs()? {
                *job_counts.entry(job.employer_id).or_default() += 1;
            }
            Ok(tx
                .employers()?
                .iter()
                .map(|profile| {
                    CompanyView::new(profile, job_counts.get(&profile.id).copied().unwrap_or(0))
                })
                .collect())
        })
    }

    pub fn company_jobs(&self, employer_id: EmployerId) -> Result<CompanyJobsView, BoardError> {
        self.store.read(|tx| {
            let profile = tx
                .employer(employer_id)?
                .ok_or(BoardError::NotFound("company"))?;
            let mut jobs: Vec<Job> = tx
                .jobs()?
                .into_iter()
                .filter(|job| job.employer_id == employer_id)
                .collect();
            sort_newest_jobs(&mut jobs);
            let jobs = jobs
                .into_iter()
                .map(|job| job_view(tx, job))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(CompanyJobsView {
                company: CompanyView::new(&profile, jobs.len()),
                jobs,
            })
        })
    }

    // ---- categories ----

    pub fn list_categories(&self, caller: &Caller) -> Result<Vec<JobCategory>, BoardError> {
        if !caller.can_manage_postings() {
            return Err(BoardError::Forbidden(
                "you do not have permission to view categories",
            ));
        }
        self.store.read(|tx| {
            let mut categories = tx.categories()?;
            if caller.is_staff {
                categories.sort_by_key(|category| Reverse(category.id));
            } else {
                categories.retain(|category| category.owner == caller.user_id);
                categories.sort_by_key(|category| Reverse((category.created_at, category.id)));
            }
            Ok(categories)
        })
    }

    pub fn create_category(
        &self,
        caller: &Caller,
        input: CategoryInput,
    ) -> Result<JobCategory, BoardError> {
        if !caller.can_manage_postings() {
            return Err(BoardError::Forbidden(
                "only staff or employers can create categories",
            ));
        }
        let name = require_text("name", &input.name, MAX_NAME_LEN)?;
        let now = self.clock.now();
        let category = self.store.transaction(|tx| {
            tx.insert_category(NewCategory {
                owner: caller.user_id.clone(),
                name,
                created_at: now,
            })
            .map_err(BoardError::from)
        })?;
        debug!(category_id = %category.id, "category created");
        Ok(category)
    }

    pub fn category(&self, caller: &Caller, id: CategoryId) -> Result<JobCategory, BoardError> {
        self.store.read(|tx| managed_category(tx, caller, id))
    }

    pub fn rename_category(
        &self,
        caller: &Caller,
        id: CategoryId,
        input: CategoryInput,
    ) -> Result<JobCategory, BoardError> {
        let name = require_text("name", &input.name, MAX_NAME_LEN)?;
        self.store.transaction(|tx| {
            let mut category = managed_category(tx, caller, id)?;
            category.name = name;
            tx.update_category(category.clone())?;
            Ok(category)
        })
    }

    pub fn delete_category(&self, caller: &Caller, id: CategoryId) -> Result<(), BoardError> {
        self.store.transaction(|tx| {
            managed_category(tx, caller, id)?;
            tx.delete_category(id)?;
            Ok(())
        })
    }

    // ---- jobs ----

    /// Role-scoped job listing. Active jobs past their deadline are closed first.
    pub fn list_jobs(&self, caller: &Caller) -> Result<Vec<JobView>, BoardError> {
        let today = self.clock.today();
        let stale = self.store.read(|tx| {
            let jobs = tx.jobs()?;
            Ok::<_, BoardError>(jobs.iter().any(|job| job.is_active && job.is_expired(today)))
        })?;
        if stale {
            self.close_expired_jobs()?;
        }

        self.store.read(|tx| {
            let mut jobs = tx.jobs()?;
            if !caller.is_staff {
                match tx.employer_by_user(&caller.user_id)? {
                    Some(employer) => jobs.retain(|job| job.employer_id == employer.id),
                    None => jobs.retain(|job| job.is_active),
                }
            }
            sort_newest_jobs(&mut jobs);
            jobs.into_iter().map(|job| job_view(tx, job)).collect()
        })
    }

    fn close_expired_jobs(&self) -> Result<usize, BoardError> {
        let now = self.clock.now();
        let today = self.clock.today();
        let expired = self.store.transaction(|tx| {
            let mut expired = 0usize;
            for mut job in tx.jobs()? {
                if job.is_active && job.is_expired(today) {
                    job.is_active = false;
                    job.updated_at = now;
                    tx.update_job(job)?;
                    expired += 1;
                }
            }
            Ok::<_, BoardError>(expired)
        })?;
        if expired > 0 {
            info!(expired, "closed jobs past their deadline");
        }
        Ok(expired)
    }

    pub fn create_job(&self, caller: &Caller, input: JobInput) -> Result<JobView, BoardError> {
        if !caller.can_manage_postings() {
            return Err(BoardError::Forbidden("only staff or employers can post jobs"));
        }
        let title = require_text("title", &input.title, MAX_TITLE_LEN)?;
        let now = self.clock.now();

        let view = self.store.transaction(|tx| {
            let employer = require_employer(tx, caller)?;
            if let Some(category) = input.category {
                ensure_category_exists(tx, category)?;
            }
            let job = tx.insert_job(NewJob {
                employer_id: employer.id,
                category_id: input.category,
                title,
                description: input.description,
                location: input.location,
                job_type: input.job_type,
                priority: input.priority,
                salary: input.salary,
                max_applicants: input.max_applicants,
                deadline: input.deadline,
                created_at: now,
            })?;
            job_view(tx, job)
        })?;

        info!(job_id = %view.id, employer_id = %view.employer_id, "job posted");
        Ok(view)
    }

    pub fn job(&self, id: JobId) -> Result<JobView, BoardError> {
        self.store.read(|tx| {
            let job = tx.job(id)?.ok_or(BoardError::NotFound("job"))?;
            job_view(tx, job)
        })
    }

    /// Partial update by the owning employer or staff. A job that is full or expired after
    /// the edit stays closed even when the patch asks to reactivate it.
    pub fn update_job(
        &self,
        caller: &Caller,
        id: JobId,
        patch: JobPatch,
    ) -> Result<JobView, BoardError> {
        let now = self.clock.now();
        let today = self.clock.today();
        let guard = self.guard;
        self.store.transaction(|tx| {
            let mut job = managed_job(tx, caller, id)?;
            if let Some(Some(category)) = patch.category {
                ensure_category_exists(tx, category)?;
            }
            apply_job_patch(&mut job, patch)?;

            let count = tx.count_applications(job.id)?;
            if job.is_active && (guard.is_exhausted(&job, count) || job.is_expired(today)) {
                debug!(job_id = %job.id, "edited job remains closed");
                job.is_active = false;
            }
            job.updated_at = now;
            tx.update_job(job.clone())?;
            job_view(tx, job)
        })
    }

    pub fn delete_job(&self, caller: &Caller, id: JobId) -> Result<(), BoardError> {
        self.store.transaction(|tx| {
            let job = managed_job(tx, caller, id)?;
            tx.delete_job(job.id)?;
            Ok::<_, BoardError>(())
        })?;
        info!(job_id = %id, "job deleted");
        Ok(())
    }

    /// Open jobs ranked by priority then recency.
    pub fn search_jobs(&self, search: &JobSearch) -> Result<SearchResults, BoardError> {
        let today = self.clock.today();
        let keyword = normalized_filter(search.q.as_deref());
        let location = normalized_filter(search.loc.as_deref());

        self.store.read(|tx| {
            let categories: BTreeMap<CategoryId, String> = tx
                .categories()?
                .into_iter()
                .map(|category| (category.id, category.name))
                .collect();

            let mut hits: Vec<(Job, Option<String>)> = tx
                .jobs()?
                .into_iter()
                .filter(|job| job.is_open(today))
                .map(|job| {
                    let category = job.category_id.and_then(|id| categories.get(&id).cloned());
                    (job, category)
                })
                .filter(|(job, category)| match &keyword {
                    Some(keyword) => {
                        contains(&job.title, keyword)
                            || contains(&job.location, keyword)
                            || category
                                .as_deref()
                                .is_some_and(|name| contains(name, keyword))
                            || contains(&job.description, keyword)
                    }
                    None => true,
                })
                .filter(|(job, _)| match &location {
                    Some(location) => contains(&job.location, location),
                    None => true,
                })
                .collect();

            hits.sort_by_key(|(job, _)| Reverse((job.priority.rank(), job.created_at, job.id)));
            hits.truncate(SEARCH_RESULT_LIMIT);

            let results: Vec<SearchHit> = hits
                .into_iter()
                .map(|(job, category_name)| SearchHit {
                    id: job.id,
                    title: job.title,
                    location: job.location,
                    category_name,
                    priority: job.priority,
                    created_at: job.created_at,
                })
                .collect();

            Ok(SearchResults {
                count: results.len(),
                results,
            })
        })
    }

    // ---- applications ----

    /// Apply to a job. Creation, the capacity re-count, and any resulting deactivation commit
    /// together; a rejection that closes the job commits the deactivation alone.
    pub fn apply(
        &self,
        caller: &Caller,
        job_id: JobId,
        request: ApplyRequest,
    ) -> Result<ApplicationView, BoardError> {
        let now = self.clock.now();
        let today = self.clock.today();
        let guard = self.guard;

        let outcome = self.store.transaction::<_, BoardError, _>(|tx| {
            let seeker = require_seeker(tx, caller)?;
            let mut job = tx.job(job_id)?.ok_or(BoardError::NotFound("job"))?;
            let context = AdmissionContext {
                current_applications: tx.count_applications(job.id)?,
                already_applied: tx.application_for(job.id, seeker.id)?.is_some(),
                today,
            };

            if let Err(rejection) = guard.admit(&job, context) {
                let closed = rejection.closes_job() && job.is_active;
                if closed {
                    job.is_active = false;
                    job.updated_at = now;
                    tx.update_job(job)?;
                }
                return Ok(ApplyOutcome::Rejected { rejection, closed });
            }

            let application = tx
                .insert_application(NewApplication {
                    job_id: job.id,
                    seeker_id: seeker.id,
                    cover_letter: request.cover_letter,
                    created_at: now,
                })
                .map_err(|err| match err {
                    RepositoryError::Conflict => BoardError::DuplicateApplication,
                    other => BoardError::Repository(other),
                })?;

            let closed = guard.is_exhausted(&job, tx.count_applications(job.id)?);
            if closed {
                job.is_active = false;
                job.updated_at = now;
                tx.update_job(job.clone())?;
            }

            let employer = tx.employer(job.employer_id)?;
            let view =
                ApplicationView::new(application, Some(&job), employer.as_ref(), Some(&seeker));
            Ok(ApplyOutcome::Accepted { view, closed })
        })?;

        match outcome {
            ApplyOutcome::Accepted { view, closed } => {
                info!(
                    application_id = %view.id,
                    job_id = %job_id,
                    seeker_id = %view.seeker_id,
                    "application accepted"
                );
                if closed {
                    info!(job_id = %job_id, "job reached capacity and was closed");
                }
                Ok(view)
            }
            ApplyOutcome::Rejected { rejection, closed } => {
                if closed {
                    info!(job_id = %job_id, ?rejection, "job closed while rejecting application");
                }
                warn!(job_id = %job_id, user_id = %caller.user_id, ?rejection, "application rejected");
                Err(rejection.into())
            }
        }
    }

    /// Relabel an application. Only the employer who owns the job may do this.
    pub fn update_status(
        &self,
        caller: &Caller,
        application_id: ApplicationId,
        label: &str,
    ) -> Result<StatusChange, BoardError> {
        let now = self.clock.now();
        let change = self.store.transaction(|tx| {
            let mut application = tx
                .application(application_id)?
                .ok_or(BoardError::NotFound("application"))?;
            let job = tx
                .job(application.job_id)?
                .ok_or(BoardError::NotFound("job"))?;
            let owner = tx.employer_by_user(&caller.user_id)?;
            if owner.map(|profile| profile.id) != Some(job.employer_id) {
                return Err(BoardError::Forbidden(
                    "only the employer who posted this job can change application status",
                ));
            }

            let target = status::resolve_status(label)
                .map_err(|unknown| BoardError::InvalidStatus(unknown.0))?;
            let change = status::transition(&mut application, target, now);
            tx.update_application(application)?;
            Ok(change)
        })?;

        info!(
            application_id = %application_id,
            from = change.previous.code(),
            to = change.status.code(),
            "application status changed"
        );
        Ok(change)
    }

    /// Visible to the applying seeker, the owning employer, and staff.
    pub fn application(
        &self,
        caller: &Caller,
        id: ApplicationId,
    ) -> Result<ApplicationView, BoardError> {
        self.store.read(|tx| {
            let application = tx
                .application(id)?
                .ok_or(BoardError::NotFound("application"))?;
            let parties = ApplicationParties::load(tx, &application)?;
            if !caller.is_staff && !parties.involves(caller) {
                return Err(BoardError::Forbidden(
                    "you do not have access to this application",
                ));
            }
            Ok(parties.view(application))
        })
    }

    /// Withdraw (seeker) or remove (employer) an application. Capacity closures stay in place.
    pub fn delete_application(&self, caller: &Caller, id: ApplicationId) -> Result<(), BoardError> {
        self.store.transaction(|tx| {
            let application = tx
                .application(id)?
                .ok_or(BoardError::NotFound("application"))?;
            let parties = ApplicationParties::load(tx, &application)?;
            if !caller.is_staff && !parties.involves(caller) {
                return Err(BoardError::Forbidden(
                    "you do not have access to this application",
                ));
            }
            tx.delete_application(id)?;
            Ok(())
        })?;
        info!(application_id = %id, user_id = %caller.user_id, "application removed");
        Ok(())
    }

    pub fn seeker_applications(&self, caller: &Caller) -> Result<Vec<ApplicationView>, BoardError> {
        self.store.read(|tx| {
            let seeker = require_seeker(tx, caller)?;
            let mut applications = tx.applications_for_seeker(seeker.id)?;
            segmentation::newest_first(&mut applications);
            application_views(tx, applications)
        })
    }

    pub fn employer_applications(
        &self,
        caller: &Caller,
    ) -> Result<Vec<ApplicationView>, BoardError> {
        self.store.read(|tx| {
            let mut applications = employer_scope(tx, caller)?.applications;
            segmentation::newest_first(&mut applications);
            application_views(tx, applications)
        })
    }

    pub fn job_applications(
        &self,
        caller: &Caller,
        job_id: JobId,
    ) -> Result<Vec<ApplicationView>, BoardError> {
        self.store.read(|tx| {
            let job = tx.job(job_id)?.ok_or(BoardError::NotFound("job"))?;
            if !caller.is_staff {
                let owner = tx.employer_by_user(&caller.user_id)?;
                if owner.map(|profile| profile.id) != Some(job.employer_id) {
                    return Err(BoardError::Forbidden(
                        "only the employer who posted this job can list its applications",
                    ));
                }
            }
            let mut applications = tx.applications_for_job(job_id)?;
            segmentation::newest_first(&mut applications);
            application_views(tx, applications)
        })
    }

    pub fn applications_in_bucket(
        &self,
        caller: &Caller,
        bucket: ApplicationBucket,
    ) -> Result<Vec<ApplicationView>, BoardError> {
        self.store.read(|tx| {
            let scope = employer_scope(tx, caller)?;
            application_views(tx, segmentation::bucket(scope.applications, bucket))
        })
    }

    /// Most recent applications across the whole board.
    pub fn recent_applications(
        &self,
        caller: &Caller,
        limit: Option<usize>,
    ) -> Result<Vec<ApplicationView>, BoardError> {
        if !caller.can_manage_postings() {
            return Err(BoardError::Forbidden(
                "only staff or employers can view recent applications",
            ));
        }
        let limit = limit.unwrap_or(self.config.recent_limit);
        self.store.read(|tx| {
            let applications = segmentation::recent(tx.applications()?, limit);
            application_views(tx, applications)
        })
    }

    // ---- saved jobs ----

    /// Bookmark a job for later. Closed jobs may still be saved.
    pub fn save_job(&self, caller: &Caller, job_id: JobId) -> Result<SavedJobView, BoardError> {
        let now = self.clock.now();
        let view = self.store.transaction(|tx| {
            let seeker = require_seeker(tx, caller)?;
            let job = tx.job(job_id)?.ok_or(BoardError::NotFound("job"))?;
            let saved = tx
                .insert_saved_job(NewSavedJob {
                    seeker_id: seeker.id,
                    job_id: job.id,
                    saved_at: now,
                })
                .map_err(|err| match err {
                    RepositoryError::Conflict => BoardError::AlreadySaved,
                    other => BoardError::Repository(other),
                })?;
            Ok::<_, BoardError>(SavedJobView::new(saved, job_view(tx, job)?))
        })?;

        debug!(saved_job_id = %view.id, job_id = %job_id, "job saved");
        Ok(view)
    }

    pub fn saved_jobs(&self, caller: &Caller) -> Result<Vec<SavedJobView>, BoardError> {
        self.store.read(|tx| {
            let seeker = require_seeker(tx, caller)?;
            let mut saved = tx.saved_jobs_for_seeker(seeker.id)?;
            saved.sort_by_key(|saved| Reverse((saved.saved_at, saved.id)));
            saved
                .into_iter()
                .map(|saved| saved_job_view(tx, saved))
                .collect()
        })
    }

    pub fn saved_job(&self, caller: &Caller, id: SavedJobId) -> Result<SavedJobView, BoardError> {
        self.store.read(|tx| {
            let saved = own_saved_job(tx, caller, id)?;
            saved_job_view(tx, saved)
        })
    }

    pub fn remove_saved_job(&self, caller: &Caller, id: SavedJobId) -> Result<(), BoardError> {
        self.store.transaction(|tx| {
            let saved = own_saved_job(tx, caller, id)?;
            tx.delete_saved_job(saved.id)?;
            Ok(())
        })
    }

    pub fn dashboard(&self, caller: &Caller) -> Result<DashboardView, BoardError> {
        let today = self.clock.today();
        self.store.read(|tx| {
            let scope = employer_scope(tx, caller)?;
            let expired_jobs = scope
                .jobs
                .iter()
                .filter(|job| job.is_expired(today))
                .count();
            Ok(DashboardView {
                total_jobs: scope.jobs.len(),
                total_applications: scope.applications.len(),
                active_jobs: scope.jobs.len() - expired_jobs,
                expired_jobs,
                applications_by_status: segmentation::counts(&scope.applications),
            })
        })
    }
}

fn profile_conflict(err: RepositoryError, kind: &'static str) -> BoardError {
    match err {
        RepositoryError::Conflict => BoardError::ProfileExists(kind),
        other => BoardError::Repository(other),
    }
}

fn require_employer(
    tx: &dyn BoardTransaction,
    caller: &Caller,
) -> Result<EmployerProfile, BoardError> {
    tx.employer_by_user(&caller.user_id)?
        .ok_or(BoardError::NotFound("employer profile"))
}

fn require_seeker(tx: &dyn BoardTransaction, caller: &Caller) -> Result<SeekerProfile, BoardError> {
    tx.seeker_by_user(&caller.user_id)?
        .ok_or(BoardError::NotFound("seeker profile"))
}

/// Staff may manage any job; employers only their own. Other jobs read as missing.
fn managed_job(tx: &dyn BoardTransaction, caller: &Caller, id: JobId) -> Result<Job, BoardError> {
    if !caller.can_manage_postings() {
        return Err(BoardError::Forbidden("only staff or employers can manage jobs"));
    }
    let job = tx.job(id)?.ok_or(BoardError::NotFound("job"))?;
    if caller.is_staff {
        return Ok(job);
    }
    match tx.employer_by_user(&caller.user_id)? {
        Some(employer) if employer.id == job.employer_id => Ok(job),
        _ => Err(BoardError::NotFound("job")),
    }
}

fn managed_category(
    tx: &dyn BoardTransaction,
    caller: &Caller,
    id: CategoryId,
) -> Result<JobCategory, BoardError> {
    if !caller.can_manage_postings() {
        return Err(BoardError::Forbidden(
            "only staff or employers can manage categories",
        ));
    }
    let category = tx.category(id)?.ok_or(BoardError::NotFound("category"))?;
    if caller.is_staff || category.owner == caller.user_id {
        Ok(category)
    } else {
        Err(BoardError::NotFound("category"))
    }
}

/// Bookmarks belonging to someone else read as missing.
fn own_saved_job(
    tx: &dyn BoardTransaction,
    caller: &Caller,
    id: SavedJobId,
) -> Result<SavedJob, BoardError> {
    let seeker = require_seeker(tx, caller)?;
    match tx.saved_job(id)? {
        Some(saved) if saved.seeker_id == seeker.id => Ok(saved),
        _ => Err(BoardError::NotFound("saved job")),
    }
}

fn saved_job_view(tx: &dyn BoardTransaction, saved: SavedJob) -> Result<SavedJobView, BoardError> {
    let job = tx.job(saved.job_id)?.ok_or(BoardError::NotFound("job"))?;
    Ok(SavedJobView::new(saved, job_view(tx, job)?))
}

fn ensure_category_exists(tx: &dyn BoardTransaction, id: CategoryId) -> Result<(), BoardError> {
    match tx.category(id)? {
        Some(_) => Ok(()),
        None => Err(BoardError::ValidationFailed(format!(
            "category {id} does not exist"
        ))),
    }
}

struct EmployerScope {
    jobs: Vec<Job>,
    applications: Vec<Application>,
}

fn employer_scope(tx: &dyn BoardTransaction, caller: &Caller) -> Result<EmployerScope, BoardError> {
    let employer = require_employer(tx, caller)?;
    let jobs: Vec<Job> = tx
        .jobs()?
        .into_iter()
        .filter(|job| job.employer_id == employer.id)
        .collect();
    let mut applications = Vec::new();
    for job in &jobs {
        applications.extend(tx.applications_for_job(job.id)?);
    }
    Ok(EmployerScope { jobs, applications })
}

struct ApplicationParties {
    job: Option<Job>,
    employer: Option<EmployerProfile>,
    seeker: Option<SeekerProfile>,
}

impl ApplicationParties {
    fn load(tx: &dyn BoardTransaction, application: &Application) -> Result<Self, BoardError> {
        let job = tx.job(application.job_id)?;
        let employer = match &job {
            Some(job) => tx.employer(job.employer_id)?,
            None => None,
        };
        let seeker = tx.seeker(application.seeker_id)?;
        Ok(Self {
            job,
            employer,
            seeker,
        })
    }

    fn involves(&self, caller: &Caller) -> bool {
        let is_seeker = self
            .seeker
            .as_ref()
            .is_some_and(|profile| profile.user_id == caller.user_id);
        let is_employer = self
            .employer
            .as_ref()
            .is_some_and(|profile| profile.user_id == caller.user_id);
        is_seeker || is_employer
    }

    fn view(&self, application: Application) -> ApplicationView {
        ApplicationView::new(
            application,
            self.job.as_ref(),
            self.employer.as_ref(),
            self.seeker.as_ref(),
        )
    }
}

fn application_views(
    tx: &dyn BoardTransaction,
    applications: Vec<Application>,
) -> Result<Vec<ApplicationView>, BoardError> {
    applications
        .into_iter()
        .map(|application| {
            let parties = ApplicationParties::load(tx, &application)?;
            Ok(parties.view(application))
        })
        .collect()
}

fn job_view(tx: &dyn BoardTransaction, job: Job) -> Result<JobView, BoardError> {
    let employer = tx.employer(job.employer_id)?;
    let category = match job.category_id {
        Some(id) => tx.category(id)?,
        None => None,
    };
    Ok(JobView::new(job, employer.as_ref(), category.as_ref()))
}

fn sort_newest_jobs(jobs: &mut [Job]) {
    jobs.sort_by_key(|job| Reverse((job.created_at, job.id)));
}

fn require_text(field: &'static str, value: &str, max_len: usize) -> Result<String, BoardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::ValidationFailed(format!("{field} must not be blank")));
    }
    if trimmed.chars().count() > max_len {
        return Err(BoardError::ValidationFailed(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn apply_job_patch(job: &mut Job, patch: JobPatch) -> Result<(), BoardError> {
    let JobPatch {
        title,
        description,
        location,
        job_type,
        priority,
        salary,
        max_applicants,
        deadline,
        category,
        is_active,
    } = patch;

    if let Some(title) = title {
        job.title = require_text("title", &title, MAX_TITLE_LEN)?;
    }
    if let Some(description) = description {
        job.description = description;
    }
    if let Some(location) = location {
        job.location = location;
    }
    if let Some(job_type) = job_type {
        job.job_type = job_type;
    }
    if let Some(priority) = priority {
        job.priority = priority;
    }
    if let Some(salary) = salary {
        job.salary = salary;
    }
    if let Some(max_applicants) = max_applicants {
        job.max_applicants = max_applicants;
    }
    if let Some(deadline) = deadline {
        job.deadline = deadline;
    }
    if let Some(category) = category {
        job.category_id = category;
    }
    if let Some(is_active) = is_active {
        job.is_active = is_active;
    }
    Ok(())
}

fn apply_employer_patch(profile: &mut EmployerProfile, patch: EmployerPatch) -> Result<(), BoardError> {
    if let Some(first_name) = patch.first_name {
        profile.first_name = require_text("first_name", &first_name, MAX_NAME_LEN)?;
    }
    if let Some(last_name) = patch.last_name {
        profile.last_name = require_text("last_name", &last_name, MAX_NAME_LEN)?;
    }
    if let Some(business_name) = patch.business_name {
        profile.business_name = require_text("business_name", &business_name, MAX_TITLE_LEN)?;
    }
    if let Some(city) = patch.city {
        profile.city = require_text("city", &city, MAX_NAME_LEN)?;
    }
    if patch.phone.is_some() {
        profile.phone = patch.phone;
    }
    if patch.size.is_some() {
        profile.size = patch.size;
    }
    if patch.website.is_some() {
        profile.website = patch.website;
    }
    if patch.industry.is_some() {
        profile.industry = patch.industry;
    }
    if patch.founded_year.is_some() {
        profile.founded_year = patch.founded_year;
    }
    if patch.contact_email.is_some() {
        profile.contact_email = patch.contact_email;
    }
    if patch.description.is_some() {
        profile.description = patch.description;
    }
    Ok(())
}

fn normalized_filter(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

fn contains(haystack: &str, needle_lowercase: &str) -> bool {
    haystack.to_lowercase().contains(needle_lowercase)
}
