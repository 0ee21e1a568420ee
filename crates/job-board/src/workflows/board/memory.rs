use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, CategoryId, EmployerId, EmployerProfile, EmployerRegistration,
    Job, JobCategory, JobId, NewApplication, NewCategory, NewJob, NewSavedJob, SavedJob,
    SavedJobId, SeekerId, SeekerProfile, SeekerRegistration, UserId,
};
use super::repository::{BoardStore, BoardTransaction, RepositoryError};
use super::status::ApplicationStatus;

/// Process-local store. Transactions run one at a time against a private copy of the state,
/// which replaces the shared state only when the unit of work succeeds.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBoardStore {
    state: Arc<Mutex<BoardState>>,
}

impl BoardStore for InMemoryBoardStore {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn BoardTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let guard = self.state.lock().map_err(|_| poisoned())?;
        work(&*guard)
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.state.lock().map_err(|_| poisoned())?;
        let mut draft = guard.clone();
        let output = work(&mut draft)?;
        *guard = draft;
        Ok(output)
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("board store mutex poisoned".to_string())
}

#[derive(Debug, Default, Clone)]
struct Sequences {
    employer: u64,
    seeker: u64,
    category: u64,
    job: u64,
    application: u64,
    saved_job: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default, Clone)]
struct BoardState {
    sequences: Sequences,
    employers: BTreeMap<EmployerId, EmployerProfile>,
    seekers: BTreeMap<SeekerId, SeekerProfile>,
    categories: BTreeMap<CategoryId, JobCategory>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, Application>,
    saved_jobs: BTreeMap<SavedJobId, SavedJob>,
}

impl BoardTransaction for BoardState {
    fn employer(&self, id: EmployerId) -> Result<Option<EmployerProfile>, RepositoryError> {
        Ok(self.employers.get(&id).cloned())
    }

    fn employer_by_user(&self, user: &UserId) -> Result<Option<EmployerProfile>, RepositoryError> {
        Ok(self
            .employers
            .values()
            .find(|profile| &profile.user_id == user)
            .cloned())
    }

    fn employers(&self) -> Result<Vec<EmployerProfile>, RepositoryError> {
        Ok(self.employers.values().cloned().collect())
    }

    fn insert_employer(
        &mut self,
        user: UserId,
        registration: EmployerRegistration,
        created_at: DateTime<Utc>,
    ) -> Result<EmployerProfile, RepositoryError> {
        if self.employers.values().any(|profile| profile.user_id == user) {
            return Err(RepositoryError::Conflict);
        }

        let EmployerRegistration {
            first_name,
            last_name,
            business_name,
            city,
            phone,
            size,
            website,
            industry,
            founded_year,
            contact_email,
            description,
        } = registration;

        let profile = EmployerProfile {
            id: EmployerId(next(&mut self.sequences.employer)),
            user_id: user,
            first_name,
            last_name,
            business_name,
            city,
            phone,
            size,
            website,
            industry,
            founded_year,
            contact_email,
            description,
            created_at,
            updated_at: created_at,
        };
        self.employers.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn update_employer(&mut self, profile: EmployerProfile) -> Result<(), RepositoryError> {
        match self.employers.get_mut(&profile.id) {
            Some(slot) => {
                *slot = profile;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn seeker(&self, id: SeekerId) -> Result<Option<SeekerProfile>, RepositoryError> {
        Ok(self.seekers.get(&id).cloned())
    }

    fn seeker_by_user(&self, user: &UserId) -> Result<Option<SeekerProfile>, RepositoryError> {
        Ok(self
            .seekers
            .values()
            .find(|profile| &profile.user_id == user)
            .cloned())
    }

    fn insert_seeker(
        &mut self,
        user: UserId,
        registration: SeekerRegistration,
        created_at: DateTime<Utc>,
    ) -> Result<SeekerProfile, RepositoryError> {
        if self.seekers.values().any(|profile| profile.user_id == user) {
            return Err(RepositoryError::Conflict);
        }

        let profile = SeekerProfile {
            id: SeekerId(next(&mut self.sequences.seeker)),
            user_id: user,
            full_name: registration.full_name,
            headline: registration.headline,
            city: registration.city,
            created_at,
        };
        self.seekers.insert(profile.id, profile.clone());
        Ok(profile)
    }

    fn category(&self, id: CategoryId) -> Result<Option<JobCategory>, RepositoryError> {
        Ok(self.categories.get(&id).cloned())
    }

    fn categories(&self) -> Result<Vec<JobCategory>, RepositoryError> {
        Ok(self.categories.values().cloned().collect())
    }

    fn insert_category(&mut self, category: NewCategory) -> Result<JobCategory, RepositoryError> {
        let stored = JobCategory {
            id: CategoryId(next(&mut self.sequences.category)),
            owner: category.owner,
            name: category.name,
            created_at: category.created_at,
        };
        self.categories.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_category(&mut self, category: JobCategory) -> Result<(), RepositoryError> {
        match self.categories.get_mut(&category.id) {
            Some(slot) => {
                *slot = category;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<bool, RepositoryError> {
        if self.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for job in self.jobs.values_mut() {
            if job.category_id == Some(id) {
                job.category_id = None;
            }
        }
        Ok(true)
    }

    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.get(&id).cloned())
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.jobs.values().cloned().collect())
    }

    fn insert_job(&mut self, job: NewJob) -> Result<Job, RepositoryError> {
        if !self.employers.contains_key(&job.employer_id) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(category) = job.category_id {
            if !self.categories.contains_key(&category) {
                return Err(RepositoryError::NotFound);
            }
        }

        let stored = Job {
            id: JobId(next(&mut self.sequences.job)),
            employer_id: job.employer_id,
            category_id: job.category_id,
            title: job.title,
            description: job.description,
            location: job.location,
            job_type: job.job_type,
            priority: job.priority,
            salary: job.salary,
            max_applicants: job.max_applicants,
            deadline: job.deadline,
            is_active: true,
            created_at: job.created_at,
            updated_at: job.created_at,
        };
        self.jobs.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_job(&mut self, job: Job) -> Result<(), RepositoryError> {
        match self.jobs.get_mut(&job.id) {
            Some(slot) => {
                *slot = job;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete_job(&mut self, id: JobId) -> Result<bool, RepositoryError> {
        if self.jobs.remove(&id).is_none() {
            return Ok(false);
        }
        self.applications
            .retain(|_, application| application.job_id != id);
        self.saved_jobs.retain(|_, saved| saved.job_id != id);
        Ok(true)
    }

    fn application(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.applications.get(&id).cloned())
    }

    fn application_for(
        &self,
        job: JobId,
        seeker: SeekerId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self
            .applications
            .values()
            .find(|application| application.job_id == job && application.seeker_id == seeker)
            .cloned())
    }

    fn applications(&self) -> Result<Vec<Application>, RepositoryError> {
        Ok(self.applications.values().cloned().collect())
    }

    fn applications_for_job(&self, job: JobId) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .applications
            .values()
            .filter(|application| application.job_id == job)
            .cloned()
            .collect())
    }

    fn applications_for_seeker(
        &self,
        seeker: SeekerId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Ok(self
            .applications
            .values()
            .filter(|application| application.seeker_id == seeker)
            .cloned()
            .collect())
    }

    fn count_applications(&self, job: JobId) -> Result<usize, RepositoryError> {
        Ok(self
            .applications
            .values()
            .filter(|application| application.job_id == job)
            .count())
    }

    fn insert_application(
        &mut self,
        application: NewApplication,
    ) -> Result<Application, RepositoryError> {
        if !self.jobs.contains_key(&application.job_id)
            || !self.seekers.contains_key(&application.seeker_id)
        {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = self.applications.values().any(|existing| {
            existing.job_id == application.job_id && existing.seeker_id == application.seeker_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let stored = Application {
            id: ApplicationId(next(&mut self.sequences.application)),
            job_id: application.job_id,
            seeker_id: application.seeker_id,
            status: ApplicationStatus::Pending,
            cover_letter: application.cover_letter,
            created_at: application.created_at,
            updated_at: application.created_at,
        };
        self.applications.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_application(&mut self, application: Application) -> Result<(), RepositoryError> {
        match self.applications.get_mut(&application.id) {
            Some(slot) => {
                *slot = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete_application(&mut self, id: ApplicationId) -> Result<bool, RepositoryError> {
        Ok(self.applications.remove(&id).is_some())
    }

    fn saved_job(&self, id: SavedJobId) -> Result<Option<SavedJob>, RepositoryError> {
        Ok(self.saved_jobs.get(&id).cloned())
    }

    fn saved_jobs_for_seeker(&self, seeker: SeekerId) -> Result<Vec<SavedJob>, RepositoryError> {
        Ok(self
            .saved_jobs
            .values()
            .filter(|saved| saved.seeker_id == seeker)
            .cloned()
            .collect())
    }

    fn insert_saved_job(&mut self, saved: NewSavedJob) -> Result<SavedJob, RepositoryError> {
        if !self.jobs.contains_key(&saved.job_id) || !self.seekers.contains_key(&saved.seeker_id) {
            return Err(RepositoryError::NotFound);
        }
        let duplicate = self.saved_jobs.values().any(|existing| {
            existing.job_id == saved.job_id && existing.seeker_id == saved.seeker_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let stored = SavedJob {
            id: SavedJobId(next(&mut self.sequences.saved_job)),
            seeker_id: saved.seeker_id,
            job_id: saved.job_id,
            saved_at: saved.saved_at,
        };
        self.saved_jobs.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn delete_saved_job(&mut self, id: SavedJobId) -> Result<bool, RepositoryError> {
        Ok(self.saved_jobs.remove(&id).is_some())
    }
}
