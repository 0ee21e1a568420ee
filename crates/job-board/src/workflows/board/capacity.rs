use chrono::NaiveDate;

use super::domain::Job;

/// Why a job refused a new application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionRejection {
    Duplicate,
    Full { capacity: u32 },
    Expired { deadline: NaiveDate },
    Inactive,
}

impl AdmissionRejection {
    /// Rejections that must also flip an active job to inactive.
    pub fn closes_job(self) -> bool {
        matches!(self, Self::Full { .. } | Self::Expired { .. })
    }
}

/// Inputs the guard needs about a job at decision time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionContext {
    pub current_applications: usize,
    pub already_applied: bool,
    pub today: NaiveDate,
}

/// Capacity and deadline rules for accepting applications.
///
/// Checks run in a fixed order: duplicate, capacity, deadline, active flag. A full job reports
/// `Full` even after it has been deactivated so callers always see why it closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct CapacityGuard;

impl CapacityGuard {
    pub fn admit(&self, job: &Job, context: AdmissionContext) -> Result<(), AdmissionRejection> {
        if context.already_applied {
            return Err(AdmissionRejection::Duplicate);
        }

        if let Some(capacity) = job.capacity() {
            if context.current_applications >= capacity as usize {
                return Err(AdmissionRejection::Full { capacity });
            }
        }

        if let Some(deadline) = job.deadline.filter(|_| job.is_expired(context.today)) {
            return Err(AdmissionRejection::Expired { deadline });
        }

        if !job.is_active {
            return Err(AdmissionRejection::Inactive);
        }

        Ok(())
    }

    /// Whether a job holding `count` applications has reached its cap.
    pub fn is_exhausted(&self, job: &Job, count: usize) -> bool {
        job.capacity()
            .is_some_and(|capacity| count >= capacity as usize)
    }
}
