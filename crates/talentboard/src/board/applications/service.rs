use std::sync::Arc;

use tracing::debug;

use crate::board::domain::{ApplicationOutcome, JobId, User, UserId, UserView};
use crate::board::store::{JobStore, StoreError, UserStore};

/// Bounded retries for version-conflict races on the user document.
const UPDATE_ATTEMPTS: usize = 3;

/// Service owning the job-application lifecycle across the user and job
/// collections.
pub struct ApplicationLifecycle<U, J> {
    users: Arc<U>,
    jobs: Arc<J>,
}

impl<U, J> ApplicationLifecycle<U, J>
where
    U: UserStore + 'static,
    J: JobStore + 'static,
{
    pub fn new(users: Arc<U>, jobs: Arc<J>) -> Self {
        Self { users, jobs }
    }

    /// Record the applicant's interest in a job. The job id lands in the
    /// `applied` set exactly once; a repeat apply is a conflict.
    pub fn apply(&self, job: &JobId, applicant: &UserId) -> Result<UserView, LifecycleError> {
        if self.jobs.fetch(job)?.is_none() {
            return Err(LifecycleError::JobNotFound);
        }

        let stored = self.update_applicant(applicant, |user| {
            if user.applied.contains(job) {
                return Err(LifecycleError::AlreadyApplied);
            }
            user.applied.insert(job.clone());
            Ok(())
        })?;

        debug!(job = %job.0, applicant = %applicant.0, "application recorded");
        Ok(UserView::from(&stored))
    }

    /// Provisionally advance an applicant for a job. Requires a prior apply
    /// and refuses duplicates; the `rejected` set is not consulted here.
    pub fn shortlist(&self, job: &JobId, applicant: &UserId) -> Result<UserView, LifecycleError> {
        if self.jobs.fetch(job)?.is_none() {
            return Err(LifecycleError::JobNotFound);
        }

        let stored = self.update_applicant(applicant, |user| {
            if !user.applied.contains(job) {
                return Err(LifecycleError::NotApplied);
            }
            if user.shortlisted.contains(job) {
                return Err(LifecycleError::AlreadyShortlisted);
            }
            user.shortlisted.insert(job.clone());
            Ok(())
        })?;

        debug!(job = %job.0, applicant = %applicant.0, "applicant shortlisted");
        Ok(UserView::from(&stored))
    }

    /// Authoritative, idempotent state-setter for a user-job pair. The job id
    /// is removed from both outcome sets before the requested one is written,
    /// so the two stay mutually exclusive and repeated calls converge.
    ///
    /// The outcome is already parsed at this point; an unknown status string
    /// never reaches the document.
    pub fn resolve(
        &self,
        applicant: &UserId,
        job: &JobId,
        outcome: ApplicationOutcome,
    ) -> Result<UserView, LifecycleError> {
        let stored = self.update_applicant(applicant, |user| {
            user.shortlisted.remove(job);
            user.rejected.remove(job);
            match outcome {
                ApplicationOutcome::Accepted => user.shortlisted.insert(job.clone()),
                ApplicationOutcome::Rejected => user.rejected.insert(job.clone()),
            };
            Ok(())
        })?;

        debug!(
            job = %job.0,
            applicant = %applicant.0,
            outcome = outcome.label(),
            "application resolved"
        );
        Ok(UserView::from(&stored))
    }

    /// Everyone whose `applied` set contains the job. Empty is a valid answer.
    pub fn applicants(&self, job: &JobId) -> Result<Vec<UserView>, LifecycleError> {
        let users = self.users.applied_to(job)?;
        Ok(users.iter().map(UserView::from).collect())
    }

    /// Everyone whose `shortlisted` set contains the job.
    pub fn shortlisted(&self, job: &JobId) -> Result<Vec<UserView>, LifecycleError> {
        let users = self.users.shortlisted_for(job)?;
        Ok(users.iter().map(UserView::from).collect())
    }

    /// Read-modify-write with bounded retries. Every attempt re-fetches the
    /// document and re-runs the precondition closure against fresh state.
    fn update_applicant<F>(&self, applicant: &UserId, mutate: F) -> Result<User, LifecycleError>
    where
        F: Fn(&mut User) -> Result<(), LifecycleError>,
    {
        for _ in 0..UPDATE_ATTEMPTS {
            let mut user = self
                .users
                .fetch(applicant)?
                .ok_or(LifecycleError::ApplicantNotFound)?;

            mutate(&mut user)?;

            match self.users.update(user) {
                Ok(stored) => return Ok(stored),
                Err(StoreError::VersionConflict) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(StoreError::VersionConflict.into())
    }
}

/// Error raised by lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("job not found")]
    JobNotFound,
    #[error("applicant not found")]
    ApplicantNotFound,
    #[error("you have already applied to this job")]
    AlreadyApplied,
    #[error("this user has not applied to the job")]
    NotApplied,
    #[error("applicant already shortlisted for this job")]
    AlreadyShortlisted,
    #[error(transparent)]
    Store(#[from] StoreError),
}
