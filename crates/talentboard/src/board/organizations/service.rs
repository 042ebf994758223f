use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::domain::{
    Job, JobId, JobStatus, Organization, OrgId, UserView,
};
use crate::board::store::{JobStore, OrganizationStore, StoreError, UserStore};

static ORG_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_org_id() -> OrgId {
    let id = ORG_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OrgId(format!("org-{id:06}"))
}

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrganization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Explicit partial update for an organization; absent/empty fields are no-ops.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewJob {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub compensation: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Explicit partial update for a job posting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub compensation: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Organization read model with the membership references resolved.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationView {
    pub id: OrgId,
    pub name: String,
    pub image: Option<String>,
    pub url: String,
    pub users: Vec<UserView>,
    pub jobs: Vec<Job>,
}

/// Service over the organization and job collections.
pub struct OrganizationService {
    organizations: Arc<dyn OrganizationStore>,
    jobs: Arc<dyn JobStore>,
    users: Arc<dyn UserStore>,
}

impl OrganizationService {
    pub fn new(
        organizations: Arc<dyn OrganizationStore>,
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            organizations,
            jobs,
            users,
        }
    }

    pub fn create(&self, new: NewOrganization) -> Result<Organization, OrganizationError> {
        let (Some(name), Some(url)) = (
            new.name.filter(|v| !v.is_empty()),
            new.url.filter(|v| !v.is_empty()),
        ) else {
            return Err(OrganizationError::MissingOrgFields);
        };

        let organization = Organization {
            id: next_org_id(),
            name,
            image: new.image,
            url,
            users: Vec::new(),
            jobs: Vec::new(),
        };

        let stored = self.organizations.insert(organization)?;
        debug!(organization = %stored.id.0, "organization created");
        Ok(stored)
    }

    /// Resolve the membership references so callers get full records back.
    /// Dangling references are skipped rather than failing the read.
    pub fn get(&self, id: &OrgId) -> Result<OrganizationView, OrganizationError> {
        let organization = self
            .organizations
            .fetch(id)?
            .ok_or(OrganizationError::OrganizationNotFound)?;

        let mut users = Vec::with_capacity(organization.users.len());
        for user_id in &organization.users {
            if let Some(user) = self.users.fetch(user_id)? {
                users.push(UserView::from(&user));
            }
        }

        let mut jobs = Vec::with_capacity(organization.jobs.len());
        for job_id in &organization.jobs {
            if let Some(job) = self.jobs.fetch(job_id)? {
                jobs.push(job);
            }
        }

        Ok(OrganizationView {
            id: organization.id,
            name: organization.name,
            image: organization.image,
            url: organization.url,
            users,
            jobs,
        })
    }

    pub fn update(
        &self,
        id: &OrgId,
        patch: OrganizationPatch,
    ) -> Result<Organization, OrganizationError> {
        let mut organization = self
            .organizations
            .fetch(id)?
            .ok_or(OrganizationError::OrganizationNotFound)?;

        if let Some(name) = patch.name.filter(|v| !v.is_empty()) {
            organization.name = name;
        }
        if let Some(image) = patch.image.filter(|v| !v.is_empty()) {
            organization.image = Some(image);
        }
        if let Some(url) = patch.url.filter(|v| !v.is_empty()) {
            organization.url = url;
        }

        Ok(self.organizations.update(organization)?)
    }

    pub fn delete(&self, id: &OrgId) -> Result<(), OrganizationError> {
        match self.organizations.delete(id) {
            Ok(()) => {
                debug!(organization = %id.0, "organization deleted");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(OrganizationError::OrganizationNotFound),
            Err(other) => Err(other.into()),
        }
    }

    pub fn list(&self) -> Result<Vec<Organization>, OrganizationError> {
        Ok(self.organizations.list()?)
    }

    /// Create a posting under an owning organization and track it in the
    /// organization's job list.
    pub fn create_job(&self, org: &OrgId, new: NewJob) -> Result<Job, OrganizationError> {
        let mut organization = self
            .organizations
            .fetch(org)?
            .ok_or(OrganizationError::OrganizationNotFound)?;

        let (Some(title), Some(description)) = (
            new.title.filter(|v| !v.is_empty()),
            new.description.filter(|v| !v.is_empty()),
        ) else {
            return Err(OrganizationError::MissingJobFields);
        };

        let status = match new.status.filter(|v| !v.is_empty()) {
            Some(raw) => JobStatus::parse(&raw).ok_or(OrganizationError::UnknownStatus)?,
            None => JobStatus::default(),
        };

        let job = Job {
            id: next_job_id(),
            title,
            description,
            compensation: new.compensation,
            organization: org.clone(),
            status,
            created_at: Utc::now(),
        };

        let stored = self.jobs.insert(job)?;
        organization.jobs.push(stored.id.clone());
        self.organizations.update(organization)?;

        debug!(job = %stored.id.0, organization = %org.0, "job created");
        Ok(stored)
    }

    pub fn jobs_for(&self, org: &OrgId) -> Result<Vec<Job>, OrganizationError> {
        if self.organizations.fetch(org)?.is_none() {
            return Err(OrganizationError::OrganizationNotFound);
        }
        Ok(self.jobs.for_organization(org)?)
    }

    pub fn update_job(&self, id: &JobId, patch: JobPatch) -> Result<Job, OrganizationError> {
        let mut job = self.jobs.fetch(id)?.ok_or(OrganizationError::JobNotFound)?;

        if let Some(title) = patch.title.filter(|v| !v.is_empty()) {
            job.title = title;
        }
        if let Some(description) = patch.description.filter(|v| !v.is_empty()) {
            job.description = description;
        }
        if let Some(compensation) = patch.compensation.filter(|v| !v.is_empty()) {
            job.compensation = Some(compensation);
        }
        if let Some(raw) = patch.status.filter(|v| !v.is_empty()) {
            job.status = JobStatus::parse(&raw).ok_or(OrganizationError::UnknownStatus)?;
        }

        Ok(self.jobs.update(job)?)
    }

    pub fn delete_job(&self, id: &JobId) -> Result<(), OrganizationError> {
        let job = self.jobs.fetch(id)?.ok_or(OrganizationError::JobNotFound)?;
        self.jobs.delete(id)?;

        if let Some(mut organization) = self.organizations.fetch(&job.organization)? {
            organization.jobs.retain(|job_id| job_id != id);
            self.organizations.update(organization)?;
        }

        debug!(job = %id.0, "job deleted");
        Ok(())
    }

    pub fn change_status(
        &self,
        id: &JobId,
        status: Option<String>,
    ) -> Result<Job, OrganizationError> {
        let raw = status
            .filter(|v| !v.is_empty())
            .ok_or(OrganizationError::MissingStatus)?;
        let status = JobStatus::parse(&raw).ok_or(OrganizationError::UnknownStatus)?;

        let mut job = self.jobs.fetch(id)?.ok_or(OrganizationError::JobNotFound)?;
        job.status = status;
        Ok(self.jobs.update(job)?)
    }

    pub fn all_jobs(&self) -> Result<Vec<Job>, OrganizationError> {
        Ok(self.jobs.list()?)
    }
}

/// Error raised by organization and job operations.
#[derive(Debug, thiserror::Error)]
pub enum OrganizationError {
    #[error("organization name and url are required")]
    MissingOrgFields,
    #[error("job title and description are required")]
    MissingJobFields,
    #[error("job status is required")]
    MissingStatus,
    #[error("unknown job status")]
    UnknownStatus,
    #[error("organization not found")]
    OrganizationNotFound,
    #[error("job not found")]
    JobNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}
