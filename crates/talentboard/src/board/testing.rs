//! Shared in-memory store double and builders for module tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use super::domain::{
    Cv, CvId, EducationEntry, ExperienceEntry, Job, JobId, JobStatus, Organization, OrgId, Role,
    RoleId, User, UserId,
};
use super::store::{CvStore, JobStore, OrganizationStore, RoleStore, StoreError, UserStore};
use super::users::{CvDraft, NewUser};

/// One struct backing every collection trait, so a single `Arc` can be handed
/// to services that need several stores.
#[derive(Default, Clone)]
pub(crate) struct MemoryBoardStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
    organizations: Arc<Mutex<HashMap<OrgId, Organization>>>,
    cvs: Arc<Mutex<HashMap<CvId, Cv>>>,
    roles: Arc<Mutex<HashMap<RoleId, Role>>>,
}

impl MemoryBoardStore {
    pub(crate) fn seed_role(&self, role: Role) {
        self.roles
            .lock()
            .expect("role mutex poisoned")
            .insert(role.id.clone(), role);
    }

    pub(crate) fn seed_organization(&self, organization: Organization) {
        self.organizations
            .lock()
            .expect("organization mutex poisoned")
            .insert(organization.id.clone(), organization);
    }

    pub(crate) fn seed_job(&self, job: Job) {
        self.jobs
            .lock()
            .expect("job mutex poisoned")
            .insert(job.id.clone(), job);
    }

    pub(crate) fn organization(&self, id: &OrgId) -> Option<Organization> {
        self.organizations
            .lock()
            .expect("organization mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl UserStore for MemoryBoardStore {
    fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut guard = self.users.lock().expect("user mutex poisoned");
        if guard.contains_key(&user.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().expect("user mutex poisoned").get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("user mutex poisoned")
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    fn find_by_user_name(&self, user_name: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("user mutex poisoned")
            .values()
            .find(|user| user.user_name == user_name)
            .cloned())
    }

    fn update(&self, mut user: User) -> Result<User, StoreError> {
        let mut guard = self.users.lock().expect("user mutex poisoned");
        match guard.get(&user.id) {
            None => Err(StoreError::NotFound),
            Some(stored) if stored.revision != user.revision => Err(StoreError::VersionConflict),
            Some(_) => {
                user.revision += 1;
                guard.insert(user.id.clone(), user.clone());
                Ok(user)
            }
        }
    }

    fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        let mut guard = self.users.lock().expect("user mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().expect("user mutex poisoned").values().cloned().collect())
    }

    fn applied_to(&self, job: &JobId) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("user mutex poisoned")
            .values()
            .filter(|user| user.applied.contains(job))
            .cloned()
            .collect())
    }

    fn shortlisted_for(&self, job: &JobId) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("user mutex poisoned")
            .values()
            .filter(|user| user.shortlisted.contains(job))
            .cloned()
            .collect())
    }

    fn with_role(&self, role: &RoleId) -> Result<Vec<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .expect("user mutex poisoned")
            .values()
            .filter(|user| &user.role == role)
            .cloned()
            .collect())
    }
}

impl JobStore for MemoryBoardStore {
    fn insert(&self, job: Job) -> Result<Job, StoreError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        if guard.contains_key(&job.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.lock().expect("job mutex poisoned").get(id).cloned())
    }

    fn update(&self, job: Job) -> Result<Job, StoreError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        if !guard.contains_key(&job.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn delete(&self, id: &JobId) -> Result<(), StoreError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn list(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.jobs.lock().expect("job mutex poisoned").values().cloned().collect())
    }

    fn for_organization(&self, org: &OrgId) -> Result<Vec<Job>, StoreError> {
        Ok(self
            .jobs
            .lock()
            .expect("job mutex poisoned")
            .values()
            .filter(|job| &job.organization == org)
            .cloned()
            .collect())
    }
}

impl OrganizationStore for MemoryBoardStore {
    fn insert(&self, organization: Organization) -> Result<Organization, StoreError> {
        let mut guard = self.organizations.lock().expect("organization mutex poisoned");
        if guard.contains_key(&organization.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(organization.id.clone(), organization.clone());
        Ok(organization)
    }

    fn fetch(&self, id: &OrgId) -> Result<Option<Organization>, StoreError> {
        Ok(self
            .organizations
            .lock()
            .expect("organization mutex poisoned")
            .get(id)
            .cloned())
    }

    fn update(&self, organization: Organization) -> Result<Organization, StoreError> {
        let mut guard = self.organizations.lock().expect("organization mutex poisoned");
        if !guard.contains_key(&organization.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(organization.id.clone(), organization.clone());
        Ok(organization)
    }

    fn delete(&self, id: &OrgId) -> Result<(), StoreError> {
        let mut guard = self.organizations.lock().expect("organization mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn list(&self) -> Result<Vec<Organization>, StoreError> {
        Ok(self
            .organizations
            .lock()
            .expect("organization mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

impl CvStore for MemoryBoardStore {
    fn insert(&self, cv: Cv) -> Result<Cv, StoreError> {
        let mut guard = self.cvs.lock().expect("cv mutex poisoned");
        if guard.values().any(|existing| existing.user == cv.user) {
            return Err(StoreError::Conflict);
        }
        guard.insert(cv.id.clone(), cv.clone());
        Ok(cv)
    }

    fn fetch_for_user(&self, user: &UserId) -> Result<Option<Cv>, StoreError> {
        Ok(self
            .cvs
            .lock()
            .expect("cv mutex poisoned")
            .values()
            .find(|cv| &cv.user == user)
            .cloned())
    }

    fn replace(&self, cv: Cv) -> Result<Cv, StoreError> {
        let mut guard = self.cvs.lock().expect("cv mutex poisoned");
        if !guard.contains_key(&cv.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(cv.id.clone(), cv.clone());
        Ok(cv)
    }

    fn delete_for_user(&self, user: &UserId) -> Result<(), StoreError> {
        let mut guard = self.cvs.lock().expect("cv mutex poisoned");
        let id = guard
            .values()
            .find(|cv| &cv.user == user)
            .map(|cv| cv.id.clone())
            .ok_or(StoreError::NotFound)?;
        guard.remove(&id);
        Ok(())
    }
}

impl RoleStore for MemoryBoardStore {
    fn insert(&self, role: Role) -> Result<Role, StoreError> {
        let mut guard = self.roles.lock().expect("role mutex poisoned");
        if guard.contains_key(&role.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    fn fetch(&self, id: &RoleId) -> Result<Option<Role>, StoreError> {
        Ok(self.roles.lock().expect("role mutex poisoned").get(id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        Ok(self
            .roles
            .lock()
            .expect("role mutex poisoned")
            .values()
            .find(|role| role.name == name)
            .cloned())
    }

    fn list(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.roles.lock().expect("role mutex poisoned").values().cloned().collect())
    }
}

/// Store with the standard roles and one organization in place.
pub(crate) fn seeded_board() -> Arc<MemoryBoardStore> {
    let store = Arc::new(MemoryBoardStore::default());
    store.seed_role(Role {
        id: RoleId("role-recruiter".to_string()),
        name: "recruiter".to_string(),
    });
    store.seed_role(Role {
        id: RoleId("role-applicant".to_string()),
        name: "applicant".to_string(),
    });
    store.seed_organization(Organization {
        id: OrgId("org-000001".to_string()),
        name: "Initech".to_string(),
        image: None,
        url: "https://initech.example.com".to_string(),
        users: Vec::new(),
        jobs: Vec::new(),
    });
    store
}

pub(crate) fn new_user(user_name: &str, email: &str) -> NewUser {
    NewUser {
        user_name: Some(user_name.to_string()),
        email: Some(email.to_string()),
        password_hash: Some("$argon2id$stub".to_string()),
        profile_image: None,
        organization: None,
        role: Some(RoleId("role-applicant".to_string())),
        cv: None,
    }
}

pub(crate) fn sample_job(id: &str, org: &str) -> Job {
    Job {
        id: JobId(id.to_string()),
        title: "Backend Engineer".to_string(),
        description: "Own the applicant lifecycle services.".to_string(),
        compensation: Some("95k EUR".to_string()),
        organization: OrgId(org.to_string()),
        status: JobStatus::Open,
        created_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    }
}

pub(crate) fn sample_cv_draft() -> CvDraft {
    CvDraft {
        full_name: "Ada Lovelace".to_string(),
        job_title: "Senior Engineer".to_string(),
        location: Some("Rotterdam".to_string()),
        email: "ada@example.com".to_string(),
        phone: None,
        skills: vec!["rust".to_string(), "distributed systems".to_string()],
        looking_for: None,
        experience: vec![ExperienceEntry {
            job_title: "Engineer".to_string(),
            company: "Analytical Engines BV".to_string(),
            start_date: "2021-02".to_string(),
            end_date: None,
        }],
        education: vec![EducationEntry {
            institution: "TU Delft".to_string(),
            degree: "MSc".to_string(),
            field_of_study: Some("Computer Science".to_string()),
            start_date: Some("2015".to_string()),
            end_date: Some("2017".to_string()),
        }],
        profile_image: None,
    }
}
