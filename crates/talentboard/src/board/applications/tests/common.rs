use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::auth::{AccessError, AccessPolicy, Caller};
use crate::board::applications::ApplicationLifecycle;
use crate::board::domain::{Job, JobId, JobStatus, OrgId, RoleId, User, UserId};
use crate::board::store::{JobStore, StoreError, UserStore};

pub(super) fn applicant(id: &str) -> User {
    User {
        id: UserId(id.to_string()),
        user_name: format!("{id}-name"),
        email: format!("{id}@example.com"),
        password_hash: "$argon2id$stub".to_string(),
        profile_image: None,
        organization: None,
        role: RoleId("role-applicant".to_string()),
        cv: None,
        applied: BTreeSet::new(),
        shortlisted: BTreeSet::new(),
        rejected: BTreeSet::new(),
        revision: 0,
    }
}

pub(super) fn job(id: &str) -> Job {
    Job {
        id: JobId(id.to_string()),
        title: "Backend Engineer".to_string(),
        description: "Own the applicant lifecycle services.".to_string(),
        compensation: Some("95k EUR".to_string()),
        organization: OrgId("org-000001".to_string()),
        status: JobStatus::Open,
        created_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    }
}

pub(super) fn build_lifecycle() -> (
    ApplicationLifecycle<MemoryUserStore, MemoryJobStore>,
    Arc<MemoryUserStore>,
    Arc<MemoryJobStore>,
) {
    let users = Arc::new(MemoryUserStore::default());
    let jobs = Arc::new(MemoryJobStore::default());
    let service = ApplicationLifecycle::new(users.clone(), jobs.clone());
    (service, users, jobs)
}

#[derive(Default, Clone)]
pub(super) struct MemoryUserStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

impl MemoryUserStore {
    pub(super) fn seed(&self, user: User) {
        self.users
            .lock()
            .expect("user mutex poisoned")
            .insert(user.id.clone(), user);
    }

    pub(super) fn get(&self, id: &UserId) -> Option<User> {
        self.users.lock().expect("user mutex poisoned").get(id).cloned()
    }
}

impl UserStore for MemoryUserStore {
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

#[derive(Default, Clone)]
pub(super) struct MemoryJobStore {
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl MemoryJobStore {
    pub(super) fn seed(&self, job: Job) {
        self.jobs
            .lock()
            .expect("job mutex poisoned")
            .insert(job.id.clone(), job);
    }
}

impl JobStore for MemoryJobStore {
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

/// Fails the first `conflicts` version checks, then delegates. Exercises the
/// bounded retry loop.
pub(super) struct RacyUserStore {
    inner: MemoryUserStore,
    conflicts: AtomicUsize,
}

impl RacyUserStore {
    pub(super) fn new(inner: MemoryUserStore, conflicts: usize) -> Self {
        Self {
            inner,
            conflicts: AtomicUsize::new(conflicts),
        }
    }
}

impl UserStore for RacyUserStore {
    fn insert(&self, user: User) -> Result<User, StoreError> {
        self.inner.insert(user)
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.inner.fetch(id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.inner.find_by_email(email)
    }

    fn find_by_user_name(&self, user_name: &str) -> Result<Option<User>, StoreError> {
        self.inner.find_by_user_name(user_name)
    }

    fn update(&self, user: User) -> Result<User, StoreError> {
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::VersionConflict);
        }
        self.inner.update(user)
    }

    fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        self.inner.delete(id)
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        self.inner.list()
    }

    fn applied_to(&self, job: &JobId) -> Result<Vec<User>, StoreError> {
        self.inner.applied_to(job)
    }

    fn shortlisted_for(&self, job: &JobId) -> Result<Vec<User>, StoreError> {
        self.inner.shortlisted_for(job)
    }

    fn with_role(&self, role: &RoleId) -> Result<Vec<User>, StoreError> {
        self.inner.with_role(role)
    }
}

/// Always-offline user store for transport-failure paths.
pub(super) struct UnavailableUserStore;

impl UserStore for UnavailableUserStore {
    fn insert(&self, _user: User) -> Result<User, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &UserId) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn find_by_user_name(&self, _user_name: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn update(&self, _user: User) -> Result<User, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn delete(&self, _id: &UserId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn list(&self) -> Result<Vec<User>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn applied_to(&self, _job: &JobId) -> Result<Vec<User>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn shortlisted_for(&self, _job: &JobId) -> Result<Vec<User>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn with_role(&self, _role: &RoleId) -> Result<Vec<User>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

/// Single-token policy for routing tests.
pub(super) struct TokenPolicy {
    pub(super) user: UserId,
}

impl AccessPolicy for TokenPolicy {
    fn authorize(&self, token: &str) -> Result<Caller, AccessError> {
        if token == "valid-token" {
            Ok(Caller {
                user: self.user.clone(),
            })
        } else {
            Err(AccessError::Unrecognized)
        }
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
