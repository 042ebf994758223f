use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use talentboard::auth::{AccessError, AccessPolicy, Caller};
use talentboard::board::domain::{
    Cv, CvId, Job, JobId, Organization, OrgId, Role, RoleId, User, UserId,
};
use talentboard::board::store::{
    CvStore, JobStore, OrganizationStore, RoleStore, StoreError, UserStore,
};

pub(crate) const ROLE_RECRUITER: &str = "role-recruiter";
pub(crate) const ROLE_APPLICANT: &str = "role-applicant";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One in-memory document store backing every collection trait, so the same
/// `Arc` can be cloned into each service.
#[derive(Default, Clone)]
pub(crate) struct InMemoryBoardStore {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
    organizations: Arc<Mutex<HashMap<OrgId, Organization>>>,
    cvs: Arc<Mutex<HashMap<CvId, Cv>>>,
    roles: Arc<Mutex<HashMap<RoleId, Role>>>,
}

impl UserStore for InMemoryBoardStore {
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

impl JobStore for InMemoryBoardStore {
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

impl OrganizationStore for InMemoryBoardStore {
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

impl CvStore for InMemoryBoardStore {
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

impl RoleStore for InMemoryBoardStore {
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

/// Put the two well-known roles in place so role-filtered listings work from
/// a cold start.
pub(crate) fn seed_roles(store: &InMemoryBoardStore) {
    for (id, name) in [(ROLE_RECRUITER, "recruiter"), (ROLE_APPLICANT, "applicant")] {
        // Conflict just means a previous boot already seeded the role.
        let _ = RoleStore::insert(
            store,
            Role {
                id: RoleId(id.to_string()),
                name: name.to_string(),
            },
        );
    }
}

/// Bearer tokens mapped to acting users, parsed from `APP_API_TOKENS`
/// ("token=user-id,other-token=user-id").
#[derive(Default, Clone)]
pub(crate) struct StaticTokenPolicy {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenPolicy {
    pub(crate) fn from_spec(spec: &str) -> Self {
        let tokens = spec
            .split(',')
            .filter_map(|pair| {
                let (token, user) = pair.split_once('=')?;
                let token = token.trim();
                let user = user.trim();
                if token.is_empty() || user.is_empty() {
                    None
                } else {
                    Some((token.to_string(), UserId(user.to_string())))
                }
            })
            .collect();

        Self { tokens }
    }

    pub(crate) fn from_env() -> Self {
        Self::from_spec(&std::env::var("APP_API_TOKENS").unwrap_or_default())
    }
}

impl AccessPolicy for StaticTokenPolicy {
    fn authorize(&self, token: &str) -> Result<Caller, AccessError> {
        self.tokens
            .get(token)
            .map(|user| Caller { user: user.clone() })
            .ok_or(AccessError::Unrecognized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_spec_parsing_skips_malformed_pairs() {
        let policy = StaticTokenPolicy::from_spec("alpha=user-1, beta=user-2 ,broken,=user-3");

        assert!(policy.authorize("alpha").is_ok());
        assert_eq!(
            policy.authorize("beta").expect("beta resolves").user,
            UserId("user-2".to_string())
        );
        assert!(policy.authorize("broken").is_err());
        assert!(policy.authorize("missing").is_err());
    }

    #[test]
    fn user_updates_are_version_checked() {
        use std::collections::BTreeSet;

        let store = InMemoryBoardStore::default();
        let user = User {
            id: UserId("user-1".to_string()),
            user_name: "ada.l".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            profile_image: None,
            organization: None,
            role: RoleId(ROLE_APPLICANT.to_string()),
            cv: None,
            applied: BTreeSet::new(),
            shortlisted: BTreeSet::new(),
            rejected: BTreeSet::new(),
            revision: 0,
        };

        let stored = UserStore::insert(&store, user).expect("insert succeeds");
        let updated = UserStore::update(&store, stored.clone()).expect("fresh update succeeds");
        assert_eq!(updated.revision, stored.revision + 1);

        match UserStore::update(&store, stored) {
            Err(StoreError::VersionConflict) => {}
            other => panic!("expected version conflict, got {other:?}"),
        }
    }
}
