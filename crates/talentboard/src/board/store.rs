//! Document-store boundary. Each collection gets its own narrow trait so the
//! services can be exercised against in-memory doubles.

use super::domain::{Cv, Job, JobId, Organization, OrgId, Role, RoleId, User, UserId};

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("document was modified concurrently")]
    VersionConflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// User collection.
///
/// `update` is version-checked: it must fail with [`StoreError::VersionConflict`]
/// when the stored revision no longer matches the document passed in, and bump
/// the revision on success. This is what keeps the lifecycle invariants intact
/// when two requests race on the same user.
pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> Result<User, StoreError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn find_by_user_name(&self, user_name: &str) -> Result<Option<User>, StoreError>;
    fn update(&self, user: User) -> Result<User, StoreError>;
    fn delete(&self, id: &UserId) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<User>, StoreError>;
    fn applied_to(&self, job: &JobId) -> Result<Vec<User>, StoreError>;
    fn shortlisted_for(&self, job: &JobId) -> Result<Vec<User>, StoreError>;
    fn with_role(&self, role: &RoleId) -> Result<Vec<User>, StoreError>;
}

/// Job collection.
pub trait JobStore: Send + Sync {
    fn insert(&self, job: Job) -> Result<Job, StoreError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
    fn update(&self, job: Job) -> Result<Job, StoreError>;
    fn delete(&self, id: &JobId) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<Job>, StoreError>;
    fn for_organization(&self, org: &OrgId) -> Result<Vec<Job>, StoreError>;
}

/// Organization collection.
pub trait OrganizationStore: Send + Sync {
    fn insert(&self, organization: Organization) -> Result<Organization, StoreError>;
    fn fetch(&self, id: &OrgId) -> Result<Option<Organization>, StoreError>;
    fn update(&self, organization: Organization) -> Result<Organization, StoreError>;
    fn delete(&self, id: &OrgId) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<Organization>, StoreError>;
}

/// CV collection, addressed by the owning user; at most one CV per user.
pub trait CvStore: Send + Sync {
    fn insert(&self, cv: Cv) -> Result<Cv, StoreError>;
    fn fetch_for_user(&self, user: &UserId) -> Result<Option<Cv>, StoreError>;
    fn replace(&self, cv: Cv) -> Result<Cv, StoreError>;
    fn delete_for_user(&self, user: &UserId) -> Result<(), StoreError>;
}

/// Role collection.
pub trait RoleStore: Send + Sync {
    fn insert(&self, role: Role) -> Result<Role, StoreError>;
    fn fetch(&self, id: &RoleId) -> Result<Option<Role>, StoreError>;
    fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError>;
    fn list(&self) -> Result<Vec<Role>, StoreError>;
}
