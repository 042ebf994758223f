use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::board::domain::{
    Cv, CvId, EducationEntry, ExperienceEntry, JobPreferences, Organization, OrgId, RoleId, User,
    UserId, UserView,
};
use crate::board::store::{CvStore, OrganizationStore, RoleStore, StoreError, UserStore};

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static CV_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("user-{id:06}"))
}

fn next_cv_id() -> CvId {
    let id = CV_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CvId(format!("cv-{id:06}"))
}

/// Registration payload. `password_hash` arrives pre-hashed from the
/// authentication collaborator; this service never sees a raw credential.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub organization: Option<OrgId>,
    #[serde(default)]
    pub role: Option<RoleId>,
    #[serde(default)]
    pub cv: Option<CvId>,
}

/// Explicit partial update: only present, non-empty fields overwrite.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub organization: Option<OrgId>,
    #[serde(default)]
    pub role: Option<RoleId>,
    #[serde(default)]
    pub cv: Option<CvId>,
}

/// CV payload without identity; the owning user comes from the route.
#[derive(Debug, Clone, Deserialize)]
pub struct CvDraft {
    pub full_name: String,
    pub job_title: String,
    #[serde(default)]
    pub location: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub looking_for: Option<JobPreferences>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl CvDraft {
    fn into_cv(self, id: CvId, user: UserId) -> Cv {
        Cv {
            id,
            user,
            full_name: self.full_name,
            job_title: self.job_title,
            location: self.location,
            email: self.email,
            phone: self.phone,
            skills: self.skills,
            looking_for: self.looking_for,
            experience: self.experience,
            education: self.education,
            profile_image: self.profile_image,
        }
    }
}

/// Directory over the user, role, CV, and organization collections.
pub struct DirectoryService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    cvs: Arc<dyn CvStore>,
    organizations: Arc<dyn OrganizationStore>,
}

impl DirectoryService {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        cvs: Arc<dyn CvStore>,
        organizations: Arc<dyn OrganizationStore>,
    ) -> Self {
        Self {
            users,
            roles,
            cvs,
            organizations,
        }
    }

    pub fn create(&self, new: NewUser) -> Result<UserView, DirectoryError> {
        let (Some(user_name), Some(email), Some(password_hash), Some(role)) = (
            new.user_name.filter(|v| !v.is_empty()),
            new.email.filter(|v| !v.is_empty()),
            new.password_hash.filter(|v| !v.is_empty()),
            new.role.filter(|v| !v.0.is_empty()),
        ) else {
            return Err(DirectoryError::MissingFields);
        };

        validate_user_name(&user_name)?;
        validate_email(&email)?;

        if self.users.find_by_email(&email)?.is_some() {
            return Err(DirectoryError::EmailTaken);
        }

        let user = User {
            id: next_user_id(),
            user_name,
            email,
            password_hash,
            profile_image: new.profile_image,
            organization: new.organization,
            role,
            cv: new.cv,
            applied: BTreeSet::new(),
            shortlisted: BTreeSet::new(),
            rejected: BTreeSet::new(),
            revision: 0,
        };

        let stored = self.users.insert(user)?;
        debug!(user = %stored.id.0, "user registered");
        Ok(UserView::from(&stored))
    }

    pub fn list(&self) -> Result<Vec<UserView>, DirectoryError> {
        Ok(self.users.list()?.iter().map(UserView::from).collect())
    }

    pub fn get(&self, id: &UserId) -> Result<UserView, DirectoryError> {
        let user = self.users.fetch(id)?.ok_or(DirectoryError::UserNotFound)?;
        Ok(UserView::from(&user))
    }

    /// Apply a partial update. A changed user name is re-validated and must
    /// not collide with another user.
    pub fn edit(&self, patch: UserPatch) -> Result<UserView, DirectoryError> {
        let user_id = patch
            .user_id
            .as_ref()
            .filter(|id| !id.is_empty())
            .map(|id| UserId(id.clone()))
            .ok_or(DirectoryError::MissingUserId)?;

        if let Some(user_name) = patch.user_name.as_ref().filter(|v| !v.is_empty()) {
            validate_user_name(user_name)?;
            if let Some(existing) = self.users.find_by_user_name(user_name)? {
                if existing.id != user_id {
                    return Err(DirectoryError::UserNameTaken);
                }
            }
        }

        // Retry the version check like the lifecycle does; edits re-apply the
        // patch to a fresh document.
        for _ in 0..3 {
            let mut user = self
                .users
                .fetch(&user_id)?
                .ok_or(DirectoryError::UserNotFound)?;

            apply_patch(&mut user, &patch);

            match self.users.update(user) {
                Ok(stored) => {
                    debug!(user = %stored.id.0, "user updated");
                    return Ok(UserView::from(&stored));
                }
                Err(StoreError::VersionConflict) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(StoreError::VersionConflict.into())
    }

    pub fn delete(&self, id: &UserId) -> Result<(), DirectoryError> {
        match self.users.delete(id) {
            Ok(()) => {
                debug!(user = %id.0, "user deleted");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(DirectoryError::UserNotFound),
            Err(other) => Err(other.into()),
        }
    }

    pub fn cv_of(&self, user: &UserId) -> Result<Cv, DirectoryError> {
        self.cvs
            .fetch_for_user(user)?
            .ok_or(DirectoryError::CvNotFound)
    }

    pub fn create_cv(&self, user: &UserId, draft: CvDraft) -> Result<Cv, DirectoryError> {
        if self.users.fetch(user)?.is_none() {
            return Err(DirectoryError::UserNotFound);
        }
        if self.cvs.fetch_for_user(user)?.is_some() {
            return Err(DirectoryError::CvExists);
        }

        let cv = draft.into_cv(next_cv_id(), user.clone());
        Ok(self.cvs.insert(cv)?)
    }

    /// PUT semantics: replace the existing CV, or create one when absent.
    pub fn upsert_cv(&self, user: &UserId, draft: CvDraft) -> Result<Cv, DirectoryError> {
        match self.cvs.fetch_for_user(user)? {
            Some(existing) => Ok(self.cvs.replace(draft.into_cv(existing.id, user.clone()))?),
            None => {
                if self.users.fetch(user)?.is_none() {
                    return Err(DirectoryError::UserNotFound);
                }
                Ok(self.cvs.insert(draft.into_cv(next_cv_id(), user.clone()))?)
            }
        }
    }

    pub fn delete_cv(&self, user: &UserId) -> Result<(), DirectoryError> {
        match self.cvs.delete_for_user(user) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound) => Err(DirectoryError::CvNotFound),
            Err(other) => Err(other.into()),
        }
    }

    pub fn organization_of(&self, user: &UserId) -> Result<Organization, DirectoryError> {
        let user = self.users.fetch(user)?.ok_or(DirectoryError::UserNotFound)?;
        let org_id = user.organization.ok_or(DirectoryError::NoOrganization)?;

        self.organizations
            .fetch(&org_id)?
            .ok_or(DirectoryError::OrganizationNotFound)
    }

    pub fn recruiters(&self) -> Result<Vec<UserView>, DirectoryError> {
        self.by_role_name("recruiter")
    }

    pub fn applicants(&self) -> Result<Vec<UserView>, DirectoryError> {
        self.by_role_name("applicant")
    }

    fn by_role_name(&self, name: &'static str) -> Result<Vec<UserView>, DirectoryError> {
        let role = self
            .roles
            .find_by_name(name)?
            .ok_or(DirectoryError::RoleNotFound(name))?;

        Ok(self
            .users
            .with_role(&role.id)?
            .iter()
            .map(UserView::from)
            .collect())
    }
}

fn apply_patch(user: &mut User, patch: &UserPatch) {
    if let Some(user_name) = patch.user_name.as_ref().filter(|v| !v.is_empty()) {
        user.user_name = user_name.clone();
    }
    if let Some(email) = patch.email.as_ref().filter(|v| !v.is_empty()) {
        user.email = email.clone();
    }
    if let Some(profile_image) = patch.profile_image.as_ref().filter(|v| !v.is_empty()) {
        user.profile_image = Some(profile_image.clone());
    }
    if let Some(organization) = patch.organization.as_ref().filter(|v| !v.0.is_empty()) {
        user.organization = Some(organization.clone());
    }
    if let Some(role) = patch.role.as_ref().filter(|v| !v.0.is_empty()) {
        user.role = role.clone();
    }
    if let Some(cv) = patch.cv.as_ref().filter(|v| !v.0.is_empty()) {
        user.cv = Some(cv.clone());
    }
}

/// 4 to 100 characters, no whitespace anywhere.
fn validate_user_name(user_name: &str) -> Result<(), DirectoryError> {
    let length = user_name.chars().count();
    if !(4..=100).contains(&length) || user_name.chars().any(char::is_whitespace) {
        return Err(DirectoryError::InvalidUserName);
    }
    Ok(())
}

/// Structural check only: local part, one '@', and a dotted domain.
fn validate_email(email: &str) -> Result<(), DirectoryError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DirectoryError::InvalidEmail);
    };

    let domain_ok = domain
        .rsplit_once('.')
        .is_some_and(|(name, tld)| !name.is_empty() && (2..=6).contains(&tld.len()));

    if local.is_empty() || email.chars().any(char::is_whitespace) || !domain_ok {
        return Err(DirectoryError::InvalidEmail);
    }
    Ok(())
}

/// Error raised by directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid username format")]
    InvalidUserName,
    #[error("invalid email format")]
    InvalidEmail,
    #[error("user with this email already exists")]
    EmailTaken,
    #[error("username already exists")]
    UserNameTaken,
    #[error("user id is required")]
    MissingUserId,
    #[error("user not found")]
    UserNotFound,
    #[error("cv already exists for this user")]
    CvExists,
    #[error("cv not found")]
    CvNotFound,
    #[error("{0} role not found")]
    RoleNotFound(&'static str),
    #[error("user has no organization")]
    NoOrganization,
    #[error("organization not found")]
    OrganizationNotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}
