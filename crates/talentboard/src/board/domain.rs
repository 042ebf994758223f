use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for user documents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for organizations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrgId(pub String);

/// Identifier wrapper for role records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(pub String);

/// Identifier wrapper for CV documents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CvId(pub String);

/// A registered user together with the three job-relationship sets the
/// lifecycle manager maintains. `revision` backs the store's optimistic
/// concurrency check and never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub organization: Option<OrgId>,
    pub role: RoleId,
    pub cv: Option<CvId>,
    pub applied: BTreeSet<JobId>,
    pub shortlisted: BTreeSet<JobId>,
    pub rejected: BTreeSet<JobId>,
    #[serde(default)]
    pub revision: u64,
}

/// Credential-redacted projection of a user. Every read surface returns this
/// shape; `password_hash` and `revision` have no field here by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub user_name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub organization: Option<OrgId>,
    pub role: RoleId,
    pub cv: Option<CvId>,
    pub applied: BTreeSet<JobId>,
    pub shortlisted: BTreeSet<JobId>,
    pub rejected: BTreeSet<JobId>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            profile_image: user.profile_image.clone(),
            organization: user.organization.clone(),
            role: user.role.clone(),
            cv: user.cv.clone(),
            applied: user.applied.clone(),
            shortlisted: user.shortlisted.clone(),
            rejected: user.rejected.clone(),
        }
    }
}

/// Advertised position owned by an organization. `status` describes the
/// posting itself, independent of any individual applicant's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub compensation: Option<String>,
    pub organization: OrgId,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Closed,
    Pending,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
            JobStatus::Pending => "pending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// Terminal decision recorded against a user-job pair by the resolution
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationOutcome {
    Accepted,
    Rejected,
}

impl ApplicationOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationOutcome::Accepted => "accepted",
            ApplicationOutcome::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Hiring-side organization; `users` and `jobs` hold membership references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub image: Option<String>,
    pub url: String,
    pub users: Vec<UserId>,
    pub jobs: Vec<JobId>,
}

/// Named role granted to users ("recruiter", "applicant", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// A user's curriculum vitae. Dates inside experience and education entries
/// are free-form strings as submitted by the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cv {
    pub id: CvId,
    pub user: UserId,
    pub full_name: String,
    pub job_title: String,
    pub location: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub looking_for: Option<JobPreferences>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub profile_image: Option<String>,
}

/// What the applicant is looking for next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPreferences {
    pub location: Option<String>,
    pub position: Option<String>,
    pub job_type: Option<String>,
    pub compensation_expectation: Option<String>,
    pub sector: Option<String>,
    pub desired_job: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub job_title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
