//! Organization CRUD and the job postings owned by each organization.

pub mod router;
pub mod service;

pub use router::organizations_router;
pub use service::{
    JobPatch, NewJob, NewOrganization, OrganizationError, OrganizationPatch, OrganizationService,
    OrganizationView,
};
