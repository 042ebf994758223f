//! User directory: registration, credential-redacted reads, partial updates,
//! the per-user CV subresource, and role-filtered listings.

pub mod router;
pub mod service;

pub use router::users_router;
pub use service::{
    CvDraft, DirectoryError, DirectoryService, NewUser, UserPatch,
};
