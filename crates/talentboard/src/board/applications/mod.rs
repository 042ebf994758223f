//! Application Lifecycle Manager: apply, shortlist, resolution, and the
//! recruiter-facing listings, together with the HTTP router exposing them.
//!
//! The lifecycle owns the three relationship sets on the user document and is
//! the only writer for `shortlisted` and `rejected`. All mutations go through
//! the version-checked `UserStore::update`, re-validating preconditions on
//! every retry.

pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use router::lifecycle_router;
pub use service::{ApplicationLifecycle, LifecycleError};
