use std::sync::Arc;

use clap::Args;
use serde_json::json;

use crate::infra::{seed_roles, InMemoryBoardStore, ROLE_APPLICANT};
use talentboard::board::applications::ApplicationLifecycle;
use talentboard::board::domain::{ApplicationOutcome, RoleId};
use talentboard::board::organizations::{NewJob, NewOrganization, OrganizationService};
use talentboard::board::users::{DirectoryService, NewUser};
use talentboard::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Number of applicants to register before walking the lifecycle
    #[arg(long, default_value_t = 3)]
    pub(crate) applicants: usize,
}

/// Walk registration, posting, apply, shortlist, and resolution against the
/// in-memory store, printing each stage for stakeholder demos.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryBoardStore::default());
    seed_roles(&store);

    let directory = DirectoryService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    let organizations = OrganizationService::new(store.clone(), store.clone(), store.clone());
    let lifecycle = ApplicationLifecycle::new(store.clone(), store.clone());

    let organization = organizations.create(NewOrganization {
        name: Some("Initech".to_string()),
        image: None,
        url: Some("https://initech.example.com".to_string()),
    })?;

    let job = organizations.create_job(
        &organization.id,
        NewJob {
            title: Some("Backend Engineer".to_string()),
            description: Some("Own the applicant lifecycle services.".to_string()),
            compensation: Some("95k EUR".to_string()),
            status: None,
        },
    )?;
    println!("posted {} at {}", job.title, organization.name);

    let count = args.applicants.max(1);
    let mut applicants = Vec::with_capacity(count);
    for index in 1..=count {
        let view = directory.create(NewUser {
            user_name: Some(format!("demo.applicant.{index}")),
            email: Some(format!("applicant{index}@example.com")),
            password_hash: Some("$argon2id$demo".to_string()),
            profile_image: None,
            organization: None,
            role: Some(RoleId(ROLE_APPLICANT.to_string())),
            cv: None,
        })?;
        lifecycle.apply(&job.id, &view.id)?;
        applicants.push(view);
    }

    lifecycle.shortlist(&job.id, &applicants[0].id)?;
    lifecycle.resolve(&applicants[0].id, &job.id, ApplicationOutcome::Accepted)?;
    if let Some(second) = applicants.get(1) {
        lifecycle.resolve(&second.id, &job.id, ApplicationOutcome::Rejected)?;
    }

    let summary = json!({
        "job": job,
        "applicants": lifecycle.applicants(&job.id)?,
        "shortlisted": lifecycle.shortlisted(&job.id)?,
    });
    println!("{summary:#}");

    Ok(())
}
