//! End-to-end specifications for the job-application lifecycle, driven through
//! the public service facade and HTTP router only.

mod common {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};

    use talentboard::auth::{AccessError, AccessPolicy, Caller};
    use talentboard::board::domain::{
        Job, JobId, JobStatus, OrgId, RoleId, User, UserId,
    };
    use talentboard::board::store::{JobStore, StoreError, UserStore};

    pub fn applicant(id: &str) -> User {
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

    pub fn job(id: &str) -> Job {
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

    #[derive(Default, Clone)]
    pub struct MemoryUsers {
        users: Arc<Mutex<HashMap<UserId, User>>>,
    }

    impl MemoryUsers {
        pub fn seed(&self, user: User) {
            self.users
                .lock()
                .expect("user mutex poisoned")
                .insert(user.id.clone(), user);
        }

        pub fn get(&self, id: &UserId) -> Option<User> {
            self.users.lock().expect("user mutex poisoned").get(id).cloned()
        }
    }

    impl UserStore for MemoryUsers {
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
                Some(stored) if stored.revision != user.revision => {
                    Err(StoreError::VersionConflict)
                }
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
            Ok(self
                .users
                .lock()
                .expect("user mutex poisoned")
                .values()
                .cloned()
                .collect())
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
    pub struct MemoryJobs {
        jobs: Arc<Mutex<HashMap<JobId, Job>>>,
    }

    impl MemoryJobs {
        pub fn seed(&self, job: Job) {
            self.jobs
                .lock()
                .expect("job mutex poisoned")
                .insert(job.id.clone(), job);
        }
    }

    impl JobStore for MemoryJobs {
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
            Ok(self
                .jobs
                .lock()
                .expect("job mutex poisoned")
                .values()
                .cloned()
                .collect())
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

    pub struct SingleUserPolicy {
        pub user: UserId,
    }

    impl AccessPolicy for SingleUserPolicy {
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
}

use std::sync::Arc;

use axum::http::{header, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{applicant, job, MemoryJobs, MemoryUsers, SingleUserPolicy};
use talentboard::board::applications::{lifecycle_router, ApplicationLifecycle};
use talentboard::board::domain::{ApplicationOutcome, JobId, UserId};

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[test]
fn lifecycle_invariants_hold_through_the_service_facade() {
    let users = Arc::new(MemoryUsers::default());
    let jobs = Arc::new(MemoryJobs::default());
    users.seed(applicant("user-1"));
    jobs.seed(job("job-1"));
    let service = ApplicationLifecycle::new(users.clone(), jobs);

    let job_id = JobId("job-1".to_string());
    let user_id = UserId("user-1".to_string());

    service.apply(&job_id, &user_id).expect("apply succeeds");
    assert!(service.apply(&job_id, &user_id).is_err(), "repeat apply conflicts");

    service
        .shortlist(&job_id, &user_id)
        .expect("shortlist succeeds after apply");

    service
        .resolve(&user_id, &job_id, ApplicationOutcome::Accepted)
        .expect("accept succeeds");
    service
        .resolve(&user_id, &job_id, ApplicationOutcome::Rejected)
        .expect("flip succeeds");

    let stored = users.get(&user_id).expect("user kept");
    assert!(stored.applied.contains(&job_id));
    assert!(stored.rejected.contains(&job_id));
    assert!(stored.shortlisted.is_empty());
}

#[tokio::test]
async fn lifecycle_scenario_over_http() {
    let users = Arc::new(MemoryUsers::default());
    let jobs = Arc::new(MemoryJobs::default());
    users.seed(applicant("user-1"));
    jobs.seed(job("job-1"));

    let service = Arc::new(ApplicationLifecycle::new(users.clone(), jobs));
    let policy = Arc::new(SingleUserPolicy {
        user: UserId("user-1".to_string()),
    });
    let router = lifecycle_router(service, policy);

    // Apply.
    let response = router
        .clone()
        .oneshot(
            axum::http::Request::post("/api/v1/jobs/job-1/apply")
                .header(header::AUTHORIZATION, "Bearer valid-token")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    // Applying twice conflicts.
    let response = router
        .clone()
        .oneshot(
            axum::http::Request::post("/api/v1/jobs/job-1/apply")
                .header(header::AUTHORIZATION, "Bearer valid-token")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Shortlist after the apply.
    let response = router
        .clone()
        .oneshot(
            axum::http::Request::put("/api/v1/jobs/job-1/shortlist")
                .header(header::AUTHORIZATION, "Bearer valid-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({ "applicant_id": "user-1" })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    // The recruiter-facing listing shows the shortlisted applicant, redacted.
    let response = router
        .clone()
        .oneshot(
            axum::http::Request::get("/api/v1/jobs/job-1/shortlisted")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let entries = payload.as_array().expect("array payload");
    assert_eq!(entries.len(), 1);
    assert!(entries[0].get("password_hash").is_none());

    // Reject flips the outcome sets.
    let response = router
        .clone()
        .oneshot(
            axum::http::Request::patch("/api/v1/users/user-1/application-status")
                .header(header::AUTHORIZATION, "Bearer valid-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({ "job_id": "job-1", "status": "rejected" }))
                        .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let stored = users.get(&UserId("user-1".to_string())).expect("user kept");
    assert!(stored.shortlisted.is_empty());
    assert!(stored.rejected.contains(&JobId("job-1".to_string())));

    // The shortlisted listing is empty again, as a list and not an error.
    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/jobs/job-1/shortlisted")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(0));
}
