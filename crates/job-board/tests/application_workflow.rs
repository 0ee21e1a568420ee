//! End-to-end scenarios for the job application workflow, driven through the public service
//! facade and HTTP router only.

mod common {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use job_board::workflows::board::{
        Caller, EmployerRegistration, InMemoryBoardStore, JobBoardService, JobInput, JobView,
        ManualClock, SeekerRegistration,
    };

    pub(super) type Service = JobBoardService<InMemoryBoardStore, ManualClock>;

    pub(super) fn service() -> (Arc<Service>, Arc<ManualClock>) {
        let start = Utc
            .with_ymd_and_hms(2025, 9, 15, 14, 0, 0)
            .single()
            .expect("valid timestamp");
        let clock = Arc::new(ManualClock::new(start));
        let service = JobBoardService::new(Arc::new(InMemoryBoardStore::default()), clock.clone());
        (Arc::new(service), clock)
    }

    pub(super) fn employer(service: &Service, user: &str) -> Caller {
        let caller = Caller::employer(user);
        service
            .register_employer(
                &caller,
                EmployerRegistration {
                    first_name: "Jordan".to_string(),
                    last_name: "Lee".to_string(),
                    business_name: "Prairie Logistics".to_string(),
                    city: "Omaha".to_string(),
                    phone: None,
                    size: None,
                    website: None,
                    industry: None,
                    founded_year: None,
                    contact_email: None,
                    description: None,
                },
            )
            .expect("employer registers");
        caller
    }

    pub(super) fn seeker(service: &Service, user: &str) -> Caller {
        let caller = Caller::seeker(user);
        service
            .register_seeker(
                &caller,
                SeekerRegistration {
                    full_name: format!("Candidate {user}"),
                    headline: None,
                    city: None,
                },
            )
            .expect("seeker registers");
        caller
    }

    pub(super) fn job(service: &Service, employer: &Caller, max_applicants: Option<i32>) -> JobView {
        service
            .create_job(
                employer,
                JobInput {
                    title: "Dispatcher".to_string(),
                    description: String::new(),
                    location: "Omaha".to_string(),
                    job_type: "full_time".to_string(),
                    priority: Default::default(),
                    salary: None,
                    max_applicants,
                    deadline: None,
                    category: None,
                },
            )
            .expect("job posted")
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use job_board::workflows::board::{
    board_router, ApplicationBucket, ApplicationStatus, ApplyRequest, BoardError,
};

#[test]
fn capacity_status_and_buckets_work_together() {
    let (service, clock) = common::service();
    let employer = common::employer(&service, "emp-1");
    let first = common::seeker(&service, "a");
    let second = common::seeker(&service, "b");
    let job = common::job(&service, &employer, Some(1));

    let application = service
        .apply(&first, job.id, ApplyRequest::default())
        .expect("first applicant accepted");
    assert!(!service.job(job.id).expect("job").is_active);

    let err = service
        .apply(&second, job.id, ApplyRequest::default())
        .expect_err("job is full");
    assert!(matches!(err, BoardError::JobFull { capacity: 1 }));

    clock.advance(Duration::hours(1));
    let change = service
        .update_status(&employer, application.id, "hired")
        .expect("owner hires");
    assert_eq!(change.status, ApplicationStatus::Hired);

    let hired = service
        .applications_in_bucket(&employer, ApplicationBucket::Hired)
        .expect("bucket listing");
    assert_eq!(hired.len(), 1);
    assert!(service
        .applications_in_bucket(&employer, ApplicationBucket::Pending)
        .expect("bucket listing")
        .is_empty());
}

#[tokio::test]
async fn http_apply_flow_returns_created_then_full() {
    let (service, _) = common::service();
    let employer = common::employer(&service, "emp-1");
    common::seeker(&service, "a");
    common::seeker(&service, "b");
    let job = common::job(&service, &employer, Some(1));
    let router = board_router(service);

    let apply_as = |user: &str| {
        Request::post(format!("/api/v1/jobs/{}/apply", job.id))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-user-id", user)
            .header("x-user-role", "seeker")
            .body(Body::from("{\"cover_letter\": \"hello\"}"))
            .expect("request builds")
    };

    let response = router
        .clone()
        .oneshot(apply_as("a"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router.oneshot(apply_as("b")).await.expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(payload.get("code").and_then(Value::as_str), Some("JOB_FULL"));
}
