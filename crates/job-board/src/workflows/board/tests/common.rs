use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::BoardConfig;
use crate::workflows::board::repository::{BoardStore, BoardTransaction, RepositoryError};
use crate::workflows::board::router::{USER_ID_HEADER, USER_ROLE_HEADER, USER_STAFF_HEADER};
use crate::workflows::board::{
    board_router, Application, ApplicationView, ApplyRequest, Caller, EmployerProfile,
    EmployerRegistration, InMemoryBoardStore, Job, JobBoardService, JobId, JobInput, JobPriority,
    JobView, ManualClock, Role, SeekerProfile, SeekerRegistration,
};

pub(super) type TestService = JobBoardService<InMemoryBoardStore, ManualClock>;

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn today() -> NaiveDate {
    start().date_naive()
}

pub(super) fn build_service() -> (TestService, Arc<InMemoryBoardStore>, Arc<ManualClock>) {
    build_service_with(BoardConfig::default())
}

pub(super) fn build_service_with(
    config: BoardConfig,
) -> (TestService, Arc<InMemoryBoardStore>, Arc<ManualClock>) {
    let store = Arc::new(InMemoryBoardStore::default());
    let clock = Arc::new(ManualClock::new(start()));
    let service = JobBoardService::with_config(store.clone(), clock.clone(), config);
    (service, store, clock)
}

pub(super) fn employer_registration(business_name: &str) -> EmployerRegistration {
    EmployerRegistration {
        first_name: "Morgan".to_string(),
        last_name: "Reyes".to_string(),
        business_name: business_name.to_string(),
        city: "Des Moines".to_string(),
        phone: None,
        size: Some("11-50".to_string()),
        website: None,
        industry: Some("Logistics".to_string()),
        founded_year: Some(2011),
        contact_email: None,
        description: None,
    }
}

pub(super) fn register_employer(service: &TestService, user: &str) -> (Caller, EmployerProfile) {
    let caller = Caller::employer(user);
    let profile = service
        .register_employer(&caller, employer_registration(&format!("{user} Freight")))
        .expect("employer registers");
    (caller, profile)
}

pub(super) fn register_seeker(service: &TestService, user: &str) -> (Caller, SeekerProfile) {
    let caller = Caller::seeker(user);
    let profile = service
        .register_seeker(
            &caller,
            SeekerRegistration {
                full_name: format!("Seeker {user}"),
                headline: None,
                city: Some("Ames".to_string()),
            },
        )
        .expect("seeker registers");
    (caller, profile)
}

pub(super) fn job_input(title: &str) -> JobInput {
    JobInput {
        title: title.to_string(),
        description: "Forklift certified preferred".to_string(),
        location: "Des Moines".to_string(),
        job_type: "full_time".to_string(),
        priority: JobPriority::Normal,
        salary: Some(42_000),
        max_applicants: None,
        deadline: None,
        category: None,
    }
}

pub(super) fn post_job(
    service: &TestService,
    employer: &Caller,
    max_applicants: Option<i32>,
    deadline: Option<NaiveDate>,
) -> JobView {
    let input = JobInput {
        max_applicants,
        deadline,
        ..job_input("Warehouse associate")
    };
    service.create_job(employer, input).expect("job posted")
}

pub(super) fn apply(
    service: &TestService,
    seeker: &Caller,
    job: JobId,
) -> Result<ApplicationView, crate::workflows::board::BoardError> {
    service.apply(
        seeker,
        job,
        ApplyRequest {
            cover_letter: "I would like to apply".to_string(),
        },
    )
}

pub(super) fn stored_job(store: &InMemoryBoardStore, id: JobId) -> Job {
    store
        .read(|tx| tx.job(id))
        .expect("read succeeds")
        .expect("job present")
}

pub(super) fn stored_applications(store: &InMemoryBoardStore, id: JobId) -> Vec<Application> {
    store
        .read(|tx| tx.applications_for_job(id))
        .expect("read succeeds")
}

/// Store double whose every unit of work fails before touching data.
pub(super) struct UnavailableStore;

impl BoardStore for UnavailableStore {
    fn read<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn BoardTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }
}

/// Store double sharing an in-memory store's data but refusing every write.
pub(super) struct ReadOnlyStore(pub(super) InMemoryBoardStore);

impl BoardStore for ReadOnlyStore {
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn BoardTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.0.read(work)
    }

    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("read-only replica".to_string()).into())
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    board_router(Arc::new(service))
}

pub(super) fn request(
    method: Method,
    uri: &str,
    caller: Option<&Caller>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        let role = match caller.role {
            Role::Employer => "employer",
            Role::Seeker => "seeker",
        };
        builder = builder
            .header(USER_ID_HEADER, caller.user_id.0.as_str())
            .header(USER_ROLE_HEADER, role)
            .header(USER_STAFF_HEADER, if caller.is_staff { "true" } else { "false" });
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn error_code(payload: &Value) -> Option<&str> {
    payload.get("code").and_then(Value::as_str)
}
