use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::clock::Clock;
use super::domain::{
    ApplicationId, ApplyRequest, Caller, CategoryId, CategoryInput, EmployerId, EmployerPatch,
    EmployerRegistration, JobId, JobInput, JobPatch, JobSearch, Role, SavedJobId,
    SeekerRegistration, StatusUpdateRequest, UserId,
};
use super::repository::{BoardStore, RepositoryError};
use super::segmentation::ApplicationBucket;
use super::service::{BoardError, JobBoardService};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_STAFF_HEADER: &str = "x-user-staff";

type SharedService<S, C> = State<Arc<JobBoardService<S, C>>>;

/// Router builder exposing the job board endpoints under `/api/v1`.
pub fn board_router<S, C>(service: Arc<JobBoardService<S, C>>) -> Router
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_jobs_handler::<S, C>).post(create_job_handler::<S, C>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(job_handler::<S, C>)
                .patch(update_job_handler::<S, C>)
                .delete(delete_job_handler::<S, C>),
        )
        .route("/api/v1/jobs/:job_id/apply", post(apply_handler::<S, C>))
        .route("/api/v1/jobs/:job_id/save", post(save_job_handler::<S, C>))
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(job_applications_handler::<S, C>),
        )
        .route("/api/v1/search/jobs", get(search_handler::<S, C>))
        .route(
            "/api/v1/applications/:application_id",
            get(application_handler::<S, C>).delete(delete_application_handler::<S, C>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(update_status_handler::<S, C>),
        )
        .route(
            "/api/v1/employer/applications",
            get(employer_applications_handler::<S, C>),
        )
        .route(
            "/api/v1/employer/applications/:bucket",
            get(bucket_handler::<S, C>),
        )
        .route(
            "/api/v1/recent-applications",
            get(recent_applications_handler::<S, C>),
        )
        .route(
            "/api/v1/categories",
            get(list_categories_handler::<S, C>).post(create_category_handler::<S, C>),
        )
        .route(
            "/api/v1/categories/:category_id",
            get(category_handler::<S, C>)
                .patch(rename_category_handler::<S, C>)
                .delete(delete_category_handler::<S, C>),
        )
        .route("/api/v1/employers", post(register_employer_handler::<S, C>))
        .route(
            "/api/v1/employers/me",
            get(employer_profile_handler::<S, C>).patch(update_employer_handler::<S, C>),
        )
        .route("/api/v1/employers/dashboard", get(dashboard_handler::<S, C>))
        .route("/api/v1/companies", get(companies_handler::<S, C>))
        .route(
            "/api/v1/companies/:employer_id/jobs",
            get(company_jobs_handler::<S, C>),
        )
        .route("/api/v1/seekers", post(register_seeker_handler::<S, C>))
        .route("/api/v1/seekers/me", get(seeker_profile_handler::<S, C>))
        .route(
            "/api/v1/seekers/me/applications",
            get(seeker_applications_handler::<S, C>),
        )
        .route("/api/v1/seekers/me/saved-jobs", get(saved_jobs_handler::<S, C>))
        .route(
            "/api/v1/seekers/me/saved-jobs/:saved_job_id",
            get(saved_job_handler::<S, C>).delete(remove_saved_job_handler::<S, C>),
        )
        .with_state(service)
}

/// Resolve the caller from the identity headers set by the upstream gateway.
pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, BoardError> {
    let user_id = header_value(headers, USER_ID_HEADER)?
        .ok_or_else(|| BoardError::Unauthenticated(format!("missing {USER_ID_HEADER} header")))?;
    let role = header_value(headers, USER_ROLE_HEADER)?
        .ok_or_else(|| BoardError::Unauthenticated(format!("missing {USER_ROLE_HEADER} header")))?;
    let role = Role::parse(&role)
        .ok_or_else(|| BoardError::Unauthenticated(format!("unknown role '{role}'")))?;
    let is_staff = match header_value(headers, USER_STAFF_HEADER)?.as_deref() {
        None => false,
        Some(flag) => match flag.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(BoardError::Unauthenticated(format!(
                    "invalid {USER_STAFF_HEADER} value '{other}'"
                )))
            }
        },
    };

    Ok(Caller {
        user_id: UserId(user_id),
        role,
        is_staff,
    })
}

fn header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, BoardError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| BoardError::Unauthenticated(format!("{name} must be valid text")))?
                .trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
    }
}

impl BoardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BoardError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            BoardError::NotFound(_) | BoardError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            BoardError::DuplicateApplication
            | BoardError::AlreadySaved
            | BoardError::JobFull { .. }
            | BoardError::JobClosed
            | BoardError::InvalidStatus(_)
            | BoardError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            BoardError::Forbidden(_) => StatusCode::FORBIDDEN,
            BoardError::ProfileExists(_) | BoardError::Repository(RepositoryError::Conflict) => {
                StatusCode::CONFLICT
            }
            BoardError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, code = self.code(), "board request failed");
        }
        let payload = json!({
            "code": self.code(),
            "error": self.to_string(),
        });
        (status, Json(payload)).into_response()
    }
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, BoardError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => err.into_response(),
    }
}

fn no_content(result: Result<(), BoardError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, BoardError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| BoardError::ValidationFailed(rejection.body_text()))
}

/// A body sent without a JSON content type reads as `T::default()`.
fn optional_json_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, BoardError> {
    match body {
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        other => json_body(other),
    }
}

fn path<T>(segment: Result<Path<T>, PathRejection>) -> Result<T, BoardError> {
    segment
        .map(|Path(value)| value)
        .map_err(|rejection| BoardError::ValidationFailed(rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, BoardError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| BoardError::ValidationFailed(rejection.body_text()))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecentQuery {
    #[serde(default)]
    limit: Option<usize>,
}

pub(crate) async fn apply_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    job_id: Result<Path<u64>, PathRejection>,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let job_id = path(job_id)?;
        let request = optional_json_body(body)?;
        service.apply(&caller, JobId(job_id), request)
    });
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn update_status_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    application_id: Result<Path<u64>, PathRejection>,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let application_id = path(application_id)?;
        let request = json_body(body)?;
        service.update_status(&caller, ApplicationId(application_id), &request.status)
    });
    respond(StatusCode::OK, result)
}

async fn application_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    application_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        service.application(&caller, ApplicationId(path(application_id)?))
    });
    respond(StatusCode::OK, result)
}

async fn delete_application_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    application_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    no_content(caller_from_headers(&headers).and_then(|caller| {
        service.delete_application(&caller, ApplicationId(path(application_id)?))
    }))
}

async fn employer_applications_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result =
        caller_from_headers(&headers).and_then(|caller| service.employer_applications(&caller));
    respond(StatusCode::OK, result)
}

pub(crate) async fn bucket_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    bucket: Result<Path<String>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let bucket = path(bucket)?;
        let bucket =
            ApplicationBucket::from_slug(&bucket).ok_or(BoardError::NotFound("bucket"))?;
        service.applications_in_bucket(&caller, bucket)
    });
    respond(StatusCode::OK, result)
}

async fn recent_applications_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    params: Result<Query<RecentQuery>, QueryRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let params = query(params)?;
        service.recent_applications(&caller, params.limit)
    });
    respond(StatusCode::OK, result)
}

async fn job_applications_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    job_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers)
        .and_then(|caller| service.job_applications(&caller, JobId(path(job_id)?)));
    respond(StatusCode::OK, result)
}

async fn seeker_applications_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result =
        caller_from_headers(&headers).and_then(|caller| service.seeker_applications(&caller));
    respond(StatusCode::OK, result)
}

async fn list_jobs_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| service.list_jobs(&caller));
    respond(StatusCode::OK, result)
}

async fn create_job_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    body: Result<Json<JobInput>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let input = json_body(body)?;
        service.create_job(&caller, input)
    });
    respond(StatusCode::CREATED, result)
}

async fn job_handler<S, C>(
    State(service): SharedService<S, C>,
    job_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = path(job_id).and_then(|job_id| service.job(JobId(job_id)));
    respond(StatusCode::OK, result)
}

async fn update_job_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    job_id: Result<Path<u64>, PathRejection>,
    body: Result<Json<JobPatch>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let job_id = path(job_id)?;
        let patch = json_body(body)?;
        service.update_job(&caller, JobId(job_id), patch)
    });
    respond(StatusCode::OK, result)
}

async fn delete_job_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    job_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    no_content(
        caller_from_headers(&headers)
            .and_then(|caller| service.delete_job(&caller, JobId(path(job_id)?))),
    )
}

async fn search_handler<S, C>(
    State(service): SharedService<S, C>,
    params: Result<Query<JobSearch>, QueryRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = query(params).and_then(|search| service.search_jobs(&search));
    respond(StatusCode::OK, result)
}

async fn list_categories_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| service.list_categories(&caller));
    respond(StatusCode::OK, result)
}

async fn create_category_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    body: Result<Json<CategoryInput>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let input = json_body(body)?;
        service.create_category(&caller, input)
    });
    respond(StatusCode::CREATED, result)
}

async fn category_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    category_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers)
        .and_then(|caller| service.category(&caller, CategoryId(path(category_id)?)));
    respond(StatusCode::OK, result)
}

async fn rename_category_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    category_id: Result<Path<u64>, PathRejection>,
    body: Result<Json<CategoryInput>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let category_id = path(category_id)?;
        let input = json_body(body)?;
        service.rename_category(&caller, CategoryId(category_id), input)
    });
    respond(StatusCode::OK, result)
}

async fn delete_category_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    category_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    no_content(caller_from_headers(&headers).and_then(|caller| {
        service.delete_category(&caller, CategoryId(path(category_id)?))
    }))
}

async fn register_employer_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    body: Result<Json<EmployerRegistration>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let registration = json_body(body)?;
        service.register_employer(&caller, registration)
    });
    respond(StatusCode::CREATED, result)
}

async fn employer_profile_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| service.employer_profile(&caller));
    respond(StatusCode::OK, result)
}

async fn update_employer_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    body: Result<Json<EmployerPatch>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let patch = json_body(body)?;
        service.update_employer_profile(&caller, patch)
    });
    respond(StatusCode::OK, result)
}

async fn dashboard_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| service.dashboard(&caller));
    respond(StatusCode::OK, result)
}

async fn companies_handler<S, C>(State(service): SharedService<S, C>) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    respond(StatusCode::OK, service.companies())
}

async fn company_jobs_handler<S, C>(
    State(service): SharedService<S, C>,
    employer_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result =
        path(employer_id).and_then(|employer_id| service.company_jobs(EmployerId(employer_id)));
    respond(StatusCode::OK, result)
}

async fn register_seeker_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    body: Result<Json<SeekerRegistration>, JsonRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| {
        let registration = json_body(body)?;
        service.register_seeker(&caller, registration)
    });
    respond(StatusCode::CREATED, result)
}

async fn seeker_profile_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| service.seeker_profile(&caller));
    respond(StatusCode::OK, result)
}

async fn save_job_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    job_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers)
        .and_then(|caller| service.save_job(&caller, JobId(path(job_id)?)));
    respond(StatusCode::CREATED, result)
}

async fn saved_jobs_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers).and_then(|caller| service.saved_jobs(&caller));
    respond(StatusCode::OK, result)
}

async fn saved_job_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    saved_job_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    let result = caller_from_headers(&headers)
        .and_then(|caller| service.saved_job(&caller, SavedJobId(path(saved_job_id)?)));
    respond(StatusCode::OK, result)
}

async fn remove_saved_job_handler<S, C>(
    State(service): SharedService<S, C>,
    headers: HeaderMap,
    saved_job_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    S: BoardStore + 'static,
    C: Clock + 'static,
{
    no_content(caller_from_headers(&headers).and_then(|caller| {
        service.remove_saved_job(&caller, SavedJobId(path(saved_job_id)?))
    }))
}
