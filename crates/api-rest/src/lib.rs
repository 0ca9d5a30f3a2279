//! # API REST
//!
//! REST API for the health record system.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS, API key checking)
//!
//! Uses `api-shared` for request/response bodies and `hrs-core` for the patient store.
//! The router is built here and served by the `hrs-run` binary.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    validate_api_key, ContactBody, DeletePatientRes, ErrorRes, HealthRes, HealthService,
    InsuranceBody, ListPatientsRes, MedicalBody, PatientAckRes, PatientBody, PatientSummary,
    API_KEY_HEADER,
};
use hrs_core::{DocumentStore, PatientError, PatientRecordStore};

/// Patient store handle shared by every request.
pub type SharedPatientStore = PatientRecordStore<Arc<dyn DocumentStore>>;

type ApiError = (StatusCode, Json<ErrorRes>);

/// Application state for the REST API server.
#[derive(Clone)]
pub struct AppState {
    patients: Arc<SharedPatientStore>,
    api_key: Option<Arc<str>>,
}

impl AppState {
    /// Builds the state from an injected patient store.
    ///
    /// `api_key` is the key every non-health route must present in the `x-api-key`
    /// header. `None` leaves the API open.
    pub fn new(patients: SharedPatientStore, api_key: Option<String>) -> Self {
        Self {
            patients: Arc::new(patients),
            api_key: api_key.map(Arc::from),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        create_patient,
        read_patient,
        update_patient,
        delete_patient,
    ),
    components(schemas(
        HealthRes,
        ListPatientsRes,
        PatientSummary,
        PatientBody,
        ContactBody,
        MedicalBody,
        InsuranceBody,
        PatientAckRes,
        DeletePatientRes,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI mounted at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    let patients = Router::new()
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/:id",
            get(read_patient).put(update_patient).delete(delete_patient),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(patients)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let provided = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let checked = validate_api_key(state.api_key.as_deref(), provided);

    match checked {
        Ok(()) => next.run(req).await,
        Err(e) => {
            tracing::warn!("rejected {} {}: {}", req.method(), req.uri().path(), e);
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorRes {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Maps a core error onto a status code and JSON error body.
fn error_response(err: PatientError) -> ApiError {
    let status = match &err {
        PatientError::Validation(_) => StatusCode::BAD_REQUEST,
        PatientError::NotFound(_) => StatusCode::NOT_FOUND,
        PatientError::Conflict(_) => StatusCode::CONFLICT,
        PatientError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PatientError::CorruptDocument { .. } | PatientError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        tracing::error!("patient request failed: {}", err);
    }

    (
        status,
        Json(ErrorRes {
            error: err.to_string(),
        }),
    )
}

fn body_rejection(rejection: JsonRejection) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorRes {
            error: rejection.body_text(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint. Never requires an API key.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "Summaries of all patients, ordered by ID", body = ListPatientsRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 503, description = "Patient store unavailable", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Result<Json<ListPatientsRes>, ApiError> {
    let patients = state
        .patients
        .list()
        .map_err(error_response)?
        .map(PatientSummary::from)
        .collect();
    Ok(Json(ListPatientsRes { patients }))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientBody,
    responses(
        (status = 201, description = "Patient created", body = PatientAckRes),
        (status = 400, description = "Invalid patient record", body = ErrorRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 409, description = "A patient with this ID already exists", body = ErrorRes),
        (status = 503, description = "Patient store unavailable", body = ErrorRes)
    )
)]
/// Create a new patient record
///
/// # Errors
/// Returns `409 Conflict` when the ID is taken and the server rejects overwrites.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<PatientBody>, JsonRejection>,
) -> Result<(StatusCode, Json<PatientAckRes>), ApiError> {
    let Json(body) = payload.map_err(body_rejection)?;
    let record = body.into_record().map_err(error_response)?;

    state.patients.create(&record).map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(PatientAckRes {
            message: format!("Patient {} added successfully!", record.name),
            id: record.id,
            name: record.name,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "The full patient record", body = PatientBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 404, description = "No patient with this ID", body = ErrorRes),
        (status = 500, description = "Stored record is corrupt", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn read_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PatientBody>, ApiError> {
    let record = state.patients.read(&id).map_err(error_response)?;
    Ok(Json(PatientBody::from(record)))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient ID")),
    request_body = PatientBody,
    responses(
        (status = 200, description = "Patient replaced", body = PatientAckRes),
        (status = 400, description = "Invalid record, or body ID differs from path", body = ErrorRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 404, description = "No patient with this ID", body = ErrorRes)
    )
)]
/// Replace every field of an existing patient record
///
/// The body must carry the full record. Fields left out of the nested `contact` and
/// `insurance` objects are stored as empty strings, not kept from the old record.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PatientBody>, JsonRejection>,
) -> Result<Json<PatientAckRes>, ApiError> {
    let Json(body) = payload.map_err(body_rejection)?;
    let record = body.into_record().map_err(error_response)?;

    state.patients.update(&id, &record).map_err(error_response)?;

    Ok(Json(PatientAckRes {
        message: format!("Patient {} updated successfully!", record.name),
        id: record.id,
        name: record.name,
    }))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deleted; the removed record is returned", body = DeletePatientRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes),
        (status = 404, description = "No patient with this ID", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletePatientRes>, ApiError> {
    let removed = state.patients.delete(&id).map_err(error_response)?;
    Ok(Json(DeletePatientRes {
        message: format!(
            "Patient {} (ID: {}) deleted successfully!",
            removed.name, removed.id
        ),
        patient: PatientBody::from(removed),
    }))
}
