//! HTTP surface: router, handlers, and error-to-status mapping.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use patient_registry_core::{
    FileStore, Patient, PatientPatch, PatientView, SortField, SortOrder, StoreError,
    ValidationError,
};

/// Shared service state.
///
/// The store sits behind a single global lock held across each
/// load-mutate-save cycle, so concurrent requests cannot lose writes.
#[derive(Clone)]
pub struct ServiceState {
    store: Arc<Mutex<FileStore>>,
}

impl ServiceState {
    pub fn new(store: FileStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, FileStore>, ApiError> {
        self.store.lock().map_err(|_| {
            tracing::error!("store lock poisoned");
            ApiError::internal()
        })
    }
}

/// An error response: HTTP status plus a `detail` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: serde_json::Value,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: json!(detail.into()),
        }
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal storage failure")
    }

    fn from_rejection(rejection: &JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: json!(err.violations),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Patient not found"),
            StoreError::Conflict(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Patient already exists")
            }
            StoreError::InvalidSortField(field) => Self::new(
                StatusCode::BAD_REQUEST,
                format!(
                    "Invalid field '{field}', select from name, city, age, gender, height, weight, bmi"
                ),
            ),
            StoreError::InvalidSortOrder(order) => Self::new(
                StatusCode::BAD_REQUEST,
                format!("Invalid order '{order}', select between asc and desc"),
            ),
            StoreError::Validation(violation) => violation.into(),
            StoreError::Io(_) | StoreError::Json(_) => {
                tracing::error!(error = %err, "storage failure");
                Self::internal()
            }
        }
    }
}

/// Body of `POST /add`: a full record, id included.
#[derive(Debug, Deserialize)]
struct AddPatientRequest {
    id: String,
    #[serde(flatten)]
    patient: Patient,
}

/// Query parameters of `GET /sort`. `order` defaults to ascending.
#[derive(Debug, Deserialize)]
struct SortParams {
    sort_by: String,
    #[serde(default = "default_order")]
    order: String,
}

fn default_order() -> String {
    "asc".to_string()
}

/// Build the service router.
pub fn app(state: ServiceState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/about", get(about))
        .route("/view", get(view))
        .route("/patient/:id", get(get_patient))
        .route("/sort", get(sort_patients))
        .route("/add", post(add_patient))
        .route("/update/:id", put(update_patient))
        .route("/delete/:id", delete(delete_patient))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Patient Management System API" }))
}

async fn about() -> Json<serde_json::Value> {
    Json(json!({ "message": "A fully functional API to manage your patient records" }))
}

/// Raw store contents: stored fields only, no derived metrics.
async fn view(
    State(state): State<ServiceState>,
) -> Result<Json<BTreeMap<String, Patient>>, ApiError> {
    let store = state.store()?;
    Ok(Json(store.load()?))
}

async fn get_patient(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<PatientView>, ApiError> {
    let store = state.store()?;
    Ok(Json(store.get_patient(&id)?))
}

async fn sort_patients(
    State(state): State<ServiceState>,
    Query(params): Query<SortParams>,
) -> Result<Json<Vec<PatientView>>, ApiError> {
    let field: SortField = params.sort_by.parse()?;
    let order: SortOrder = params.order.parse()?;
    let store = state.store()?;
    Ok(Json(store.sort_patients(field, order)?))
}

async fn add_patient(
    State(state): State<ServiceState>,
    payload: Result<Json<AddPatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::from_rejection(&rejection))?;
    let store = state.store()?;
    let patient = store.add_patient(&request.id, request.patient)?;
    tracing::info!(id = %patient.id, "patient added");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Patient added successfully",
            "patient": patient,
        })),
    ))
}

async fn update_patient(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
    payload: Result<Json<PatientPatch>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(patch) = payload.map_err(|rejection| ApiError::from_rejection(&rejection))?;
    let store = state.store()?;
    store.update_patient(&id, &patch)?;
    tracing::info!(%id, "patient updated");
    Ok(Json(json!({ "message": "patient updated" })))
}

async fn delete_patient(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = state.store()?;
    store.delete_patient(&id)?;
    tracing::info!(%id, "patient deleted");
    Ok(Json(json!({ "message": "patient deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use patient_registry_core::Gender;
    use tower::ServiceExt;

    fn patient(name: &str, age: u32, height: f64, weight: f64) -> Patient {
        Patient {
            name: name.to_string(),
            city: "Kolkata".to_string(),
            age,
            gender: Gender::F,
            height,
            weight,
        }
    }

    fn seeded_router() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("patients.json"));

        let mut records = BTreeMap::new();
        records.insert("P001".to_string(), patient("Asha", 30, 1.65, 60.0));
        records.insert("P002".to_string(), patient("Bala", 25, 1.72, 80.0));
        records.insert("P003".to_string(), patient("Chitra", 40, 1.58, 52.0));
        store.save(&records).unwrap();

        let router = app(ServiceState::new(store));
        (dir, router)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("GET")
            .body(Body::empty())
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn greeting_endpoints() {
        let (_dir, router) = seeded_router();

        let (status, value) = send(router.clone(), get_request("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["message"], "Patient Management System API");

        let (status, value) = send(router, get_request("/about")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            value["message"],
            "A fully functional API to manage your patient records"
        );
    }

    #[tokio::test]
    async fn view_returns_raw_fields_without_metrics() {
        let (_dir, router) = seeded_router();

        let (status, value) = send(router, get_request("/view")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value.as_object().unwrap().len(), 3);
        assert_eq!(value["P001"]["name"], "Asha");
        assert!(value["P001"].get("bmi").is_none());
        assert!(value["P001"].get("verdict").is_none());
    }

    #[tokio::test]
    async fn get_patient_includes_metrics() {
        let (_dir, router) = seeded_router();

        let (status, value) = send(router, get_request("/patient/P002")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["id"], "P002");
        assert_eq!(value["bmi"], 27.04);
        assert_eq!(value["verdict"], "Overweight");
    }

    #[tokio::test]
    async fn get_missing_patient_is_404() {
        let (_dir, router) = seeded_router();

        let (status, value) = send(router, get_request("/patient/P999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["detail"], "Patient not found");
    }

    #[tokio::test]
    async fn sort_by_age_both_directions() {
        let (_dir, router) = seeded_router();

        // order defaults to asc
        let (status, value) = send(router.clone(), get_request("/sort?sort_by=age")).await;
        assert_eq!(status, StatusCode::OK);
        let ages: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["age"].as_u64().unwrap())
            .collect();
        assert_eq!(ages, vec![25, 30, 40]);

        let (status, value) = send(router, get_request("/sort?sort_by=age&order=desc")).await;
        assert_eq!(status, StatusCode::OK);
        let ages: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["age"].as_u64().unwrap())
            .collect();
        assert_eq!(ages, vec![40, 30, 25]);
    }

    #[tokio::test]
    async fn sort_rejects_unknown_tokens() {
        let (_dir, router) = seeded_router();

        let (status, value) =
            send(router.clone(), get_request("/sort?sort_by=nonexistent_field")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["detail"]
            .as_str()
            .unwrap()
            .contains("Invalid field"));

        let (status, value) = send(router, get_request("/sort?sort_by=age&order=dsc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["detail"].as_str().unwrap().contains("Invalid order"));
    }

    #[tokio::test]
    async fn add_patient_returns_created_with_metrics() {
        let (_dir, router) = seeded_router();

        let body = json!({
            "id": "P004",
            "name": "Dev",
            "city": "Jaipur",
            "age": 33,
            "gender": "M",
            "height": 1.80,
            "weight": 75.0
        });
        let (status, value) = send(router.clone(), json_request("POST", "/add", body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(value["message"], "Patient added successfully");
        assert_eq!(value["patient"]["id"], "P004");
        assert_eq!(value["patient"]["bmi"], 23.15);
        assert_eq!(value["patient"]["verdict"], "Normal weight");

        let (status, _) = send(router, get_request("/patient/P004")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn add_duplicate_id_is_400() {
        let (_dir, router) = seeded_router();

        let body = json!({
            "id": "P001",
            "name": "Imposter",
            "city": "Nowhere",
            "age": 99,
            "gender": "Others",
            "height": 1.99,
            "weight": 99.0
        });
        let (status, value) = send(router, json_request("POST", "/add", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["detail"], "Patient already exists");
    }

    #[tokio::test]
    async fn add_invalid_fields_is_422_with_all_violations() {
        let (_dir, router) = seeded_router();

        let body = json!({
            "id": "P004",
            "name": "",
            "city": "Jaipur",
            "age": 0,
            "gender": "M",
            "height": 1.80,
            "weight": -1.0
        });
        let (status, value) = send(router, json_request("POST", "/add", body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<_> = value["detail"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, vec!["name", "age", "weight"]);
    }

    #[tokio::test]
    async fn add_with_malformed_body_is_client_error() {
        let (_dir, router) = seeded_router();

        let request = Request::builder()
            .uri("/add")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from("{"))
            .unwrap();
        let (status, _) = send(router, request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn update_merges_patch() {
        let (_dir, router) = seeded_router();

        let body = json!({ "weight": 70.0 });
        let (status, value) = send(router.clone(), json_request("PUT", "/update/P001", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["message"], "patient updated");

        let (_, value) = send(router, get_request("/patient/P001")).await;
        assert_eq!(value["weight"], 70.0);
        // Untouched fields and freshly derived metrics.
        assert_eq!(value["name"], "Asha");
        assert_eq!(value["bmi"], 25.71);
    }

    #[tokio::test]
    async fn update_missing_patient_is_404() {
        let (_dir, router) = seeded_router();

        let body = json!({ "age": 50 });
        let (status, value) = send(router, json_request("PUT", "/update/P999", body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["detail"], "Patient not found");
    }

    #[tokio::test]
    async fn update_violating_patch_is_422() {
        let (_dir, router) = seeded_router();

        let body = json!({ "height": 0.0 });
        let (status, value) = send(router, json_request("PUT", "/update/P001", body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(value["detail"][0]["field"], "height");
    }

    #[tokio::test]
    async fn delete_patient_then_404_on_repeat() {
        let (_dir, router) = seeded_router();

        let request = Request::builder()
            .uri("/delete/P003")
            .method("DELETE")
            .body(Body::empty())
            .unwrap();
        let (status, value) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["message"], "patient deleted");

        let request = Request::builder()
            .uri("/delete/P003")
            .method("DELETE")
            .body(Body::empty())
            .unwrap();
        let (status, value) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["detail"], "Patient not found");
    }

    #[tokio::test]
    async fn unreadable_store_is_500() {
        let dir = tempfile::tempdir().unwrap();
        // No document at this path.
        let store = FileStore::new(dir.path().join("missing.json"));
        let router = app(ServiceState::new(store));

        let (status, value) = send(router, get_request("/view")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["detail"], "internal storage failure");
    }
}
