use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::{errors::ServiceError, EmployeeStore, Record};

use crate::errors::ApiError;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn list_employees(State(store): State<Arc<EmployeeStore>>) -> Json<HashMap<String, Record>> {
    Json(store.list().await)
}

async fn get_employee(
    State(store): State<Arc<EmployeeStore>>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let record = store
        .get(&id)
        .await
        .ok_or_else(ServiceError::id_not_found)?;
    Ok(Json(record))
}

async fn get_employee_name(
    State(store): State<Arc<EmployeeStore>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let name = store.get_field(&id, "firstName").await?;
    Ok(Json(name))
}

async fn post_employees(
    State(store): State<Arc<EmployeeStore>>,
    Json(entries): Json<HashMap<String, Record>>,
) -> Result<(StatusCode, &'static str), ApiError> {
    store.create(entries).await?;
    Ok((StatusCode::CREATED, "Posted Successfully"))
}

async fn put_employee(
    State(store): State<Arc<EmployeeStore>>,
    Path(id): Path<String>,
    Json(fields): Json<Record>,
) -> Result<(StatusCode, &'static str), ApiError> {
    store.update(&id, fields).await?;
    Ok((StatusCode::ACCEPTED, "Updated Successfully"))
}

async fn delete_employee(
    State(store): State<Arc<EmployeeStore>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, &'static str), ApiError> {
    store.remove(&id).await?;
    Ok((StatusCode::ACCEPTED, "Deleted Successfully"))
}

/// Build the full application router over a shared employee store.
pub fn build_router(store: Arc<EmployeeStore>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/Emp_Data", get(list_employees))
        .route("/Emp_Data/post_json", post(post_employees))
        .route(
            "/Emp_Data/:id",
            get(get_employee).put(put_employee).delete(delete_employee),
        )
        .route("/Emp_Data/:id/name", get(get_employee_name))
        .with_state(store)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
