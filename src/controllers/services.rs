use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ApiResult, BlockingCount};
use crate::middleware::AdminUser;
use crate::models::{Service, ServiceType};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // public catalog
        .route("/services", get(get_catalog))
        .route("/services/types", get(get_service_types))
        // admin management
        .route("/admin/services", get(list_services).post(create_service))
        .route("/admin/services/{id}", put(update_service).delete(delete_service))
        .route("/admin/service-types", get(list_service_types).post(create_service_type))
        .route("/admin/service-types/{id}", put(update_service_type).delete(delete_service_type))
}

const SERVICE_SELECT: &str = "\
    SELECT s.id, s.service_type_id, s.brand, s.description, s.base_price, \
           s.image, st.name AS service_type \
    FROM services s \
    JOIN service_types st ON s.service_type_id = st.id";

/* ---------- PUBLIC CATALOG ---------- */

// GET /api/services
async fn get_catalog(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let sql = format!("{SERVICE_SELECT} ORDER BY st.name, s.brand");
    let services = sqlx::query_as::<_, Service>(&sql)
        .fetch_all(&state.db.pool)
        .await?;
    Ok(Json(services))
}

// GET /api/services/types
async fn get_service_types(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let types = sqlx::query_as::<_, ServiceType>(
        "SELECT id, name, description FROM service_types ORDER BY name",
    )
    .fetch_all(&state.db.pool)
    .await?;
    Ok(Json(types))
}

/* ---------- SERVICES (ADMIN) ---------- */

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct ServicePayload {
    #[validate(range(min = 1))]
    service_type_id: i64,
    #[validate(length(min = 1))]
    brand: String,
    description: Option<String>,
    #[validate(range(min = 0.0))]
    base_price: f64,
    image: Option<String>,
}

// GET /api/admin/services
async fn list_services(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let sql = format!("{SERVICE_SELECT} ORDER BY s.id DESC");
    let services = sqlx::query_as::<_, Service>(&sql)
        .fetch_all(&state.db.pool)
        .await?;
    Ok(Json(json!({ "services": services })))
}

// POST /api/admin/services
async fn create_service(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<ServicePayload>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(|e| ApiError::validation(e.to_string()))?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO services (service_type_id, brand, description, base_price, image)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(req.service_type_id)
    .bind(&req.brand)
    .bind(&req.description)
    .bind(req.base_price)
    .bind(&req.image)
    .fetch_one(&state.db.pool)
    .await?;

    let sql = format!("{SERVICE_SELECT} WHERE s.id = $1");
    let service = sqlx::query_as::<_, Service>(&sql)
        .bind(id)
        .fetch_one(&state.db.pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Service created successfully", "service": service })),
    ))
}

// PUT /api/admin/services/{id}
async fn update_service(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<ServicePayload>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(|e| ApiError::validation(e.to_string()))?;

    let updated = sqlx::query(
        "UPDATE services
         SET service_type_id = $1, brand = $2, description = $3, base_price = $4, image = $5
         WHERE id = $6",
    )
    .bind(req.service_type_id)
    .bind(&req.brand)
    .bind(&req.description)
    .bind(req.base_price)
    .bind(&req.image)
    .bind(id)
    .execute(&state.db.pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Service"));
    }

    Ok(Json(json!({ "message": "Service updated successfully" })))
}

// DELETE /api/admin/services/{id}
async fn delete_service(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let bookings_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM bookings WHERE service_id = $1",
    )
    .bind(id)
    .fetch_one(&state.db.pool)
    .await?;

    if bookings_count > 0 {
        return Err(ApiError::conflict_with(
            "Cannot delete service with existing bookings",
            BlockingCount::Bookings(bookings_count),
        ));
    }

    let deleted = sqlx::query("DELETE FROM services WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Service"));
    }

    Ok(Json(json!({ "message": "Service deleted successfully" })))
}

/* ---------- SERVICE TYPES (ADMIN) ---------- */

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServiceTypePayload {
    name: String,
    description: Option<String>,
}

// GET /api/admin/service-types
async fn list_service_types(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let types = sqlx::query_as::<_, ServiceType>(
        "SELECT id, name, description FROM service_types ORDER BY name ASC",
    )
    .fetch_all(&state.db.pool)
    .await?;
    Ok(Json(types))
}

// POST /api/admin/service-types
async fn create_service_type(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<ServiceTypePayload>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("Service type name is required"));
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM service_types WHERE name = $1")
        .bind(&req.name)
        .fetch_optional(&state.db.pool)
        .await?;

    if existing.is_some() {
        return Err(ApiError::conflict("Service type already exists"));
    }

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO service_types (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(&req.name)
    .bind(&req.description)
    .fetch_one(&state.db.pool)
    .await?;

    let service_type = sqlx::query_as::<_, ServiceType>(
        "SELECT id, name, description FROM service_types WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&state.db.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Service type created successfully",
            "serviceType": service_type,
        })),
    ))
}

// PUT /api/admin/service-types/{id}
async fn update_service_type(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<ServiceTypePayload>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("Service type name is required"));
    }

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM service_types WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db.pool)
        .await?;

    if exists.is_none() {
        return Err(ApiError::NotFound("Service type"));
    }

    let name_taken = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM service_types WHERE name = $1 AND id != $2",
    )
    .bind(&req.name)
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?;

    if name_taken.is_some() {
        return Err(ApiError::conflict("Service type name already exists"));
    }

    sqlx::query("UPDATE service_types SET name = $1, description = $2 WHERE id = $3")
        .bind(&req.name)
        .bind(&req.description)
        .bind(id)
        .execute(&state.db.pool)
        .await?;

    let service_type = sqlx::query_as::<_, ServiceType>(
        "SELECT id, name, description FROM service_types WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&state.db.pool)
    .await?;

    Ok(Json(json!({
        "message": "Service type updated successfully",
        "serviceType": service_type,
    })))
}

// DELETE /api/admin/service-types/{id}
async fn delete_service_type(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM service_types WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db.pool)
        .await?;

    if exists.is_none() {
        return Err(ApiError::NotFound("Service type"));
    }

    let services_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM services WHERE service_type_id = $1",
    )
    .bind(id)
    .fetch_one(&state.db.pool)
    .await?;

    if services_count > 0 {
        return Err(ApiError::conflict_with(
            "Cannot delete service type with associated services. \
             Please delete or reassign the services first.",
            BlockingCount::Services(services_count),
        ));
    }

    let deleted = sqlx::query("DELETE FROM service_types WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("Service type"));
    }

    Ok(Json(json!({
        "message": "Service type deleted successfully",
        "deletedServiceTypeId": id,
    })))
}
