use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ApiResult, BlockingCount};
use crate::middleware::AdminUser;
use crate::models::user::{UserWithStats, ROLE_ADMIN, ROLE_CUSTOMER};
use crate::query::{bind_params, bind_params_scalar, page_window, FilterSet, PageMeta, SqlParam};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", axum::routing::delete(delete_user))
}

// GET /api/admin/users
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct UserListQuery {
    #[validate(range(min = 1))]
    page: Option<u32>,
    #[validate(range(min = 1))]
    limit: Option<u32>,
    search: Option<String>,
}

#[derive(Debug, Serialize)]
struct UserListResponse {
    users: Vec<UserWithStats>,
    pagination: PageMeta,
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<UserListQuery>,
) -> ApiResult<impl IntoResponse> {
    params.validate().map_err(|e| ApiError::validation(e.to_string()))?;

    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(10);

    let mut filters = FilterSet::new();
    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        filters.add_any(
            &["u.name ILIKE $?", "u.email ILIKE $?"],
            SqlParam::Text(format!("%{search}%")),
        );
    }

    // Customers only; the left join supplies per-user booking aggregates.
    let list_sql = format!(
        "SELECT u.id, u.name, u.email, u.phone, u.address, u.role, \
                u.profile_picture, u.created_at, \
                COUNT(b.id) AS bookings_count, \
                MAX(b.created_at) AS last_booking_date \
         FROM users u \
         LEFT JOIN bookings b ON u.id = b.user_id \
         WHERE u.role = {ROLE_CUSTOMER}{} \
         GROUP BY u.id \
         ORDER BY u.created_at DESC LIMIT ${} OFFSET ${}",
        filters.and_clause(),
        filters.next_ordinal(),
        filters.next_ordinal() + 1,
    );
    let count_sql = format!(
        "SELECT COUNT(*) FROM users u WHERE u.role = {ROLE_CUSTOMER}{}",
        filters.and_clause(),
    );

    let (limit_n, offset) = page_window(page, limit);
    let rows = bind_params(sqlx::query_as::<_, UserWithStats>(&list_sql), filters.params())
        .bind(limit_n)
        .bind(offset)
        .fetch_all(&state.db.pool);
    let total = bind_params_scalar(sqlx::query_scalar::<_, i64>(&count_sql), filters.params())
        .fetch_one(&state.db.pool);

    let (users, total_records) = futures::try_join!(rows, total)?;

    Ok(Json(UserListResponse {
        users,
        pagination: PageMeta::new(page, limit, total_records),
    }))
}

// DELETE /api/admin/users/{id}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let target: Option<(i64, i16)> =
        sqlx::query_as("SELECT id, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db.pool)
            .await?;

    let (_, role) = target.ok_or(ApiError::NotFound("User"))?;

    if role == ROLE_ADMIN {
        return Err(ApiError::forbidden("Cannot delete administrator accounts"));
    }

    // Referential guard. Check-then-delete is not atomic; a booking created
    // between the two statements survives with a dangling user only if the
    // FK constraint is dropped, otherwise the delete fails as a store error.
    let bookings_count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM bookings WHERE user_id = $1",
    )
    .bind(id)
    .fetch_one(&state.db.pool)
    .await?;

    if bookings_count > 0 {
        return Err(ApiError::conflict_with(
            "Cannot delete user with existing bookings. Please delete their bookings first.",
            BlockingCount::Bookings(bookings_count),
        ));
    }

    let deleted = sqlx::query("DELETE FROM users WHERE id = $1 AND role = $2")
        .bind(id)
        .bind(ROLE_CUSTOMER)
        .execute(&state.db.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("User"));
    }

    tracing::info!("user {} deleted", id);

    Ok(Json(json!({
        "message": "User deleted successfully",
        "deletedUserId": id,
    })))
}
