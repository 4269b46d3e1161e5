use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AdminUser, AuthUser};
use crate::models::{BookingDetail, BookingStatus};
use crate::query::{bind_params, bind_params_scalar, page_window, FilterSet, PageMeta, SqlParam};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(get_my_bookings).post(create_booking))
        .route("/admin/bookings", get(list_bookings))
        .route("/admin/bookings/{booking_id}/status", patch(update_booking_status))
}

/* ---------- CUSTOMER SURFACE ---------- */

// POST /api/bookings
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct CreateBookingRequest {
    #[validate(range(min = 1))]
    service_id: i64,
    #[validate(length(min = 1))]
    issue_description: String,
    date: NaiveDate,
    #[validate(length(min = 1))]
    time_slot: String,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(|e| ApiError::validation(e.to_string()))?;

    // The owning user is always the verified caller, never a body field.
    let booking_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO bookings (user_id, service_id, issue_description, date, time_slot)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(user.user_id)
    .bind(req.service_id)
    .bind(&req.issue_description)
    .bind(req.date)
    .bind(&req.time_slot)
    .fetch_one(&state.db.pool)
    .await?;

    tracing::info!("booking {} created by user {}", booking_id, user.user_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Booking created", "bookingId": booking_id })),
    ))
}

// GET /api/bookings
async fn get_my_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let sql = format!(
        "{} WHERE b.user_id = $1 ORDER BY b.created_at DESC",
        BookingDetail::SELECT_FROM
    );
    let bookings = sqlx::query_as::<_, BookingDetail>(&sql)
        .bind(user.user_id)
        .fetch_all(&state.db.pool)
        .await?;

    Ok(Json(bookings))
}

/* ---------- ADMIN SURFACE ---------- */

// GET /api/admin/bookings
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct BookingListQuery {
    #[validate(range(min = 1))]
    page: Option<u32>,
    #[validate(range(min = 1))]
    limit: Option<u32>,
    status: Option<String>,
    service_type: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Serialize)]
struct BookingListResponse {
    bookings: Vec<BookingDetail>,
    pagination: PageMeta,
}

/// Empty strings come in from cleared UI filters and mean "no filter".
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn parse_date(value: &str, field: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("{field} must be a YYYY-MM-DD date")))
}

fn booking_filters(params: &BookingListQuery) -> ApiResult<FilterSet> {
    let mut filters = FilterSet::new();

    if let Some(status) = non_empty(&params.status) {
        filters.add("b.status = $?", SqlParam::Text(status.to_string()));
    }
    if let Some(service_type) = non_empty(&params.service_type) {
        filters.add("st.name = $?", SqlParam::Text(service_type.to_string()));
    }
    if let Some(from) = non_empty(&params.date_from) {
        filters.add("b.date >= $?", SqlParam::Date(parse_date(from, "date_from")?));
    }
    if let Some(to) = non_empty(&params.date_to) {
        filters.add("b.date <= $?", SqlParam::Date(parse_date(to, "date_to")?));
    }
    if let Some(search) = non_empty(&params.search) {
        filters.add_any(
            &[
                "u.name ILIKE $?",
                "u.email ILIKE $?",
                "u.phone ILIKE $?",
                "s.brand ILIKE $?",
            ],
            SqlParam::Text(format!("%{search}%")),
        );
    }

    Ok(filters)
}

async fn list_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<BookingListQuery>,
) -> ApiResult<impl IntoResponse> {
    params.validate().map_err(|e| ApiError::validation(e.to_string()))?;

    let page = params.page.unwrap_or(1);
    let limit = params.limit.unwrap_or(10);
    let filters = booking_filters(&params)?;

    let list_sql = format!(
        "{}{} ORDER BY b.created_at DESC LIMIT ${} OFFSET ${}",
        BookingDetail::SELECT_FROM,
        filters.where_clause(),
        filters.next_ordinal(),
        filters.next_ordinal() + 1,
    );
    let count_sql = format!(
        "SELECT COUNT(*) \
         FROM bookings b \
         JOIN users u ON b.user_id = u.id \
         JOIN services s ON b.service_id = s.id \
         JOIN service_types st ON s.service_type_id = st.id{}",
        filters.where_clause(),
    );

    let (limit_n, offset) = page_window(page, limit);
    let rows = bind_params(sqlx::query_as::<_, BookingDetail>(&list_sql), filters.params())
        .bind(limit_n)
        .bind(offset)
        .fetch_all(&state.db.pool);
    let total = bind_params_scalar(sqlx::query_scalar::<_, i64>(&count_sql), filters.params())
        .fetch_one(&state.db.pool);

    let (bookings, total_records) = futures::try_join!(rows, total)?;

    Ok(Json(BookingListResponse {
        bookings,
        pagination: PageMeta::new(page, limit, total_records),
    }))
}

// PATCH /api/admin/bookings/{booking_id}/status
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateStatusRequest {
    status: String,
    #[serde(rename = "adminNotes")]
    admin_notes: Option<String>,
}

async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(booking_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let status = BookingStatus::parse(&req.status)
        .ok_or_else(|| ApiError::validation("Invalid status"))?;

    // Update and re-fetch in one transaction so the joined view reflects
    // exactly the write we just made.
    let mut tx = state.db.pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE bookings SET status = $1, admin_notes = COALESCE($2, admin_notes) WHERE id = $3",
    )
    .bind(status.as_str())
    .bind(&req.admin_notes)
    .bind(booking_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Booking"));
    }

    let booking = BookingDetail::find(&mut *tx, booking_id)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    tx.commit().await?;

    tracing::info!("booking {} moved to '{}'", booking_id, status.as_str());

    Ok(Json(json!({
        "message": "Booking status updated successfully",
        "booking": booking,
    })))
}
