use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AdminUser, AuthUser};
use crate::models::PaymentDetail;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments", get(list_payments).post(record_payment))
}

// POST /api/payments
//
// Payments are recorded facts; no gateway interaction happens here.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct RecordPaymentRequest {
    #[validate(range(min = 1))]
    booking_id: i64,
    #[validate(range(min = 0.01))]
    amount: f64,
    #[validate(length(min = 1))]
    payment_method: String,
    #[validate(length(min = 1))]
    payment_status: String,
    transaction_id: Option<String>,
}

async fn record_payment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<RecordPaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(|e| ApiError::validation(e.to_string()))?;

    let booking_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM bookings WHERE id = $1)",
    )
    .bind(req.booking_id)
    .fetch_one(&state.db.pool)
    .await?;

    if !booking_exists {
        return Err(ApiError::NotFound("Booking"));
    }

    let transaction_id = req
        .transaction_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let payment_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO payments (booking_id, amount, payment_method, payment_status, transaction_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(req.booking_id)
    .bind(req.amount)
    .bind(&req.payment_method)
    .bind(&req.payment_status)
    .bind(&transaction_id)
    .fetch_one(&state.db.pool)
    .await?;

    tracing::info!(
        "payment {} recorded for booking {} by user {}",
        payment_id,
        req.booking_id,
        user.user_id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Payment recorded successfully", "paymentId": payment_id })),
    ))
}

// GET /api/payments
async fn list_payments(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let payments = sqlx::query_as::<_, PaymentDetail>(
        "SELECT p.id, p.booking_id, p.amount, p.payment_method, p.payment_status, \
                p.transaction_id, p.created_at, \
                u.name AS customer_name, s.brand, st.name AS service_type \
         FROM payments p \
         JOIN bookings b ON p.booking_id = b.id \
         JOIN users u ON b.user_id = u.id \
         JOIN services s ON b.service_id = s.id \
         JOIN service_types st ON s.service_type_id = st.id \
         ORDER BY p.created_at DESC",
    )
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(payments))
}
