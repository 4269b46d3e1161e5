use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// Payment rows count toward revenue only once their status reaches this.
pub const PAYMENT_STATUS_PAID: &str = "Paid";

/// Payment joined through its booking to customer and service context.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentDetail {
    pub id: i64,
    pub booking_id: i64,
    pub amount: f64,
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub customer_name: String,
    pub brand: String,
    pub service_type: String,
}
