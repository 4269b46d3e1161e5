//! dashboard.rs
//!
//! Admin aggregation surface.
//!
//! - Dashboard summary: five independent aggregates (customer count,
//!   booking count, paid revenue, pending count, per-type booking counts)
//!   plus the ten most recent bookings, issued concurrently and combined
//!   into one response. If any sub-query fails the whole operation fails.
//! - Revenue analytics: paid payments bucketed by week/month/year, plus
//!   per-service-type revenue totals.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::middleware::AdminUser;
use crate::models::payment::PAYMENT_STATUS_PAID;
use crate::models::user::ROLE_CUSTOMER;
use crate::models::BookingDetail;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/dashboard/stats", get(get_dashboard_stats))
        .route("/admin/dashboard/analytics/revenue", get(get_revenue_analytics))
}

/* ---------- DASHBOARD SUMMARY ---------- */

#[derive(Debug, FromRow, Serialize)]
struct ServiceTypeStat {
    service_type: String,
    booking_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardStats {
    total_users: i64,
    total_bookings: i64,
    total_revenue: f64,
    pending_bookings: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    stats: DashboardStats,
    services_stats: Vec<ServiceTypeStat>,
    recent_bookings: Vec<BookingDetail>,
}

// GET /api/admin/dashboard/stats
async fn get_dashboard_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<impl IntoResponse> {
    let pool = &state.db.pool;

    let total_users = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE role = $1",
    )
    .bind(ROLE_CUSTOMER)
    .fetch_one(pool);

    let total_bookings =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings").fetch_one(pool);

    let paid_revenue = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(amount), 0)::float8 FROM payments WHERE payment_status = $1",
    )
    .bind(PAYMENT_STATUS_PAID)
    .fetch_one(pool);

    let pending_bookings = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM bookings WHERE status = 'Pending'",
    )
    .fetch_one(pool);

    // Inner-join semantics: types with zero bookings are omitted entirely.
    let services_stats = sqlx::query_as::<_, ServiceTypeStat>(
        "SELECT st.name AS service_type, COUNT(b.id) AS booking_count \
         FROM service_types st \
         LEFT JOIN services s ON st.id = s.service_type_id \
         LEFT JOIN bookings b ON s.id = b.service_id \
         WHERE b.id IS NOT NULL \
         GROUP BY st.id, st.name",
    )
    .fetch_all(pool);

    let recent_sql = format!(
        "{} ORDER BY b.created_at DESC LIMIT 10",
        BookingDetail::SELECT_FROM
    );
    let recent_bookings = sqlx::query_as::<_, BookingDetail>(&recent_sql).fetch_all(pool);

    let (total_users, total_bookings, paid_revenue, pending_bookings, services_stats, recent_bookings) =
        futures::try_join!(
            total_users,
            total_bookings,
            paid_revenue,
            pending_bookings,
            services_stats,
            recent_bookings
        )?;

    // No paid payments recorded yet (sum is zero): estimate revenue from
    // the base price of every booked service instead.
    let total_revenue = if paid_revenue == 0.0 {
        sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(s.base_price), 0)::float8 \
             FROM bookings b \
             JOIN services s ON b.service_id = s.id",
        )
        .fetch_one(pool)
        .await?
    } else {
        paid_revenue
    };

    Ok(Json(DashboardResponse {
        stats: DashboardStats {
            total_users,
            total_bookings,
            total_revenue,
            pending_bookings,
        },
        services_stats,
        recent_bookings,
    }))
}

/* ---------- REVENUE ANALYTICS ---------- */

/// Reporting granularity for the revenue trend. Unrecognized values fall
/// back to monthly, matching the behavior clients already rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Weekly,
    Monthly,
    Yearly,
}

impl Period {
    fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("weekly") => Period::Weekly,
            Some("yearly") => Period::Yearly,
            _ => Period::Monthly,
        }
    }

    /// `to_char` bucket key: ISO week, year-month, or year.
    fn bucket_format(self) -> &'static str {
        match self {
            Period::Weekly => "IYYY-IW",
            Period::Monthly => "YYYY-MM",
            Period::Yearly => "YYYY",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Period::Weekly => "week",
            Period::Monthly => "month",
            Period::Yearly => "year",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RevenueQuery {
    period: Option<String>,
}

#[derive(Debug, FromRow, Serialize)]
struct RevenueBucket {
    period: String,
    transaction_count: i64,
    total_revenue: f64,
    average_revenue: f64,
}

#[derive(Debug, FromRow, Serialize)]
struct ServiceRevenue {
    service_type: String,
    booking_count: i64,
    total_revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RevenueAnalyticsResponse {
    revenue_trend: Vec<RevenueBucket>,
    service_revenue: Vec<ServiceRevenue>,
    period: &'static str,
}

// GET /api/admin/dashboard/analytics/revenue
//
// Reflects recorded payments only; the dashboard's base-price estimate is
// deliberately not applied here, so the two views can disagree while no
// payments exist.
async fn get_revenue_analytics(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<RevenueQuery>,
) -> ApiResult<impl IntoResponse> {
    let period = Period::from_query(params.period.as_deref());
    let pool = &state.db.pool;

    let revenue_trend = sqlx::query_as::<_, RevenueBucket>(
        "SELECT to_char(p.created_at, $1::text) AS period, \
                COUNT(p.id) AS transaction_count, \
                SUM(p.amount)::float8 AS total_revenue, \
                AVG(p.amount)::float8 AS average_revenue \
         FROM payments p \
         WHERE p.payment_status = $2 \
         GROUP BY 1 \
         ORDER BY 1 DESC \
         LIMIT 12",
    )
    .bind(period.bucket_format())
    .bind(PAYMENT_STATUS_PAID)
    .fetch_all(pool);

    let service_revenue = sqlx::query_as::<_, ServiceRevenue>(
        "SELECT st.name AS service_type, \
                COUNT(p.id) AS booking_count, \
                SUM(p.amount)::float8 AS total_revenue \
         FROM payments p \
         JOIN bookings b ON p.booking_id = b.id \
         JOIN services s ON b.service_id = s.id \
         JOIN service_types st ON s.service_type_id = st.id \
         WHERE p.payment_status = $1 \
         GROUP BY st.id, st.name \
         ORDER BY total_revenue DESC",
    )
    .bind(PAYMENT_STATUS_PAID)
    .fetch_all(pool);

    let (revenue_trend, service_revenue) = futures::try_join!(revenue_trend, service_revenue)?;

    Ok(Json(RevenueAnalyticsResponse {
        revenue_trend,
        service_revenue,
        period: period.label(),
    }))
}
