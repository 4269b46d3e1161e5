use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

pub const ROLE_CUSTOMER: i16 = 0;
pub const ROLE_ADMIN: i16 = 1;

/// Customer row as returned by the admin user listing: profile columns
/// plus booking aggregates computed by the grouped left join.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserWithStats {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: i16,
    pub profile_picture: Option<String>,
    pub created_at: NaiveDateTime,
    pub bookings_count: i64,
    pub last_booking_date: Option<NaiveDateTime>,
}
