use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

/// Booking lifecycle status.
///
/// Any status may be set from any other; the only hard constraint is
/// membership in this set. Staff use free transitions to correct mistakes
/// (e.g. reverting an accidental "Completed").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    /// Wire and storage string. "In Progress" keeps the space for
    /// compatibility with existing rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::InProgress => "In Progress",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(BookingStatus::Pending),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "In Progress" | "InProgress" => Some(BookingStatus::InProgress),
            "Completed" => Some(BookingStatus::Completed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// Fully joined booking record: booking columns plus customer, service and
/// service-type context, so callers need no additional round trip.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingDetail {
    pub id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub issue_description: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub status: String,
    pub admin_notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub brand: String,
    pub base_price: f64,
    pub service_type: String,
}

impl BookingDetail {
    /// Shared base join for every joined-booking query. Callers append
    /// their own WHERE/ORDER/LIMIT clauses.
    pub const SELECT_FROM: &'static str = "\
        SELECT b.id, b.user_id, b.service_id, b.issue_description, b.date, \
               b.time_slot, b.status, b.admin_notes, b.created_at, \
               u.name AS customer_name, u.email, u.phone, u.profile_picture, \
               s.brand, s.base_price, st.name AS service_type \
        FROM bookings b \
        JOIN users u ON b.user_id = u.id \
        JOIN services s ON b.service_id = s.id \
        JOIN service_types st ON s.service_type_id = st.id";

    pub async fn find<'e, E>(executor: E, id: i64) -> sqlx::Result<Option<BookingDetail>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let sql = format!("{} WHERE b.id = $1", Self::SELECT_FROM);
        sqlx::query_as::<_, BookingDetail>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_round_trips() {
        for status in BookingStatus::ALL {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn in_progress_accepts_both_spellings() {
        assert_eq!(BookingStatus::parse("In Progress"), Some(BookingStatus::InProgress));
        assert_eq!(BookingStatus::parse("InProgress"), Some(BookingStatus::InProgress));
    }

    #[test]
    fn unknown_values_are_rejected() {
        for s in ["pending", "Done", "CANCELLED", "", "Confirmed "] {
            assert_eq!(BookingStatus::parse(s), None, "{s:?} should not parse");
        }
    }
}
