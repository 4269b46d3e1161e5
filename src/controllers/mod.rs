pub mod bookings;
pub mod users;
pub mod dashboard;
pub mod services;
pub mod payments;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(bookings::routes())
        .merge(users::routes())
        .merge(dashboard::routes())
        .merge(services::routes())
        .merge(payments::routes())
}
