pub mod user;
pub mod service;
pub mod booking;
pub mod payment;

pub use user::UserWithStats;
pub use service::{Service, ServiceType};
pub use booking::{BookingDetail, BookingStatus};
pub use payment::PaymentDetail;
