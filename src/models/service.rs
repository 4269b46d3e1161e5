use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceType {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Service joined to its type name. Used by the public catalog and the
/// admin listing alike.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Service {
    pub id: i64,
    pub service_type_id: i64,
    pub brand: String,
    pub description: Option<String>,
    pub base_price: f64,
    pub image: Option<String>,
    pub service_type: String,
}
