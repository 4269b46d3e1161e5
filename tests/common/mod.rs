//! Shared harness for router-level tests: an in-memory app over a
//! per-test database, token minting, and seed helpers.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;

use repair_desk::config::{AppConfig, Config, DatabaseConfig, JwtConfig};
use repair_desk::database::Database;
use repair_desk::{router, AppState};

pub const JWT_SECRET: &str = "test-secret";

pub fn test_app(pool: PgPool) -> Router {
    let config = Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "error".to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            pool_size: 5,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
    };
    router(Arc::new(AppState {
        db: Database { pool },
        config,
    }))
}

#[derive(Serialize)]
struct Claims {
    id: i64,
    role: i16,
    exp: usize,
}

pub fn token_for(user_id: i64, role: i16) -> String {
    let claims = Claims {
        id: user_id,
        role,
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Fire one request at the app and decode the response. Non-JSON bodies
/// (extractor rejections) come back as a JSON string.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

/* ---------- seed helpers ---------- */

pub async fn seed_user(pool: &PgPool, name: &str, email: &str, phone: &str, role: i16) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, phone, role)
         VALUES ($1, $2, 'x', $3, $4) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_service_type(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO service_types (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn seed_service(pool: &PgPool, type_id: i64, brand: &str, base_price: f64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO services (service_type_id, brand, base_price)
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(type_id)
    .bind(brand)
    .bind(base_price)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_booking(pool: &PgPool, user_id: i64, service_id: i64, status: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO bookings (user_id, service_id, issue_description, date, time_slot, status)
         VALUES ($1, $2, 'broken screen', '2025-06-01', '10:00-12:00', $3) RETURNING id",
    )
    .bind(user_id)
    .bind(service_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn seed_payment(pool: &PgPool, booking_id: i64, amount: f64, status: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO payments (booking_id, amount, payment_method, payment_status, transaction_id)
         VALUES ($1, $2, 'Card', $3, 'tx') RETURNING id",
    )
    .bind(booking_id)
    .bind(amount)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Current status + notes straight from the store.
pub async fn booking_state(pool: &PgPool, id: i64) -> (String, Option<String>) {
    sqlx::query_as("SELECT status, admin_notes FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}
