//! Shared fixtures for handler tests.

use std::sync::Arc;

use actix_web::web;
use serde_json::{json, Value};

use crate::config::Config;
use crate::services::fake::FakeBackend;
use crate::services::AuthUser;
use crate::state::AppState;

pub const USER_TOKEN: &str = "user-token";
pub const PROVIDER_TOKEN: &str = "provider-token";

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub fn test_state() -> (Arc<FakeBackend>, web::Data<AppState>) {
    let fake = Arc::new(
        FakeBackend::new()
            .with_session(
                USER_TOKEN,
                AuthUser {
                    id: "user-1".into(),
                    email: Some("nadeesha@example.com".into()),
                    full_name: Some("Nadeesha Silva".into()),
                },
            )
            .with_session(
                PROVIDER_TOKEN,
                AuthUser { id: "prov-1".into(), email: Some("ruwan@example.com".into()), full_name: None },
            ),
    );
    let state = AppState::new(fake.clone(), Config::default());
    (fake, web::Data::new(state))
}

pub fn service_row(id: &str, provider_id: &str, adult_price: f64, child_price: Option<f64>, max_group_size: u32) -> Value {
    json!({
        "id": id,
        "provider_id": provider_id,
        "title": format!("Tour {}", id),
        "description": "Guided day trip",
        "category": "Adventure",
        "province": "Central Province",
        "city": "Kandy",
        "district": "Kandy Central",
        "base_price": adult_price,
        "adult_price": adult_price,
        "child_price": child_price,
        "max_group_size": max_group_size,
        "duration": 4,
        "duration_type": "hours",
        "images": ["https://img.example/1.jpg"],
        "available_dates": ["2026-12-01"],
        "time_slots": [{"start": "08:00", "end": "12:00"}],
        "blocked_dates": [],
        "status": "active",
        "created_at": "2026-10-01T08:00:00Z"
    })
}
