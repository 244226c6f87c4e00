use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::catalog::{self, ServiceFilter};
use crate::error::ApiError;
use crate::models::service::STATUS_ACTIVE;
use crate::models::Service;
use crate::services::{fetch_all, Query};
use crate::state::AppState;

use super::bookings::load_service;

pub async fn list_services(
    state: web::Data<AppState>,
    filter: web::Query<ServiceFilter>,
) -> Result<HttpResponse, ApiError> {
    let query = Query::new().eq("status", STATUS_ACTIVE).order("created_at", false);
    let services: Vec<Service> = fetch_all(state.backend.as_ref(), None, "services", &query)
        .await
        .map_err(|e| {
            log::error!("error fetching services: {}", e);
            ApiError::from(e)
        })?;
    let services = filter.apply(services);

    Ok(HttpResponse::Ok().json(json!({
        "count": services.len(),
        "services": services
    })))
}

pub async fn get_service(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let service = load_service(state.backend.as_ref(), None, &path).await?;
    Ok(HttpResponse::Ok().json(service))
}

pub async fn catalog() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "categories": catalog::CATEGORIES,
        "provinces": catalog::PROVINCES,
        "interests": catalog::INTERESTS
    }))
}

pub async fn cities(path: web::Path<String>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "cities": catalog::cities_for(&path) }))
}

#[derive(Deserialize)]
pub struct DistrictQuery {
    city: String,
}

pub async fn districts(query: web::Query<DistrictQuery>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "districts": catalog::districts_for(&query.city) }))
}
