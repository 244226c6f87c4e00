use std::collections::{BTreeSet, HashMap};

use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::auth::Session;
use crate::error::ApiError;
use crate::models::{Booking, ProfileContact, ProviderBooking, Service};
use crate::pricing::round_cents;
use crate::services::{fetch_all, Backend, Filter, Query};
use crate::state::AppState;

use super::bookings::load_service;

#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_services: usize,
    pub total_bookings: usize,
    pub total_revenue: f64,
    pub total_customers: usize,
}

impl DashboardStats {
    fn collect(services: &[Service], bookings: &[ProviderBooking]) -> Self {
        let customers: BTreeSet<&str> = bookings.iter().map(|b| b.booking.user_id.as_str()).collect();
        DashboardStats {
            total_services: services.len(),
            total_bookings: bookings.len(),
            total_revenue: round_cents(bookings.iter().map(|b| b.booking.total_amount).sum()),
            total_customers: customers.len(),
        }
    }
}

async fn services_of(backend: &dyn Backend, token: Option<&str>, provider_id: &str) -> Result<Vec<Service>, ApiError> {
    let query = Query::new().eq("provider_id", provider_id).order("created_at", false);
    Ok(fetch_all(backend, token, "services", &query).await?)
}

async fn bookings_of(
    backend: &dyn Backend,
    token: Option<&str>,
    provider_id: &str,
) -> Result<Vec<ProviderBooking>, ApiError> {
    let query = Query::new().eq("provider_id", provider_id).order("created_at", false);
    let bookings: Vec<Booking> = fetch_all(backend, token, "bookings", &query).await?;
    if bookings.is_empty() {
        return Ok(Vec::new());
    }

    let service_ids: BTreeSet<String> = bookings.iter().map(|b| b.service_id.clone()).collect();
    let titles: HashMap<String, String> = fetch_all::<Service>(
        backend,
        token,
        "services",
        &Query::new().is_in("id", service_ids.into_iter().collect()),
    )
    .await?
    .into_iter()
    .map(|s| (s.id, s.title))
    .collect();

    let user_ids: BTreeSet<String> = bookings.iter().map(|b| b.user_id.clone()).collect();
    let contacts: HashMap<String, ProfileContact> = match fetch_all::<ProfileContact>(
        backend,
        token,
        "profiles",
        &Query::new().columns("id,full_name,email").is_in("id", user_ids.into_iter().collect()),
    )
    .await
    {
        Ok(rows) => rows
            .into_iter()
            .filter_map(|c| c.id.clone().map(|id| (id, c)))
            .collect(),
        Err(e) => {
            log::warn!("customer profiles unavailable for provider {}: {}", provider_id, e);
            HashMap::new()
        }
    };

    Ok(bookings
        .into_iter()
        .map(|booking| ProviderBooking {
            service_title: titles.get(&booking.service_id).cloned(),
            customer: contacts.get(&booking.user_id).cloned().unwrap_or_default(),
            booking,
        })
        .collect())
}

pub async fn my_services(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let services = services_of(state.backend.as_ref(), session.token(), session.user_id()).await?;
    Ok(HttpResponse::Ok().json(json!({ "services": services })))
}

pub async fn my_bookings(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let bookings = bookings_of(state.backend.as_ref(), session.token(), session.user_id()).await?;
    Ok(HttpResponse::Ok().json(json!({ "bookings": bookings })))
}

pub async fn dashboard(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let backend = state.backend.as_ref();
    let services = services_of(backend, session.token(), session.user_id()).await?;
    let bookings = bookings_of(backend, session.token(), session.user_id()).await?;
    let stats = DashboardStats::collect(&services, &bookings);

    Ok(HttpResponse::Ok().json(json!({
        "stats": stats,
        "services": services,
        "bookings": bookings
    })))
}

pub async fn delete_service(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let backend = state.backend.as_ref();
    let service = load_service(backend, session.token(), &path).await?;
    if service.provider_id != session.user_id() {
        log::warn!("{} tried to delete service {} owned by {}", session.user_id(), service.id, service.provider_id);
        return Err(ApiError::Forbidden);
    }

    let filters = [
        Filter::Eq("id".to_string(), service.id.clone()),
        Filter::Eq("provider_id".to_string(), session.user_id().to_string()),
    ];
    backend.delete(session.token(), "services", &filters).await.map_err(|e| {
        log::error!("error deleting service {}: {}", service.id, e);
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Service deleted successfully" })))
}
