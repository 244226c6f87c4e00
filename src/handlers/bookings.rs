use std::collections::{BTreeSet, HashMap};

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::auth::Session;
use crate::error::ApiError;
use crate::models::booking::STATUS_CONFIRMED;
use crate::models::{Booking, BookingSelection, NewBooking, Service, ServiceSummary, UserBooking};
use crate::pricing::{self, Extras, Quote};
use crate::services::{fetch_all, fetch_one, insert_as, Backend, Query};
use crate::state::AppState;

pub(crate) async fn load_service(backend: &dyn Backend, token: Option<&str>, id: &str) -> Result<Service, ApiError> {
    fetch_one::<Service>(backend, token, "services", Query::new().eq("id", id))
        .await?
        .ok_or(ApiError::NotFound("Service"))
}

pub(crate) fn ensure_bookable(service: &Service) -> Result<(), ApiError> {
    if service.is_active() {
        Ok(())
    } else {
        Err(ApiError::Validation("This service is no longer available".to_string()))
    }
}

fn quote_for(service: &Service, selection: &BookingSelection) -> Result<Quote, ApiError> {
    ensure_bookable(service)?;
    let extras = Extras {
        private_guide: selection.private_guide,
        professional_photo: selection.professional_photo,
    };
    Ok(pricing::quote(&service.tariff(), selection.adults, selection.children, extras)?)
}

/// Prices the selection again and writes one confirmed booking.
pub(crate) async fn place_booking(
    backend: &dyn Backend,
    token: Option<&str>,
    user_id: &str,
    selection: &BookingSelection,
) -> Result<Booking, ApiError> {
    let date = selection
        .date()
        .ok_or_else(|| ApiError::Validation("Please select a date".to_string()))?;
    let service = load_service(backend, token, &selection.service_id).await?;
    let quote = quote_for(&service, selection)?;

    let row = NewBooking {
        service_id: service.id.clone(),
        user_id: user_id.to_string(),
        provider_id: service.provider_id.clone(),
        booking_date: date.to_string(),
        time_slot: selection.slot().map(str::to_string),
        adults: selection.adults,
        children: selection.children,
        total_amount: quote.total,
        private_guide: selection.private_guide,
        professional_photo: selection.professional_photo,
        status: STATUS_CONFIRMED.to_string(),
    };

    let booking: Booking = insert_as(backend, token, "bookings", &row).await.map_err(|e| {
        log::error!("error creating booking for {} on {}: {}", user_id, service.id, e);
        ApiError::from(e)
    })?;
    log::info!("booking {} confirmed for {} ({})", booking.id, user_id, booking.total_amount);
    Ok(booking)
}

pub async fn quote(
    state: web::Data<AppState>,
    data: web::Json<BookingSelection>,
) -> Result<HttpResponse, ApiError> {
    let selection = data.into_inner();
    let service = load_service(state.backend.as_ref(), None, &selection.service_id).await?;
    let quote = quote_for(&service, &selection)?;
    Ok(HttpResponse::Ok().json(quote))
}

pub async fn create_booking(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<BookingSelection>,
) -> Result<HttpResponse, ApiError> {
    let booking = place_booking(state.backend.as_ref(), session.token(), session.user_id(), &data).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Booking confirmed successfully!",
        "booking": booking
    })))
}

pub async fn list_bookings(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let backend = state.backend.as_ref();
    let query = Query::new().eq("user_id", session.user_id()).order("created_at", false);
    let bookings: Vec<Booking> = fetch_all(backend, session.token(), "bookings", &query).await?;

    let ids: BTreeSet<String> = bookings.iter().map(|b| b.service_id.clone()).collect();
    let services: HashMap<String, ServiceSummary> = if ids.is_empty() {
        HashMap::new()
    } else {
        let query = Query::new().is_in("id", ids.into_iter().collect());
        fetch_all::<Service>(backend, session.token(), "services", &query)
            .await?
            .iter()
            .map(|s| (s.id.clone(), ServiceSummary::from(s)))
            .collect()
    };

    let bookings: Vec<UserBooking> = bookings
        .into_iter()
        .map(|booking| {
            let service = services.get(&booking.service_id).cloned();
            UserBooking { booking, service }
        })
        .collect();
    Ok(HttpResponse::Ok().json(json!({ "bookings": bookings })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{bearer, service_row, test_state, USER_TOKEN};
    use actix_web::{http::StatusCode, test, App};

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .route("/api/bookings", web::post().to(create_booking))
                    .route("/api/bookings", web::get().to(list_bookings))
                    .route("/api/bookings/quote", web::post().to(quote)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn quote_uses_service_prices() {
        let (fake, state) = test_state();
        fake.seed("services", service_row("svc-1", "prov-1", 75.0, None, 10));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/bookings/quote")
            .set_json(json!({"service_id": "svc-1", "adults": 2, "private_guide": true}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 200.0);
    }

    #[actix_web::test]
    async fn booking_needs_session_and_date() {
        let (fake, state) = test_state();
        fake.seed("services", service_row("svc-1", "prov-1", 75.0, None, 10));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/bookings")
            .set_json(json!({"service_id": "svc-1", "booking_date": "2026-12-01"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/bookings")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({"service_id": "svc-1", "booking_date": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(fake.rows("bookings").is_empty());
    }

    #[actix_web::test]
    async fn creates_confirmed_booking_with_snapshot() {
        let (fake, state) = test_state();
        fake.seed("services", service_row("svc-1", "prov-1", 75.0, Some(30.0), 10));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/bookings")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({
                "service_id": "svc-1",
                "booking_date": "2026-12-01",
                "time_slot": "08:00 - 12:00",
                "adults": 2,
                "children": 1,
                "professional_photo": true
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let rows = fake.rows("bookings");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["total_amount"], 210.0);
        assert_eq!(rows[0]["status"], "confirmed");
        assert_eq!(rows[0]["provider_id"], "prov-1");
        assert_eq!(rows[0]["user_id"], "user-1");
    }

    #[actix_web::test]
    async fn group_limit_is_enforced() {
        let (fake, state) = test_state();
        fake.seed("services", service_row("svc-1", "prov-1", 75.0, None, 2));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/bookings")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({"service_id": "svc-1", "booking_date": "2026-12-01", "adults": 2, "children": 1}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn inactive_services_cannot_be_booked() {
        let (fake, state) = test_state();
        let mut row = service_row("svc-1", "prov-1", 75.0, None, 10);
        row["status"] = json!("inactive");
        fake.seed("services", row);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/bookings")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({"service_id": "svc-1", "booking_date": "2026-12-01"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "This service is no longer available");
    }

    #[actix_web::test]
    async fn lists_own_bookings_with_service_summary() {
        let (fake, state) = test_state();
        fake.seed("services", service_row("svc-1", "prov-1", 75.0, None, 10));
        for (id, user, at) in [("b-1", "user-1", "2026-10-01"), ("b-2", "user-1", "2026-10-05"), ("b-3", "user-2", "2026-10-06")] {
            fake.seed(
                "bookings",
                json!({
                    "id": id, "service_id": "svc-1", "user_id": user, "provider_id": "prov-1",
                    "booking_date": "2026-12-01", "time_slot": null, "adults": 2, "children": 0,
                    "total_amount": 150.0, "status": "confirmed", "created_at": at
                }),
            );
        }
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/api/bookings")
            .insert_header(bearer(USER_TOKEN))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let bookings = body["bookings"].as_array().unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0]["id"], "b-2");
        assert_eq!(bookings[0]["service"]["title"], "Tour svc-1");
    }
}
