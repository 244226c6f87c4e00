pub mod auth;
pub mod bookings;
pub mod cart;
pub mod onboarding;
pub mod profile;
pub mod provider;
pub mod services;
pub mod wizard;
#[cfg(test)]
pub(crate) mod test_support;

use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))

        .route("/api/auth/google", web::get().to(auth::google_sign_in))
        .route("/api/auth/session", web::get().to(auth::current_session))
        .route("/api/auth/logout", web::post().to(auth::logout))

        .route("/api/profile", web::get().to(profile::get_profile))
        .route("/api/profile", web::put().to(profile::update_profile))

        .route("/api/onboarding/status", web::get().to(onboarding::status))
        .route("/api/onboarding/role", web::post().to(onboarding::select_role))
        .route("/api/onboarding/interests", web::post().to(onboarding::save_interests))

        .route("/api/catalog", web::get().to(services::catalog))
        .route("/api/catalog/provinces/{province}/cities", web::get().to(services::cities))
        .route("/api/catalog/districts", web::get().to(services::districts))
        .route("/api/services", web::get().to(services::list_services))
        .route("/api/services/{id}", web::get().to(services::get_service))

        .route("/api/bookings", web::get().to(bookings::list_bookings))
        .route("/api/bookings", web::post().to(bookings::create_booking))
        .route("/api/bookings/quote", web::post().to(bookings::quote))

        .route("/api/cart", web::get().to(cart::get_cart))
        .route("/api/cart", web::post().to(cart::add_to_cart))
        .route("/api/cart", web::delete().to(cart::clear_cart))
        .route("/api/cart/checkout", web::post().to(cart::checkout))
        .route("/api/cart/{item_id}", web::delete().to(cart::remove_from_cart))

        .route("/api/provider/services", web::get().to(provider::my_services))
        .route("/api/provider/services/{id}", web::delete().to(provider::delete_service))
        .route("/api/provider/bookings", web::get().to(provider::my_bookings))
        .route("/api/provider/dashboard", web::get().to(provider::dashboard))

        .route("/api/provider/onboarding", web::get().to(wizard::get_wizard))
        .route("/api/provider/onboarding/start", web::post().to(wizard::start))
        .route("/api/provider/onboarding/draft", web::patch().to(wizard::update_draft))
        .route("/api/provider/onboarding/next", web::post().to(wizard::next_step))
        .route("/api/provider/onboarding/previous", web::post().to(wizard::previous_step))
        .route("/api/provider/onboarding/dates", web::post().to(wizard::add_date))
        .route("/api/provider/onboarding/dates/{date}", web::delete().to(wizard::remove_date))
        .route("/api/provider/onboarding/blocked-dates", web::post().to(wizard::add_blocked_date))
        .route("/api/provider/onboarding/blocked-dates/{date}", web::delete().to(wizard::remove_blocked_date))
        .route("/api/provider/onboarding/time-slots", web::post().to(wizard::add_time_slot))
        .route("/api/provider/onboarding/time-slots/{index}", web::delete().to(wizard::remove_time_slot))
        .route("/api/provider/onboarding/images", web::post().to(wizard::upload_images))
        .route("/api/provider/onboarding/images/reorder", web::post().to(wizard::move_image))
        .route("/api/provider/onboarding/images/{index}", web::delete().to(wizard::remove_image))
        .route("/api/provider/onboarding/submit", web::post().to(wizard::submit));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn health_and_route_table() {
        let (_fake, state) = test_support::test_state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post().uri("/api/cart/checkout").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get().uri("/api/catalog/districts?city=Ella").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
