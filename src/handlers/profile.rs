use actix_web::{web, HttpResponse};
use serde_json::{json, Map, Value};

use crate::auth::Session;
use crate::error::ApiError;
use crate::models::{Profile, ProfileUpdate};
use crate::services::{by_id, fetch_one, Backend, Query};
use crate::state::AppState;

pub(crate) async fn load_profile(
    backend: &dyn Backend,
    token: Option<&str>,
    user_id: &str,
) -> Result<Option<Profile>, ApiError> {
    Ok(fetch_one(backend, token, "profiles", Query::new().eq("id", user_id)).await?)
}

pub async fn get_profile(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let profile = load_profile(state.backend.as_ref(), session.token(), session.user_id())
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(HttpResponse::Ok().json(json!({
        "profile": profile,
        "display_name": session.user.display_name()
    })))
}

fn update_patch(update: ProfileUpdate) -> Map<String, Value> {
    let mut patch = Map::new();
    let fields = [
        ("full_name", update.full_name),
        ("phone", update.phone),
        ("address", update.address),
        ("city", update.city),
        ("province", update.province),
    ];
    for (key, value) in fields {
        if let Some(v) = value {
            patch.insert(key.to_string(), Value::String(v.trim().to_string()));
        }
    }
    patch
}

pub async fn update_profile(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, ApiError> {
    let mut patch = update_patch(data.into_inner());
    if patch.is_empty() {
        return Err(ApiError::Validation("Nothing to update".to_string()));
    }
    patch.insert("updated_at".to_string(), json!(chrono::Utc::now().to_rfc3339()));

    let backend = state.backend.as_ref();
    backend
        .update(session.token(), "profiles", &by_id(session.user_id()), Value::Object(patch))
        .await
        .map_err(|e| {
            log::error!("error updating profile {}: {}", session.user_id(), e);
            ApiError::from(e)
        })?;

    let profile = load_profile(backend, session.token(), session.user_id())
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully!",
        "profile": profile
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{bearer, test_state, USER_TOKEN};
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn reads_and_updates_own_profile() {
        let (fake, state) = test_state();
        fake.seed("profiles", json!({"id": "user-1", "email": "nadeesha@example.com", "full_name": null}));
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .route("/api/profile", web::get().to(get_profile))
                .route("/api/profile", web::put().to(update_profile)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/profile").insert_header(bearer(USER_TOKEN)).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["profile"]["email"], "nadeesha@example.com");
        assert_eq!(body["display_name"], "Nadeesha Silva");

        let req = test::TestRequest::put()
            .uri("/api/profile")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({"phone": " +94 77 123 4567 ", "city": "Galle"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["profile"]["phone"], "+94 77 123 4567");
        assert_eq!(body["profile"]["city"], "Galle");

        let row = &fake.rows("profiles")[0];
        assert!(row["updated_at"].is_string());
        assert_eq!(row["full_name"], Value::Null);
    }

    #[actix_web::test]
    async fn empty_update_is_rejected() {
        let (_fake, state) = test_state();
        let app = test::init_service(App::new().app_data(state.clone()).route("/api/profile", web::put().to(update_profile))).await;
        let req = test::TestRequest::put()
            .uri("/api/profile")
            .insert_header(bearer(USER_TOKEN))
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn missing_profile_is_not_found() {
        let (_fake, state) = test_state();
        let app = test::init_service(App::new().app_data(state.clone()).route("/api/profile", web::get().to(get_profile))).await;
        let req = test::TestRequest::get().uri("/api/profile").insert_header(bearer(USER_TOKEN)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
