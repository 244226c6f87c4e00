use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Session;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SignInQuery {
    pub next: Option<String>,
}

const DEFAULT_REDIRECT: &str = "/user/onboarding";

pub async fn google_sign_in(state: web::Data<AppState>, query: web::Query<SignInQuery>) -> HttpResponse {
    let next = query
        .next
        .as_deref()
        .filter(|p| p.starts_with('/') && !p.starts_with("//"))
        .unwrap_or(DEFAULT_REDIRECT);
    let redirect_to = state.config.redirect_url(next);

    HttpResponse::Ok().json(json!({
        "provider": "google",
        "url": state.backend.oauth_url("google", &redirect_to)
    }))
}

pub async fn current_session(session: Session) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "user": session.user,
        "display_name": session.user.display_name()
    }))
}

pub async fn logout(session: Session, state: web::Data<AppState>) -> HttpResponse {
    if let Err(e) = state.backend.sign_out(&session.token).await {
        log::warn!("sign out of {} failed on the platform: {}", session.user_id(), e);
    }
    state.forget_user(session.user_id());

    HttpResponse::Ok().json(json!({ "message": "Signed out" }))
}
