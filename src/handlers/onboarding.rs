use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::Session;
use crate::catalog;
use crate::error::ApiError;
use crate::models::Role;
use crate::onboarding::{landing_for, Landing};
use crate::services::by_id;
use crate::state::AppState;

use super::profile::load_profile;

#[derive(Deserialize)]
pub struct RoleChoice {
    pub role: Role,
}

#[derive(Deserialize)]
pub struct InterestsChoice {
    pub interests: Vec<String>,
}

/// Where the signed-in user should continue after login.
pub async fn status(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let profile = load_profile(state.backend.as_ref(), session.token(), session.user_id()).await?;
    let landing = landing_for(profile.as_ref());
    Ok(HttpResponse::Ok().json(json!({
        "landing": landing,
        "path": landing.path(),
        "profile": profile
    })))
}

pub async fn select_role(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<RoleChoice>,
) -> Result<HttpResponse, ApiError> {
    let role = data.role;
    let row = json!({
        "id": session.user_id(),
        "email": session.user.email,
        "full_name": session.user.display_name(),
        "role": role.as_str(),
        "onboarding_completed": false
    });
    state.backend.upsert(session.token(), "profiles", row).await.map_err(|e| {
        log::error!("error saving role for {}: {}", session.user_id(), e);
        ApiError::from(e)
    })?;

    let next = match role {
        Role::RegularUser => Landing::Interests,
        Role::ServiceProvider => Landing::ServiceDetails,
    };
    Ok(HttpResponse::Ok().json(json!({
        "role": role,
        "next": next,
        "path": next.path()
    })))
}

pub async fn save_interests(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<InterestsChoice>,
) -> Result<HttpResponse, ApiError> {
    let mut interests: Vec<String> = Vec::new();
    for interest in data.into_inner().interests {
        if !catalog::is_interest(&interest) {
            return Err(ApiError::Validation(format!("Unknown interest: {}", interest)));
        }
        if !interests.contains(&interest) {
            interests.push(interest);
        }
    }
    if interests.is_empty() {
        return Err(ApiError::Validation("Select at least one interest".to_string()));
    }

    let patch = json!({
        "role": Role::RegularUser.as_str(),
        "interests": interests,
        "onboarding_completed": true
    });
    state
        .backend
        .update(session.token(), "profiles", &by_id(session.user_id()), patch)
        .await
        .map_err(|e| {
            log::error!("error saving interests for {}: {}", session.user_id(), e);
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "interests": interests,
        "next": Landing::UserHome,
        "path": Landing::UserHome.path()
    })))
}
