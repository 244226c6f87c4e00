use std::future::Future;
use std::pin::Pin;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::ApiError;
use crate::services::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<ClaimsMetadata>,
}

#[derive(Debug, Deserialize, Default)]
struct ClaimsMetadata {
    full_name: Option<String>,
    name: Option<String>,
}

/// Signed-in user plus the access token forwarded on every platform call.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub token: String,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn token(&self) -> Option<&str> {
        Some(&self.token)
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get("Authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;
    let token = token.trim();
    if token.is_empty() { None } else { Some(token.to_string()) }
}

pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["authenticated"]);

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation).map_err(|e| {
        log::debug!("rejected access token: {}", e);
        ApiError::Unauthorized
    })?;
    let metadata = data.claims.user_metadata.unwrap_or_default();

    Ok(AuthUser {
        id: data.claims.sub,
        email: data.claims.email,
        full_name: metadata.full_name.or(metadata.name),
    })
}

pub async fn authenticate(req: &HttpRequest, state: &AppState) -> Result<Session, ApiError> {
    let token = bearer_token(req).ok_or(ApiError::Unauthorized)?;

    let user = match &state.config.jwt_secret {
        Some(secret) => verify_token(&token, secret)?,
        None => state.backend.get_user(&token).await.map_err(|e| {
            if e.is_unauthorized() {
                ApiError::Unauthorized
            } else {
                log::error!("session lookup failed: {}", e);
                ApiError::Backend(e)
            }
        })?,
    };

    Ok(Session { user, token })
}

impl FromRequest for Session {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or(ApiError::Unauthorized)?
                .clone();
            authenticate(&req, &state).await
        })
    }
}
