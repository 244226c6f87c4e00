use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::json;

use crate::auth::Session;
use crate::error::ApiError;
use crate::onboarding::media::MAX_IMAGE_BYTES;
use crate::onboarding::submit::{submit_service, SubmitError};
use crate::onboarding::{DraftPatch, Landing, StagedImage, Wizard, WizardError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DateInput {
    pub date: String,
}

#[derive(Deserialize)]
pub struct SlotInput {
    pub start: String,
    pub end: String,
}

#[derive(Deserialize)]
pub struct MoveInput {
    pub from: usize,
    pub to: usize,
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Applies `f` to the caller's wizard and answers with its new view.
fn respond<R>(
    state: &AppState,
    session: &Session,
    f: impl FnOnce(&mut Wizard) -> Result<R, WizardError>,
) -> Result<HttpResponse, ApiError> {
    let view = state.with_wizard(session.user_id(), |wizard| f(&mut *wizard).map(|_| wizard.view()))?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_wizard(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, |_| Ok(()))
}

pub async fn start(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, Wizard::start)
}

pub async fn update_draft(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<DraftPatch>,
) -> Result<HttpResponse, ApiError> {
    let patch = data.into_inner();
    respond(&state, &session, |w| w.edit(|draft| draft.apply(patch)))
}

pub async fn next_step(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, Wizard::next)
}

pub async fn previous_step(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, Wizard::previous)
}

pub async fn add_date(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<DateInput>,
) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, |w| w.edit(|d| d.add_available_date(&data.date, today()))?)
}

pub async fn remove_date(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, |w| w.edit(|d| d.remove_available_date(&path)))
}

pub async fn add_blocked_date(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<DateInput>,
) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, |w| w.edit(|d| d.add_blocked_date(&data.date, today()))?)
}

pub async fn remove_blocked_date(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, |w| w.edit(|d| d.remove_blocked_date(&path)))
}

pub async fn add_time_slot(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<SlotInput>,
) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, |w| w.edit(|d| d.add_time_slot(&data.start, &data.end))?)
}

pub async fn remove_time_slot(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<usize>,
) -> Result<HttpResponse, ApiError> {
    let index = path.into_inner();
    respond(&state, &session, |w| w.edit(|d| d.remove_time_slot(index))?)
}

/// Stages every file part of the form. Parts that are not valid images are reported back.
/// A broken multipart stream rejects the whole request and stages nothing.
pub async fn upload_images(
    session: Session,
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let interrupted = |e: actix_multipart::MultipartError| {
        log::warn!("image upload of {} interrupted: {}", session.user_id(), e);
        ApiError::Validation("Upload was interrupted. Please try again.".to_string())
    };
    let mut staged: Vec<StagedImage> = Vec::new();
    let mut rejected: Vec<serde_json::Value> = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(interrupted)? {
        let file_name = match field.content_disposition().get_filename() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let content_type = field.content_type().map(|m| m.to_string()).unwrap_or_default();

        let mut data = Vec::new();
        let mut too_large = false;
        while let Some(chunk) = field.try_next().await.map_err(interrupted)? {
            if data.len() + chunk.len() > MAX_IMAGE_BYTES {
                too_large = true;
                continue;
            }
            data.extend_from_slice(&chunk);
        }
        if too_large {
            rejected.push(json!({"file_name": file_name, "error": "File size must be less than 5MB"}));
            continue;
        }

        match StagedImage::new(&file_name, &content_type, data) {
            Ok(image) => staged.push(image),
            Err(e) => rejected.push(json!({"file_name": file_name, "error": e.to_string()})),
        }
    }

    if staged.is_empty() && rejected.is_empty() {
        return Err(ApiError::Validation("No image files in request".to_string()));
    }

    let view = state.with_wizard(session.user_id(), |wizard| {
        for image in staged {
            wizard.add_image(image)?;
        }
        Ok::<_, WizardError>(wizard.view())
    })?;
    Ok(HttpResponse::Ok().json(json!({ "wizard": view, "rejected": rejected })))
}

pub async fn remove_image(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<usize>,
) -> Result<HttpResponse, ApiError> {
    let index = path.into_inner();
    respond(&state, &session, |w| w.remove_image(index))
}

pub async fn move_image(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<MoveInput>,
) -> Result<HttpResponse, ApiError> {
    respond(&state, &session, |w| w.move_image(data.from, data.to))
}

/// Moves the wizard out of `Submitting` when a submit ends without reporting an outcome.
struct SubmitGuard {
    state: AppState,
    user_id: String,
    armed: bool,
}

impl SubmitGuard {
    fn new(state: AppState, user_id: &str) -> Self {
        SubmitGuard { state, user_id: user_id.to_string(), armed: true }
    }

    fn finish(mut self, outcome: Result<(), String>) {
        self.armed = false;
        self.state.with_wizard(&self.user_id, |w| w.finish(outcome));
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("submit of {} ended without an outcome", self.user_id);
            self.state.with_wizard(&self.user_id, |w| {
                w.finish(Err("Submission was interrupted. Please try again.".to_string()))
            });
        }
    }
}

/// Runs the submit on its own task so a dropped request still finishes or compensates.
pub async fn submit(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let user_id = session.user_id().to_string();
    let (draft, images) = state.with_wizard(&user_id, Wizard::begin_submit)?;

    let guard = SubmitGuard::new(state.get_ref().clone(), &user_id);
    let app = state.get_ref().clone();
    let token = session.token.clone();
    let task_user = user_id.clone();
    let task = actix_web::rt::spawn(async move {
        let outcome = submit_service(
            app.backend.as_ref(),
            &app.config.storage_bucket,
            Some(&token),
            &task_user,
            &draft,
            images,
        )
        .await;
        match &outcome {
            Ok(_) => guard.finish(Ok(())),
            Err(e) => guard.finish(Err(e.to_string())),
        }
        outcome
    });

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("submit task of {} failed: {}", user_id, e);
            let view = state.with_wizard(&user_id, |w| w.view());
            return Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Submission was interrupted. Please try again.",
                "wizard": view
            })));
        }
    };

    match outcome {
        Ok(outcome) => Ok(HttpResponse::Created().json(json!({
            "message": "Service created successfully!",
            "service": outcome.service,
            "image_urls": outcome.image_urls,
            "failed_uploads": outcome.failed_uploads,
            "path": Landing::ProviderDashboard.path()
        }))),
        Err(SubmitError::Draft(e)) => Err(e.into()),
        Err(e) => {
            let view = state.with_wizard(&user_id, |w| w.view());
            Ok(HttpResponse::BadGateway().json(json!({
                "error": e.to_string(),
                "wizard": view
            })))
        }
    }
}
