use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::{media, ServiceDraft, StagedImage, WizardError};
use crate::config::PLACEHOLDER_IMAGE;
use crate::models::{Role, Service};
use crate::services::{by_id, insert_as, Backend, BackendError, Query};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Failed to update user role. Please try again.")]
    Role(#[source] BackendError),
    #[error(transparent)]
    Draft(#[from] WizardError),
    #[error("Failed to create service. Please try again.")]
    Service(#[source] BackendError),
}

#[derive(Debug, Serialize)]
pub struct SubmitOutcome {
    pub service: Service,
    pub image_urls: Vec<String>,
    pub failed_uploads: usize,
}

struct Uploads {
    urls: Vec<String>,
    stored: Vec<String>,
    failed: usize,
}

async fn upload_images(
    backend: &dyn Backend,
    bucket: &str,
    token: Option<&str>,
    user_id: &str,
    images: Vec<StagedImage>,
) -> Uploads {
    let mut uploads = Uploads { urls: Vec::new(), stored: Vec::new(), failed: 0 };

    for image in images {
        let path = media::storage_path(user_id, Utc::now().timestamp_millis(), &media::random_suffix(), &image.extension());
        match backend.upload(token, bucket, &path, image.bytes, &image.content_type).await {
            Ok(()) => {
                uploads.urls.push(backend.public_url(bucket, &path));
                uploads.stored.push(path);
            }
            Err(e) => {
                log::warn!("image upload {} failed, using placeholder: {}", path, e);
                uploads.urls.push(PLACEHOLDER_IMAGE.to_string());
                uploads.failed += 1;
            }
        }
    }

    if uploads.urls.is_empty() {
        uploads.urls.push(PLACEHOLDER_IMAGE.to_string());
    }
    uploads
}

async fn previous_role(backend: &dyn Backend, token: Option<&str>, user_id: &str) -> Option<Value> {
    let query = Query::new().columns("role").eq("id", user_id).limit(1);
    match backend.select(token, "profiles", &query).await {
        Ok(rows) => rows.into_iter().next().and_then(|mut row| row.get_mut("role").map(Value::take)),
        Err(e) => {
            log::warn!("could not read current role of {}: {}", user_id, e);
            None
        }
    }
}

/// Undoes the role change and the uploads after the service insert failed.
async fn compensate(
    backend: &dyn Backend,
    bucket: &str,
    token: Option<&str>,
    user_id: &str,
    role: Option<Value>,
    stored: &[String],
) {
    if let Some(role) = role {
        if let Err(e) = backend.update(token, "profiles", &by_id(user_id), json!({ "role": role })).await {
            log::error!("could not restore role of {}: {}", user_id, e);
        }
    }
    if !stored.is_empty() {
        if let Err(e) = backend.remove_objects(token, bucket, stored).await {
            log::error!("could not remove {} uploaded images of {}: {}", stored.len(), user_id, e);
        }
    }
}

/// Publishes the wizard's service: role, images, service row, onboarding flag.
pub async fn submit_service(
    backend: &dyn Backend,
    bucket: &str,
    token: Option<&str>,
    user_id: &str,
    draft: &ServiceDraft,
    images: Vec<StagedImage>,
) -> Result<SubmitOutcome, SubmitError> {
    // numbers are checked before anything is written
    draft.to_new_service(user_id, Vec::new())?;

    let role = previous_role(backend, token, user_id).await;

    backend
        .update(token, "profiles", &by_id(user_id), json!({ "role": Role::ServiceProvider.as_str() }))
        .await
        .map_err(|e| {
            log::error!("error setting role for {}: {}", user_id, e);
            SubmitError::Role(e)
        })?;

    let uploads = upload_images(backend, bucket, token, user_id, images).await;

    let row = draft.to_new_service(user_id, uploads.urls.clone())?;
    let service: Service = match insert_as(backend, token, "services", &row).await {
        Ok(service) => service,
        Err(e) => {
            log::error!("error creating service for {}: {}", user_id, e);
            compensate(backend, bucket, token, user_id, role, &uploads.stored).await;
            return Err(SubmitError::Service(e));
        }
    };

    if let Err(e) = backend
        .update(token, "profiles", &by_id(user_id), json!({ "onboarding_completed": true }))
        .await
    {
        log::error!("service {} created but onboarding flag not set for {}: {}", service.id, user_id, e);
    }

    log::info!("provider {} published service {}", user_id, service.id);
    Ok(SubmitOutcome {
        service,
        image_urls: uploads.urls,
        failed_uploads: uploads.failed,
    })
}
