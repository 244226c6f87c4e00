use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Serialize;

use super::WizardError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MIN_IMAGES: usize = 3;

/// Image held in memory until the wizard is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ImageView {
    pub index: usize,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

impl StagedImage {
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<Self, WizardError> {
        if !content_type.starts_with("image/") {
            return Err(WizardError::InvalidInput("Only image files are allowed".to_string()));
        }
        if bytes.is_empty() {
            return Err(WizardError::InvalidInput("Image file is empty".to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(WizardError::InvalidInput("File size must be less than 5MB".to_string()));
        }
        Ok(StagedImage {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        })
    }

    pub fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
            _ => {
                let subtype = self.content_type.trim_start_matches("image/");
                match subtype {
                    "jpeg" => "jpg".to_string(),
                    "svg+xml" => "svg".to_string(),
                    other => other.to_string(),
                }
            }
        }
    }

    pub fn view(&self, index: usize) -> ImageView {
        ImageView {
            index,
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            size: self.bytes.len(),
        }
    }
}

pub fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Object key inside the images bucket: `{user}/{millis}-{suffix}.{ext}`.
pub fn storage_path(user_id: &str, millis: i64, suffix: &str, ext: &str) -> String {
    format!("{}/{}-{}.{}", user_id, millis, suffix, ext)
}

/// Moves the element at `from` to position `to`, shifting the ones in between.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), WizardError> {
    if from >= items.len() {
        return Err(WizardError::OutOfRange(from));
    }
    if to >= items.len() {
        return Err(WizardError::OutOfRange(to));
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}
