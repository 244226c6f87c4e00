//! Provider onboarding: a five-step wizard that collects one service listing
//! and submits it in a single pass at the end.

pub mod draft;
pub mod landing;
pub mod media;
pub mod submit;

use serde::Serialize;
use thiserror::Error;

pub use draft::{DraftPatch, ServiceDraft};
pub use landing::{landing_for, Landing};
pub use media::{ImageView, StagedImage};

pub const TOTAL_STEPS: u8 = 5;
pub const STEP_TITLES: [&str; TOTAL_STEPS as usize] = ["Basic Details", "Pricing", "Availability", "Images", "Review"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WizardState {
    Welcome,
    Step(u8),
    Submitting,
    Complete,
    Error(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("Complete the required fields of step {0} before continuing")]
    StepIncomplete(u8),
    #[error("Already at the first step")]
    AtFirstStep,
    #[error("Already at the last step")]
    AtLastStep,
    #[error("Onboarding has not been started")]
    NotStarted,
    #[error("Submission is in progress")]
    Busy,
    #[error("The service has already been submitted")]
    Finished,
    #[error("Submit is only available from the review step")]
    NotAtReview,
    #[error("{0}")]
    InvalidInput(String),
    #[error("No item at position {0}")]
    OutOfRange(usize),
}

#[derive(Debug, Clone)]
pub struct Wizard {
    state: WizardState,
    draft: ServiceDraft,
    images: Vec<StagedImage>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct WizardView {
    pub state: WizardState,
    pub step: Option<u8>,
    pub total_steps: u8,
    pub steps: [&'static str; TOTAL_STEPS as usize],
    pub can_go_next: bool,
    pub can_go_previous: bool,
    pub draft: ServiceDraft,
    pub images: Vec<ImageView>,
}

impl Wizard {
    pub fn new() -> Self {
        Wizard {
            state: WizardState::Welcome,
            draft: ServiceDraft::default(),
            images: Vec::new(),
        }
    }

    /// Step the provider is looking at. A failed submit leaves them on the review step.
    fn current_step(&self) -> Result<u8, WizardError> {
        match &self.state {
            WizardState::Welcome => Err(WizardError::NotStarted),
            WizardState::Step(n) => Ok(*n),
            WizardState::Submitting => Err(WizardError::Busy),
            WizardState::Complete => Err(WizardError::Finished),
            WizardState::Error(_) => Ok(TOTAL_STEPS),
        }
    }

    pub fn start(&mut self) -> Result<(), WizardError> {
        match self.state {
            WizardState::Welcome => {
                self.state = WizardState::Step(1);
                Ok(())
            }
            WizardState::Submitting => Err(WizardError::Busy),
            WizardState::Complete => Err(WizardError::Finished),
            _ => Ok(()),
        }
    }

    pub fn can_advance(&self) -> bool {
        match self.state {
            WizardState::Step(n) => n < TOTAL_STEPS && self.draft.step_valid(n, self.images.len()),
            _ => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.current_step(), Ok(n) if n > 1)
    }

    pub fn next(&mut self) -> Result<u8, WizardError> {
        let n = self.current_step()?;
        if n >= TOTAL_STEPS {
            return Err(WizardError::AtLastStep);
        }
        if !self.draft.step_valid(n, self.images.len()) {
            return Err(WizardError::StepIncomplete(n));
        }
        self.state = WizardState::Step(n + 1);
        Ok(n + 1)
    }

    pub fn previous(&mut self) -> Result<u8, WizardError> {
        let n = self.current_step()?;
        if n <= 1 {
            return Err(WizardError::AtFirstStep);
        }
        self.state = WizardState::Step(n - 1);
        Ok(n - 1)
    }

    /// Runs an edit against the draft while the wizard is on a step.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut ServiceDraft) -> R) -> Result<R, WizardError> {
        self.current_step()?;
        Ok(f(&mut self.draft))
    }

    pub fn add_image(&mut self, image: StagedImage) -> Result<usize, WizardError> {
        self.current_step()?;
        self.images.push(image);
        Ok(self.images.len())
    }

    pub fn remove_image(&mut self, index: usize) -> Result<StagedImage, WizardError> {
        self.current_step()?;
        if index >= self.images.len() {
            return Err(WizardError::OutOfRange(index));
        }
        Ok(self.images.remove(index))
    }

    pub fn move_image(&mut self, from: usize, to: usize) -> Result<(), WizardError> {
        self.current_step()?;
        media::move_item(&mut self.images, from, to)
    }

    /// Locks the wizard for submission and hands out what has to be sent.
    pub fn begin_submit(&mut self) -> Result<(ServiceDraft, Vec<StagedImage>), WizardError> {
        if self.current_step()? != TOTAL_STEPS {
            return Err(WizardError::NotAtReview);
        }
        self.state = WizardState::Submitting;
        Ok((self.draft.clone(), self.images.clone()))
    }

    pub fn finish(&mut self, outcome: Result<(), String>) {
        self.state = match outcome {
            Ok(()) => WizardState::Complete,
            Err(message) => WizardState::Error(message),
        };
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            state: self.state.clone(),
            step: self.current_step().ok(),
            total_steps: TOTAL_STEPS,
            steps: STEP_TITLES,
            can_go_next: self.can_advance(),
            can_go_previous: self.can_go_back(),
            draft: self.draft.clone(),
            images: self.images.iter().enumerate().map(|(i, img)| img.view(i)).collect(),
        }
    }
}
