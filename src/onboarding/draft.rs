use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::media::MIN_IMAGES;
use super::WizardError;
use crate::models::service::STATUS_ACTIVE;
use crate::models::{DurationType, NewService, TimeSlot};

pub const MIN_DESCRIPTION_CHARS: usize = 50;

/// Form fields of the provider wizard, kept as typed by the provider.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ServiceDraft {
    pub service_name: String,
    pub description: String,
    pub category: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub base_price: String,
    pub adult_price: String,
    pub child_price: String,
    pub max_group_size: String,
    pub duration: String,
    pub duration_type: DurationType,
    pub available_dates: Vec<String>,
    pub time_slots: Vec<TimeSlot>,
    pub blocked_dates: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DraftPatch {
    pub service_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub base_price: Option<String>,
    pub adult_price: Option<String>,
    pub child_price: Option<String>,
    pub max_group_size: Option<String>,
    pub duration: Option<String>,
    pub duration_type: Option<DurationType>,
}

fn positive_number(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() && value > 0.0 { Some(value) } else { None }
}

fn positive_count(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

fn filled(s: &str) -> bool {
    !s.trim().is_empty()
}

fn parse_date(raw: &str, today: NaiveDate) -> Result<String, WizardError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| WizardError::InvalidInput(format!("'{}' is not a date (YYYY-MM-DD)", raw.trim())))?;
    if date < today {
        return Err(WizardError::InvalidInput(format!("{} is in the past", date)));
    }
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Adds `raw` to a sorted, duplicate-free date list. Returns false for duplicates.
fn insert_date(dates: &mut Vec<String>, raw: &str, today: NaiveDate) -> Result<bool, WizardError> {
    let date = parse_date(raw, today)?;
    if dates.contains(&date) {
        return Ok(false);
    }
    dates.push(date);
    dates.sort();
    Ok(true)
}

impl ServiceDraft {
    /// Merges the provided fields. A new province clears city and district; a new city clears district.
    pub fn apply(&mut self, patch: DraftPatch) {
        if let Some(v) = patch.service_name {
            self.service_name = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.province {
            if v != self.province {
                self.province = v;
                self.city.clear();
                self.district.clear();
            }
        }
        if let Some(v) = patch.city {
            if v != self.city {
                self.city = v;
                self.district.clear();
            }
        }
        if let Some(v) = patch.district {
            self.district = v;
        }
        if let Some(v) = patch.base_price {
            self.base_price = v;
        }
        if let Some(v) = patch.adult_price {
            self.adult_price = v;
        }
        if let Some(v) = patch.child_price {
            self.child_price = v;
        }
        if let Some(v) = patch.max_group_size {
            self.max_group_size = v;
        }
        if let Some(v) = patch.duration {
            self.duration = v;
        }
        if let Some(v) = patch.duration_type {
            self.duration_type = v;
        }
    }

    pub fn add_available_date(&mut self, raw: &str, today: NaiveDate) -> Result<bool, WizardError> {
        insert_date(&mut self.available_dates, raw, today)
    }

    pub fn remove_available_date(&mut self, date: &str) -> bool {
        let before = self.available_dates.len();
        self.available_dates.retain(|d| d != date);
        before != self.available_dates.len()
    }

    pub fn add_blocked_date(&mut self, raw: &str, today: NaiveDate) -> Result<bool, WizardError> {
        insert_date(&mut self.blocked_dates, raw, today)
    }

    pub fn remove_blocked_date(&mut self, date: &str) -> bool {
        let before = self.blocked_dates.len();
        self.blocked_dates.retain(|d| d != date);
        before != self.blocked_dates.len()
    }

    pub fn add_time_slot(&mut self, start: &str, end: &str) -> Result<(), WizardError> {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return Err(WizardError::InvalidInput("A time slot needs both a start and an end".to_string()));
        }
        for t in [start, end] {
            NaiveTime::parse_from_str(t, "%H:%M")
                .map_err(|_| WizardError::InvalidInput(format!("'{}' is not a time (HH:MM)", t)))?;
        }
        self.time_slots.push(TimeSlot { start: start.to_string(), end: end.to_string() });
        Ok(())
    }

    pub fn remove_time_slot(&mut self, index: usize) -> Result<TimeSlot, WizardError> {
        if index >= self.time_slots.len() {
            return Err(WizardError::OutOfRange(index));
        }
        Ok(self.time_slots.remove(index))
    }

    pub fn step_valid(&self, step: u8, image_count: usize) -> bool {
        match step {
            1 => {
                filled(&self.service_name)
                    && self.description.trim().chars().count() >= MIN_DESCRIPTION_CHARS
                    && filled(&self.category)
                    && filled(&self.province)
                    && filled(&self.city)
                    && filled(&self.district)
            }
            2 => {
                positive_number(&self.base_price).is_some()
                    && positive_number(&self.adult_price).is_some()
                    && positive_count(&self.max_group_size).is_some()
                    && positive_number(&self.duration).is_some()
            }
            3 => !self.available_dates.is_empty() && !self.time_slots.is_empty(),
            4 => image_count >= MIN_IMAGES,
            5 => true,
            _ => false,
        }
    }

    pub fn to_new_service(&self, provider_id: &str, images: Vec<String>) -> Result<NewService, WizardError> {
        let invalid = |field: &str| WizardError::InvalidInput(format!("{} must be a positive number", field));

        let base_price = positive_number(&self.base_price).ok_or_else(|| invalid("Base price"))?;
        let adult_price = positive_number(&self.adult_price).ok_or_else(|| invalid("Adult price"))?;
        let max_group_size = positive_count(&self.max_group_size).ok_or_else(|| invalid("Maximum group size"))?;
        let duration = positive_number(&self.duration).ok_or_else(|| invalid("Duration"))?;
        let child_price = if filled(&self.child_price) {
            let price = self
                .child_price
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite() && *p >= 0.0)
                .ok_or_else(|| WizardError::InvalidInput("Child price must be a number".to_string()))?;
            Some(price)
        } else {
            None
        };

        Ok(NewService {
            provider_id: provider_id.to_string(),
            title: self.service_name.trim().to_string(),
            description: self.description.trim().to_string(),
            category: self.category.clone(),
            province: self.province.clone(),
            city: self.city.clone(),
            district: self.district.clone(),
            base_price,
            adult_price,
            child_price,
            max_group_size,
            duration,
            duration_type: self.duration_type,
            images,
            available_dates: self.available_dates.clone(),
            time_slots: self.time_slots.clone(),
            blocked_dates: self.blocked_dates.clone(),
            status: STATUS_ACTIVE.to_string(),
        })
    }
}
