use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::pricing::Tariff;

pub const STATUS_ACTIVE: &str = "active";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DurationType {
    #[default]
    Hours,
    Days,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Service {
    pub id: String,
    pub provider_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub province: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub district: String,
    pub base_price: f64,
    pub adult_price: f64,
    pub child_price: Option<f64>,
    pub max_group_size: u32,
    pub duration: f64,
    pub duration_type: DurationType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_dates: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocked_dates: Vec<String>,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

impl Service {
    pub fn tariff(&self) -> Tariff {
        Tariff {
            adult_price: self.adult_price,
            child_price: self.child_price,
            max_group_size: self.max_group_size,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

/// Row written by the provider onboarding submit.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewService {
    pub provider_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub base_price: f64,
    pub adult_price: f64,
    pub child_price: Option<f64>,
    pub max_group_size: u32,
    pub duration: f64,
    pub duration_type: DurationType,
    pub images: Vec<String>,
    pub available_dates: Vec<String>,
    pub time_slots: Vec<TimeSlot>,
    pub blocked_dates: Vec<String>,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceSummary {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub province: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    pub duration: f64,
    pub duration_type: DurationType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

impl From<&Service> for ServiceSummary {
    fn from(s: &Service) -> Self {
        Self {
            id: s.id.clone(),
            title: s.title.clone(),
            city: s.city.clone(),
            province: s.province.clone(),
            category: s.category.clone(),
            duration: s.duration,
            duration_type: s.duration_type,
            images: s.images.clone(),
        }
    }
}
