use serde::{Deserialize, Serialize};

use super::{ProfileContact, ServiceSummary};

pub const STATUS_CONFIRMED: &str = "confirmed";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    pub user_id: String,
    pub provider_id: String,
    pub booking_date: String,
    pub time_slot: Option<String>,
    pub adults: u32,
    pub children: u32,
    pub total_amount: f64,
    #[serde(default)]
    pub private_guide: bool,
    #[serde(default)]
    pub professional_photo: bool,
    pub status: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewBooking {
    pub service_id: String,
    pub user_id: String,
    pub provider_id: String,
    pub booking_date: String,
    pub time_slot: Option<String>,
    pub adults: u32,
    pub children: u32,
    pub total_amount: f64,
    pub private_guide: bool,
    pub professional_photo: bool,
    pub status: String,
}

fn default_adults() -> u32 {
    2
}

/// What a traveler picked on the tour details page.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingSelection {
    pub service_id: String,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub private_guide: bool,
    #[serde(default)]
    pub professional_photo: bool,
}

impl BookingSelection {
    /// Empty strings from the date and slot pickers mean "nothing selected".
    pub fn date(&self) -> Option<&str> {
        self.booking_date.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    pub fn slot(&self) -> Option<&str> {
        self.time_slot.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct UserBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub service: Option<ServiceSummary>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ProviderBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub service_title: Option<String>,
    pub customer: ProfileContact,
}
