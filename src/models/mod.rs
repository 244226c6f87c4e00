pub mod profile;
pub mod service;
pub mod booking;

use serde::{Deserialize, Deserializer};

pub use profile::{Profile, ProfileContact, ProfileUpdate, Role};
pub use service::{DurationType, NewService, Service, ServiceSummary, TimeSlot};
pub use booking::{Booking, BookingSelection, NewBooking, ProviderBooking, UserBooking};

/// Platform columns come back as `null` for empty arrays; treat that like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
