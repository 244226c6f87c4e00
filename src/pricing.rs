use serde::Serialize;
use thiserror::Error;

pub const PRIVATE_GUIDE_FEE: f64 = 50.0;
pub const PROFESSIONAL_PHOTO_FEE: f64 = 30.0;

/// Per-service price sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tariff {
    pub adult_price: f64,
    pub child_price: Option<f64>,
    pub max_group_size: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extras {
    pub private_guide: bool,
    pub professional_photo: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("At least one adult is required")]
    NoAdults,
    #[error("Group of {requested} exceeds the maximum of {max} people")]
    GroupTooLarge { requested: u32, max: u32 },
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct Quote {
    pub adults_subtotal: f64,
    pub children_subtotal: f64,
    pub extras: f64,
    pub total: f64,
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn quote(tariff: &Tariff, adults: u32, children: u32, extras: Extras) -> Result<Quote, PricingError> {
    if adults < 1 {
        return Err(PricingError::NoAdults);
    }
    let requested = adults.saturating_add(children);
    if requested > tariff.max_group_size {
        return Err(PricingError::GroupTooLarge { requested, max: tariff.max_group_size });
    }

    let adults_subtotal = tariff.adult_price * f64::from(adults);
    // children ride free when the provider set no child price
    let children_subtotal = match tariff.child_price {
        Some(price) if children > 0 => price * f64::from(children),
        _ => 0.0,
    };
    let mut extras_total = 0.0;
    if extras.private_guide {
        extras_total += PRIVATE_GUIDE_FEE;
    }
    if extras.professional_photo {
        extras_total += PROFESSIONAL_PHOTO_FEE;
    }

    Ok(Quote {
        adults_subtotal: round_cents(adults_subtotal),
        children_subtotal: round_cents(children_subtotal),
        extras: extras_total,
        total: round_cents(adults_subtotal + children_subtotal + extras_total),
    })
}
