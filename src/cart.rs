use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BookingSelection, Service};
use crate::pricing::{self, round_cents, Extras, PricingError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartItem {
    pub id: String,
    pub service_id: String,
    pub service_title: String,
    pub booking_date: String,
    pub time_slot: Option<String>,
    pub adults: u32,
    pub children: u32,
    pub private_guide: bool,
    pub professional_photo: bool,
    pub total: f64,
}

impl CartItem {
    /// Prices the selection against the service as it is right now.
    pub fn price(service: &Service, selection: &BookingSelection, booking_date: &str) -> Result<Self, PricingError> {
        let quote = pricing::quote(
            &service.tariff(),
            selection.adults,
            selection.children,
            Extras {
                private_guide: selection.private_guide,
                professional_photo: selection.professional_photo,
            },
        )?;

        Ok(CartItem {
            id: Uuid::new_v4().to_string(),
            service_id: service.id.clone(),
            service_title: service.title.clone(),
            booking_date: booking_date.to_string(),
            time_slot: selection.slot().map(str::to_string),
            adults: selection.adults,
            children: selection.children,
            private_guide: selection.private_guide,
            professional_photo: selection.professional_photo,
            total: quote.total,
        })
    }

    pub fn selection(&self) -> BookingSelection {
        BookingSelection {
            service_id: self.service_id.clone(),
            booking_date: Some(self.booking_date.clone()),
            time_slot: self.time_slot.clone(),
            adults: self.adults,
            children: self.children,
            private_guide: self.private_guide,
            professional_photo: self.professional_photo,
        }
    }
}

/// Selections waiting for checkout. Lives only in server memory.
#[derive(Debug, Default, Clone)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, item: CartItem) {
        self.items.push(item);
    }

    pub fn remove(&mut self, id: &str) -> Option<CartItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total(&self) -> f64 {
        round_cents(self.items.iter().map(|i| i.total).sum())
    }

    /// Empties the cart and hands its items to the caller.
    pub fn take_all(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }

    /// Puts unbooked items back ahead of anything added since they were taken.
    pub fn restore(&mut self, mut items: Vec<CartItem>) {
        items.append(&mut self.items);
        self.items = items;
    }
}

#[derive(Debug, Serialize)]
pub struct CartView<'a> {
    pub items: &'a [CartItem],
    pub count: usize,
    pub total: f64,
}

impl<'a> From<&'a Cart> for CartView<'a> {
    fn from(cart: &'a Cart) -> Self {
        CartView {
            items: cart.items(),
            count: cart.len(),
            total: cart.total(),
        }
    }
}
