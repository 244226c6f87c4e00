use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::auth::Session;
use crate::cart::{Cart, CartItem, CartView};
use crate::error::ApiError;
use crate::models::{Booking, BookingSelection};
use crate::state::AppState;

use super::bookings::{ensure_bookable, load_service, place_booking};

#[derive(Serialize)]
struct CheckoutFailure {
    item_id: String,
    service_title: String,
    error: String,
}

pub async fn get_cart(session: Session, state: web::Data<AppState>) -> HttpResponse {
    let view = state.with_cart(session.user_id(), |cart| json!(CartView::from(&*cart)));
    HttpResponse::Ok().json(view)
}

pub async fn add_to_cart(
    session: Session,
    state: web::Data<AppState>,
    data: web::Json<BookingSelection>,
) -> Result<HttpResponse, ApiError> {
    let selection = data.into_inner();
    let date = selection
        .date()
        .ok_or_else(|| ApiError::Validation("Please select a date".to_string()))?
        .to_string();
    let service = load_service(state.backend.as_ref(), session.token(), &selection.service_id).await?;
    ensure_bookable(&service)?;
    let item = CartItem::price(&service, &selection, &date)?;

    let cart = state.with_cart(session.user_id(), |cart| {
        cart.add(item.clone());
        json!(CartView::from(&*cart))
    });
    log::debug!("{} added {} to cart", session.user_id(), item.service_id);
    Ok(HttpResponse::Created().json(json!({ "item": item, "cart": cart })))
}

pub async fn remove_from_cart(
    session: Session,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    state
        .with_cart(session.user_id(), |cart| {
            cart.remove(&item_id).map(|_| json!(CartView::from(&*cart)))
        })
        .map(|view| HttpResponse::Ok().json(view))
        .ok_or(ApiError::NotFound("Cart item"))
}

pub async fn clear_cart(session: Session, state: web::Data<AppState>) -> HttpResponse {
    let view = state.with_cart(session.user_id(), |cart| {
        cart.clear();
        json!(CartView::from(&*cart))
    });
    HttpResponse::Ok().json(view)
}

/// Books every cart item in turn. Booked items leave the cart, failed ones stay.
/// Items taken out of a cart for checkout. Whatever is still held when this drops goes back.
struct CartClaim {
    state: AppState,
    user_id: String,
    items: Vec<CartItem>,
}

impl Drop for CartClaim {
    fn drop(&mut self) {
        if !self.items.is_empty() {
            let items = std::mem::take(&mut self.items);
            self.state.with_cart(&self.user_id, |cart| cart.restore(items));
        }
    }
}

/// Books every item in the cart. The cart is emptied up front so a second checkout
/// running at the same time finds nothing to book.
pub async fn checkout(session: Session, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let items = state.with_cart(session.user_id(), Cart::take_all);
    if items.is_empty() {
        return Err(ApiError::Validation("Your cart is empty".to_string()));
    }
    let mut claim = CartClaim {
        state: state.get_ref().clone(),
        user_id: session.user_id().to_string(),
        items,
    };

    let mut booked: Vec<Booking> = Vec::new();
    let mut failed: Vec<CheckoutFailure> = Vec::new();

    for item in claim.items.clone() {
        match place_booking(state.backend.as_ref(), session.token(), session.user_id(), &item.selection()).await {
            Ok(booking) => {
                claim.items.retain(|i| i.id != item.id);
                booked.push(booking);
            }
            Err(e) => {
                log::warn!("checkout of cart item {} failed: {}", item.id, e);
                failed.push(CheckoutFailure {
                    item_id: item.id,
                    service_title: item.service_title,
                    error: e.to_string(),
                });
            }
        }
    }
    drop(claim);

    let cart = state.with_cart(session.user_id(), |cart| json!(CartView::from(&*cart)));
    Ok(HttpResponse::Ok().json(json!({
        "booked": booked,
        "failed": failed,
        "cart": cart
    })))
}
