//! Sign-in, profile, addresses and wishlist.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::instrument;
use validator::Validate;

use super::Customer;
use crate::domain::aggregates::{
    Address, AddressInput, LoginInput, Profile, ProfileUpdate, RegisterInput, SignedIn, Wishlist, WishlistToggle,
};
use crate::domain::events::StorefrontEvent;
use crate::{AppState, Result};

pub async fn register(State(s): State<AppState>, Json(input): Json<RegisterInput>) -> Result<(StatusCode, Json<SignedIn>)> {
    input.validate()?;
    Ok((StatusCode::CREATED, Json(s.backend.register(&input).await?)))
}

pub async fn login(State(s): State<AppState>, Json(input): Json<LoginInput>) -> Result<Json<SignedIn>> {
    input.validate()?;
    Ok(Json(s.backend.login(&input).await?))
}

pub async fn get_profile(State(s): State<AppState>, customer: Customer) -> Result<Json<Profile>> {
    Ok(Json(s.backend.get_profile(customer.bearer()).await?))
}

pub async fn update_profile(State(s): State<AppState>, customer: Customer, Json(update): Json<ProfileUpdate>) -> Result<Json<Profile>> {
    update.validate()?;
    Ok(Json(s.backend.update_profile(customer.bearer(), &update).await?))
}

// =============================================================================
// Addresses
// =============================================================================

pub async fn list_addresses(State(s): State<AppState>, customer: Customer) -> Result<Json<Vec<Address>>> {
    Ok(Json(s.backend.list_addresses(customer.bearer()).await?))
}

pub async fn create_address(State(s): State<AppState>, customer: Customer, Json(input): Json<AddressInput>) -> Result<(StatusCode, Json<Address>)> {
    input.validate()?;
    Ok((StatusCode::CREATED, Json(s.backend.create_address(customer.bearer(), &input).await?)))
}

pub async fn update_address(State(s): State<AppState>, customer: Customer, Path(id): Path<String>, Json(input): Json<AddressInput>) -> Result<Json<Address>> {
    input.validate()?;
    Ok(Json(s.backend.update_address(customer.bearer(), &id, &input).await?))
}

pub async fn delete_address(State(s): State<AppState>, customer: Customer, Path(id): Path<String>) -> Result<StatusCode> {
    s.backend.delete_address(customer.bearer(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_default_address(State(s): State<AppState>, customer: Customer, Path(id): Path<String>) -> Result<StatusCode> {
    s.backend.set_default_address(customer.bearer(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Wishlist
// =============================================================================

pub async fn list_wishlist(State(s): State<AppState>, customer: Customer) -> Result<Json<Wishlist>> {
    Ok(Json(s.backend.get_wishlist(customer.bearer()).await?))
}

/// Removes the product when it is on the wishlist, adds it otherwise.
#[instrument(skip(s, customer))]
pub async fn toggle_wishlist(State(s): State<AppState>, customer: Customer, Path(product_id): Path<String>) -> Result<Json<WishlistToggle>> {
    let wishlist = s.backend.get_wishlist(customer.bearer()).await?;
    let in_wishlist = if wishlist.contains(&product_id) {
        s.backend.remove_from_wishlist(customer.bearer(), &product_id).await?;
        false
    } else {
        s.backend.add_to_wishlist(customer.bearer(), &product_id).await?;
        true
    };

    s.events
        .publish(StorefrontEvent::WishlistToggled { customer: customer.key().to_string(), product_id: product_id.clone(), in_wishlist })
        .await;
    Ok(Json(WishlistToggle { product_id, in_wishlist }))
}
