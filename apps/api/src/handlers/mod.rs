//! # HTTP Handlers
//!
//! One module per resource. Handlers are thin: extract, call a repository,
//! project the result into a response DTO.
//!
//! ## Handler Categories
//! - [`health`] - Liveness check and the shared `{code, status}` payload
//! - [`product`] - Product CRUD and name search
//! - [`category`] - Category CRUD
//! - [`checkout`] - Atomic checkout and transaction lookup
//! - [`report`] - Sales reports over a date window
//!
//! ## Money at the boundary
//! Storage and domain code work in integer cents ([`Money`]). DTOs carry
//! decimal numbers; conversion happens only in the `From` impls here.

pub mod category;
pub mod checkout;
pub mod health;
pub mod product;
pub mod report;

pub use health::StatusResponse;

use storefront_core::Money;

use crate::error::ApiError;

/// Converts a decimal price from a request body into cents.
///
/// `None` stays `None` (no price). Non-finite or out-of-range numbers are a
/// validation error; negative prices are rejected later by draft validation.
pub(crate) fn price_to_cents(price: Option<f64>) -> Result<Option<i64>, ApiError> {
    price
        .map(|p| {
            Money::from_major_f64(p)
                .map(|m| m.cents())
                .ok_or_else(|| ApiError::validation("price must be a finite number"))
        })
        .transpose()
}
