//! Core types for Afrah Organic Mart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod display;
pub mod email;
pub mod id;
pub mod money;
pub mod phone;
pub mod rating;
pub mod slug;
pub mod status;
pub mod stock;
pub mod toast;
pub mod validation;

pub use catalog::{CATEGORIES, Category};
pub use display::{initials, short_initials};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{MoneyError, Taka};
pub use phone::{Phone, PhoneError};
pub use rating::{RatingAggregate, RatingError, Stars};
pub use slug::create_slug;
pub use status::*;
pub use stock::{StockEffect, clamp_quantity};
pub use toast::{Toast, ToastVariant};
pub use validation::ValidationErrors;
