//! Afrah Organic Mart back-office.
//!
//! Orders, products, users and contact messages for shop staff. Every page
//! except `/login` requires an account whose admin flag is set.
//!
//! Run it only behind the private network; it can change any order and
//! grant admin access.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod flash;
pub mod forms;
pub mod fragments;
pub mod layout;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
