//! Fitting Room Core - Shared types library.
//!
//! This crate provides common types used across all Fitting Room components:
//! - `storefront` - Client library (local store, try-on pipeline, views)
//! - `cli` - Terminal front-end for browsing and trying on products
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no local storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Emails, prices, categories, user profiles and try-on results

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
