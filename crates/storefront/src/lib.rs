//! Fitting Room storefront client library.
//!
//! Everything a front-end needs apart from drawing: local storage, the signed
//! in session, the profile API, the virtual try-on cache and pipeline, and
//! page state for the home and category pages.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod tryon;
pub mod views;
