//! Core domain + application logic for the nearby facility bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the OneMap HTTP
//! API live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod credentials;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod geo;
pub mod logging;
pub mod map;
pub mod messaging;
pub mod ports;
pub mod results;
pub mod search;
pub mod service;
pub mod session;
pub mod themes;

pub use errors::{Error, Result};
