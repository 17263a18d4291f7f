//! Core AKI library (session controller, providers, records, config).

pub mod auth;
pub mod config;
pub mod providers;
pub mod records;
