//! Core types, config, errors, and language registry for Bhasha Relay.

pub mod config;
pub mod error;
pub mod language;
pub mod types;
pub mod validation;
