//! Core domain logic for the private Telegram responder.
//!
//! This crate is framework-agnostic. Telegram lives behind the
//! `MessagingPort` trait implemented in the adapter crate.

pub mod config;
pub mod domain;
pub mod errors;
pub mod gatekeeper;
pub mod logging;
pub mod messaging;

pub use errors::{Error, Result};
