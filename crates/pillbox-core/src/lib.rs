//! Core types and the recurring schedule engine for Pillbox.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Everything here is pure and synchronous except the collaborator traits
//! ([`store::MedicationStore`], [`dispatch::NotificationDispatcher`],
//! [`context::TextCompletion`]), which other crates implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod context;
pub mod dispatch;
pub mod error;
pub mod group;
pub mod medication;
pub mod plan;
pub mod resolve;
pub mod schedule;
pub mod store;
pub mod taken;
pub mod time;

pub use error::{Error, Result};
