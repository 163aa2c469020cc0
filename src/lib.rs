//! Seatkeep - license activation server
//!
//! Issues licenses identified by a license ID and a secret key, and limits how
//! many distinct machines may activate each license within an optional
//! expiry window that starts at first activation.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod db;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod registry;
pub mod store;
pub mod util;
