//! HTTP handlers for users, addresses, and operational probes.

pub mod addresses;
pub mod common;
pub mod users;
