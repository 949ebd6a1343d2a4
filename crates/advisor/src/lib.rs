//! Agricultural advisory service
//!
//! Serves crop recommendations and water-use estimates over HTTP from
//! models loaded once at startup.

pub mod api;
pub mod config;
