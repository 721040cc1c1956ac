//! `ratewatch` library crate.
//!
//! Fetches published interest-rate series (FRED text downloads by default),
//! keeps the latest observation of each in a Prometheus gauge and serves the
//! gauges on a `/metrics` endpoint.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
