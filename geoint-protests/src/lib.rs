//! Client for the hosted protest-news aggregation API.
//!
//! The hosted service broadcasts news related to protests and
//! demonstrations, spatially aggregated into hexagonal bins, and keeps the
//! last 90 days of features. This crate wraps its three endpoints:
//!
//! - `aggregate`: binned features for a day
//! - `articles`: the underlying broadcasted articles
//! - `hotspots`: hotspot locations
//!
//! All requests are authenticated with RapidAPI host/key headers. The date
//! is optional on every endpoint; when omitted the service returns the last
//! 24 hours, and yesterday is the latest date guaranteed to be available.

mod client;
mod error;

pub use client::{GeoProtestClient, OutFormat};
pub use error::{ProtestApiError, Result};
