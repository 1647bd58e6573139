//! Client for a cybersecurity news aggregation backend.
//!
//! [`store::NewsStore`] owns the session state (filter, articles, fetch
//! status) and drives an [`api::NewsService`]; [`stats`] and [`export`]
//! work on the article collection it holds.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
