//! HTTP client for the TaskApp tasks service
//!
//! [`HttpTaskClient`] implements [`taskapp_core::task::TaskService`] over the
//! `/tasks` REST contract.

mod client;
mod config;
mod error;

pub use client::{HttpTaskClient, API_KEY_HEADER};
pub use config::{ClientConfig, API_KEY_ENV, API_URL_ENV, DEFAULT_API_URL};
pub use error::ConfigError;
