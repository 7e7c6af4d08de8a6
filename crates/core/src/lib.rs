//! Core library for the TaskApp client
//!
//! This crate contains the client-side business logic, including:
//! - The task record and its wire format
//! - The `TaskService` seam implemented by the HTTP client
//! - The task store that caches, sorts and reconciles the task list
//! - The task editor behind the create/edit flow

pub mod editor;
pub mod error;
pub mod store;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod testing;
