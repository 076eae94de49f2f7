//! Typed access to the CPG query service.

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use types::*;
