//! Backend API access
//!
//! - [`client`]   -- the authenticated request pipeline
//! - [`options`]  -- per-request headers, query and timeout
//! - [`response`] -- successful response wrapper

pub mod client;
pub mod options;
pub mod response;

pub use client::{ApiClient, SignedIn};
pub use options::RequestOptions;
pub use reqwest::Method;
pub use response::ApiResponse;
