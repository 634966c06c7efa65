//! Azure API interaction module
//!
//! This module provides the core functionality for interacting with Azure
//! Resource Manager, including authentication, the HTTP client, and the
//! workbooks endpoints.
//!
//! # Module Structure
//!
//! - [`auth`] - bearer tokens from a static token or a service principal
//! - [`client`] - main Azure client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//! - [`workbooks`] - `RemoteClient` implementation for workbooks
//!
//! # Example
//!
//! ```ignore
//! use azwb::azure::{AzureClient, CredentialSource, DEFAULT_ENDPOINT};
//!
//! fn example() -> Result<(), azwb::azure::ApiError> {
//!     let source = CredentialSource::Static("token".to_string());
//!     let client = AzureClient::new("00000000-0000-0000-0000-000000000000", DEFAULT_ENDPOINT, source)?;
//!     println!("{}", client.workbook_url("rg1", "wb1"));
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod workbooks;

pub use auth::{credential_source_from_env, AzureCredentials, CredentialSource};
pub use client::{AzureClient, DEFAULT_ENDPOINT, WORKBOOKS_API_VERSION};
pub use http::{format_api_error, ApiError, ApiResponse, AzureHttpClient};
