//! fsd Provider
//!
//! A provider plugin that exposes the fsd coffee-ordering API to an
//! infrastructure-as-code host. It follows the pattern established by
//! [terraform-plugin-framework](https://github.com/hashicorp/terraform-plugin-framework).
//!
//! # Overview
//!
//! - **Provider configuration**: `host`, `username` and `password`, each
//!   falling back to an `fsd_*` environment variable
//! - **Client**: built once per successful configure and shared with every
//!   handler through [`ProviderData`]
//! - **Resources**: `fsd_order` and `fsd_try`
//! - **Data sources**: `fsd_coffees` and `fsd_try`
//! - **Logging**: structured `tracing` output on stderr; the password is
//!   always masked
//!
//! # Quick Start
//!
//! ```ignore
//! use fsd_provider::{FsdProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     fsd_provider::init_logging();
//!
//!     let provider = FsdProvider::new();
//!     let diagnostics = provider
//!         .configure(json!({
//!             "host": "http://localhost:19090",
//!             "username": "education",
//!             "password": "test123"
//!         }))
//!         .await?;
//!     assert!(diagnostics.is_empty());
//!
//!     let coffees = provider.read_data_source("fsd_coffees", json!({})).await?;
//!     println!("{}", coffees);
//!     Ok(())
//! }
//! ```
//!
//! # Unknown values
//!
//! A configuration value that is not known until apply is encoded as
//! `{"unknown": true}`. Configure rejects it with a diagnostic on the
//! offending attribute; validation accepts it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod logging;
pub mod models;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;
pub mod value;

// Re-export main types at crate root
pub use client::{Client, ClientError};
pub use config::{configure_client, EnvSource, ProcessEnv, ProviderConfig};
pub use error::{ConfigError, ProviderError};
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::{FsdProvider, ProviderData, TYPE_NAME};
pub use schema::{Diagnostic, ProviderSchema};
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{validate, validate_result};
pub use value::{ConfigValue, Sensitive};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
