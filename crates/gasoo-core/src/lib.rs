//! Client-side core of the Gasoo cylinder monitor.
//!
//! This crate sits between a dashboard and wherever readings live:
//!
//! - [`ServiceClient`]: HTTP client for the `gasoo-service` REST API
//! - [`LocalSource`]: adapter exposing any [`ReadingStore`](gasoo_store::ReadingStore)
//!   as a [`ReadingSource`]
//! - [`ReadingService`]: resilience wrapper that never fails, falling back
//!   according to a [`DegradedPolicy`]
//! - [`Dashboard`] and [`DashboardPoller`]: interval-driven refresh producing
//!   [`DashboardSnapshot`]s
//!
//! # Example
//!
//! ```no_run
//! use gasoo_core::{DegradedPolicy, ReadingService, ServiceClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ServiceClient::new("http://localhost:5000")?;
//! let service = ReadingService::new(client, DegradedPolicy::Placeholder);
//!
//! // Never fails: an unreachable API yields buffered or empty data.
//! let readings = service.get_readings().await;
//! println!("{} readings", readings.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod dashboard;
pub mod placeholder;
pub mod service;
pub mod source;

pub use client::{ServiceClient, ServiceClientError, ValveStatus};
pub use dashboard::{Dashboard, DashboardConfig, DashboardPoller, DashboardSnapshot};
pub use service::{DegradedPolicy, ReadingService};
pub use source::{LocalSource, ReadingSource, SourceError};

/// Default base URL of the Gasoo API.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default dashboard refresh interval in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 30;
