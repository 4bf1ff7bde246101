//! HTTP REST API and usage simulator for the Gasoo cylinder monitor.
//!
//! This crate provides a service that:
//! - Persists timestamped gas-level readings in a [`ReadingStore`](gasoo_store::ReadingStore)
//! - Exposes a small REST API for inserting and querying readings
//! - Drains a simulated cylinder in the background while the valve is open
//! - Holds the remote valve position
//!
//! # REST API Endpoints
//!
//! - `GET /` - Plain-text liveness check
//! - `GET /api/health` - Service health check
//! - `GET /api/health/detailed` - Store, simulator and valve diagnostics
//! - `GET /api/readings` - Up to 30 most recent readings, newest first
//! - `GET /api/readings/latest` - Newest reading or `null`
//! - `POST /api/readings` - Store a reading (`{"level": 42.5}`)
//! - `GET /api/valve` / `PUT /api/valve` - Remote valve position
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/gasoo/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [storage]
//! backend = "sqlite"   # or "memory"
//! path = "~/.local/share/gasoo/readings.db"
//!
//! [simulation]
//! enabled = true
//! interval_secs = 60
//! initial_level = 35.0
//! ```
//!
//! `GASOO_BIND`, `PORT`, `GASOO_DATABASE` and `GASOO_STORAGE` override the
//! file, and command-line flags override both.

pub mod api;
pub mod config;
pub mod simulator;
pub mod state;

pub use config::{
    Config, ConfigError, ServerConfig, SimulationConfig, StorageBackend, StorageConfig,
};
pub use simulator::Simulator;
pub use state::{AppState, ValveStatus};
