//! Reading persistence for the Gasoo cylinder monitor.
//!
//! Two backends implement the same [`ReadingStore`] contract:
//!
//! - [`Store`]: SQLite table `readings(id, level, created_at)`
//! - [`MemoryStore`]: a process-scoped buffer, reset when the process exits
//!
//! Callers hold a `dyn ReadingStore` and do not need to know which backend
//! answered.
//!
//! # Example
//!
//! ```no_run
//! use gasoo_store::{ReadingStore, Store};
//!
//! let store = Store::open_default()?;
//! store.insert(42.0)?;
//!
//! let recent = store.list(30)?;
//! let latest = store.latest()?;
//! # Ok::<(), gasoo_store::Error>(())
//! ```

mod error;
mod memory;
mod queries;
mod schema;
mod store;
mod traits;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use queries::ReadingQuery;
pub use store::Store;
pub use traits::{DEFAULT_LIST_LIMIT, ReadingStore};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/gasoo/readings.db`
/// - macOS: `~/Library/Application Support/gasoo/readings.db`
/// - Windows: `C:\Users\<user>\AppData\Local\gasoo\readings.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("gasoo")
        .join("readings.db")
}
