//! Add command implementation.

use anyhow::{Result, bail};

use gasoo_core::{ReadingService, ReadingSource};
use gasoo_types::validate_level;

use crate::format::format_timestamp;

/// Record one reading through the reading service.
///
/// An unreachable source is not an error: depending on the degraded-mode
/// policy the reading is either buffered in this process or dropped.
pub async fn cmd_add<S: ReadingSource>(service: &ReadingService<S>, level: f64) -> Result<String> {
    if let Err(e) = validate_level(level) {
        bail!("Invalid level: {}", e);
    }

    match service.add_reading(level).await {
        Some(reading) if service.is_degraded() => Ok(format!(
            "Source unreachable; buffered {:.1}% locally (not persisted)\n",
            reading.level
        )),
        Some(reading) => Ok(format!(
            "Recorded {:.1}% (id {} at {})\n",
            reading.level,
            reading.id,
            format_timestamp(reading.timestamp)
        )),
        None => Ok("Source unreachable; reading dropped\n".to_string()),
    }
}
