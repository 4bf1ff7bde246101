//! Valve command implementation.

use anyhow::{Result, bail};

use gasoo_core::ServiceClient;
use gasoo_types::ValveState;

use crate::format::{FormatOptions, format_valve_text};

/// Show the valve position, or switch it when `state` is given.
///
/// Closing shuts off the gas supply and needs `confirm`.
pub async fn cmd_valve(
    client: &ServiceClient,
    state: Option<ValveState>,
    confirm: bool,
    opts: &FormatOptions,
) -> Result<String> {
    let status = match state {
        None => client.valve().await?,
        Some(ValveState::Closed) if !confirm => {
            bail!("Closing the valve shuts off the gas supply. Re-run with --yes to confirm.")
        }
        Some(state) => client.set_valve(state, confirm).await?,
    };

    Ok(format_valve_text(&status, opts) + "\n")
}
