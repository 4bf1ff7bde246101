//! Command implementations for the CLI.

mod add;
mod history;
mod status;
mod valve;
mod watch;

pub use add::cmd_add;
pub use history::cmd_history;
pub use status::cmd_status;
pub use valve::cmd_valve;
pub use watch::{WatchArgs, cmd_watch};
