//! CLI command handlers. Each command is in its own file.

mod checksum;
mod completions;
mod config;
mod scan;

pub use checksum::run_checksum;
pub use completions::{run_completions, run_man};
pub use config::run_config;
pub use scan::{run_scan, ScanArgs};
