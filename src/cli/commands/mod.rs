//! CLI command implementations.

mod config;
mod process;
mod serve;

pub use config::run_config;
pub use process::run_process;
pub use serve::run_serve;
