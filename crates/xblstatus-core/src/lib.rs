//! Core xblstatus library (config, presence formatting, polling, shutdown).

pub mod config;
pub mod logging;
pub mod monitor;
pub mod presence;
pub mod xbox;
