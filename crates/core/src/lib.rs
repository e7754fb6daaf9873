//! Electricity price indicator.
//!
//! Polls a spot-price endpoint, maps the current price through a validated
//! threshold table to an LED appearance, and falls back to a dedicated
//! offline appearance whenever the price service is unreachable.

pub mod appearance;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod indicator;
pub mod runtime;
pub mod types;

pub use config::PricelightCfg;
pub use error::{ConfigError, Fatal, PayloadError};
pub use runtime::{Runtime, Scheduler, SchedulerStatus};
