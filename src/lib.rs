//! Day-stepped simulation of patient flow through capacity-limited care
//! settings.

pub mod components;
pub mod config;
pub mod error;
pub mod io;
pub mod matrix;
/// Engine, value store, dependency graph and run summary.
pub mod sim;

pub use error::{ConfigError, Result, SimError};
