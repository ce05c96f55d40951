//! Core functionality: configuration, note storage and timers

pub mod config;
pub mod scheduler;
pub mod store;
