//! Core domain types and logic.

pub mod atr;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod kalman;
pub mod ohlcv;
pub mod performance;
pub mod signal;
pub mod simulator;
