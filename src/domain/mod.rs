//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_helpers;
pub mod signal;
pub mod scoring;
pub mod screen;
pub mod recovery;
pub mod analysis;
pub mod universe;
pub mod config_validation;
pub mod error;
