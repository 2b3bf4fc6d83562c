//! holocast library
//!
//! Cache-aside aggregation of registry characters, their homeworlds and the
//! homeworlds' weather, with every fusion recorded in a history. The binary in
//! `main.rs` is a thin CLI over `Aggregator`.

pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod history;
