//! CLI command implementations

pub mod asset;
pub mod audit;
pub mod calendar;
pub mod completions;
pub mod dashboard;
pub mod file;
pub mod init;
pub mod mail;
pub mod supplier;
pub mod task;
