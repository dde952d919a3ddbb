//! Zenova SRP: supplier relationship planning over plain CSV tables
//!
//! Suppliers, assets, project tasks, audit points, shared files, messages
//! and calendar events each live in one CSV file inside a workspace's
//! `data/` directory. The library owns the store, the search/filter engine
//! and the dashboard derivations; the `srp` binary is a thin CLI over it.

pub mod cli;
pub mod core;
pub mod entities;
