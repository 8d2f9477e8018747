//! Two-participant value splitter.
//!
//! An administrator registers two participant accounts once; from then on every
//! contribution the administrator makes is halved and forwarded to both of them
//! in a single all-or-nothing ledger batch. Contributions from anyone else are
//! held in a pending pool until the administrator releases it.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
