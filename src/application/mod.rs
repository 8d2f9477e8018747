//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `SplitterEngine` which acts as the primary entry point
//! for executing calls against the mechanism. It serializes every operation
//! through a single lock and keeps the ledger and the stored mechanism in step.

pub mod engine;
