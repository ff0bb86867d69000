//! Shared KMS cleanup domain primitives.
//!
//! This crate owns the deterministic decision logic (alias index construction,
//! key classification, notification composition) and the key/alias contracts.
//! It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod alias_index;
pub mod classify;
pub mod contract;
pub mod report;
