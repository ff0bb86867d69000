//! AWS-oriented adapters and handlers for the scheduled KMS cleanup job.
//!
//! This crate owns runtime integration details (Lambda handler, KMS and SNS
//! ports, configuration) and drives the decision logic from
//! `kms_cleanup_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
