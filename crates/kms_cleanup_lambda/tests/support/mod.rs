#![allow(dead_code)]

pub mod fake_kms;
pub mod recording_notifier;
