//! Conformance testing harness for boundlen.
//!
//! This crate provides:
//! - Fixtures: JSON case files describing scan inputs and expected output
//! - Execution: run a case against the safe core API or the C ABI, under a mode
//! - Verification: compare, diff and summarize results
//! - Report generation: markdown + JSON conformance reports
//! - Structured logging: JSONL records for every run

#![deny(unsafe_code)]

pub mod diff;
pub mod error;
#[allow(unsafe_code)]
pub mod exec;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureSet};
pub use report::ConformanceReport;
pub use runner::{RunMode, TestRunner};
pub use verify::{VerificationResult, VerificationSummary};
