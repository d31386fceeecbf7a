//! Loan application scoring: synthetic training data, feature encoding, and the
//! approval decision contract shared by the trainer and the HTTP service.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
