//! cmm-mi - Music Intake
//!
//! Reconciles competitor registration records against independently submitted
//! music files and maintains a versioned local media cache plus report
//! projection data.
//!
//! Exposes the engine as a library for integration testing; the batch binary
//! lives in `main.rs`.

pub mod diagnostics;
pub mod models;
pub mod report;
pub mod services;
pub mod snapshot;
pub mod workflow;
