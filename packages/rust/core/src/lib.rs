//! Core pipeline orchestration for stagehand.
//!
//! This crate ties discovery, per-root preparation, credential lifecycle,
//! preview resolution, and pull-request notification into the two
//! end-to-end workflows (`run_prepare`, `run_preview_build`).

pub mod aggregate;
pub mod credentials;
pub mod notify;
pub mod pipeline;
pub mod preview;
pub mod revision;

pub use pipeline::{BuildConfig, run_prepare, run_preview_build};
