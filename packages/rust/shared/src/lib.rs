//! Shared types, error model, and configuration for stagehand.
//!
//! This crate is the foundation depended on by all other stagehand crates.
//! It provides:
//! - [`StagehandError`] — the unified error type
//! - Domain types ([`ContentRoot`], [`AggregateResult`], [`RevisionId`], ...)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentServiceConfig, DefaultsConfig, GithubConfig, PresenterConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_admin_key,
};
pub use error::{Result, StagehandError};
pub use types::{
    AggregateResult, ContentRoot, PrepareOutcome, PresentedUrlMap, PullRequestOutcome,
    RevisionId, TransientApiKey,
};
