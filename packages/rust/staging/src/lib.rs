//! External collaborators for stagehand builds.
//!
//! This crate provides:
//! - [`ContentServiceClient`] — API-key issuance and revocation
//! - [`PresenterClient`] — maps content IDs to public preview paths
//! - [`GitHubClient`] — posts preview comments to pull requests
//! - [`comment`] — preview comment body rendering
//! - [`Preparer`] / [`CommandPreparer`] — per-root content preparation

pub mod comment;
mod content_service;
mod github;
mod preparer;
mod presenter;

pub use content_service::ContentServiceClient;
pub use github::GitHubClient;
pub use preparer::{CommandPreparer, PrepareOptions, Preparer};
pub use presenter::PresenterClient;
