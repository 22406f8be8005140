//! Keeps IS PMO Features in step with their Impact Assessment.
//!
//! Two runs are supported:
//!
//! - [`sync::FeatureSync::create_missing_features`] creates one Feature per
//!   impacted domain that has none yet and links them to the assessment.
//! - [`sync::FeatureSync::update_features`] refreshes the impacted-system
//!   fields of every Feature linked to the project.
//!
//! The core (`models`, `reconcile`, `payload`) is pure. All I/O goes through
//! the collaborator traits in [`ppm`] and [`notify`].

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod payload;
pub mod ppm;
pub mod reconcile;
pub mod sync;

pub use error::SyncError;
