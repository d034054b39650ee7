//! # profsync
//!
//! Synchronizes faculty profile records from the Faculty180 activity API into
//! a Drupal site by creating one content node per record over Drupal's REST
//! interface.
//!
//! The pipeline is a single linear pass: load configuration from the process
//! environment, fetch the source records, establish a cookie + CSRF-token
//! session against Drupal, then transform and POST each record. Every
//! outbound call goes through a bounded-retry HTTP wrapper.

pub mod config;
pub mod drupal;
pub mod errors;
pub mod http;
pub mod pipeline;
pub mod source;
pub mod transform;

pub use config::SyncConfig;
pub use errors::SyncError;
pub use pipeline::{run, SyncReport};
