//! conf-migrate library
//!
//! Parses, inspects and patches the configuration files of applications
//! that live in one directory each, on the local host or over ssh.
//!
//! - [`artifact`] wraps one file's text with its parsed [`dispatch::Data`]
//! - [`dispatch`] picks parsers and printers from content and file names
//! - [`application`] holds an application's file tree
//! - [`server`] fetches applications through a [`provider`]

pub mod application;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod paths;
pub mod provider;
pub mod registry;
pub mod server;
pub mod stanza;
pub mod tree;
pub mod validators;
pub mod xml;

pub use application::Application;
pub use artifact::{Artifact, ArtifactKind};
pub use error::{ErrorCode, MigrateError, MigrateResult};
