//! buildtriage - CI build failure triage library
//!
//! Exposes the failure-classification core: the signature catalog, the log
//! classifier, the build-history walk and report assembly, plus the server
//! boundary and settings loading used by the CLI.

pub mod catalog;
pub mod classify;
pub mod cli;
pub mod constants;
pub mod models;
pub mod report;
pub mod server;
pub mod settings;
pub mod walk;
