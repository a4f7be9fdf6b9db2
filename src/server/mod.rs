//! CI server boundary
//!
//! The capability interface the report core needs from the remote CI server,
//! plus the error taxonomy shared by its implementations. Every call is
//! blocking: the history walk is sequential because each continuation
//! decision depends on the previous fetch's timestamp.

use crate::models::{BuildInfo, BuildRef};
use thiserror::Error;

pub mod jenkins;

/// Errors from the remote server boundary.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A single build number has no metadata (CI servers prune old builds).
    /// Recovered locally by the history walk; never fatal.
    #[error("job '{job}' has no build #{number}")]
    BuildNotFound { job: String, number: u32 },

    /// The job itself is unknown to the server. Fatal.
    #[error("job not found: '{0}'")]
    JobNotFound(String),

    #[error("unexpected response ({status}) from {url}")]
    Status { status: u16, url: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid timestamp {millis} on build #{number} of job '{job}'")]
    BadTimestamp {
        job: String,
        number: u32,
        millis: i64,
    },
}

/// Capability interface required from the CI collaborator.
pub trait BuildServer {
    /// Reference to the most recently completed build of a job, or None for
    /// a job that has never completed a build.
    fn last_completed_build(&self, job: &str) -> Result<Option<BuildRef>, ServerError>;

    /// Metadata for one build. Fails with `BuildNotFound` when the number
    /// has been pruned or never existed.
    fn build_info(&self, job: &str, number: u32) -> Result<BuildInfo, ServerError>;

    /// Full console text of one build.
    fn console_text(&self, job: &str, number: u32) -> Result<String, ServerError>;

    /// Names of all jobs known to the server.
    fn list_jobs(&self) -> Result<Vec<String>, ServerError>;
}
