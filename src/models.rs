//! Data models module
//!
//! Defines core data structures:
//! - BuildResult: terminal outcome of a CI build
//! - BuildRef / BuildInfo: remote build identity and metadata
//! - BuildDecision: one step of the history walk with its inclusion verdict
//! - ReportWindow: time range and success-inclusion policy for a run
//! - ReportRow / ReportSummary / ReportOutput: display-ready report shapes

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal outcome of a build as reported by the CI server.
///
/// Jenkins reports results as upper-case strings; anything outside the known
/// vocabulary (including a null result on a still-running build) is preserved
/// verbatim in `Other` and treated as non-success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildResult {
    Success,
    Failure,
    Unstable,
    Aborted,
    NotBuilt,
    Other(String),
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success)
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Failure => "FAILURE",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Aborted => "ABORTED",
            BuildResult::NotBuilt => "NOT_BUILT",
            BuildResult::Other(s) => s,
        }
    }
}

impl From<String> for BuildResult {
    fn from(s: String) -> Self {
        match s.as_str() {
            "SUCCESS" => BuildResult::Success,
            "FAILURE" => BuildResult::Failure,
            "UNSTABLE" => BuildResult::Unstable,
            "ABORTED" => BuildResult::Aborted,
            "NOT_BUILT" => BuildResult::NotBuilt,
            _ => BuildResult::Other(s),
        }
    }
}

impl From<BuildResult> for String {
    fn from(r: BuildResult) -> Self {
        r.as_str().to_string()
    }
}

/// Lightweight reference to a build: number plus display URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRef {
    pub number: u32,
    pub url: String,
}

/// Metadata for one build, fetched on demand and discarded after it has
/// contributed a single report row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Name of the job this build belongs to
    pub job: String,
    /// Build number (dense descending sequence per job)
    pub number: u32,
    /// Terminal outcome
    pub result: BuildResult,
    /// Build start time
    pub timestamp: DateTime<Utc>,
    /// Display URL of the build
    pub url: String,
    /// Optional display name (e.g. "#49 nightly")
    pub display_name: Option<String>,
}

/// One step of the history walk: the fetched metadata and whether the build
/// falls inside the report window.
#[derive(Debug, Clone)]
pub struct BuildDecision {
    pub info: BuildInfo,
    pub included: bool,
}

/// Time range and success-inclusion policy bounding which builds are
/// reported. Derived once per run and immutable afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ReportWindow {
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    pub include_success: bool,
}

impl ReportWindow {
    pub fn new(now: DateTime<Utc>, hours_ago: i64, include_success: bool) -> Self {
        ReportWindow {
            now,
            cutoff: now - Duration::hours(hours_ago),
            include_success,
        }
    }

    /// Window anchored at the current wall-clock time.
    pub fn ending_now(hours_ago: i64, include_success: bool) -> Self {
        Self::new(Utc::now(), hours_ago, include_success)
    }

    /// Whether a timestamp is still inside the window. Also the walk
    /// continuation test: the walk keeps descending while this holds for the
    /// most recently fetched build.
    pub fn covers(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.cutoff
    }

    /// Whether a build belongs in the report. Successful builds are gated by
    /// the include_success flag; every other terminal outcome is included
    /// whenever the build is inside the window.
    pub fn includes(&self, info: &BuildInfo) -> bool {
        if !self.covers(info.timestamp) {
            return false;
        }
        if info.result.is_success() && !self.include_success {
            return false;
        }
        true
    }
}

/// Configuration for one report run, produced by the CLI layer.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Job to report on (may be a short alias; resolved via settings).
    /// None is only valid together with list_jobs.
    pub job: Option<String>,
    /// Report window size in hours (HOURS_AGO < build time <= now)
    pub hours_ago: i64,
    /// Whether successful builds appear in the report
    pub include_success: bool,
    /// Path to the signature catalog
    pub catalog_path: PathBuf,
    /// Explicit server settings path, overriding the per-user default
    pub settings_path: Option<PathBuf>,
    /// Whether to output JSON format
    pub json_output: bool,
    /// Whether to run in quiet mode (suppress warnings)
    pub quiet: bool,
    /// List the server's job names instead of producing a report
    pub list_jobs: bool,
}

/// One display-ready report row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub job: String,
    pub number: u32,
    pub result: String,
    /// Names of the matched failure signatures (may be empty)
    pub causes: Vec<String>,
    /// Bug URL per matched signature, empty string where none is tracked
    pub bug_urls: Vec<String>,
    pub url: String,
    pub display_name: String,
}

/// Summary statistics for one report run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Builds visited by the walk (included or not)
    pub visited: usize,
    /// Builds that fell inside the report window
    pub included: usize,
    /// Builds whose console log was classified
    pub classified: usize,
    /// Missing build numbers skipped during the walk
    pub skipped_missing: usize,
    /// Builds kept in the report despite an unavailable console log
    pub log_fetch_failures: usize,
    /// Whether the run was interrupted by user signal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<bool>,
}

/// Complete output structure for JSON serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}
