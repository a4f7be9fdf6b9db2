//! Jenkins JSON API client
//!
//! Thin, purpose-built blocking client for the handful of endpoints the
//! report needs: job info (last completed build), per-build metadata,
//! console text and the job list. Uses `tree=` projections to keep the
//! payloads small.

use super::{BuildServer, ServerError};
use crate::models::{BuildInfo, BuildRef, BuildResult};
use crate::settings::ServerSettings;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("buildtriage/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking Jenkins client with basic auth.
#[derive(Debug, Clone)]
pub struct JenkinsServer {
    http: reqwest::blocking::Client,
    base: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct JobPayload {
    #[serde(rename = "lastCompletedBuild")]
    last_completed_build: Option<BuildRefPayload>,
}

#[derive(Debug, Deserialize)]
struct BuildRefPayload {
    number: u32,
    url: String,
}

#[derive(Debug, Deserialize)]
struct BuildPayload {
    number: u32,
    /// Null while a build is still running.
    result: Option<String>,
    /// Build start time, epoch milliseconds.
    timestamp: i64,
    url: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobListPayload {
    jobs: Vec<JobNamePayload>,
}

#[derive(Debug, Deserialize)]
struct JobNamePayload {
    name: String,
}

fn to_build_info(job: &str, payload: BuildPayload) -> Result<BuildInfo, ServerError> {
    let timestamp = DateTime::from_timestamp_millis(payload.timestamp).ok_or_else(|| {
        ServerError::BadTimestamp {
            job: job.to_string(),
            number: payload.number,
            millis: payload.timestamp,
        }
    })?;
    // A null result means the build has not reached a terminal state yet;
    // it counts as non-success downstream.
    let result = payload
        .result
        .map_or(BuildResult::Other("UNKNOWN".to_string()), BuildResult::from);
    Ok(BuildInfo {
        job: job.to_string(),
        number: payload.number,
        result,
        timestamp,
        url: payload.url,
        display_name: payload.display_name,
    })
}

impl JenkinsServer {
    pub fn connect(settings: &ServerSettings) -> Result<Self, ServerError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(JenkinsServer {
            http,
            base: settings.url.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ServerError> {
        Ok(self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()?)
    }

    /// GET a JSON endpoint. Ok(None) on 404 so callers can map "not found"
    /// to the right domain error.
    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Option<T>, ServerError> {
        let response = self.get(url)?;
        match response.status().as_u16() {
            200 => Ok(Some(response.json()?)),
            404 => Ok(None),
            status => Err(ServerError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

impl BuildServer for JenkinsServer {
    fn last_completed_build(&self, job: &str) -> Result<Option<BuildRef>, ServerError> {
        let url = format!(
            "{}/job/{}/api/json?tree=lastCompletedBuild[number,url]",
            self.base, job
        );
        let payload: JobPayload = self
            .get_json(&url)?
            .ok_or_else(|| ServerError::JobNotFound(job.to_string()))?;
        Ok(payload.last_completed_build.map(|b| BuildRef {
            number: b.number,
            url: b.url,
        }))
    }

    fn build_info(&self, job: &str, number: u32) -> Result<BuildInfo, ServerError> {
        let url = format!("{}/job/{}/{}/api/json", self.base, job, number);
        let payload: BuildPayload =
            self.get_json(&url)?
                .ok_or_else(|| ServerError::BuildNotFound {
                    job: job.to_string(),
                    number,
                })?;
        to_build_info(job, payload)
    }

    fn console_text(&self, job: &str, number: u32) -> Result<String, ServerError> {
        let url = format!("{}/job/{}/{}/consoleText", self.base, job, number);
        let response = self.get(&url)?;
        match response.status().as_u16() {
            200 => Ok(response.text()?),
            404 => Err(ServerError::BuildNotFound {
                job: job.to_string(),
                number,
            }),
            status => Err(ServerError::Status { status, url }),
        }
    }

    fn list_jobs(&self) -> Result<Vec<String>, ServerError> {
        let url = format!("{}/api/json?tree=jobs[name]", self.base);
        let payload: JobListPayload =
            self.get_json(&url)?.ok_or_else(|| ServerError::Status {
                status: 404,
                url: url.clone(),
            })?;
        Ok(payload.jobs.into_iter().map(|j| j.name).collect())
    }
}
