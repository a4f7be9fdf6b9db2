#![allow(dead_code)]

use buildtriage::models::{BuildInfo, BuildRef, BuildResult};
use buildtriage::server::{BuildServer, ServerError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// One scripted build: metadata plus optional console text. A build without
/// console text makes the console fetch fail, exercising the
/// log-unavailable path.
pub struct FakeBuild {
    pub info: BuildInfo,
    pub console: Option<String>,
}

/// In-memory CI server with a scripted build history for one job. Records
/// every remote call so tests can assert on walk behavior (what was
/// fetched, and crucially what was not).
#[derive(Default)]
pub struct FakeServer {
    pub job: String,
    builds: BTreeMap<u32, FakeBuild>,
    pub info_fetches: Mutex<Vec<u32>>,
    pub console_fetches: Mutex<Vec<u32>>,
}

impl FakeServer {
    pub fn new(job: &str) -> Self {
        FakeServer {
            job: job.to_string(),
            ..FakeServer::default()
        }
    }

    pub fn add_build(
        &mut self,
        number: u32,
        result: BuildResult,
        timestamp: DateTime<Utc>,
        console: Option<&str>,
    ) {
        self.builds.insert(
            number,
            FakeBuild {
                info: BuildInfo {
                    job: self.job.clone(),
                    number,
                    result,
                    timestamp,
                    url: format!("http://ci/job/{}/{}/", self.job, number),
                    display_name: Some(format!("#{number}")),
                },
                console: console.map(str::to_string),
            },
        );
    }

    pub fn info_fetches(&self) -> Vec<u32> {
        self.info_fetches.lock().unwrap().clone()
    }

    pub fn console_fetches(&self) -> Vec<u32> {
        self.console_fetches.lock().unwrap().clone()
    }
}

impl BuildServer for FakeServer {
    fn last_completed_build(&self, job: &str) -> Result<Option<BuildRef>, ServerError> {
        if job != self.job {
            return Err(ServerError::JobNotFound(job.to_string()));
        }
        Ok(self.builds.keys().next_back().map(|&number| BuildRef {
            number,
            url: format!("http://ci/job/{}/{}/", self.job, number),
        }))
    }

    fn build_info(&self, job: &str, number: u32) -> Result<BuildInfo, ServerError> {
        self.info_fetches.lock().unwrap().push(number);
        self.builds
            .get(&number)
            .map(|b| b.info.clone())
            .ok_or_else(|| ServerError::BuildNotFound {
                job: job.to_string(),
                number,
            })
    }

    fn console_text(&self, job: &str, number: u32) -> Result<String, ServerError> {
        self.console_fetches.lock().unwrap().push(number);
        match self.builds.get(&number) {
            Some(FakeBuild {
                console: Some(text),
                ..
            }) => Ok(text.clone()),
            Some(_) => Err(ServerError::Status {
                status: 500,
                url: format!("http://ci/job/{}/{}/consoleText", job, number),
            }),
            None => Err(ServerError::BuildNotFound {
                job: job.to_string(),
                number,
            }),
        }
    }

    fn list_jobs(&self) -> Result<Vec<String>, ServerError> {
        Ok(vec![self.job.clone()])
    }
}
