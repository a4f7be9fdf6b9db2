//! Build history walk
//!
//! Walks a job's build history backward from the most recently completed
//! build, deciding per build whether it belongs in the report and whether to
//! keep walking. The walk is lazy: each step is one blocking metadata fetch,
//! and the continuation decision depends on the fetched build's own
//! timestamp, so the walk cannot be parallelized by number range.

use crate::models::{BuildDecision, ReportWindow};
use crate::server::{BuildServer, ServerError};
use tracing::warn;

/// Walk state: the next number to fetch, or done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fetch(u32),
    Done,
}

/// Lazy backward walk over a job's build history.
///
/// Inclusion and continuation use the same cutoff comparison, so the first
/// build older than the window is visited exactly once, excluded, and then
/// the walk stops. Missing build numbers are skipped (CI servers prune old
/// builds); any other server error is yielded and terminates the walk.
pub struct Walk<'a, S: BuildServer + ?Sized> {
    server: &'a S,
    job: &'a str,
    window: ReportWindow,
    state: State,
    skipped_missing: usize,
}

/// Start a walk at the job's most recently completed build. A job that has
/// never completed a build yields an empty walk.
pub fn walk_history<'a, S: BuildServer + ?Sized>(
    server: &'a S,
    job: &'a str,
    window: ReportWindow,
) -> Result<Walk<'a, S>, ServerError> {
    let state = match server.last_completed_build(job)? {
        Some(last) => State::Fetch(last.number),
        None => State::Done,
    };
    Ok(Walk {
        server,
        job,
        window,
        state,
        skipped_missing: 0,
    })
}

impl<S: BuildServer + ?Sized> Walk<'_, S> {
    /// Missing build numbers skipped so far.
    pub fn skipped_missing(&self) -> usize {
        self.skipped_missing
    }

    fn descend(&self, number: u32) -> State {
        if number > 1 {
            State::Fetch(number - 1)
        } else {
            State::Done
        }
    }
}

impl<S: BuildServer + ?Sized> Iterator for Walk<'_, S> {
    type Item = Result<BuildDecision, ServerError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let number = match self.state {
                State::Fetch(n) => n,
                State::Done => return None,
            };
            match self.server.build_info(self.job, number) {
                Ok(info) => {
                    // Inclusion is decided first; only then is the stop
                    // condition evaluated, on the same timestamp.
                    let included = self.window.includes(&info);
                    self.state = if self.window.covers(info.timestamp) {
                        self.descend(number)
                    } else {
                        State::Done
                    };
                    return Some(Ok(BuildDecision { info, included }));
                }
                Err(ServerError::BuildNotFound { .. }) => {
                    warn!(job = self.job, number, "build metadata missing, skipping");
                    self.skipped_missing += 1;
                    self.state = self.descend(number);
                }
                Err(err) => {
                    self.state = State::Done;
                    return Some(Err(err));
                }
            }
        }
    }
}
