use std::thread;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Bounded retry with a fixed backoff between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_secs: 10,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_secs: u64) -> Self {
        Self {
            max_attempts,
            backoff_secs,
        }
    }

    /// Runs `fetch` until it succeeds or the attempts are used up, in which
    /// case the last failure is reported as [`Error::SourceUnavailable`].
    pub fn run<T>(
        &self,
        source_name: &str,
        mut fetch: impl FnMut() -> Result<T, Error>,
    ) -> Result<T, Error> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match fetch() {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts => {
                    return Err(Error::SourceUnavailable {
                        source_name: source_name.to_string(),
                        attempts,
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    warn!(
                        "Fetching {source_name} failed (attempt {attempt}/{attempts}): {err}; \
                         retrying in {}s",
                        self.backoff_secs
                    );
                    thread::sleep(Duration::from_secs(self.backoff_secs));
                    attempt += 1;
                }
            }
        }
    }
}
