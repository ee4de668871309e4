//! HTTP retrieval with a bounded, fixed-delay retry.
//!
//! [`Fetch`] is the seam between content loading and the network. The
//! production implementation, [`HttpFetcher`], wraps a blocking `reqwest`
//! client; tests substitute a scripted fetcher so no request ever leaves the
//! process.
//!
//! Retries are sequential: one attempt fully completes before the delay and
//! the next attempt. The delay is fixed (no jitter, no exponential growth).

use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Retrieve the body of a URL as text. A non-success status is an error.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        (**self).get(url)
    }
}

/// Blocking HTTP client used for remote content.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(transport)
    }
}

/// How many times to re-attempt a failed fetch, and how long to wait first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-attempts after the initial one.
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Total attempts, initial one included.
    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }
}

/// GET `url`, retrying on any failure until the policy is exhausted.
///
/// The last error is returned once every attempt has failed.
pub fn fetch_with_retry<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
    policy: RetryPolicy,
) -> Result<String, FetchError> {
    let mut remaining = policy.retries;
    loop {
        match fetcher.get(url) {
            Ok(body) => {
                debug!(url, bytes = body.len(), "fetched");
                return Ok(body);
            }
            Err(e) if remaining > 0 => {
                warn!(url, retries_left = remaining, error = %e, "fetch failed, retrying");
                remaining -= 1;
                thread::sleep(policy.delay);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    /// In-memory fetcher. Each URL has a queue of scripted responses; the
    /// last one repeats once the queue drains. Unknown URLs return 404.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        responses: RefCell<HashMap<String, VecDeque<Result<String, u16>>>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, url: &str, body: &str) -> Self {
            self.script(url, Ok(body.to_string()))
        }

        pub fn fail(self, url: &str, status: u16) -> Self {
            self.script(url, Err(status))
        }

        fn script(self, url: &str, response: Result<String, u16>) -> Self {
            self.responses
                .borrow_mut()
                .entry(url.to_string())
                .or_default()
                .push_back(response);
            self
        }

        pub fn call_count(&self, url: &str) -> usize {
            self.calls.borrow().iter().filter(|u| *u == url).count()
        }
    }

    impl Fetch for ScriptedFetcher {
        fn get(&self, url: &str) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            let mut responses = self.responses.borrow_mut();
            let response = match responses.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };
            match response {
                Some(Ok(body)) => Ok(body),
                Some(Err(status)) => Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    pub fn no_delay() -> RetryPolicy {
        RetryPolicy {
            retries: 3,
            delay: Duration::ZERO,
        }
    }

    const URL: &str = "https://example.com/content/projects/index.json";

    #[test]
    fn default_policy_is_three_retries_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retries, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn first_attempt_success_makes_one_call() {
        let fetcher = ScriptedFetcher::new().respond(URL, "[]");
        assert_eq!(fetch_with_retry(&fetcher, URL, no_delay()).unwrap(), "[]");
        assert_eq!(fetcher.call_count(URL), 1);
    }

    #[test]
    fn fails_twice_then_succeeds() {
        let fetcher = ScriptedFetcher::new()
            .fail(URL, 503)
            .fail(URL, 500)
            .respond(URL, "ok");
        assert_eq!(fetch_with_retry(&fetcher, URL, no_delay()).unwrap(), "ok");
        assert_eq!(fetcher.call_count(URL), 3);
    }

    #[test]
    fn gives_up_after_retries_exhausted() {
        let fetcher = ScriptedFetcher::new().fail(URL, 502);
        let err = fetch_with_retry(&fetcher, URL, no_delay()).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 502, .. }));
        assert_eq!(fetcher.call_count(URL), 4);
    }

    #[test]
    fn success_on_last_allowed_attempt() {
        let fetcher = ScriptedFetcher::new()
            .fail(URL, 500)
            .fail(URL, 500)
            .fail(URL, 500)
            .respond(URL, "late");
        assert_eq!(fetch_with_retry(&fetcher, URL, no_delay()).unwrap(), "late");
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let fetcher = ScriptedFetcher::new().fail(URL, 500).respond(URL, "never");
        let policy = RetryPolicy {
            retries: 0,
            delay: Duration::ZERO,
        };
        assert!(fetch_with_retry(&fetcher, URL, policy).is_err());
        assert_eq!(fetcher.call_count(URL), 1);
    }

    #[test]
    fn delay_is_applied_between_attempts() {
        let fetcher = ScriptedFetcher::new().fail(URL, 500).respond(URL, "ok");
        let policy = RetryPolicy {
            retries: 1,
            delay: Duration::from_millis(20),
        };
        let start = std::time::Instant::now();
        fetch_with_retry(&fetcher, URL, policy).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn error_messages_name_the_url() {
        let err = FetchError::Status {
            url: URL.to_string(),
            status: 404,
        };
        assert!(err.to_string().contains("index.json"));
        assert!(err.to_string().contains("404"));
    }
}
