//! Purpose: HTTP GET transport feeding the decode pipeline.
//! Exports: `Client`, `canonical_url`.
//! Role: Thin glue over the platform URL-loading stack (ureq); all status and
//! Role: shape policy lives in the pipeline, not here.
//! Invariants: Non-2xx responses are returned as plain envelopes, never as
//! Invariants: transport errors; only connection-level failures error here.
//! Invariants: Batch fetches report per-item results and never abort the
//! Invariants: batch; the aggregate map is returned exactly once, after the
//! Invariants: last request completes.
//! Invariants: No retry, timeout, or cancellation; timeout policy belongs to
//! Invariants: callers.

use crate::error::{Error, ErrorKind};
use crate::json::decode::Decode;
use crate::pipeline::{Response, decode_response};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;
use std::sync::mpsc;
use url::Url;

type FetchResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    agent: ureq::Agent,
    token: Option<String>,
    user_agent: Option<String>,
}

impl Client {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ClientInner {
                agent: ureq::AgentBuilder::new().build(),
                token: None,
                user_agent: None,
            }),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.token = Some(token);
        } else {
            self.inner = Arc::new(ClientInner {
                agent: self.inner.agent.clone(),
                token: Some(token),
                user_agent: self.inner.user_agent.clone(),
            });
        }
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.user_agent = Some(user_agent);
        } else {
            self.inner = Arc::new(ClientInner {
                agent: self.inner.agent.clone(),
                token: self.inner.token.clone(),
                user_agent: Some(user_agent),
            });
        }
        self
    }

    /// Performs one GET and returns the raw envelope. Any HTTP status is a
    /// successful fetch at this layer; the pipeline decides what 404 means.
    pub fn get(&self, url: &str) -> FetchResult<Response> {
        let url = canonical_url(url)?;
        self.get_canonical(&url)
    }

    /// Fetches one URL and runs the decode pipeline on the envelope.
    pub fn fetch<T: Decode>(&self, url: &str) -> FetchResult<T> {
        let url = canonical_url(url)?;
        let response = self.get_canonical(&url)?;
        decode_response(&response).map_err(|err| err.with_url(url.as_str()))
    }

    /// Dispatches every request concurrently and joins on all of them,
    /// returning raw per-item results keyed by canonical URL string. A failed
    /// item occupies its slot in the map; it never aborts the batch.
    pub fn fetch_all<S: AsRef<str>>(
        &self,
        urls: &[S],
    ) -> BTreeMap<String, FetchResult<Response>> {
        let mut results = BTreeMap::new();
        let (event_tx, event_rx) = mpsc::channel::<(String, FetchResult<Response>)>();
        let mut in_flight = 0usize;

        for raw in urls {
            let url = match canonical_url(raw.as_ref()) {
                Ok(url) => url,
                Err(err) => {
                    // Unparseable requests are reported under their raw text.
                    results.insert(raw.as_ref().to_string(), Err(err));
                    continue;
                }
            };
            let key = url.as_str().to_string();
            let client = self.clone();
            let tx = event_tx.clone();
            in_flight += 1;
            let _ = std::thread::spawn(move || {
                let outcome = client.get_canonical(&url);
                let _ = tx.send((key, outcome));
            });
        }
        drop(event_tx);

        for (key, outcome) in event_rx.iter().take(in_flight) {
            results.insert(key, outcome);
        }
        tracing::debug!(count = results.len(), "batch fetch complete");
        results
    }

    pub(crate) fn get_canonical(&self, url: &Url) -> FetchResult<Response> {
        tracing::debug!(url = url.as_str(), "dispatching GET");
        let mut request = self
            .inner
            .agent
            .request("GET", url.as_str())
            .set("Accept", "application/json");
        if let Some(token) = &self.inner.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        if let Some(user_agent) = &self.inner.user_agent {
            request = request.set("User-Agent", user_agent);
        }

        let response = match request.call() {
            Ok(resp) => read_response(resp, url)?,
            Err(ureq::Error::Status(_, resp)) => read_response(resp, url)?,
            Err(ureq::Error::Transport(err)) => {
                return Err(Error::new(ErrorKind::Transport)
                    .with_message("request failed")
                    .with_url(url.as_str())
                    .with_source(err));
            }
        };
        tracing::trace!(
            url = url.as_str(),
            status = response.status,
            bytes = response.body.len(),
            "response received"
        );
        Ok(response)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses and normalizes a request URL. The normalized string is the request
/// identity used to key batch results and image cache entries.
pub fn canonical_url(raw: &str) -> FetchResult<Url> {
    Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid request url")
            .with_url(raw)
            .with_source(err)
    })
}

fn read_response(response: ureq::Response, url: &Url) -> FetchResult<Response> {
    let status = response.status();
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|err| {
            Error::new(ErrorKind::Transport)
                .with_message("failed to read response body")
                .with_url(url.as_str())
                .with_source(err)
        })?;
    Ok(Response { status, body })
}
