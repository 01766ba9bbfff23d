//! Blocking executor for built requests.
//!
//! # Design
//! `EnvelopeClient` owns a single pooled `ureq::Agent`. It is built once from
//! a [`ClientConfig`] and cloned or shared by reference wherever requests are
//! issued; clones share the pool. Nothing here ever returns an error to the
//! caller: transport, decode and extractor failures are logged and collapsed
//! into a failed [`ApiResponse`], `None` or `-1`.
//!
//! A non-2xx status short-circuits the structured executors before the body
//! is read. Callers who need the body of an error response use
//! [`EnvelopeClient::execute_raw`].
//!
//! Bodies are read up to [`ClientConfig::max_body_bytes`] and decoded as
//! UTF-8 with invalid sequences replaced by U+FFFD, so a mislabelled charset
//! never turns a readable body into a transport failure.

use std::fmt;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use ureq::http::Response;
use ureq::Body;

use crate::config::ClientConfig;
use crate::decode::{decode_flat_response, decode_response};
use crate::envelope::{ApiResponse, Extractors, Failure};
use crate::error::DecodeError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Status returned by [`EnvelopeClient::execute_for_status`] when no
/// response was received.
pub const NO_STATUS: i32 = -1;

/// Shared, pooled HTTP client that decodes JSON envelopes.
#[derive(Clone)]
pub struct EnvelopeClient {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl EnvelopeClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            agent: config.agent(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute `request` and decode the data element located by
    /// `extractors` into `T`.
    pub fn execute<T: DeserializeOwned>(&self, request: &HttpRequest, extractors: &Extractors) -> ApiResponse<T> {
        self.timed(request, |client| {
            client.exchange(request, |response| decode_response(response, extractors))
        })
    }

    /// Execute `request` and decode the whole envelope, minus `code`, into `T`.
    ///
    /// Only the success and message extractors are consulted.
    pub fn execute_flat<T: DeserializeOwned>(&self, request: &HttpRequest, extractors: &Extractors) -> ApiResponse<T> {
        self.timed(request, |client| {
            client.exchange(request, |response| decode_flat_response(response, extractors))
        })
    }

    /// Execute `request` and return the body text whatever the status.
    pub fn execute_raw(&self, request: &HttpRequest) -> Option<String> {
        self.timed(request, |client| {
            match client.send(request).and_then(|mut response| client.read_body(&mut response)) {
                Ok(body) => Some(body),
                Err(err) => {
                    error!(url = %request.url, error = %err, "raw request failed");
                    None
                }
            }
        })
    }

    /// Execute `request` and return its HTTP status, or [`NO_STATUS`].
    pub fn execute_for_status(&self, request: &HttpRequest) -> i32 {
        self.timed(request, |client| match client.send(request) {
            Ok(response) => i32::from(response.status().as_u16()),
            Err(err) => {
                error!(url = %request.url, error = %err, "status request failed");
                NO_STATUS
            }
        })
    }

    fn timed<R>(&self, request: &HttpRequest, call: impl FnOnce(&Self) -> R) -> R {
        let started = Instant::now();
        let result = call(self);
        debug!(
            method = ?request.method,
            url = %request.url,
            elapsed = ?started.elapsed(),
            "request finished"
        );
        result
    }

    fn exchange<T, F>(&self, request: &HttpRequest, decode: F) -> ApiResponse<T>
    where
        F: FnOnce(&HttpResponse) -> Result<ApiResponse<T>, DecodeError>,
    {
        let mut response = match self.send(request) {
            Ok(response) => response,
            Err(err) => {
                error!(url = %request.url, error = %err, "request failed");
                return ApiResponse::system_busy(Failure::Transport);
            }
        };

        let status = response.status();
        if !status.is_success() {
            // The body is dropped unread; see `execute_raw` for error bodies.
            warn!(url = %request.url, status = status.as_u16(), "non-success status");
            return ApiResponse::rejected(status.as_u16());
        }

        let body = match self.read_body(&mut response) {
            Ok(body) => body,
            Err(err) => {
                error!(url = %request.url, error = %err, "failed to read response body");
                return ApiResponse::system_busy(Failure::Transport);
            }
        };

        let exchanged = HttpResponse {
            status: status.as_u16(),
            body,
        };
        decode(&exchanged).unwrap_or_else(|err| {
            error!(url = %request.url, error = %err, "failed to decode response envelope");
            ApiResponse::system_busy(Failure::from(&err))
        })
    }

    fn read_body(&self, response: &mut Response<Body>) -> Result<String, ureq::Error> {
        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.config.max_body_bytes)
            .read_to_vec()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn send(&self, request: &HttpRequest) -> Result<Response<Body>, ureq::Error> {
        match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => {
                        let payload = body.encode();
                        builder.content_type(body.content_type()).send(payload.as_bytes())
                    }
                    None => builder.send_empty(),
                }
            }
        }
    }
}

impl Default for EnvelopeClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl fmt::Debug for EnvelopeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::TcpListener;

    use crate::request::{build_get, build_raw};

    /// An address nothing is listening on.
    fn closed_addr() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/")
    }

    fn client() -> EnvelopeClient {
        EnvelopeClient::new(ClientConfig {
            connect_timeout_ms: 500,
            ..ClientConfig::default()
        })
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<EnvelopeClient>();
    }

    #[test]
    fn refused_connection_collapses_to_system_busy() {
        let req = build_get(&closed_addr(), None, None).unwrap();
        let resp: ApiResponse<serde_json::Value> = client().execute(&req, &Extractors::conventional());
        assert!(!resp.success);
        assert_eq!(resp.msg.as_deref(), Some(crate::SYSTEM_BUSY));
        assert_eq!(resp.failure, Some(Failure::Transport));
    }

    #[test]
    fn refused_connection_sentinels() {
        let c = client();
        let req = build_raw(&closed_addr(), None, "ping").unwrap();
        assert_eq!(c.execute_raw(&req), None);
        assert_eq!(c.execute_for_status(&req), NO_STATUS);
        let flat: ApiResponse<serde_json::Value> = c.execute_flat(&req, &Extractors::conventional());
        assert_eq!(flat.failure, Some(Failure::Transport));
    }

    #[test]
    fn debug_shows_config() {
        let rendered = format!("{:?}", EnvelopeClient::default());
        assert!(rendered.contains("max_idle_connections: 2000"));
    }
}
