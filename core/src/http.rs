//! HTTP transport types shared by the builder and the executor.
//!
//! # Design
//! Requests are plain data. The builder produces an `HttpRequest` without
//! touching the network and the client replays it against its pooled agent,
//! so every build step can be asserted on directly in tests. A built request
//! is never mutated afterwards.

use url::form_urlencoded;

/// `Content-Type` of a form-encoded body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
/// `Content-Type` of a JSON body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// `Content-Type` of a raw text body.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Form fields in the order they will be encoded.
    Form(Vec<(String, String)>),
    /// Already-encoded content sent verbatim.
    Raw { content_type: String, content: String },
}

impl RequestBody {
    pub fn content_type(&self) -> &str {
        match self {
            RequestBody::Form(_) => FORM_CONTENT_TYPE,
            RequestBody::Raw { content_type, .. } => content_type,
        }
    }

    /// Render the body as it goes on the wire.
    pub fn encode(&self) -> String {
        match self {
            RequestBody::Form(pairs) => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish(),
            RequestBody::Raw { content, .. } => content.clone(),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by the functions in [`crate::request`] and executed by
/// [`crate::EnvelopeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
