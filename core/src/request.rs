//! Request builders.
//!
//! # Design
//! Every builder is a pure function of its inputs: it validates the URL and
//! headers, encodes the body and returns an immutable [`HttpRequest`]. Map
//! inputs are emitted in ascending key order so the same inputs always build
//! the same request. When a body is present its content type wins over any
//! caller-supplied `Content-Type` header.

use std::collections::HashMap;

use ::http::{HeaderName, HeaderValue};
use serde::Serialize;
use url::Url;

use crate::error::BuildError;
use crate::http::{HttpMethod, HttpRequest, RequestBody, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE};

/// Build a form POST from ordered pairs. Pairs without a value are skipped.
pub fn build_form<K, V>(
    url: &str,
    headers: Option<&HashMap<String, String>>,
    params: &[(K, Option<V>)],
) -> Result<HttpRequest, BuildError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let pairs = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|value| (key.as_ref().to_string(), value.as_ref().to_string()))
        })
        .collect();
    post(url, headers, RequestBody::Form(pairs))
}

/// Build a form POST from a map. Entries without a value are skipped.
pub fn build_form_map(
    url: &str,
    headers: Option<&HashMap<String, String>>,
    params: &HashMap<String, Option<String>>,
) -> Result<HttpRequest, BuildError> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|value| (key.clone(), value.clone())))
        .collect();
    pairs.sort();
    post(url, headers, RequestBody::Form(pairs))
}

/// Build a POST whose body is `payload` serialized as JSON.
pub fn build_json<T: Serialize + ?Sized>(
    url: &str,
    headers: Option<&HashMap<String, String>>,
    payload: &T,
) -> Result<HttpRequest, BuildError> {
    let json = serde_json::to_string(payload)?;
    build_json_str(url, headers, &json)
}

/// Build a POST carrying an already-formatted JSON document.
pub fn build_json_str(
    url: &str,
    headers: Option<&HashMap<String, String>>,
    json: &str,
) -> Result<HttpRequest, BuildError> {
    post(
        url,
        headers,
        RequestBody::Raw {
            content_type: JSON_CONTENT_TYPE.to_string(),
            content: json.to_string(),
        },
    )
}

/// Build a POST whose body is `text` as `text/plain`.
pub fn build_raw(
    url: &str,
    headers: Option<&HashMap<String, String>>,
    text: &str,
) -> Result<HttpRequest, BuildError> {
    post(
        url,
        headers,
        RequestBody::Raw {
            content_type: TEXT_CONTENT_TYPE.to_string(),
            content: text.to_string(),
        },
    )
}

/// Build a GET with `params` appended to the query string.
///
/// `None` leaves the URL as given; existing query parameters are kept.
pub fn build_get(
    url: &str,
    headers: Option<&HashMap<String, String>>,
    params: Option<&HashMap<String, String>>,
) -> Result<HttpRequest, BuildError> {
    let mut parsed = parse_url(url)?;
    if let Some(params) = params.filter(|params| !params.is_empty()) {
        let mut sorted: Vec<(&String, &String)> = params.iter().collect();
        sorted.sort();
        parsed.query_pairs_mut().extend_pairs(sorted);
    }
    Ok(HttpRequest {
        method: HttpMethod::Get,
        url: parsed.into(),
        headers: collect_headers(headers, false)?,
        body: None,
    })
}

fn post(
    url: &str,
    headers: Option<&HashMap<String, String>>,
    body: RequestBody,
) -> Result<HttpRequest, BuildError> {
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url: parse_url(url)?.into(),
        headers: collect_headers(headers, true)?,
        body: Some(body),
    })
}

fn parse_url(url: &str) -> Result<Url, BuildError> {
    Url::parse(url).map_err(|source| BuildError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

fn collect_headers(
    headers: Option<&HashMap<String, String>>,
    has_body: bool,
) -> Result<Vec<(String, String)>, BuildError> {
    let Some(headers) = headers else {
        return Ok(Vec::new());
    };
    let mut collected = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(value).is_err() {
            return Err(BuildError::InvalidHeader { name: name.clone() });
        }
        if has_body && name.eq_ignore_ascii_case("content-type") {
            continue;
        }
        collected.push((name.clone(), value.clone()));
    }
    collected.sort();
    Ok(collected)
}
