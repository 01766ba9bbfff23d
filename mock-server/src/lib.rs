use std::{collections::BTreeMap, time::Duration};

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What the echo route saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub query: BTreeMap<String, String>,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Deserialize)]
pub struct Delay {
    #[serde(default)]
    pub ms: u64,
}

#[derive(Deserialize)]
pub struct Size {
    #[serde(default)]
    pub bytes: usize,
}

/// Envelope routes:
///
/// - `/echo`: `{success, code, data: Echo}` for any method
/// - `/echo/json`: the posted JSON document echoed under `data`
/// - `/envelope/ok`, `/envelope/fail`, `/envelope/flat`: fixed envelopes
/// - `/status/{code}`: that status with a failure envelope body
/// - `/malformed`, `/array`: 200 with a body that is not a JSON object
/// - `/slow?ms=N`: a success envelope after `N` milliseconds
/// - `/large?bytes=N`: a success envelope whose `data` is an `N`-character string
/// - `/latin1`: a failure envelope encoded as ISO-8859-1, not UTF-8
pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/json", post(echo_json))
        .route("/envelope/ok", get(envelope_ok))
        .route("/envelope/fail", get(envelope_fail))
        .route("/envelope/flat", get(envelope_flat))
        .route("/status/{code}", any(status))
        .route("/malformed", get(malformed))
        .route("/array", get(array))
        .route("/slow", get(slow))
        .route("/large", get(large))
        .route("/latin1", get(latin1))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success(data: Value) -> Json<Value> {
    Json(json!({"success": true, "code": "0", "data": data}))
}

async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    let echo = Echo {
        method: method.to_string(),
        query,
        content_type,
        headers,
        body,
    };
    success(json!(echo))
}

async fn echo_json(Json(payload): Json<Value>) -> Json<Value> {
    success(payload)
}

async fn envelope_ok() -> Json<Value> {
    success(json!({"x": 1}))
}

async fn envelope_fail() -> Json<Value> {
    Json(json!({"success": false, "code": "E42", "msg": "bad input"}))
}

async fn envelope_flat() -> Json<Value> {
    Json(json!({"success": true, "code": "0", "name": "widget", "count": 3}))
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({"success": false, "code": code.to_string(), "msg": "rejected by server"})),
    )
}

async fn malformed() -> &'static str {
    "this is not json"
}

async fn array() -> Json<Value> {
    Json(json!([1, 2, 3]))
}

async fn slow(Query(delay): Query<Delay>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(delay.ms)).await;
    success(json!({"x": 1}))
}

async fn large(Query(size): Query<Size>) -> Json<Value> {
    success(Value::String("a".repeat(size.bytes)))
}

async fn latin1() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json; charset=iso-8859-1")],
        b"{\"success\":false,\"code\":\"E7\",\"msg\":\"caf\xe9\"}".to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_with_all_fields() {
        let echo = Echo {
            method: "POST".to_string(),
            query: BTreeMap::from([("a".to_string(), "1".to_string())]),
            content_type: Some("text/plain".to_string()),
            headers: BTreeMap::new(),
            body: "ping".to_string(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["query"]["a"], "1");
        assert_eq!(json["content_type"], "text/plain");
        assert_eq!(json["body"], "ping");
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "GET".to_string(),
            query: BTreeMap::new(),
            content_type: None,
            headers: BTreeMap::from([("x-token".to_string(), "t".to_string())]),
            body: String::new(),
        };
        let back: Echo = serde_json::from_value(serde_json::to_value(&echo).unwrap()).unwrap();
        assert_eq!(back, echo);
    }

    #[test]
    fn delay_defaults_to_zero() {
        let delay: Delay = serde_json::from_str("{}").unwrap();
        assert_eq!(delay.ms, 0);
    }

    #[test]
    fn size_defaults_to_zero() {
        let size: Size = serde_json::from_str("{}").unwrap();
        assert_eq!(size.bytes, 0);
    }

    #[test]
    fn success_envelope_shape() {
        let Json(value) = success(json!({"k": "v"}));
        assert_eq!(value, json!({"success": true, "code": "0", "data": {"k": "v"}}));
    }
}
