use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn post(uri: &str, content_type: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, content_type)
        .body(body.to_string())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_reports_query_and_method() {
    let resp = app().oneshot(get("/echo?page=2&q=a+b")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["success"], true);
    let echo: Echo = serde_json::from_value(envelope["data"].clone()).unwrap();
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.query["page"], "2");
    assert_eq!(echo.query["q"], "a b");
    assert!(echo.body.is_empty());
}

#[tokio::test]
async fn echo_reports_form_body_and_headers() {
    let mut req = post("/echo", "application/x-www-form-urlencoded", "a=1&b=two+words");
    req.headers_mut().insert("x-trace", "t1".parse().unwrap());
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    let echo: Echo = serde_json::from_value(envelope["data"].clone()).unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
    assert_eq!(echo.body, "a=1&b=two+words");
    assert_eq!(echo.headers["x-trace"], "t1");
}

#[tokio::test]
async fn echo_json_wraps_payload_in_data() {
    let resp = app()
        .oneshot(post("/echo/json", "application/json", r#"{"id":7,"tags":["a"]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["code"], "0");
    assert_eq!(envelope["data"]["id"], 7);
    assert_eq!(envelope["data"]["tags"][0], "a");
}

#[tokio::test]
async fn echo_json_rejects_non_json_content_type() {
    let resp = app().oneshot(post("/echo/json", "text/plain", "{}")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

// --- fixed envelopes ---

#[tokio::test]
async fn fixed_envelopes() {
    let ok: Value = body_json(app().oneshot(get("/envelope/ok")).await.unwrap()).await;
    assert_eq!(ok["data"]["x"], 1);

    let fail: Value = body_json(app().oneshot(get("/envelope/fail")).await.unwrap()).await;
    assert_eq!(fail["success"], false);
    assert_eq!(fail["msg"], "bad input");

    let flat: Value = body_json(app().oneshot(get("/envelope/flat")).await.unwrap()).await;
    assert_eq!(flat["name"], "widget");
    assert_eq!(flat["count"], 3);
}

// --- error statuses and bad bodies ---

#[tokio::test]
async fn status_route_returns_requested_status() {
    let resp = app().oneshot(get("/status/503")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["msg"], "rejected by server");
}

#[tokio::test]
async fn status_route_rejects_non_numeric_code() {
    let resp = app().oneshot(get("/status/teapot")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_plain_text() {
    let resp = app().oneshot(get("/malformed")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&body).is_err());
}

#[tokio::test]
async fn slow_without_delay_answers_immediately() {
    let resp = app().oneshot(get("/slow")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["success"], true);
}

#[tokio::test]
async fn large_pads_data_to_requested_length() {
    let resp = app().oneshot(get("/large?bytes=4096")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["data"].as_str().map(str::len), Some(4096));
}

#[tokio::test]
async fn latin1_body_is_not_utf8() {
    let resp = app().oneshot(get("/latin1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert!(std::str::from_utf8(&body).is_err());
    assert!(body.ends_with(b"caf\xe9\"}"));
}
