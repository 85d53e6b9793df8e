use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use backend_bootstrap::{build_router_with_layers, AppContext};
use backend_domain::{DeliveryError, MailRelay, RuntimeConfig};
use backend_infrastructure::connect_in_memory;

const BASE_URL: &str = "http://rollcall.test";
const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Default)]
struct RecordingRelay {
    fail: bool,
    sent: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl MailRelay for RecordingRelay {
    async fn relay_upload(&self, filename: &str, content: Vec<u8>) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError("535 authentication failed".to_string()));
        }
        self.sent
            .lock()
            .expect("relay lock")
            .push((filename.to_string(), content));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    relay: Arc<RecordingRelay>,
    _export_dir: TempDir,
}

async fn spawn_app(fail_uploads: bool) -> TestApp {
    let export_dir = tempfile::tempdir().expect("tempdir");
    let config = RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        public_base_url: BASE_URL.to_string(),
        token_secret: "test-secret".to_string(),
        token_ttl_minutes: 30,
        password_hash_rounds: 1_000,
        default_event_name: "default".to_string(),
        default_columns: "name".to_string(),
        export_path: export_dir
            .path()
            .join("export.csv")
            .to_string_lossy()
            .to_string(),
        max_body_bytes: MAX_BODY_BYTES,
        request_timeout_seconds: 10,
    };
    let pool = connect_in_memory().await.expect("pool");
    let relay = Arc::new(RecordingRelay {
        fail: fail_uploads,
        ..RecordingRelay::default()
    });
    let context = AppContext::assemble(config, pool, relay.clone())
        .await
        .expect("context");
    TestApp {
        router: build_router_with_layers(context.state),
        relay,
        _export_dir: export_dir,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).expect("utf8"))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };
    request.expect("request")
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).expect("json body")
}

async fn create_record(app: &TestApp, event_name: &str, parameters: Value) -> Value {
    let (status, _, body) = send(
        app,
        json_request(
            "POST",
            "/records/",
            json!({ "event_name": event_name, "parameters": parameters }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    parse(&body)
}

async fn register(app: &TestApp, email: &str, password: &str) -> (StatusCode, String) {
    let (status, _, body) = send(
        app,
        json_request(
            "POST",
            "/event-staff/",
            json!({
                "email": email,
                "password": password,
                "event_name": "CONF",
                "specified_columns": "name"
            }),
        ),
    )
    .await;
    (status, body)
}

async fn token_for(app: &TestApp, email: &str, password: &str) -> String {
    let (status, _, body) = send(
        app,
        form_request(
            "/token",
            &format!("username={}&password={}", email.replace('@', "%40"), password),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let token = parse(&body);
    assert_eq!(token["token_type"], "bearer");
    token["access_token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn login_redirects_to_the_staff_event_with_a_token() {
    let app = spawn_app(false).await;
    let (status, body) = register(&app, "Desk@Example.com", "pw-123").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let staff = parse(&body);
    assert_eq!(staff["email"], "desk@example.com");
    assert!(staff.get("hashed_password").is_none());

    let (status, headers, _) = send(
        &app,
        form_request("/login", "username=desk%40example.com&password=pw-123"),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let location = headers
        .get(header::LOCATION)
        .expect("location")
        .to_str()
        .expect("ascii");
    assert!(location.starts_with("http://rollcall.test/records/CONF/?token=rollcall.v1."));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = spawn_app(false).await;
    register(&app, "desk@example.com", "pw-123").await;

    let wrong_password = send(
        &app,
        form_request("/login", "username=desk%40example.com&password=nope"),
    )
    .await;
    let unknown_email = send(
        &app,
        form_request("/login", "username=ghost%40example.com&password=pw-123"),
    )
    .await;
    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.2, unknown_email.2);
}

#[tokio::test]
async fn duplicate_registration_keeps_the_first_account() {
    let app = spawn_app(false).await;
    let (status, _) = register(&app, "desk@example.com", "first").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = register(&app, "desk@example.com", "second").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse(&body)["error"]
        .as_str()
        .expect("message")
        .contains("already registered"));

    token_for(&app, "desk@example.com", "first").await;
}

#[tokio::test]
async fn staff_endpoints_require_a_live_token() {
    let app = spawn_app(false).await;
    register(&app, "desk@example.com", "pw-123").await;

    let (status, _, _) = send(&app, empty_request("GET", "/event-staff/me/")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, _) = send(&app, authed("GET", "/event-staff/me/", "forged", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = token_for(&app, "desk@example.com", "pw-123").await;
    let (status, _, body) = send(&app, authed("GET", "/event-staff/me/", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["event_name"], "CONF");

    let (status, _, _) = send(&app, authed("DELETE", "/event-staff/me/", &token, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, authed("GET", "/event-staff/me/", &token, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_change_takes_effect_on_next_login() {
    let app = spawn_app(false).await;
    register(&app, "desk@example.com", "old-pw").await;
    let token = token_for(&app, "desk@example.com", "old-pw").await;

    let (status, _, _) = send(
        &app,
        authed(
            "PUT",
            "/event-staff/me/password/",
            &token,
            Some(json!({ "new_password": "new-pw" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(
        &app,
        form_request("/token", "username=desk%40example.com&password=old-pw"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    token_for(&app, "desk@example.com", "new-pw").await;
}

#[tokio::test]
async fn staff_sees_only_their_event_and_columns() {
    let app = spawn_app(false).await;
    register(&app, "desk@example.com", "pw-123").await;
    let token = token_for(&app, "desk@example.com", "pw-123").await;

    create_record(&app, "CONF", json!({ "name": "Ana", "phone": "555-0100" })).await;
    create_record(&app, "EXPO", json!({ "name": "Bo" })).await;

    let (status, _, body) = send(
        &app,
        authed("GET", "/event-staff/me/records/", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = parse(&body);
    let records = records.as_array().expect("array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["parameters"], json!({ "name": "Ana" }));
}

#[tokio::test]
async fn record_lifecycle_by_code() {
    let app = spawn_app(false).await;
    create_record(&app, "CONF", json!({ "name": "Ana" })).await;
    create_record(&app, "CONF", json!({ "name": "Bo" })).await;
    let lee = create_record(&app, "CONF", json!({ "name": "Lee" })).await;
    assert_eq!(lee["id"], 3);
    assert_eq!(lee["code"], Value::Null);
    assert_eq!(lee["signed_in"], Value::Null);

    let (status, _, body) = send(&app, empty_request("PUT", "/update_codes/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({ "updated": 3 }));
    let (_, _, body) = send(&app, empty_request("PUT", "/update_codes/")).await;
    assert_eq!(parse(&body), json!({ "updated": 0 }));

    let (status, _, body) = send(&app, empty_request("GET", "/record/CONF-0003/")).await;
    assert_eq!(status, StatusCode::OK);
    let flattened = parse(&body);
    assert_eq!(flattened["name"], "Lee");
    assert_eq!(flattened["event_name"], "CONF");
    assert_eq!(flattened["code"], "CONF-0003");

    let (status, _, body) = send(&app, empty_request("GET", "/record/id/3/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["parameters"]["name"], "Lee");

    let (status, _, _) = send(
        &app,
        json_request(
            "PUT",
            "/record/CONF-0003/update_status/",
            json!({ "flag": "not_a_flag", "value": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, _, body) = send(&app, empty_request("GET", "/record/CONF-0003/")).await;
    let unchanged = parse(&body);
    assert_eq!(unchanged["signed_in"], Value::Null);
    assert_eq!(unchanged["signed_out"], Value::Null);

    let (status, _, body) = send(
        &app,
        json_request(
            "PUT",
            "/record/CONF-0003/update_status/",
            json!({ "flag": "signed_in", "value": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let record = parse(&body);
    assert_eq!(record["signed_in"], true);
    assert_eq!(record["signed_out"], Value::Null);

    let (status, _, body) = send(
        &app,
        json_request(
            "PUT",
            "/record/CONF-0003/",
            json!({ "parameters": { "name": "Lee R." } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let record = parse(&body);
    assert_eq!(record["parameters"]["name"], "Lee R.");
    assert_eq!(record["signed_in"], true);

    let (status, _, _) = send(&app, empty_request("DELETE", "/record/CONF-0003/")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, empty_request("DELETE", "/record/CONF-0003/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reserved_parameter_keys_are_rejected() {
    let app = spawn_app(false).await;
    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/records/",
            json!({ "event_name": "CONF", "parameters": { "code": "FAKE-0001" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
}

#[tokio::test]
async fn event_listing_answers_get_and_post() {
    let app = spawn_app(false).await;
    create_record(&app, "CONF", json!({ "name": "Ana" })).await;
    create_record(&app, "EXPO", json!({ "name": "Bo" })).await;

    for method in ["GET", "POST"] {
        let (status, _, body) = send(&app, empty_request(method, "/records/EXPO/")).await;
        assert_eq!(status, StatusCode::OK);
        let records = parse(&body);
        assert_eq!(records.as_array().expect("array").len(), 1);
        assert_eq!(records[0]["parameters"]["name"], "Bo");
    }

    let (_, _, body) = send(&app, empty_request("GET", "/records/")).await;
    assert_eq!(parse(&body).as_array().expect("array").len(), 2);
}

#[tokio::test]
async fn export_then_download_the_latest_column() {
    let app = spawn_app(false).await;
    let (status, _, _) = send(&app, empty_request("GET", "/download_csv/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, empty_request("GET", "/create_csv/?column=code")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    create_record(&app, "CONF", json!({ "name": "Ana" })).await;
    create_record(&app, "CONF", json!({ "name": "Bo" })).await;
    send(&app, empty_request("PUT", "/update_codes/")).await;

    let (status, _, _) = send(
        &app,
        empty_request("GET", "/create_csv/?column=code;DROP%20TABLE%20records"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(&app, empty_request("GET", "/create_csv/?column=code")).await;
    assert_eq!(status, StatusCode::OK);
    let summary = parse(&body);
    assert_eq!(summary["column"], "code");
    assert_eq!(summary["rows"], 2);

    let (status, headers, body) = send(&app, empty_request("GET", "/download_csv/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers
        .get(header::CONTENT_TYPE)
        .expect("content type")
        .to_str()
        .expect("ascii")
        .starts_with("text/csv"));
    assert_eq!(body, "code\nCONF-0001\nCONF-0002\n");
}

fn multipart_upload(filename: &str, content: &str) -> Request<Body> {
    let boundary = "rollcall-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/upload_csv/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn upload_is_relayed_by_mail() {
    let app = spawn_app(false).await;
    let (status, _, body) = send(&app, multipart_upload("guests.csv", "name\nAna\n")).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(parse(&body)["filename"], "guests.csv");

    let sent = app.relay.sent.lock().expect("relay lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "guests.csv");
    assert_eq!(sent[0].1, b"name\nAna\n".to_vec());
}

#[tokio::test]
async fn uploads_up_to_the_configured_body_limit_are_accepted() {
    let app = spawn_app(false).await;
    let row = "Ana,ana@example.com\n";
    let content = row.repeat(3 * 1024 * 1024 / row.len());
    let (status, _, body) = send(&app, multipart_upload("guests.csv", &content)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let sent = app.relay.sent.lock().expect("relay lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.len(), content.len());
}

#[tokio::test]
async fn uploads_over_the_body_limit_are_rejected_as_too_large() {
    let app = spawn_app(false).await;
    let content = "x".repeat(MAX_BODY_BYTES as usize + 1024);
    let (status, _, _) = send(&app, multipart_upload("guests.csv", &content)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.relay.sent.lock().expect("relay lock").is_empty());
}

#[tokio::test]
async fn failed_relay_is_a_server_error_with_message() {
    let app = spawn_app(true).await;
    let (status, _, body) = send(&app, multipart_upload("guests.csv", "name\nAna\n")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(parse(&body)["error"]
        .as_str()
        .expect("message")
        .contains("authentication failed"));

    let (_, _, metrics) = send(&app, empty_request("GET", "/ops/metrics/prometheus")).await;
    assert!(metrics.contains("rollcall_upload_failures_total 1\n"));
}

#[tokio::test]
async fn health_and_metrics_are_served() {
    let app = spawn_app(false).await;
    let (status, _, _) = send(&app, empty_request("GET", "/ops/health/live")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&app, empty_request("GET", "/ops/health/ready")).await;
    assert_eq!(status, StatusCode::OK);

    create_record(&app, "CONF", json!({})).await;
    let (status, _, body) = send(&app, empty_request("GET", "/ops/metrics/prometheus")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("rollcall_records_created_total 1\n"));
}
