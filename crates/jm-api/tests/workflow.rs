use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, FORM)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

async fn register_worker(app: &Router, name: &str, phone: &str) -> Response {
    send(
        app,
        post_form(
            "/register",
            &format!(
                "name={name}&location=Pune&skills=masonry&experience=4+years&phone_number={phone}"
            ),
        ),
    )
    .await
}

async fn login_cookie(app: &Router) -> String {
    let registered = send(
        app,
        post_form(
            "/contractor-register",
            "username=asha&password=s3cret&name=Asha+Builders&phone_number=9000000001&age=44&job_type=construction",
        ),
    )
    .await;
    assert_eq!(registered.status(), StatusCode::CREATED);

    let login = send(app, post_form("/login", "username=asha&password=s3cret")).await;
    assert_eq!(login.status(), StatusCode::OK);

    let set_cookie = login
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));

    set_cookie
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn worker_registration_enforces_unique_phone_and_presence() {
    let dir = tempfile::tempdir().unwrap();
    let app = jm_api::create_router(jm_api::test_state(dir.path()));

    let first = register_worker(&app, "Ravi", "9998887777").await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let worker = json_body(first).await;
    assert_eq!(worker["id"], 1);
    assert_eq!(worker["phone_number"], "9998887777");

    let duplicate = register_worker(&app, "Other", "9998887777").await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(duplicate).await["code"], "conflict");

    let incomplete = send(&app, post_form("/register", "name=Ravi&phone_number=1")).await;
    assert_eq!(incomplete.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(incomplete).await["message"],
        "missing required field: location"
    );

    let second = register_worker(&app, "Meena", "8887776666").await;
    assert_eq!(json_body(second).await["id"], 2);
}

#[tokio::test]
async fn contractor_login_failures_are_indistinguishable() {
    let dir = tempfile::tempdir().unwrap();
    let app = jm_api::create_router(jm_api::test_state(dir.path()));
    login_cookie(&app).await;

    let duplicate = send(
        &app,
        post_form(
            "/contractor-register",
            "username=asha&password=x&name=A&phone_number=1&age=30&job_type=y",
        ),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let unknown = send(&app, post_form("/login", "username=nouser&password=x")).await;
    let wrong = send(&app, post_form("/login", "username=asha&password=wrongpass")).await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = json_body(unknown).await;
    let wrong = json_body(wrong).await;
    assert_eq!(unknown["code"], wrong["code"]);
    assert_eq!(unknown["message"], wrong["message"]);
    assert_eq!(unknown["message"], "invalid username or password");
}

#[tokio::test]
async fn missed_call_status_codes() {
    let dir = tempfile::tempdir().unwrap();
    let app = jm_api::create_router(jm_api::test_state(dir.path()));
    register_worker(&app, "Ravi", "111").await;

    let no_number = send(&app, get("/missed-call")).await;
    assert_eq!(no_number.status(), StatusCode::BAD_REQUEST);

    let unknown = send(&app, get("/missed-call?From=999")).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let by_query = send(&app, get("/missed-call?CallFrom=111")).await;
    assert_eq!(by_query.status(), StatusCode::OK);
    let body = json_body(by_query).await;
    assert_eq!(body["status"], "available");
    assert_eq!(body["worker_id"], 1);

    let by_form = send(&app, post_form("/missed-call", "CallerId=111")).await;
    assert_eq!(by_form.status(), StatusCode::OK);

    let events: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("availability.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(events.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn dashboard_lists_only_available_registered_workers_and_hire_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let app = jm_api::create_router(jm_api::test_state(dir.path()));

    register_worker(&app, "A", "A").await;
    register_worker(&app, "B", "B").await;
    assert_eq!(
        send(&app, get("/missed-call?From=B")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        send(&app, get("/missed-call?From=C")).await.status(),
        StatusCode::NOT_FOUND
    );

    let cookie = login_cookie(&app).await;

    let dashboard = send(&app, with_cookie(get("/dashboard"), &cookie)).await;
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body = json_body(dashboard).await;
    assert_eq!(body["contractor"]["username"], "asha");
    assert_eq!(body["registered_workers"], 2);
    let available = body["available_workers"].as_array().unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0]["phone_number"], "B");

    let hire_request = Request::builder()
        .method("POST")
        .uri("/hire/2")
        .body(Body::empty())
        .unwrap();
    let hire = send(&app, with_cookie(hire_request, &cookie)).await;
    assert_eq!(hire.status(), StatusCode::OK);
    let hire = json_body(hire).await;
    assert_eq!(hire["status"], "notified");
    assert_eq!(hire["worker_name"], "B");
    assert!(hire["message"].as_str().unwrap().contains("Asha Builders"));

    let missing_request = Request::builder()
        .method("POST")
        .uri("/hire/42")
        .body(Body::empty())
        .unwrap();
    let missing = send(&app, with_cookie(missing_request, &cookie)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_clears_session_cookie() {
    let dir = tempfile::tempdir().unwrap();
    let app = jm_api::create_router(jm_api::test_state(dir.path()));

    let response = send(&app, get("/logout")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("jm_session=;"));
    assert!(cookie.contains("Max-Age=0"));
}
