use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wartrack::config::Config;

/// Default admin seeded by migration (must match m20240101_initial.rs)
const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;

    let state = wartrack::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    wartrack::api::router(state)
}

/// Log in and return the session cookie pair ("token=...") on success.
async fn login(app: &Router, email: &str, password: &str) -> Option<String> {
    let body = serde_json::json!({ "email": email, "password": password });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    if response.status() != StatusCode::OK {
        return None;
    }

    let set_cookie = response.headers().get(header::SET_COOKIE)?;
    let pair = set_cookie.to_str().ok()?.split(';').next()?.to_string();
    Some(pair)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, cookie: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/assets").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(get_request("/api/assets", "token=not-a-real-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The same request succeeds after a login.
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("seeded admin can log in");

    let response = app
        .clone()
        .oneshot(get_request("/api/assets", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    // Correct email, wrong password: 401 and no cookie.
    let body = serde_json::json!({ "email": ADMIN_EMAIL, "password": "wrong-password" });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid credentials");

    // Unknown email takes the same exit.
    assert!(login(&app, "nobody@example.com", "password").await.is_none());

    // Missing fields are a validation error.
    let body = serde_json::json!({ "email": "", "password": "" });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_returns_session_identity() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let response = app.clone().oneshot(get_request("/api/me", &cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], ADMIN_EMAIL);
    assert_eq!(json["user"]["name"], "Admin");
    assert_eq!(json["user"]["role"], "admin");
}

#[tokio::test]
async fn test_register_and_duplicate_conflict() {
    let app = spawn_app().await;

    let body = serde_json::json!({
        "name": "Worker",
        "email": "worker@example.com",
        "password": "workerpass",
        "role": "user"
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/register")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same email again: 409, and the member list is unchanged.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/register")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    let response = app
        .clone()
        .oneshot(get_request("/api/members", &cookie))
        .await
        .unwrap();
    let json = body_json(response).await;
    // Seeded admin + one registration.
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    // Missing fields: 400.
    let body = serde_json::json!({ "name": "No Email" });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/register")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The registered account can log in.
    assert!(login(&app, "worker@example.com", "workerpass").await.is_some());
}

#[tokio::test]
async fn test_asset_crud_round_trip() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let today = chrono::Local::now().date_naive();
    let start = today.format("%Y-%m-%d").to_string();

    let body = serde_json::json!({
        "sc_code": "SC-2024-0113",
        "project_name": "Switch replacement",
        "start_date": start,
        "duration_years": 3,
        "remark": "Building B"
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/assets", &cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["sc_code"], "SC-2024-0113");
    assert_eq!(json["data"]["status"], "in_warranty");

    // Fetch by id returns the same field values.
    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/assets/{id}"), &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["sc_code"], "SC-2024-0113");
    assert_eq!(fetched["data"]["project_name"], "Switch replacement");
    assert_eq!(fetched["data"]["start_date"], start.as_str());
    assert_eq!(fetched["data"]["duration_years"], 3);
    assert_eq!(fetched["data"]["remark"], "Building B");

    // Update shifts the start date into the deep past: now expired.
    let body = serde_json::json!({
        "sc_code": "SC-2024-0113",
        "project_name": "Switch replacement",
        "start_date": "2019-01-01",
        "duration_years": 1,
        "remark": "Building B"
    });
    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/api/assets/{id}"), &cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["status"], "expired");
    assert_eq!(updated["data"]["end_date"], "2020-01-01");

    // Delete, then the record is gone.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/assets/{id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/assets/{id}"), &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_asset_validation_gate() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    // Unparseable start date blocks the save.
    let body = serde_json::json!({
        "sc_code": "SC-1",
        "project_name": "Proj",
        "start_date": "not-a-date"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/assets", &cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);

    // Missing SC code.
    let body = serde_json::json!({
        "sc_code": "  ",
        "project_name": "Proj",
        "start_date": "2024-05-01"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/assets", &cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Absent duration defaults to one year.
    let body = serde_json::json!({
        "sc_code": "SC-2",
        "project_name": "Proj",
        "start_date": "2024-05-01"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/assets", &cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["duration_years"], 1);
    assert_eq!(json["data"]["end_date"], "2025-05-01");

    // Unknown id is a 404, not a 500.
    let response = app
        .clone()
        .oneshot(get_request("/api/assets/99999", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_asset_filtering_and_export() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let today = chrono::Local::now().date_naive();
    let current_start = today.format("%Y-%m-%d").to_string();

    let live = serde_json::json!({
        "sc_code": "SC-LIVE",
        "project_name": "CCTV maintenance",
        "start_date": current_start,
        "duration_years": 5
    });
    let dead = serde_json::json!({
        "sc_code": "SC-DEAD",
        "project_name": "Old firewall",
        "start_date": "2018-02-01",
        "duration_years": 1
    });

    for body in [&live, &dead] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/assets", &cookie, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Status filter recomputes live, it does not trust stored snapshots.
    let response = app
        .clone()
        .oneshot(get_request("/api/assets?status=in_warranty", &cookie))
        .await
        .unwrap();
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sc_code"], "SC-LIVE");

    let response = app
        .clone()
        .oneshot(get_request("/api/assets?status=expired", &cookie))
        .await
        .unwrap();
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sc_code"], "SC-DEAD");

    // Search matches SC code and project name, case-insensitively.
    let response = app
        .clone()
        .oneshot(get_request("/api/assets?search=cctv", &cookie))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    // Export honors the same filter.
    let response = app
        .clone()
        .oneshot(get_request("/api/assets/export?status=in_warranty", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    assert!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("attachment")
    );

    let csv = String::from_utf8(
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap();
    assert!(csv.starts_with("sc_code,project_name,start_date"));
    assert!(csv.contains("SC-LIVE"));
    assert!(!csv.contains("SC-DEAD"));
}

#[tokio::test]
async fn test_member_crud_and_password_privacy() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let body = serde_json::json!({
        "name": "Field Tech",
        "email": "tech@example.com",
        "password": "techpassword",
        "role": "user"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/members", &cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["role"], "user");

    // The hash never appears in any member payload.
    let response = app
        .clone()
        .oneshot(get_request("/api/members", &cookie))
        .await
        .unwrap();
    let raw = String::from_utf8(
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap();
    assert!(!raw.contains("password_hash"));
    assert!(!raw.contains("$argon2"));

    // Duplicate email on create is a conflict.
    let dup = serde_json::json!({
        "name": "Other",
        "email": "tech@example.com",
        "password": "otherpassword",
        "role": "user"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/members", &cookie, &dup))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Update can rotate the password; the new one works, the old one stops.
    let update = serde_json::json!({
        "name": "Field Tech",
        "email": "tech@example.com",
        "role": "admin",
        "password": "rotatedpassword"
    });
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/members/{id}"),
            &cookie,
            &update,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "admin");

    assert!(login(&app, "tech@example.com", "techpassword").await.is_none());
    assert!(
        login(&app, "tech@example.com", "rotatedpassword")
            .await
            .is_some()
    );

    // Delete, then 404.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/members/{id}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/members/{id}"), &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_navigation_gate_redirects() {
    let app = spawn_app().await;

    // Anonymous visitor on a protected page is sent to login.
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/dashboard/warranty")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");

    // Authenticated visitor on the login page is sent to the dashboard.
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    let response = app
        .clone()
        .oneshot(get_request("/login", &cookie))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );

    // A stale token is the same as no token.
    let response = app
        .clone()
        .oneshot(get_request("/dashboard", "token=garbage"))
        .await
        .unwrap();
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/api/logout", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let removal = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(removal.starts_with("token="));
    assert!(removal.contains("Max-Age=0"));

    let json = body_json(response).await;
    assert_eq!(json["message"], "Logout successful");
}

#[tokio::test]
async fn test_system_status_counts() {
    let app = spawn_app().await;
    let cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let today = chrono::Local::now().date_naive();
    let body = serde_json::json!({
        "sc_code": "SC-STAT",
        "project_name": "Status check",
        "start_date": today.format("%Y-%m-%d").to_string(),
        "duration_years": 2
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/assets", &cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get_request("/api/system/status", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["total_assets"], 1);
    assert_eq!(json["data"]["in_warranty"], 1);
    assert_eq!(json["data"]["expired"], 0);
    assert_eq!(json["data"]["members"], 1);
    assert!(json["data"]["version"].is_string());
}
