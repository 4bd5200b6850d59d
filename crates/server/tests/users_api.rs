use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;

use configs::DatabaseConfig;
use server::routes;
use server::state::ServerState;
use service::user::password::Hasher;
use service::user::repo::seaorm::SeaOrmUserRepository;
use service::user::repository::UserRepository;
use service::UserService;

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app() -> anyhow::Result<Router> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
    let db = models::db::connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;

    let repo: Arc<dyn UserRepository> = Arc::new(SeaOrmUserRepository::new(db));
    // cheap argon2 settings keep the suite fast
    let users = UserService::with_hasher(repo, Hasher::with_params(1024, 1, 1)?);
    Ok(routes::build_router(ServerState::new(Arc::new(users)), cors()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, json))
}

async fn register(app: &Router, username: &str, password: &str, email: &str) -> anyhow::Result<(StatusCode, Value)> {
    send(app, "POST", "/api/users/register", Some(json!({"username": username, "password": password, "email": email}))).await
}

async fn login(app: &Router, username: &str, password: &str) -> anyhow::Result<StatusCode> {
    let (status, _) = send(app, "POST", "/api/users/login", Some(json!({"username": username, "password": password}))).await?;
    Ok(status)
}

fn user_id(body: &Value) -> i64 {
    body["data"]["id"].as_i64().unwrap_or_default()
}

#[tokio::test]
async fn test_register_and_duplicate_username() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, body) = register(&app, "alice", "secret1", "alice@example.com").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["message"], "register success");
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["status"], 1);
    assert!(body["data"].get("password").is_none());
    assert!(body["data"]["createTime"].is_string());

    let (status, body) = register(&app, "alice", "other22", "alice2@example.com").await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);
    assert_eq!(body["message"], "username already exists");
    assert!(body["data"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_check_username_availability() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, body) = send(&app, "GET", "/api/users/check-username?username=bob", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    register(&app, "bob", "secret1", "bob@example.com").await?;
    let (_, body) = send(&app, "GET", "/api/users/check-username?username=bob", None).await?;
    assert_eq!(body["data"], false);
    assert_eq!(body["message"], "success");

    let (status, _) = send(&app, "GET", "/api/users/check-username", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_login_right_and_wrong_password() -> anyhow::Result<()> {
    let app = build_app().await?;
    register(&app, "carol", "S3curePass", "carol@example.com").await?;

    let (status, body) = send(&app, "POST", "/api/users/login", Some(json!({"username": "carol", "password": "S3curePass"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "login success");
    assert_eq!(body["data"]["username"], "carol");

    assert_eq!(login(&app, "carol", "wrong-pass").await?, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "nobody", "S3curePass").await?, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_change_password() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (_, body) = register(&app, "dave", "secret1", "dave@example.com").await?;
    let id = user_id(&body);

    let uri = format!("/api/users/{id}/password?oldPassword=badold1&newPassword=newsecret1");
    let (status, body) = send(&app, "PUT", &uri, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    assert_eq!(login(&app, "dave", "secret1").await?, StatusCode::OK);

    let uri = format!("/api/users/{id}/password?oldPassword=secret1&newPassword=newsecret1");
    let (status, body) = send(&app, "PUT", &uri, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "password changed");
    assert_eq!(login(&app, "dave", "secret1").await?, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&app, "dave", "newsecret1").await?, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_get_update_delete() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (_, body) = register(&app, "erin", "secret1", "erin@example.com").await?;
    let id = user_id(&body);

    let (status, body) = send(&app, "GET", &format!("/api/users/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["email"], "erin@example.com");

    let (status, body) = send(&app, "PUT", &format!("/api/users/{id}"), Some(json!({"nickname": "Erin E.", "password": "ignored"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "update success");
    assert_eq!(body["data"]["nickname"], "Erin E.");
    assert_eq!(body["data"]["email"], "erin@example.com");
    assert_eq!(login(&app, "erin", "secret1").await?, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", &format!("/api/users/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "account deleted");

    let (status, body) = send(&app, "GET", &format!("/api/users/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert_eq!(body["message"], "user not found");

    let (status, _) = send(&app, "DELETE", &format!("/api/users/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_update_to_taken_username_conflicts() -> anyhow::Result<()> {
    let app = build_app().await?;
    register(&app, "frank", "secret1", "frank@example.com").await?;
    let (_, body) = register(&app, "gina", "secret1", "gina@example.com").await?;
    let id = user_id(&body);

    let (status, _) = send(&app, "PUT", &format!("/api/users/{id}"), Some(json!({"username": "frank"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn test_list_paging_and_direction() -> anyhow::Result<()> {
    let app = build_app().await?;
    for i in 0..12 {
        register(&app, &format!("list_user_{i:02}"), "secret1", &format!("list{i}@example.com")).await?;
    }

    let (status, body) = send(&app, "GET", "/api/users/list?page=0&size=10", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "query success");
    let content = body["data"]["content"].as_array().cloned().unwrap_or_default();
    assert!(content.len() <= 10);
    assert_eq!(body["data"]["totalElements"], 12);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["first"], true);

    let ids = |body: &Value| -> Vec<i64> {
        body["data"]["content"].as_array().map(|a| a.iter().filter_map(|u| u["id"].as_i64()).collect()).unwrap_or_default()
    };
    let (_, asc) = send(&app, "GET", "/api/users/list?size=12&sort=username&direction=asc", None).await?;
    let (_, desc) = send(&app, "GET", "/api/users/list?size=12&sort=username&direction=desc", None).await?;
    let mut reversed = ids(&desc);
    reversed.reverse();
    assert_eq!(ids(&asc).len(), 12);
    assert_eq!(ids(&asc), reversed);

    // anything but "desc" sorts ascending
    let (_, odd) = send(&app, "GET", "/api/users/list?size=12&sort=username&direction=sideways", None).await?;
    assert_eq!(ids(&odd), ids(&asc));
    Ok(())
}

#[tokio::test]
async fn test_list_paging_bounds() -> anyhow::Result<()> {
    let app = build_app().await?;
    register(&app, "bound_user", "secret1", "bound@example.com").await?;

    let (status, body) = send(&app, "GET", "/api/users/list?page=1844674407370955161&size=20", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["data"].is_null());

    let (status, _) = send(&app, "GET", &format!("/api/users/search?keyword=bound&page={}", u64::MAX), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/users/list?page=-1", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/users/list?size=0", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["size"], 1);
    assert_eq!(body["data"]["numberOfElements"], 1);

    let (status, body) = send(&app, "GET", "/api/users/list?size=500", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["size"], 100);

    // past the last page is an empty page, not an error
    let (status, body) = send(&app, "GET", "/api/users/list?page=50&size=10", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["empty"], true);
    assert_eq!(body["data"]["last"], true);
    Ok(())
}

#[tokio::test]
async fn test_search_wildcards_match_literally() -> anyhow::Result<()> {
    let app = build_app().await?;
    register(&app, "wild_x", "secret1", "wx@example.com").await?;
    register(&app, "wildyy", "secret1", "wy@example.com").await?;

    let (status, body) = send(&app, "GET", "/api/users/search?keyword=%25", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalElements"], 0);

    let (_, body) = send(&app, "GET", "/api/users/search?keyword=d_y", None).await?;
    assert_eq!(body["data"]["totalElements"], 0);

    let (_, body) = send(&app, "GET", "/api/users/search?keyword=d_x", None).await?;
    assert_eq!(body["data"]["totalElements"], 1);
    assert_eq!(body["data"]["content"][0]["username"], "wild_x");
    Ok(())
}

#[tokio::test]
async fn test_register_and_update_agree_on_email() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (_, body) = register(&app, "mail_owner", "secret1", "owner@example.com").await?;
    let id = user_id(&body);

    for (i, email) in ["m@localhost", "not-an-email", "plain@example.org"].iter().enumerate() {
        let (reg_status, reg_body) = register(&app, &format!("mail_user_{i}"), "secret1", email).await?;
        let (upd_status, _) = send(&app, "PUT", &format!("/api/users/{id}"), Some(json!({"email": email}))).await?;
        assert_eq!(reg_status, upd_status, "{email}");
        if reg_status != StatusCode::OK {
            assert_eq!(reg_status, StatusCode::BAD_REQUEST);
            assert!(!reg_body["message"].as_str().unwrap_or_default().contains("model error"));
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_search_by_email() -> anyhow::Result<()> {
    let app = build_app().await?;
    register(&app, "hank", "secret1", "hank@unique-mail.org").await?;
    register(&app, "ivan", "secret1", "ivan@example.com").await?;

    let (status, body) = send(&app, "GET", "/api/users/search?keyword=unique-mail", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "search success");
    assert_eq!(body["data"]["totalElements"], 1);
    assert_eq!(body["data"]["content"][0]["username"], "hank");

    let (status, body) = send(&app, "GET", "/api/users/search?keyword=", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    Ok(())
}

#[tokio::test]
async fn test_bad_requests_use_envelope() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, body) = register(&app, "judy", "secret1", "not-an-email").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["data"].is_null());

    let (status, _) = register(&app, "jo", "secret1", "jo@example.com").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/users/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _) = send(&app, "GET", "/api/users/list?sort=password", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("POST")
        .uri("/api/users/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_health_and_metrics() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    register(&app, "kate", "secret1", "kate@example.com").await?;
    let req = Request::builder().uri("/metrics").body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("user_service_requests_total"));
    assert!(text.contains("operation=\"register\""));
    Ok(())
}
