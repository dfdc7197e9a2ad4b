use axum::http::{header, Method, StatusCode};
use chrono::{Duration, Utc};
use innkeep::storage::repositories::{OrganizationRepository, SqlxOrganizationRepository};
use serde_json::{json, Value};

use super::support::{
    login, json_body, seed_tenant, seed_user, dispatch, session_cookie, spawn_app,
};

#[tokio::test]
async fn login_sets_session_cookie_and_returns_org_context() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;

    let response = dispatch(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "owner@example.com", "password": "a-strong-pass" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a cookie")
        .to_str()
        .expect("ascii cookie");
    assert!(set_cookie.starts_with("ik_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    // Default config serves over plain HTTP.
    assert!(!set_cookie.contains("Secure"));

    let body: Value = json_body(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["data"]["user"]["email"], "owner@example.com");
    assert_eq!(body["data"]["org"]["orgId"], json!(tenant.org_id.as_str()));
    assert_eq!(body["data"]["org"]["orgName"], "Seaside Stays");
    assert_eq!(body["data"]["org"]["role"], "owner");
}

#[tokio::test]
async fn login_normalizes_the_email_address() {
    let app = spawn_app().await;
    seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;

    let (_cookie, body) = login(&app, "Owner@Example.COM", "a-strong-pass", None).await;
    assert_eq!(body["data"]["user"]["email"], "owner@example.com");
}

#[tokio::test]
async fn me_returns_user_and_roles_for_the_session_org() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let response =
        dispatch(&app, Method::GET, "/api/v1/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response).await;
    assert_eq!(body["data"]["user"]["id"], json!(tenant.owner_id.as_str()));
    assert_eq!(body["data"]["org"]["orgId"], json!(tenant.org_id.as_str()));
    assert_eq!(body["data"]["org"]["orgName"], "Seaside Stays");
    assert_eq!(body["data"]["org"]["roles"], json!(["owner"]));
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let app = spawn_app().await;
    seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let response =
        dispatch(&app, Method::POST, "/api/v1/auth/logout", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The clearing cookie has an empty value and an expiry in the past.
    let cleared = session_cookie(&response);
    assert_eq!(cleared, "ik_session=");
    let body: Value = json_body(response).await;
    assert_eq!(body, json!({ "ok": true }));

    let response = dispatch(&app, Method::GET, "/api/v1/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "No session");
}

#[tokio::test]
async fn requests_without_a_cookie_are_unauthorized() {
    let app = spawn_app().await;

    let response = dispatch(&app, Method::GET, "/api/v1/auth/me", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = json_body(response).await;
    assert_eq!(body, json!({ "ok": false, "error": "No session" }));
}

#[tokio::test]
async fn unknown_session_tokens_are_rejected() {
    let app = spawn_app().await;
    seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;

    let response = dispatch(
        &app,
        Method::GET,
        "/api/v1/auth/me",
        Some("ik_session=no-such-token"),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = json_body(response).await;
    assert_eq!(body, json!({ "ok": false, "error": "No session" }));
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;

    sqlx::query(
        "INSERT INTO sessions (token, user_id, org_id, expires_at, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind("expired-session-token")
    .bind(tenant.owner_id.as_str())
    .bind(tenant.org_id.as_str())
    .bind(Utc::now() - Duration::hours(2))
    .bind(Utc::now() - Duration::hours(26))
    .execute(&app.pool)
    .await
    .expect("insert expired session");

    let response = dispatch(
        &app,
        Method::GET,
        "/api/v1/auth/me",
        Some("ik_session=expired-session-token"),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "Session expired");
}

#[tokio::test]
async fn bad_credentials_are_rejected_uniformly() {
    let app = spawn_app().await;
    seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;

    // Wrong password and unknown account must be indistinguishable.
    for payload in [
        json!({ "email": "owner@example.com", "password": "wrong-password" }),
        json!({ "email": "nobody@example.com", "password": "a-strong-pass" }),
    ] {
        let response =
            dispatch(&app, Method::POST, "/api/v1/auth/login", None, Some(payload)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = json_body(response).await;
        assert_eq!(body, json!({ "ok": false, "error": "Invalid credentials" }));
    }
}

#[tokio::test]
async fn deactivated_accounts_cannot_log_in() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;

    sqlx::query("UPDATE users SET active = 0 WHERE id = $1")
        .bind(tenant.owner_id.as_str())
        .execute(&app.pool)
        .await
        .expect("deactivate user");

    let response = dispatch(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "owner@example.com", "password": "a-strong-pass" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_without_org_selects_the_oldest_membership() {
    let app = spawn_app().await;
    let user_id = seed_user(&app, "multi@example.com", "a-strong-pass").await;

    let orgs = SqlxOrganizationRepository::new(app.pool.clone());
    let first = orgs.create_organization("First Stop", &user_id).await.expect("first org");
    let second = orgs.create_organization("Second Stop", &user_id).await.expect("second org");

    let (_cookie, body) = login(&app, "multi@example.com", "a-strong-pass", None).await;
    assert_eq!(body["data"]["org"]["orgId"], json!(first.id.as_str()));
    assert_eq!(body["data"]["org"]["orgName"], "First Stop");
    assert_eq!(body["data"]["org"]["role"], "owner");

    // An explicit selection overrides the default.
    let (_cookie, body) = login(&app, "multi@example.com", "a-strong-pass", Some(&second.id)).await;
    assert_eq!(body["data"]["org"]["orgId"], json!(second.id.as_str()));
}

#[tokio::test]
async fn login_with_an_org_the_user_does_not_belong_to_is_rejected() {
    let app = spawn_app().await;
    seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let other = seed_tenant(&app, "Mountain Lodges", "other@example.com", "another-pass").await;

    let response = dispatch(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({
            "email": "owner@example.com",
            "password": "a-strong-pass",
            "orgId": other.org_id.as_str(),
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "Organization not allowed");
}

#[tokio::test]
async fn login_with_no_memberships_is_rejected() {
    let app = spawn_app().await;
    seed_user(&app, "orphan@example.com", "a-strong-pass").await;

    let response = dispatch(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "orphan@example.com", "password": "a-strong-pass" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "No organizations assigned");
}
