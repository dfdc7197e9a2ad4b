use axum::http::{header, Method, StatusCode};
use innkeep::auth::Role;
use innkeep::domain::OrgId;
use serde_json::{json, Value};

use super::support::{
    grant_role, login, json_body, seed_tenant, seed_user, dispatch, spawn_app, TestApp,
};

/// Create an invitation through the API, returning the response `data`.
async fn create_invitation(
    app: &TestApp,
    cookie: &str,
    org_id: &OrgId,
    email: &str,
    role: &str,
) -> Value {
    let path = format!("/api/v1/orgs/{}/invitations", org_id);
    let response = dispatch(
        app,
        Method::POST,
        &path,
        Some(cookie),
        Some(json!({ "email": email, "role": role })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "invitation should be created");

    let body: Value = json_body(response).await;
    body["data"].clone()
}

async fn accept(app: &TestApp, token: &str, password: &str) -> axum::response::Response {
    dispatch(
        app,
        Method::POST,
        "/api/v1/auth/invitations/accept",
        None,
        Some(json!({ "token": token, "password": password, "name": "Invited Guest" })),
    )
    .await
}

#[tokio::test]
async fn invitation_create_echoes_the_token_exactly_once() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let data = create_invitation(&app, &cookie, &tenant.org_id, "guest@example.com", "member").await;

    let token = data["token"].as_str().expect("token echoed on create");
    assert!(token.len() >= 16, "invite tokens are long random strings");
    assert_eq!(data["email"], "guest@example.com");
    assert_eq!(data["role"], "member");
    assert_eq!(data["usedAt"], Value::Null);
    assert_eq!(data["invitedBy"], json!(tenant.owner_id.as_str()));
    // Flattened: the invitation fields sit next to `token`, not under a key.
    assert!(data.get("invitation").is_none());

    let path = format!("/api/v1/orgs/{}/invitations", tenant.org_id);
    let response = dispatch(&app, Method::GET, &path, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await;
    let listed = body["data"].as_array().expect("invitation list");
    assert_eq!(listed.len(), 1);
    assert!(listed[0].get("token").is_none(), "listings never expose tokens");
}

#[tokio::test]
async fn accepting_an_invitation_provisions_account_and_session() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let data = create_invitation(&app, &cookie, &tenant.org_id, "guest@example.com", "member").await;
    let token = data["token"].as_str().expect("token").to_string();

    let response = accept(&app, &token, "guest-password").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("accepting opens a session")
        .to_str()
        .expect("ascii cookie");
    assert!(set_cookie.starts_with("ik_session="));
    let guest_cookie = set_cookie.split(';').next().expect("cookie pair").to_string();

    let body: Value = json_body(response).await;
    assert_eq!(body["data"]["user"]["email"], "guest@example.com");
    assert_eq!(body["data"]["user"]["name"], "Invited Guest");
    assert_eq!(body["data"]["org"]["orgId"], json!(tenant.org_id.as_str()));
    assert_eq!(body["data"]["org"]["role"], "member");

    // The fresh session is usable immediately.
    let response =
        dispatch(&app, Method::GET, "/api/v1/auth/me", Some(&guest_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await;
    assert_eq!(body["data"]["org"]["roles"], json!(["member"]));
}

#[tokio::test]
async fn invitations_cannot_be_accepted_twice() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let data = create_invitation(&app, &cookie, &tenant.org_id, "guest@example.com", "member").await;
    let token = data["token"].as_str().expect("token").to_string();

    let response = accept(&app, &token, "guest-password").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = accept(&app, &token, "guest-password").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response).await;
    assert_eq!(body, json!({ "ok": false, "error": "Invalid or expired invite" }));
}

#[tokio::test]
async fn expired_invitations_are_rejected() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let data = create_invitation(&app, &cookie, &tenant.org_id, "guest@example.com", "member").await;
    let token = data["token"].as_str().expect("token").to_string();
    let id = data["id"].as_str().expect("invitation id").to_string();

    sqlx::query("UPDATE invitations SET expires_at = '2000-01-01T00:00:00Z' WHERE id = $1")
        .bind(&id)
        .execute(&app.pool)
        .await
        .expect("expire invitation");

    let response = accept(&app, &token, "guest-password").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "Invalid or expired invite");
}

#[tokio::test]
async fn accepting_a_second_invitation_keeps_the_existing_role() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let first = create_invitation(&app, &cookie, &tenant.org_id, "guest@example.com", "member").await;
    let response = accept(&app, first["token"].as_str().expect("token"), "guest-password").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // A second invite for the same address, this time as admin.
    let second = create_invitation(&app, &cookie, &tenant.org_id, "guest@example.com", "admin").await;
    let response = accept(&app, second["token"].as_str().expect("token"), "new-password").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The membership existed already, so its role wins over the invite's.
    let body: Value = json_body(response).await;
    assert_eq!(body["data"]["org"]["role"], "member");

    let membership_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM memberships m \
         JOIN users u ON u.id = m.user_id \
         WHERE u.email = $1 AND m.org_id = $2",
    )
    .bind("guest@example.com")
    .bind(tenant.org_id.as_str())
    .fetch_one(&app.pool)
    .await
    .expect("count memberships");
    assert_eq!(membership_count, 1);
}

#[tokio::test]
async fn invited_role_may_not_exceed_the_inviters_role() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let admin_id = seed_user(&app, "admin@example.com", "admin-pass").await;
    grant_role(&app, &admin_id, &tenant.org_id, Role::Admin).await;

    let (cookie, _body) = login(&app, "admin@example.com", "admin-pass", None).await;

    let path = format!("/api/v1/orgs/{}/invitations", tenant.org_id);
    let response = dispatch(
        &app,
        Method::POST,
        &path,
        Some(&cookie),
        Some(json!({ "email": "new-owner@example.com", "role": "owner" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "Insufficient role");

    // An owner can mint owners.
    let (owner_cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;
    let data =
        create_invitation(&app, &owner_cookie, &tenant.org_id, "new-owner@example.com", "owner")
            .await;
    assert_eq!(data["role"], "owner");
}

#[tokio::test]
async fn revoking_an_unused_invitation_removes_it() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let data = create_invitation(&app, &cookie, &tenant.org_id, "guest@example.com", "member").await;
    let token = data["token"].as_str().expect("token").to_string();
    let id = data["id"].as_str().expect("invitation id").to_string();

    let path = format!("/api/v1/orgs/{}/invitations/{}", tenant.org_id, id);
    let response = dispatch(&app, Method::DELETE, &path, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await;
    assert_eq!(body, json!({ "ok": true }));

    let list_path = format!("/api/v1/orgs/{}/invitations", tenant.org_id);
    let response = dispatch(&app, Method::GET, &list_path, Some(&cookie), None).await;
    let body: Value = json_body(response).await;
    assert_eq!(body["data"], json!([]));

    // The revoked token can no longer be redeemed.
    let response = accept(&app, &token, "guest-password").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn revoking_a_used_invitation_returns_not_found() {
    let app = spawn_app().await;
    let tenant = seed_tenant(&app, "Seaside Stays", "owner@example.com", "a-strong-pass").await;
    let (cookie, _body) = login(&app, "owner@example.com", "a-strong-pass", None).await;

    let data = create_invitation(&app, &cookie, &tenant.org_id, "guest@example.com", "member").await;
    let token = data["token"].as_str().expect("token").to_string();
    let id = data["id"].as_str().expect("invitation id").to_string();

    let response = accept(&app, &token, "guest-password").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let path = format!("/api/v1/orgs/{}/invitations/{}", tenant.org_id, id);
    let response = dispatch(&app, Method::DELETE, &path, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], json!(format!("invitation not found: {}", id)));
}

#[tokio::test]
async fn short_invite_tokens_fail_validation() {
    let app = spawn_app().await;

    let response = dispatch(
        &app,
        Method::POST,
        "/api/v1/auth/invitations/accept",
        None,
        Some(json!({ "token": "short", "password": "guest-password" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response).await;
    let error = body["error"].as_str().expect("error message");
    assert!(error.contains("Invite token is too short"), "got: {error}");
}
