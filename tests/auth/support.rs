use axum::{
    body::to_bytes,
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use innkeep::{
    api::ApiState,
    auth::{hashing, Role, SESSION_COOKIE_NAME},
    config::AuthConfig,
    domain::{OrgId, UserId},
    storage::{
        self,
        repositories::{
            MembershipRepository, OrganizationRepository, SqlxMembershipRepository,
            SqlxOrganizationRepository, SqlxUserRepository, UserRepository,
        },
        DbPool,
    },
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

pub struct TestApp {
    pub pool: DbPool,
    pub state: ApiState,
}

impl TestApp {
    pub fn router(&self) -> Router {
        innkeep::api::build_router(self.state.clone())
    }
}

pub async fn spawn_app() -> TestApp {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("create sqlite pool");

    storage::run_migrations(&pool).await.expect("run migrations for tests");

    let state = ApiState::with_sqlx(pool.clone(), AuthConfig::default());
    TestApp { pool, state }
}

/// An organization with its owning user, as seeded through the repositories.
pub struct Tenant {
    pub owner_id: UserId,
    pub org_id: OrgId,
}

pub async fn seed_user(app: &TestApp, email: &str, password: &str) -> UserId {
    let users = SqlxUserRepository::new(app.pool.clone());
    let hash = hashing::hash_password(password).expect("hash password");
    let user = users.upsert_by_email(email, Some("Test User"), &hash).await.expect("seed user");
    user.id
}

/// Seed an owner account and an organization it owns.
pub async fn seed_tenant(app: &TestApp, org_name: &str, owner_email: &str, password: &str) -> Tenant {
    let owner_id = seed_user(app, owner_email, password).await;
    let orgs = SqlxOrganizationRepository::new(app.pool.clone());
    let org = orgs.create_organization(org_name, &owner_id).await.expect("seed organization");
    Tenant { owner_id, org_id: org.id }
}

pub async fn grant_role(app: &TestApp, user_id: &UserId, org_id: &OrgId, role: Role) {
    let memberships = SqlxMembershipRepository::new(app.pool.clone());
    memberships.ensure_membership(user_id, org_id, role).await.expect("grant role");
}

pub async fn dispatch(
    app: &TestApp,
    method: Method,
    path: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = if let Some(json) = body {
        let bytes = serde_json::to_vec(&json).expect("serialize body");
        builder
            .header("content-type", "application/json")
            .body(Body::from(bytes))
            .expect("build request")
    } else {
        builder.body(Body::empty()).expect("build request")
    };

    app.router().oneshot(request).await.expect("request")
}

pub async fn json_body<T: DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

/// Extract the `name=value` pair of the session cookie from a response.
pub fn session_cookie(response: &Response) -> String {
    let header = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .expect("cookie header is ascii");
    let pair = header.split(';').next().expect("cookie pair").to_string();
    assert!(
        pair.starts_with(SESSION_COOKIE_NAME),
        "unexpected cookie in Set-Cookie: {pair}"
    );
    pair
}

/// Log in and return the session cookie together with the response body.
pub async fn login(
    app: &TestApp,
    email: &str,
    password: &str,
    org_id: Option<&OrgId>,
) -> (String, Value) {
    let mut payload = json!({ "email": email, "password": password });
    if let Some(org_id) = org_id {
        payload["orgId"] = json!(org_id.as_str());
    }

    let response = dispatch(app, Method::POST, "/api/v1/auth/login", None, Some(payload)).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");

    let cookie = session_cookie(&response);
    let body: Value = json_body(response).await;
    (cookie, body)
}
