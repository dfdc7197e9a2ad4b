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

/// One organization with an owner, an admin, and a member, each logged in.
pub struct TenantFixture {
    pub app: TestApp,
    pub org_id: OrgId,
    pub owner_id: UserId,
    pub admin_id: UserId,
    pub member_id: UserId,
    pub owner_cookie: String,
    pub admin_cookie: String,
    pub member_cookie: String,
}

impl TenantFixture {
    /// Path under this fixture's organization, e.g. `path("/properties")`.
    pub fn path(&self, suffix: &str) -> String {
        format!("/api/v1/orgs/{}{}", self.org_id, suffix)
    }
}

pub async fn setup_tenant() -> TenantFixture {
    let app = spawn_app().await;

    let owner_id = seed_user(&app, "owner@example.com", "owner-pass").await;
    let orgs = SqlxOrganizationRepository::new(app.pool.clone());
    let org = orgs.create_organization("Seaside Stays", &owner_id).await.expect("seed org");

    let admin_id = seed_user(&app, "admin@example.com", "admin-pass").await;
    grant_role(&app, &admin_id, &org.id, Role::Admin).await;
    let member_id = seed_user(&app, "member@example.com", "member-pass").await;
    grant_role(&app, &member_id, &org.id, Role::Member).await;

    let owner_cookie = login(&app, "owner@example.com", "owner-pass").await;
    let admin_cookie = login(&app, "admin@example.com", "admin-pass").await;
    let member_cookie = login(&app, "member@example.com", "member-pass").await;

    TenantFixture {
        app,
        org_id: org.id,
        owner_id,
        admin_id,
        member_id,
        owner_cookie,
        admin_cookie,
        member_cookie,
    }
}

pub async fn seed_user(app: &TestApp, email: &str, password: &str) -> UserId {
    let users = SqlxUserRepository::new(app.pool.clone());
    let hash = hashing::hash_password(password).expect("hash password");
    let user = users.upsert_by_email(email, Some("Test User"), &hash).await.expect("seed user");
    user.id
}

/// Seed a second organization with its own owner, for isolation tests.
pub async fn seed_other_org(app: &TestApp, org_name: &str, owner_email: &str) -> (OrgId, String) {
    let owner_id = seed_user(app, owner_email, "other-pass").await;
    let orgs = SqlxOrganizationRepository::new(app.pool.clone());
    let org = orgs.create_organization(org_name, &owner_id).await.expect("seed other org");
    let cookie = login(app, owner_email, "other-pass").await;
    (org.id, cookie)
}

pub async fn grant_role(app: &TestApp, user_id: &UserId, org_id: &OrgId, role: Role) {
    let memberships = SqlxMembershipRepository::new(app.pool.clone());
    memberships.ensure_membership(user_id, org_id, role).await.expect("grant role");
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let response = dispatch(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");

    let header = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .expect("cookie header is ascii");
    let pair = header.split(';').next().expect("cookie pair").to_string();
    assert!(pair.starts_with(SESSION_COOKIE_NAME));
    pair
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

/// Create a property through the API with the fixture's admin session.
pub async fn create_property(
    fixture: &TenantFixture,
    name: &str,
    address: &str,
    description: Option<&str>,
) -> Value {
    let mut payload = json!({ "name": name, "address": address });
    if let Some(description) = description {
        payload["description"] = json!(description);
    }

    let response = dispatch(
        &fixture.app,
        Method::POST,
        &fixture.path("/properties"),
        Some(&fixture.admin_cookie),
        Some(payload),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "property should be created");

    let body: Value = json_body(response).await;
    body["data"].clone()
}

/// Create a reservation through the API with the fixture's member session.
pub async fn create_reservation(
    fixture: &TenantFixture,
    property_id: &str,
    guest_name: &str,
    start_date: &str,
    end_date: &str,
) -> Value {
    let response = dispatch(
        &fixture.app,
        Method::POST,
        &fixture.path("/reservations"),
        Some(&fixture.member_cookie),
        Some(json!({
            "propertyId": property_id,
            "guestName": guest_name,
            "startDate": start_date,
            "endDate": end_date,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "reservation should be created");

    let body: Value = json_body(response).await;
    body["data"].clone()
}
