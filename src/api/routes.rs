use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::auth::middleware::{
    require_min_role, require_session, resolve_membership, MembershipState,
};
use crate::auth::{InvitationService, LoginService, Role, SessionService};
use crate::config::AuthConfig;
use crate::storage::repositories::{
    MembershipRepository, OrganizationRepository, PropertyRepository, ReservationRepository,
    SqlxMembershipRepository, SqlxOrganizationRepository, SqlxPropertyRepository,
    SqlxReservationRepository, SqlxUserRepository, UserRepository,
};
use crate::storage::DbPool;

use super::{
    docs,
    handlers::{
        accept_invitation_handler, create_invitation_handler, create_organization_handler,
        create_property_handler, create_reservation_handler, delete_property_handler,
        delete_reservation_handler, get_organization_handler, get_property_handler,
        get_reservation_handler, health_handler, list_invitations_handler, list_members_handler,
        list_properties_handler, list_reservations_handler, login_handler, logout_handler,
        me_handler, remove_member_handler, revoke_invitation_handler, update_member_handler,
        update_property_handler, update_reservation_handler,
    },
};

/// Shared state for all handlers: services, repositories, and auth settings.
#[derive(Clone)]
pub struct ApiState {
    pub sessions: SessionService,
    pub logins: LoginService,
    pub invitations: InvitationService,
    pub users: Arc<dyn UserRepository>,
    pub orgs: Arc<dyn OrganizationRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub properties: Arc<dyn PropertyRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub auth: AuthConfig,
}

impl ApiState {
    /// Wire every service and repository onto one connection pool.
    pub fn with_sqlx(pool: DbPool, auth: AuthConfig) -> Self {
        let session_ttl = chrono::Duration::hours(auth.session_ttl_hours as i64);
        let invitation_ttl = chrono::Duration::hours(auth.invitation_ttl_hours as i64);

        let users: Arc<dyn UserRepository> = Arc::new(SqlxUserRepository::new(pool.clone()));
        let memberships: Arc<dyn MembershipRepository> =
            Arc::new(SqlxMembershipRepository::new(pool.clone()));
        let sessions = SessionService::with_sqlx(pool.clone(), session_ttl);
        let logins = LoginService::new(users.clone(), memberships.clone());
        let invitations = InvitationService::with_sqlx(pool.clone(), invitation_ttl);

        Self {
            sessions,
            logins,
            invitations,
            users,
            orgs: Arc::new(SqlxOrganizationRepository::new(pool.clone())),
            memberships,
            properties: Arc::new(SqlxPropertyRepository::new(pool.clone())),
            reservations: Arc::new(SqlxReservationRepository::new(pool)),
            auth,
        }
    }
}

/// Assemble the application router.
///
/// Requests pass the gates outside-in: session, then membership for routes
/// under `/orgs/{org_id}`, then a minimum role where one is attached.
/// `/api/v1/auth/me` and organization creation sit behind the session gate
/// alone; everything in `public_api` bypasses all three.
pub fn build_router(api_state: ApiState) -> Router {
    let session_layer =
        middleware::from_fn_with_state(api_state.sessions.clone(), require_session);
    let membership_layer = {
        let memberships: MembershipState = api_state.memberships.clone();
        middleware::from_fn_with_state(memberships, resolve_membership)
    };
    let role_layer = |minimum: Role| middleware::from_fn_with_state(minimum, require_min_role);

    let public_api = Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
        .route("/api/v1/auth/invitations/accept", post(accept_invitation_handler))
        .with_state(api_state.clone());

    let tenant_api = Router::new()
        .route("/api/v1/orgs/{org_id}", get(get_organization_handler))
        .route("/api/v1/orgs/{org_id}/members", get(list_members_handler))
        .route("/api/v1/orgs/{org_id}/properties", get(list_properties_handler))
        .route("/api/v1/orgs/{org_id}/properties/{property_id}", get(get_property_handler))
        .route("/api/v1/orgs/{org_id}/reservations", get(list_reservations_handler))
        .route(
            "/api/v1/orgs/{org_id}/reservations/{reservation_id}",
            get(get_reservation_handler),
        )
        .merge(
            Router::new()
                .route("/api/v1/orgs/{org_id}/reservations", post(create_reservation_handler))
                .route(
                    "/api/v1/orgs/{org_id}/reservations/{reservation_id}",
                    put(update_reservation_handler),
                )
                .route_layer(role_layer(Role::Member)),
        )
        .merge(
            Router::new()
                .route("/api/v1/orgs/{org_id}/invitations", get(list_invitations_handler))
                .route("/api/v1/orgs/{org_id}/invitations", post(create_invitation_handler))
                .route(
                    "/api/v1/orgs/{org_id}/invitations/{invitation_id}",
                    delete(revoke_invitation_handler),
                )
                .route("/api/v1/orgs/{org_id}/properties", post(create_property_handler))
                .route(
                    "/api/v1/orgs/{org_id}/properties/{property_id}",
                    put(update_property_handler),
                )
                .route_layer(role_layer(Role::Admin)),
        )
        .merge(
            Router::new()
                .route("/api/v1/orgs/{org_id}/members/{user_id}", patch(update_member_handler))
                .route("/api/v1/orgs/{org_id}/members/{user_id}", delete(remove_member_handler))
                .route(
                    "/api/v1/orgs/{org_id}/properties/{property_id}",
                    delete(delete_property_handler),
                )
                .route(
                    "/api/v1/orgs/{org_id}/reservations/{reservation_id}",
                    delete(delete_reservation_handler),
                )
                .route_layer(role_layer(Role::Owner)),
        )
        .route_layer(membership_layer);

    let secured_api = Router::new()
        .route("/api/v1/auth/me", get(me_handler))
        .route("/api/v1/orgs", post(create_organization_handler))
        .merge(tenant_api)
        .with_state(api_state)
        .layer(session_layer);

    public_api.merge(secured_api).merge(docs::docs_router())
}
