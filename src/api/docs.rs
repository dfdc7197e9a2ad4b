use axum::Router;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::SESSION_COOKIE_NAME;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_handler,
        crate::api::handlers::auth::login_handler,
        crate::api::handlers::auth::logout_handler,
        crate::api::handlers::auth::me_handler,
        crate::api::handlers::auth::accept_invitation_handler,
        crate::api::handlers::organizations::create_organization_handler,
        crate::api::handlers::organizations::get_organization_handler,
        crate::api::handlers::members::list_members_handler,
        crate::api::handlers::members::update_member_handler,
        crate::api::handlers::members::remove_member_handler,
        crate::api::handlers::invitations::create_invitation_handler,
        crate::api::handlers::invitations::list_invitations_handler,
        crate::api::handlers::invitations::revoke_invitation_handler,
        crate::api::handlers::properties::list_properties_handler,
        crate::api::handlers::properties::create_property_handler,
        crate::api::handlers::properties::get_property_handler,
        crate::api::handlers::properties::update_property_handler,
        crate::api::handlers::properties::delete_property_handler,
        crate::api::handlers::reservations::list_reservations_handler,
        crate::api::handlers::reservations::create_reservation_handler,
        crate::api::handlers::reservations::get_reservation_handler,
        crate::api::handlers::reservations::update_reservation_handler,
        crate::api::handlers::reservations::delete_reservation_handler
    ),
    components(
        schemas(
            crate::api::handlers::health::HealthResponse,
            crate::auth::LoginRequest,
            crate::api::handlers::auth::SessionResponseBody,
            crate::api::handlers::auth::SessionOrg,
            crate::api::handlers::auth::MeResponseBody,
            crate::api::handlers::auth::MeOrg,
            crate::api::handlers::auth::AcceptInvitationRequest,
            crate::api::handlers::organizations::CreateOrganizationBody,
            crate::api::handlers::members::UpdateMemberBody,
            crate::api::handlers::members::UpdatedMember,
            crate::api::handlers::invitations::CreateInvitationBody,
            crate::api::handlers::invitations::InvitationCreatedBody,
            crate::api::handlers::properties::PropertyBody,
            crate::api::handlers::reservations::CreateReservationBody,
            crate::api::handlers::reservations::UpdateReservationBody,
            crate::auth::User,
            crate::auth::Organization,
            crate::auth::MemberRecord,
            crate::auth::Invitation,
            crate::auth::Role,
            crate::storage::repositories::Property,
            crate::storage::repositories::Reservation
        )
    ),
    tags(
        (name = "health", description = "Service liveness"),
        (name = "auth", description = "Sessions, login, and invitation acceptance"),
        (name = "organizations", description = "Organization lifecycle"),
        (name = "members", description = "Organization membership management"),
        (name = "invitations", description = "Invite-only onboarding"),
        (name = "properties", description = "Rental property management"),
        (name = "reservations", description = "Guest reservations")
    ),
    security(
        ("cookieAuth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookieAuth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
        );
    }
}

pub fn docs_router() -> Router {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()).into()
}
