//! One handler module per resource.

pub mod auth;
pub mod health;
pub mod invitations;
pub mod members;
pub mod organizations;
pub mod properties;
pub mod reservations;

// Handler fns, consumed by the router
pub use auth::{accept_invitation_handler, login_handler, logout_handler, me_handler};
pub use health::health_handler;
pub use invitations::{
    create_invitation_handler, list_invitations_handler, revoke_invitation_handler,
};
pub use members::{list_members_handler, remove_member_handler, update_member_handler};
pub use organizations::{create_organization_handler, get_organization_handler};
pub use properties::{
    create_property_handler, delete_property_handler, get_property_handler,
    list_properties_handler, update_property_handler,
};
pub use reservations::{
    create_reservation_handler, delete_reservation_handler, get_reservation_handler,
    list_reservations_handler, update_reservation_handler,
};

// Request and response bodies, consumed by the OpenAPI document
pub use auth::{AcceptInvitationRequest, MeOrg, MeResponseBody, SessionOrg, SessionResponseBody};
pub use health::HealthResponse;
pub use invitations::{CreateInvitationBody, InvitationCreatedBody};
pub use members::{MemberPath, UpdateMemberBody, UpdatedMember};
pub use organizations::CreateOrganizationBody;
pub use properties::{PropertyBody, PropertyPath};
pub use reservations::{
    CreateReservationBody, ListReservationsQuery, ReservationPath, UpdateReservationBody,
};
