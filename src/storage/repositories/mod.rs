//! One repository per aggregate.
//!
//! Each module pairs a trait with its sqlx implementation and owns the row
//! mapping for its tables.

pub mod invitation;
pub mod membership;
pub mod organization;
pub mod property;
pub mod reservation;
pub mod session;
pub mod user;

// Traits, sqlx implementations, and the entity and payload types that
// ride with them
pub use invitation::{InvitationRepository, SqlxInvitationRepository};
pub use membership::{MembershipRepository, SqlxMembershipRepository};
pub use organization::{OrganizationRepository, SqlxOrganizationRepository};
pub use property::{
    NewProperty, Property, PropertyRepository, SqlxPropertyRepository, UpdateProperty,
};
pub use reservation::{
    NewReservation, Reservation, ReservationRepository, SqlxReservationRepository,
    UpdateReservation,
};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
