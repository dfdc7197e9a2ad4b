//! SQLite-backed persistence: pool construction, embedded migrations, and
//! one repository per aggregate.

pub mod migrations;
pub mod pool;
pub mod repositories;


pub use crate::config::DatabaseConfig;

pub use pool::{create_pool, DbPool};
pub use repositories::{
    InvitationRepository, MembershipRepository, NewProperty, NewReservation, OrganizationRepository,
    Property, PropertyRepository, Reservation, ReservationRepository, SessionRepository,
    SqlxInvitationRepository, SqlxMembershipRepository, SqlxOrganizationRepository,
    SqlxPropertyRepository, SqlxReservationRepository, SqlxSessionRepository, SqlxUserRepository,
    UpdateProperty, UpdateReservation, UserRepository,
};

use crate::errors::Result;

/// Apply any migrations the database has not seen yet.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    migrations::run_migrations(pool).await
}
