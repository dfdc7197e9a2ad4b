//! Demo data seeder
//!
//! Creates an owner account with one organization, two properties, a
//! sample reservation, and a pending admin invitation whose token is
//! logged once. Safe to run repeatedly; existing data is reused.
//! Usage: cargo run --bin seed
//!
//! Set INNKEEP_SEED_EMAIL and INNKEEP_SEED_PASSWORD to control the owner
//! credentials. Defaults are owner@innkeep.dev / welcome-innkeeper.

use anyhow::Context;
use chrono::{Duration, Utc};
use innkeep::{
    auth::{hashing, InvitationService, OrgContext, Role},
    config::DatabaseConfig,
    storage::{
        create_pool,
        repositories::{
            MembershipRepository, NewProperty, NewReservation, OrganizationRepository,
            PropertyRepository, ReservationRepository, SqlxMembershipRepository,
            SqlxOrganizationRepository, SqlxPropertyRepository, SqlxReservationRepository,
            SqlxUserRepository, UserRepository,
        },
    },
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let email = std::env::var("INNKEEP_SEED_EMAIL")
        .unwrap_or_else(|_| "owner@innkeep.dev".to_string());
    let password = std::env::var("INNKEEP_SEED_PASSWORD")
        .unwrap_or_else(|_| "welcome-innkeeper".to_string());
    let org_name =
        std::env::var("INNKEEP_SEED_ORG").unwrap_or_else(|_| "Seaside Stays".to_string());

    let db_config = DatabaseConfig::from_env();
    let pool = create_pool(&db_config).await.context("connect to database")?;
    innkeep::storage::run_migrations(&pool).await.context("run migrations")?;

    let users = SqlxUserRepository::new(pool.clone());
    let orgs = SqlxOrganizationRepository::new(pool.clone());
    let memberships = SqlxMembershipRepository::new(pool.clone());
    let properties = SqlxPropertyRepository::new(pool.clone());
    let reservations = SqlxReservationRepository::new(pool.clone());

    let password_hash = hashing::hash_password(&password).context("hash seed password")?;
    let owner = users
        .upsert_by_email(&email, Some("Demo Owner"), &password_hash)
        .await
        .context("upsert seed user")?;
    info!(email = %owner.email, user_id = %owner.id, "Seed user ready");

    let existing = memberships
        .list_memberships_for_user(&owner.id)
        .await
        .context("list seed user memberships")?;
    let org_id = match existing.first() {
        Some(membership) => {
            info!(org_id = %membership.org_id, org_name = %membership.org_name, "Reusing existing organization");
            membership.org_id.clone()
        }
        None => {
            let org =
                orgs.create_organization(&org_name, &owner.id).await.context("create seed org")?;
            info!(org_id = %org.id, org_name = %org.name, "Created organization");
            org.id
        }
    };
    memberships
        .ensure_membership(&owner.id, &org_id, Role::Owner)
        .await
        .context("ensure owner membership")?;

    if properties.list_properties(&org_id).await.context("list properties")?.is_empty() {
        let cottage = properties
            .create_property(
                &org_id,
                NewProperty {
                    name: "Harbour Cottage".to_string(),
                    address: "1 Quay Lane, Port Ellen".to_string(),
                    description: Some("Two bedrooms, view of the harbour".to_string()),
                },
            )
            .await
            .context("create first property")?;
        properties
            .create_property(
                &org_id,
                NewProperty {
                    name: "Hillside Loft".to_string(),
                    address: "14 Brae Road, Port Ellen".to_string(),
                    description: None,
                },
            )
            .await
            .context("create second property")?;

        let start = Utc::now().date_naive() + Duration::days(7);
        reservations
            .create_reservation(
                &org_id,
                NewReservation {
                    property_id: cottage.id,
                    guest_name: "Alex Morgan".to_string(),
                    start_date: start,
                    end_date: start + Duration::days(3),
                    notes: Some("Arriving on the evening ferry".to_string()),
                    created_by: Some(owner.id.clone()),
                },
            )
            .await
            .context("create sample reservation")?;
        info!("Seeded two properties and a sample reservation");
    } else {
        info!("Properties already present, skipping property seed");
    }

    let invites = InvitationService::with_sqlx(pool.clone(), Duration::hours(72));
    let pending = invites.list_invitations(&org_id).await.context("list invitations")?;
    if pending.iter().any(|invite| invite.is_acceptable(Utc::now())) {
        info!("Pending invitation already present, skipping invitation seed");
    } else {
        let inviter = OrgContext::new(owner.id.clone(), org_id.clone(), vec![Role::Owner]);
        let invitation = invites
            .create_invitation(&inviter, "manager@innkeep.dev", Role::Admin)
            .await
            .context("create seed invitation")?;
        // The token is recoverable only here; listings never echo it.
        info!(
            email = %invitation.email,
            token = %invitation.token,
            "Seeded pending admin invitation, accept it with this token"
        );
    }

    info!(email = %email, "Seeding complete; log in with the seed credentials");
    Ok(())
}
