//! Who is calling, and what they may do.
//!
//! Cookie sessions, the three request gates (session, membership, role), and
//! the login and invitation services that feed them.

pub mod hashing;
pub mod invitation;
pub mod invitation_service;
pub mod login_service;
pub mod middleware;
pub mod models;
pub mod organization;
pub mod session;
pub mod user;

pub use invitation::Invitation;
pub use invitation_service::{AcceptOutcome, InvitationService};
pub use login_service::{LoginOutcome, LoginRequest, LoginService, OrgSelection};
pub use models::{AuthError, OrgContext, SessionIdentity};
pub use organization::{
    max_role, MemberRecord, Membership, MembershipWithOrg, Organization, Role,
};
pub use session::{Session, SessionService, SESSION_COOKIE_NAME};
pub use user::{User, UserWithHash};
