//! Shared domain vocabulary: the identifier newtypes.
//!
//! Entity structs live next to the code that resolves them (`auth`, the
//! repository modules); only the typed ids are shared from here.

pub mod id;

pub use id::{InvitationId, MembershipId, OrgId, PropertyId, ReservationId, UserId};
