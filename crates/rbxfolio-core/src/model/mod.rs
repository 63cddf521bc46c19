// ── Domain model ──
//
// Canonical types produced by an aggregation. Upstream response shapes
// live in `rbxfolio_api`; `crate::convert` bridges the two.

pub mod group;
pub mod identity;
pub mod listing;
pub mod resource;

pub use group::{OwnedGroup, OwnershipPolicy};
pub use identity::{Identity, IdentityQuery};
pub use listing::{ErrorEnvelope, ResourceListing, SubResourceListing, SubResourceView};
pub use resource::{ResourceEntry, SubResourceEntry};
