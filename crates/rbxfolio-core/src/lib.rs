//! Aggregation engine between `rbxfolio-api` and the CLI.
//!
//! - **[`Aggregator`]**: resolves an identity, then walks its owned groups,
//!   games and game passes. Level-1 fetches run concurrently; deeper
//!   branches run through a bounded, order-preserving [`FanOut`] and are
//!   failure-isolated.
//!
//! - **[`TtlCache`]**: process-wide memoization keyed by [`CacheKey`]
//!   (`operation:params`), with single-flight misses. Errors are never
//!   cached.
//!
//! - **Domain model** ([`model`]): [`Identity`], [`OwnedGroup`],
//!   [`ResourceEntry`] and the JSON envelopes [`ResourceListing`],
//!   [`SubResourceListing`] and [`ErrorEnvelope`].

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod fanout;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregator::Aggregator;
pub use cache::{CacheKey, TtlCache};
pub use config::AggregatorConfig;
pub use error::CoreError;
pub use fanout::{FanOut, FanOutPolicy, Pacer};
pub use model::{
    ErrorEnvelope, Identity, IdentityQuery, OwnedGroup, OwnershipPolicy, ResourceEntry,
    ResourceListing, SubResourceEntry, SubResourceListing, SubResourceView,
};
