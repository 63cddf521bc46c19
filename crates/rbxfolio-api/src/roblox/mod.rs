// Roblox web API client modules
//
// Typed wrappers over the users, games, groups and auth endpoints. Every
// call is routed through `ResilientClient`; list endpoints are walked with
// the shared `Paginator`.

pub mod client;
pub mod games;
pub mod groups;
pub mod models;
pub mod users;

pub use client::{Endpoints, RobloxClient};
