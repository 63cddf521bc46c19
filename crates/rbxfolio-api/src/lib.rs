// rbxfolio-api: resilient async client for the Roblox web APIs

pub mod auth;
pub mod client;
pub mod error;
pub mod pagination;
pub mod roblox;
pub mod transport;

pub use auth::{AuthSession, TokenSnapshot};
pub use client::{ApiRequest, ResilientClient, ResponseClass, RetryPolicy, classify};
pub use error::Error;
pub use pagination::{Page, Paginator};
pub use roblox::models::{
    Creator, Game, GamePass, GroupInfo, GroupMembership, GroupRole, PlaceRef, User, UsernameMatch,
};
pub use roblox::{Endpoints, RobloxClient};
pub use transport::TransportConfig;
