// edgesync-api: Async Rust client for the FMC dynamic-object API and CDN edge lists

pub mod auth;
pub mod client;
pub mod dynamic_objects;
pub mod error;
pub mod models;
pub mod sources;
pub mod transport;

pub use auth::{AuthToken, Credentials};
pub use client::FmcClient;
pub use error::Error;
pub use models::{
    DynamicObject, DynamicObjectCreate, MappingsEntry, MappingsUpdate, ObjectRef, Page, Paging,
};
pub use sources::EdgeListClient;
pub use transport::{TlsMode, TransportConfig};
