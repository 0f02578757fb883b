//! HTTP adapters for the issues service and IP geolocation.

pub mod client;
pub mod error;
pub mod ipinfo;

pub use client::IssuesClient;
pub use error::ClientError;
pub use ipinfo::IpInfoClient;
