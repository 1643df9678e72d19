// bsp-api: Async Rust client for the BSP site, provisioning, security, and
// transaction-document services.
//
// Every request is signed with HMAC-SHA512 over the method, path+query, and
// a fixed header subset (see `signing`). List endpoints are traversed with
// `Paginator`.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod pagination;
pub mod provisioning;
pub mod security;
pub mod signing;
pub mod site;
pub mod transaction;
pub mod transport;

pub use auth::{Credentials, Scheme, ServerTarget};
pub use client::{BspClient, Method};
pub use error::Error;
pub use models::{
    AccessKey, Address, Coordinates, CreatedSite, CreatedUser, EnterpriseUnit, Group, GroupMember,
    GroupMembers, Page, PageContent, SiteStatus, UserStatus,
};
pub use pagination::Paginator;
pub use provisioning::ProvisioningClient;
pub use security::SecurityClient;
pub use site::{CreateSiteOptions, SiteClient, UpdateSiteOptions};
pub use transaction::TransactionClient;
pub use transport::TransportConfig;
