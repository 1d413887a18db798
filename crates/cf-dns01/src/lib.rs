//! Cloudflare DNS-01 challenge solving
//!
//! Locates the Cloudflare zone that owns a challenge FQDN and publishes or
//! retracts the `_acme-challenge` TXT record in it.
//!
//! - [`Credentials`] - API key + email, or API token
//! - [`CloudflareApi`] / [`CloudflareClient`] - authenticated v4 API requests
//! - [`find_nearest_zone_for_fqdn`] - longest-suffix zone lookup
//! - [`DnsProvider`] - `present` / `cleanup` of the challenge record

pub mod client;
pub mod credentials;
pub mod provider;
pub mod types;
pub mod zone;

pub use client::{ApiError, CloudflareApi, CloudflareClient, CloudflareError};
pub use credentials::Credentials;
pub use provider::{CHALLENGE_TTL, DnsProvider};
pub use types::{
    ACME_CHALLENGE_LABEL, Dns01Error, Dns01Result, DnsZone, TxtRecord, challenge_fqdn, un_fqdn,
};
pub use zone::find_nearest_zone_for_fqdn;
