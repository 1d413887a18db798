use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ApiError;

/// Owner label of DNS-01 challenge records
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// A DNS zone managed by the Cloudflare account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsZone {
    pub id: String,
    pub name: String,
}

/// A TXT record as listed by the DNS records endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtRecord {
    pub id: String,
    pub name: String,
    pub content: String,
}

/// Strips a single trailing dot from a fully-qualified name
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Challenge record FQDN for a domain, e.g. `_acme-challenge.example.com.`
///
/// Wildcard domains share the record of their base domain.
pub fn challenge_fqdn(domain: &str) -> String {
    let domain = un_fqdn(domain.strip_prefix("*.").unwrap_or(domain));
    format!("{ACME_CHALLENGE_LABEL}.{domain}.")
}

#[derive(Error, Debug)]
pub enum Dns01Error {
    /// Unusable credential combination, detected before any request
    #[error("{0}")]
    Config(String),

    #[error("invalid FQDN '{0}'")]
    InvalidFqdn(String),

    #[error("while attempting to find zones for domain {fqdn} (querying '{suffix}'): {source}")]
    ZoneLookup {
        fqdn: String,
        suffix: String,
        #[source]
        source: ApiError,
    },

    #[error("found {count} zones named '{suffix}', expected at most one")]
    AmbiguousZone { suffix: String, count: usize },

    #[error(
        "found no zones for domain {fqdn} (neither in the sub-domain nor in the SLD), \
         make sure the domain is managed by this account and the credentials can list zones"
    )]
    ZoneNotFound { fqdn: String },

    #[error("failed to {action} TXT record {fqdn}: {source}")]
    ProviderRequest {
        action: &'static str,
        fqdn: String,
        #[source]
        source: ApiError,
    },

    #[error("{operation} {fqdn}: {source}")]
    Operation {
        operation: &'static str,
        fqdn: String,
        #[source]
        source: Box<Dns01Error>,
    },
}

impl Dns01Error {
    /// The underlying error, without operation context
    pub fn root(&self) -> &Dns01Error {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn during(self, operation: &'static str, fqdn: &str) -> Self {
        Self::Operation {
            operation,
            fqdn: fqdn.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Dns01Result<T> = Result<T, Dns01Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_un_fqdn() {
        assert_eq!(un_fqdn("example.com."), "example.com");
        assert_eq!(un_fqdn("example.com"), "example.com");
        assert_eq!(un_fqdn("example.com.."), "example.com.");
        assert_eq!(un_fqdn(""), "");
    }

    #[test]
    fn test_challenge_fqdn() {
        assert_eq!(challenge_fqdn("example.com"), "_acme-challenge.example.com.");
        assert_eq!(challenge_fqdn("*.example.com"), "_acme-challenge.example.com.");
        assert_eq!(challenge_fqdn("sub.example.com."), "_acme-challenge.sub.example.com.");
    }

    #[test]
    fn test_zone_deserialize_ignores_extra_fields() {
        let zone: DnsZone = serde_json::from_str(
            r#"{"id":"1a23cc4567b8def91a01c23a456e78cd","name":"sub.domain.com","status":"active"}"#,
        )
        .unwrap();
        assert_eq!(zone.id, "1a23cc4567b8def91a01c23a456e78cd");
        assert_eq!(zone.name, "sub.domain.com");
    }

    #[test]
    fn test_root_unwraps_operation_context() {
        let err = Dns01Error::ZoneNotFound {
            fqdn: "_acme-challenge.example.com.".to_string(),
        }
        .during("present", "_acme-challenge.example.com.");

        assert!(err.to_string().starts_with("present _acme-challenge.example.com.: "));
        assert!(matches!(err.root(), Dns01Error::ZoneNotFound { .. }));
    }
}
