//! TXT record lifecycle for DNS-01 challenges

use std::time::Duration;

use cf_common::SolverConfig;
use cf_common::config::{
    DEFAULT_POLLING_INTERVAL_SECS, DEFAULT_PROPAGATION_TIMEOUT_SECS, DEFAULT_RECORD_TTL,
};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use crate::client::{CloudflareApi, CloudflareClient, decode_result};
use crate::credentials::Credentials;
use crate::types::{Dns01Error, Dns01Result, DnsZone, TxtRecord, un_fqdn};
use crate::zone::find_nearest_zone_for_fqdn;

/// Default TTL of challenge records
pub const CHALLENGE_TTL: u32 = DEFAULT_RECORD_TTL;

/// Page size of DNS record listings
const RECORDS_PER_PAGE: usize = 100;

/// Publishes and retracts challenge TXT records through a [`CloudflareApi`].
///
/// Holds no state between calls: every operation resolves the owning zone again.
#[derive(Debug, Clone)]
pub struct DnsProvider<C = CloudflareClient> {
    client: C,
    record_ttl: u32,
    propagation_timeout: Duration,
    polling_interval: Duration,
}

impl DnsProvider<CloudflareClient> {
    /// Validates the configured credentials and builds the HTTP client
    pub fn from_config(config: &SolverConfig) -> Dns01Result<Self> {
        let credentials = Credentials::validate(
            config.email.as_deref().unwrap_or_default(),
            config.api_key.as_deref().unwrap_or_default(),
            config.api_token.as_deref().unwrap_or_default(),
        )?;
        debug!(kind = credentials.kind(), api_url = %config.api_url, "Using Cloudflare credentials");

        let client = CloudflareClient::new(
            credentials,
            config.api_url.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )?;

        Ok(Self::new(client)
            .with_record_ttl(config.record_ttl)
            .with_timeout(
                Duration::from_secs(config.propagation_timeout_secs),
                Duration::from_secs(config.polling_interval_secs),
            ))
    }
}

impl<C: CloudflareApi> DnsProvider<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            record_ttl: CHALLENGE_TTL,
            propagation_timeout: Duration::from_secs(DEFAULT_PROPAGATION_TIMEOUT_SECS),
            polling_interval: Duration::from_secs(DEFAULT_POLLING_INTERVAL_SECS),
        }
    }

    pub fn with_record_ttl(mut self, ttl: u32) -> Self {
        self.record_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration, interval: Duration) -> Self {
        self.propagation_timeout = timeout;
        self.polling_interval = interval;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Recommended propagation timeout and polling interval for the caller
    pub fn timeout(&self) -> (Duration, Duration) {
        (self.propagation_timeout, self.polling_interval)
    }

    /// The zone `fqdn` would be published in
    pub async fn find_zone(&self, fqdn: &str) -> Dns01Result<DnsZone> {
        find_nearest_zone_for_fqdn(&self.client, fqdn).await
    }

    /// Creates the TXT record `fqdn` with `value`, unless it is already published.
    ///
    /// Returns once Cloudflare acknowledged the record; propagation is not awaited.
    pub async fn present(&self, domain: &str, fqdn: &str, value: &str) -> Dns01Result<()> {
        let zone = self
            .find_zone(fqdn)
            .await
            .map_err(|e| e.during("present", fqdn))?;

        let name = un_fqdn(fqdn).to_ascii_lowercase();
        let existing = self.find_txt_records(&zone, &name, fqdn, value).await?;
        if !existing.is_empty() {
            debug!(domain, fqdn, zone = %zone.name, "Challenge record already present");
            return Ok(());
        }

        let uri = format!("/zones/{}/dns_records", zone.id);
        let body = json!({
            "type": "TXT",
            "name": name,
            "content": value,
            "ttl": self.record_ttl,
        });

        let result = self
            .client
            .make_request(Method::POST, &uri, Some(body))
            .await
            .map_err(|source| Dns01Error::ProviderRequest {
                action: "create",
                fqdn: fqdn.to_string(),
                source,
            })?;

        let record_id = result.get("id").and_then(|id| id.as_str()).unwrap_or_default();
        info!(domain, fqdn, zone = %zone.name, record_id, "Created challenge TXT record");
        Ok(())
    }

    /// Deletes every TXT record `fqdn` carrying `value`. Nothing to delete is not an error.
    pub async fn cleanup(&self, domain: &str, fqdn: &str, value: &str) -> Dns01Result<()> {
        let zone = self
            .find_zone(fqdn)
            .await
            .map_err(|e| e.during("cleanup", fqdn))?;

        let name = un_fqdn(fqdn).to_ascii_lowercase();
        let records = self.find_txt_records(&zone, &name, fqdn, value).await?;
        if records.is_empty() {
            debug!(domain, fqdn, zone = %zone.name, "No challenge record to clean up");
            return Ok(());
        }

        for record in records {
            let uri = format!("/zones/{}/dns_records/{}", zone.id, record.id);
            self.client
                .make_request(Method::DELETE, &uri, None)
                .await
                .map_err(|source| Dns01Error::ProviderRequest {
                    action: "delete",
                    fqdn: fqdn.to_string(),
                    source,
                })?;
            info!(domain, fqdn, zone = %zone.name, record_id = %record.id, "Deleted challenge TXT record");
        }

        Ok(())
    }

    /// TXT records of `zone` named `name` whose content is `value`, across all pages.
    ///
    /// Names compare case-insensitively; content must match exactly.
    async fn find_txt_records(
        &self,
        zone: &DnsZone,
        name: &str,
        fqdn: &str,
        value: &str,
    ) -> Dns01Result<Vec<TxtRecord>> {
        let list_failed = |source| Dns01Error::ProviderRequest {
            action: "list",
            fqdn: fqdn.to_string(),
            source,
        };

        let mut matching = Vec::new();
        let mut page = 1;
        loop {
            let uri = format!(
                "/zones/{}/dns_records?type=TXT&name={}&per_page={RECORDS_PER_PAGE}&page={page}",
                zone.id,
                urlencoding::encode(name),
            );
            let result = self
                .client
                .make_request(Method::GET, &uri, None)
                .await
                .map_err(list_failed)?;
            let records: Vec<TxtRecord> =
                decode_result(&Method::GET, &uri, result).map_err(list_failed)?;

            let last_page = records.len() < RECORDS_PER_PAGE;
            matching.extend(
                records
                    .into_iter()
                    .filter(|r| r.name.eq_ignore_ascii_case(name) && r.content == value),
            );
            if last_page {
                return Ok(matching);
            }
            page += 1;
        }
    }
}
