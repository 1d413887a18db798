use cf_common::SolverConfig;
use cf_dns01::{DnsProvider, challenge_fqdn};
use std::time::Duration;

/// Live configuration, only when an account and a test domain are provided
fn live_setup() -> Option<(DnsProvider, String)> {
    let domain = std::env::var("CLOUDFLARE_DOMAIN").ok().filter(|d| !d.is_empty())?;
    let config = SolverConfig::from_env().ok()?;
    if config.email.is_none() || (config.api_key.is_none() && config.api_token.is_none()) {
        return None;
    }
    let provider = DnsProvider::from_config(&config).expect("live credentials should be valid");
    Some((provider, domain))
}

/// Publishes then retracts a challenge record on the real Cloudflare account
#[tokio::test]
async fn test_live_present_and_cleanup() {
    let Some((provider, domain)) = live_setup() else {
        eprintln!("Skipping: live Cloudflare credentials not configured");
        return;
    };
    let fqdn = challenge_fqdn(&domain);

    provider.present(&domain, &fqdn, "123d==").await.unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;

    provider.cleanup(&domain, &fqdn, "123d==").await.unwrap();
    // A second cleanup finds nothing left to delete
    provider.cleanup(&domain, &fqdn, "123d==").await.unwrap();
}
