//! Nearest managed zone lookup

use reqwest::Method;
use tracing::{debug, warn};

use crate::client::{CloudflareApi, decode_result};
use crate::types::{Dns01Error, Dns01Result, DnsZone, un_fqdn};

/// Suffixes of `name` from most to least specific, stopping before single labels.
///
/// `a.b.example.com` yields `a.b.example.com`, `b.example.com`, `example.com`.
/// A trailing dot is ignored; a name with an empty label yields nothing.
pub fn candidate_suffixes(name: &str) -> impl Iterator<Item = &str> {
    let name = un_fqdn(name);
    let well_formed = has_no_empty_label(name);
    std::iter::once(name)
        .chain(name.match_indices('.').map(move |(i, _)| &name[i + 1..]))
        .take_while(move |suffix| well_formed && suffix.contains('.'))
}

fn has_no_empty_label(name: &str) -> bool {
    name.split('.').all(|label| !label.is_empty())
}

/// Finds the most specific zone of the account that `fqdn` belongs to.
///
/// One `GET /zones?name=` query is issued per candidate suffix, longest first. An
/// empty listing moves on to the next suffix; a failed request ends the search.
pub async fn find_nearest_zone_for_fqdn<C>(client: &C, fqdn: &str) -> Dns01Result<DnsZone>
where
    C: CloudflareApi + ?Sized,
{
    let name = un_fqdn(fqdn).to_ascii_lowercase();
    if !has_no_empty_label(&name) {
        return Err(Dns01Error::InvalidFqdn(fqdn.to_string()));
    }

    for suffix in candidate_suffixes(&name) {
        let uri = format!("/zones?name={}", urlencoding::encode(suffix));
        let lookup_failed = |source| Dns01Error::ZoneLookup {
            fqdn: fqdn.to_string(),
            suffix: suffix.to_string(),
            source,
        };

        let result = client
            .make_request(Method::GET, &uri, None)
            .await
            .map_err(lookup_failed)?;
        let mut zones: Vec<DnsZone> =
            decode_result(&Method::GET, &uri, result).map_err(lookup_failed)?;

        match zones.len() {
            0 => debug!(fqdn, suffix, "No zone with this name, trying parent"),
            1 => {
                let zone = zones.remove(0);
                debug!(fqdn, zone = %zone.name, zone_id = %zone.id, "Found nearest zone");
                return Ok(zone);
            }
            count => {
                warn!(fqdn, suffix, count, "Zone listing returned several zones for one name");
                return Err(Dns01Error::AmbiguousZone {
                    suffix: suffix.to_string(),
                    count,
                });
            }
        }
    }

    Err(Dns01Error::ZoneNotFound {
        fqdn: fqdn.to_string(),
    })
}
