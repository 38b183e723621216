//! DNSEndpoint to ExternalDns conversion

use std::collections::BTreeMap;

use super::cluster::ExternalDns;
use crate::models::external_dns::DnsEndpoint;

/// One entry per endpoint, keyed by DNS name. A name declared by several
/// endpoints keeps the first declaration.
pub(crate) fn build_external_dnses(endpoints: &[DnsEndpoint]) -> BTreeMap<String, ExternalDns> {
    let mut dnses = BTreeMap::new();

    for endpoint in endpoints.iter().flat_map(|e| e.spec.endpoints.iter()) {
        if endpoint.dns_name.is_empty() {
            continue;
        }
        dnses
            .entry(endpoint.dns_name.clone())
            .or_insert_with(|| ExternalDns {
                dns_name: endpoint.dns_name.clone(),
                targets: endpoint.targets.clone(),
                ttl: endpoint.record_ttl,
            });
    }

    dnses
}
