//! Resource kind definitions
//!
//! Centralized enum for every resource kind the topology fetcher lists.
//! Used to tag listing failures and log lines instead of hardcoded strings.

use std::fmt;

/// Enumeration of all listed resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    // Core resources
    Namespace,
    Service,
    // Workloads
    Deployment,
    StatefulSet,
    DaemonSet,
    ReplicaSet,
    // Networking
    Ingress,
    IngressClass,
    // Hub resources
    AccessControlPolicy,
    Api,
    ApiCollection,
    ApiAccess,
    ApiPortal,
    ApiGateway,
    // External DNS
    DnsEndpoint,
}

impl ResourceKind {
    /// Get the Kubernetes kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Service => "Service",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::IngressClass => "IngressClass",
            ResourceKind::AccessControlPolicy => "AccessControlPolicy",
            ResourceKind::Api => "API",
            ResourceKind::ApiCollection => "APICollection",
            ResourceKind::ApiAccess => "APIAccess",
            ResourceKind::ApiPortal => "APIPortal",
            ResourceKind::ApiGateway => "APIGateway",
            ResourceKind::DnsEndpoint => "DNSEndpoint",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(ResourceKind::Deployment.as_str(), "Deployment");
        assert_eq!(ResourceKind::Api.as_str(), "API");
        assert_eq!(ResourceKind::DnsEndpoint.as_str(), "DNSEndpoint");
    }

    #[test]
    fn test_display_matches_kind_name() {
        assert_eq!(ResourceKind::ApiAccess.to_string(), "APIAccess");
        assert_eq!(format!("{}", ResourceKind::IngressClass), "IngressClass");
    }
}
