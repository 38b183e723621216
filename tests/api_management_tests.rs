//! API management snapshot tests
//!
//! Selector matching between APIs, collections and accesses, and gating of
//! the optional resource kinds behind their feature flags.

mod common;

use common::FakeLister;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use std::collections::BTreeMap;
use topology_agent::models::ResourceKind;
use topology_agent::models::external_dns::{DnsEndpoint, DnsEndpointSpec, Endpoint};
use topology_agent::models::hub::{
    ApiAccess, ApiAccessSpec, ApiCollection, ApiCollectionSpec, ApiGateway, ApiGatewaySpec,
    ApiServiceRef, ApiSpec, HubApi,
};
use topology_agent::topology::Fetcher;

fn api(name: &str, labels: &[(&str, &str)]) -> HubApi {
    let mut api = HubApi::new(
        name,
        ApiSpec {
            path_prefix: format!("/{}", name),
            service: ApiServiceRef {
                name: name.to_string(),
                ..Default::default()
            },
        },
    );
    api.metadata.namespace = Some("apps".to_string());
    api.metadata.labels = Some(
        labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    api
}

fn in_selector(key: &str, values: &[&str]) -> LabelSelector {
    LabelSelector {
        match_expressions: Some(vec![LabelSelectorRequirement {
            key: key.to_string(),
            operator: "In".to_string(),
            values: Some(values.iter().map(|v| v.to_string()).collect()),
        }]),
        ..Default::default()
    }
}

fn api_lister() -> FakeLister {
    let mut collection_labels = BTreeMap::new();
    collection_labels.insert("team".to_string(), "payments".to_string());
    let mut collection = ApiCollection::new(
        "payments",
        ApiCollectionSpec {
            path_prefix: "/payments".to_string(),
            api_selector: LabelSelector {
                match_labels: Some(BTreeMap::from([(
                    "team".to_string(),
                    "payments".to_string(),
                )])),
                ..Default::default()
            },
        },
    );
    collection.metadata.labels = Some(collection_labels);

    FakeLister {
        apis: vec![
            api("one", &[("key", "value1"), ("team", "payments")]),
            api("two", &[("key", "value2")]),
            api("three", &[("key", "value3")]),
            api("four", &[("key", "value4")]),
            api("unlabelled", &[]),
        ],
        api_collections: vec![collection],
        api_accesses: vec![
            ApiAccess::new(
                "by-value",
                ApiAccessSpec {
                    groups: vec!["dev".to_string()],
                    api_selector: Some(in_selector("key", &["value1", "value2", "value3"])),
                    ..Default::default()
                },
            ),
            ApiAccess::new(
                "by-collection",
                ApiAccessSpec {
                    groups: vec!["ops".to_string()],
                    api_collection_selector: Some(in_selector("team", &["payments"])),
                    ..Default::default()
                },
            ),
        ],
        api_gateways: vec![ApiGateway::new(
            "gateway",
            ApiGatewaySpec {
                api_accesses: vec!["by-value".to_string()],
                custom_domains: vec!["api.example.com".to_string()],
            },
        )],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_access_in_expression_selects_listed_values() {
    let cluster = Fetcher::new(api_lister(), "cluster-1")
        .with_api_management(true)
        .fetch_state()
        .await
        .unwrap();

    let access = &cluster.api_accesses["by-value"];
    let selected = access.resolve_apis(&cluster.apis);

    assert_eq!(selected, vec!["one@apps", "three@apps", "two@apps"]);
    assert!(!access.matches_api(&cluster.apis["four@apps"]));
    assert!(!access.matches_api(&cluster.apis["unlabelled@apps"]));
}

#[tokio::test]
async fn test_collection_and_access_resolution() {
    let cluster = Fetcher::new(api_lister(), "cluster-1")
        .with_api_management(true)
        .fetch_state()
        .await
        .unwrap();

    let collection = &cluster.api_collections["payments"];
    assert_eq!(collection.resolve_apis(&cluster.apis), vec!["one@apps"]);

    let access = &cluster.api_accesses["by-collection"];
    assert_eq!(
        access.resolve_collections(&cluster.api_collections),
        vec!["payments"]
    );
    // No API selector means every API.
    assert_eq!(access.resolve_apis(&cluster.apis).len(), 5);

    let gateway = &cluster.api_gateways["gateway"];
    assert_eq!(gateway.api_accesses, vec!["by-value"]);
}

#[tokio::test]
async fn test_api_management_disabled_lists_nothing() {
    let lister = api_lister();
    let listed = lister.listed.clone();

    let cluster = Fetcher::new(lister, "cluster-1")
        .fetch_state()
        .await
        .unwrap();

    assert!(cluster.apis.is_empty());
    assert!(cluster.api_collections.is_empty());
    assert!(cluster.api_accesses.is_empty());
    assert!(cluster.api_gateways.is_empty());

    let listed = listed.lock().unwrap();
    assert!(!listed.contains(&ResourceKind::Api));
    assert!(!listed.contains(&ResourceKind::ApiAccess));
    assert!(!listed.contains(&ResourceKind::DnsEndpoint));
    assert!(listed.contains(&ResourceKind::Service));
}

#[tokio::test]
async fn test_external_dns_records_when_enabled() {
    let mut endpoint = DnsEndpoint::new(
        "records",
        DnsEndpointSpec {
            endpoints: vec![
                Endpoint {
                    dns_name: "web.example.com".to_string(),
                    targets: vec!["1.2.3.4".to_string()],
                    record_type: "A".to_string(),
                    record_ttl: 300,
                },
                Endpoint {
                    dns_name: "web.example.com".to_string(),
                    targets: vec!["5.6.7.8".to_string()],
                    record_type: "A".to_string(),
                    record_ttl: 60,
                },
            ],
        },
    );
    endpoint.metadata.namespace = Some("default".to_string());

    let lister = FakeLister {
        dns_endpoints: vec![endpoint],
        ..Default::default()
    };

    let cluster = Fetcher::new(lister, "cluster-1")
        .with_external_dns(true)
        .fetch_state()
        .await
        .unwrap();

    let record = &cluster.external_dnses["web.example.com"];
    assert_eq!(record.targets, vec!["1.2.3.4"]);
    assert_eq!(record.ttl, 300);
}
