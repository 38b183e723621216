//! API management resources to snapshot conversion

use std::collections::BTreeMap;

use super::cluster::{
    Api, ApiAccess, ApiCollection, ApiGateway, ApiPortal, ApiService, ApiServiceBackendPort,
    OpenApiSpec,
};
use super::key::{cluster_key, object_key};
use crate::models::hub;

pub(crate) fn build_apis(apis: &[hub::HubApi]) -> BTreeMap<String, Api> {
    apis.iter()
        .map(|api| {
            let name = api.metadata.name.clone().unwrap_or_default();
            let namespace = api.metadata.namespace.clone().unwrap_or_default();
            let service = &api.spec.service;

            let converted = Api {
                name: name.clone(),
                namespace: namespace.clone(),
                labels: api.metadata.labels.clone().unwrap_or_default(),
                path_prefix: api.spec.path_prefix.clone(),
                service: ApiService {
                    name: service.name.clone(),
                    port: backend_port(&service.port),
                    open_api_spec: OpenApiSpec {
                        url: service.open_api_spec.url.clone(),
                        path: service.open_api_spec.path.clone(),
                        protocol: service.open_api_spec.protocol.clone(),
                        port: service.open_api_spec.port.as_ref().map(backend_port),
                    },
                },
            };
            (object_key(&name, &namespace), converted)
        })
        .collect()
}

fn backend_port(port: &hub::ApiServicePort) -> ApiServiceBackendPort {
    ApiServiceBackendPort {
        name: port.name.clone(),
        number: port.number,
    }
}

pub(crate) fn build_api_collections(
    collections: &[hub::ApiCollection],
) -> BTreeMap<String, ApiCollection> {
    collections
        .iter()
        .map(|collection| {
            let name = collection.metadata.name.clone().unwrap_or_default();
            let converted = ApiCollection {
                name: name.clone(),
                labels: collection.metadata.labels.clone().unwrap_or_default(),
                path_prefix: collection.spec.path_prefix.clone(),
                api_selector: collection.spec.api_selector.clone(),
            };
            (cluster_key(&name), converted)
        })
        .collect()
}

pub(crate) fn build_api_accesses(accesses: &[hub::ApiAccess]) -> BTreeMap<String, ApiAccess> {
    accesses
        .iter()
        .map(|access| {
            let name = access.metadata.name.clone().unwrap_or_default();
            let converted = ApiAccess {
                name: name.clone(),
                labels: access.metadata.labels.clone().unwrap_or_default(),
                groups: access.spec.groups.clone(),
                api_selector: access.spec.api_selector.clone(),
                api_collection_selector: access.spec.api_collection_selector.clone(),
            };
            (cluster_key(&name), converted)
        })
        .collect()
}

pub(crate) fn build_api_portals(portals: &[hub::ApiPortal]) -> BTreeMap<String, ApiPortal> {
    portals
        .iter()
        .map(|portal| {
            let name = portal.metadata.name.clone().unwrap_or_default();
            let converted = ApiPortal {
                name: name.clone(),
                title: portal.spec.title.clone(),
                description: portal.spec.description.clone(),
                api_gateway: portal.spec.api_gateway.clone(),
                custom_domains: portal.spec.custom_domains.clone(),
            };
            (cluster_key(&name), converted)
        })
        .collect()
}

pub(crate) fn build_api_gateways(gateways: &[hub::ApiGateway]) -> BTreeMap<String, ApiGateway> {
    gateways
        .iter()
        .map(|gateway| {
            let name = gateway.metadata.name.clone().unwrap_or_default();
            let converted = ApiGateway {
                name: name.clone(),
                labels: gateway.metadata.labels.clone().unwrap_or_default(),
                api_accesses: gateway.spec.api_accesses.clone(),
                custom_domains: gateway.spec.custom_domains.clone(),
            };
            (cluster_key(&name), converted)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_is_namespaced_and_collection_is_not() {
        let mut api = hub::HubApi::new(
            "books",
            hub::ApiSpec {
                path_prefix: "/books".to_string(),
                service: hub::ApiServiceRef {
                    name: "books-svc".to_string(),
                    port: hub::ApiServicePort {
                        number: 8080,
                        ..Default::default()
                    },
                    ..Default::default()
                },
            },
        );
        api.metadata.namespace = Some("library".to_string());
        let collection = hub::ApiCollection::new("all", hub::ApiCollectionSpec::default());

        let apis = build_apis(&[api]);
        let collections = build_api_collections(&[collection]);

        assert_eq!(apis["books@library"].service.port.number, 8080);
        assert_eq!(apis["books@library"].path_prefix, "/books");
        assert!(collections.contains_key("all"));
    }
}
