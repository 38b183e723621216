//! Service conversion and Service to App correlation

use k8s_openapi::api::core::v1::Service as KubeService;
use std::collections::BTreeMap;

use super::cluster::{App, Service};
use super::key::object_key;
use super::selector;

/// Build the Service map and attach the Apps each Service selects.
///
/// An App is selected when it lives in the Service's namespace and its pod
/// labels contain every selector pair. Services without a selector select
/// nothing.
pub(crate) fn build_services(
    services: &[KubeService],
    apps: &BTreeMap<String, App>,
) -> BTreeMap<String, Service> {
    services
        .iter()
        .map(|svc| {
            let mut service = convert(svc);
            service.apps = matching_apps(&service, apps);
            (object_key(&service.name, &service.namespace), service)
        })
        .collect()
}

fn convert(svc: &KubeService) -> Service {
    let spec = svc.spec.as_ref();

    let external_addresses = svc
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .map(|ingresses| {
            ingresses
                .iter()
                .filter_map(|ing| ing.ip.clone().or_else(|| ing.hostname.clone()))
                .collect()
        })
        .unwrap_or_default();

    Service {
        name: svc.metadata.name.clone().unwrap_or_default(),
        namespace: svc.metadata.namespace.clone().unwrap_or_default(),
        service_type: spec
            .and_then(|s| s.type_.clone())
            .unwrap_or_else(|| "ClusterIP".to_string()),
        selector: spec.and_then(|s| s.selector.clone()).unwrap_or_default(),
        apps: Vec::new(),
        external_addresses,
        ports: spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| ports.iter().map(|p| p.port).collect())
            .unwrap_or_default(),
    }
}

fn matching_apps(service: &Service, apps: &BTreeMap<String, App>) -> Vec<String> {
    apps.iter()
        .filter(|(_, app)| app.namespace == service.namespace)
        .filter(|(_, app)| selector::is_subset(&service.selector, app.pod_labels()))
        .map(|(key, _)| key.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        LoadBalancerIngress, LoadBalancerStatus, ServicePort, ServiceSpec, ServiceStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn app(name: &str, namespace: &str, pod_labels: &[(&str, &str)]) -> (String, App) {
        let app = App {
            name: name.to_string(),
            kind: "Deployment".to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
        .with_pod_labels(
            pod_labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        (object_key(name, namespace), app)
    }

    fn service(name: &str, selector: &[(&str, &str)]) -> KubeService {
        KubeService {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                selector: if selector.is_empty() {
                    None
                } else {
                    Some(
                        selector
                            .iter()
                            .map(|(k, v)| (k.to_string(), v.to_string()))
                            .collect(),
                    )
                },
                ports: Some(vec![ServicePort {
                    port: 80,
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            status: None,
        }
    }

    #[test]
    fn test_service_selects_apps_by_pod_labels() {
        let apps = BTreeMap::from([
            app("foo", "default", &[("app", "foo")]),
            app("bar", "default", &[("app", "bar")]),
        ]);

        let services = build_services(&[service("svc", &[("app", "foo")])], &apps);

        let svc = &services["svc@default"];
        assert_eq!(svc.apps, vec!["foo@default".to_string()]);
        assert_eq!(svc.service_type, "ClusterIP");
        assert_eq!(svc.ports(), &[80]);
    }

    #[test]
    fn test_empty_selector_selects_nothing() {
        let apps = BTreeMap::from([app("foo", "default", &[("app", "foo")])]);

        let services = build_services(&[service("headless", &[])], &apps);

        assert!(services["headless@default"].apps.is_empty());
    }

    #[test]
    fn test_selector_does_not_cross_namespaces() {
        let apps = BTreeMap::from([app("foo", "other", &[("app", "foo")])]);

        let services = build_services(&[service("svc", &[("app", "foo")])], &apps);

        assert!(services["svc@default"].apps.is_empty());
    }

    #[test]
    fn test_load_balancer_addresses_are_collected() {
        let mut svc = service("lb", &[("app", "traefik")]);
        svc.status = Some(ServiceStatus {
            load_balancer: Some(LoadBalancerStatus {
                ingress: Some(vec![
                    LoadBalancerIngress {
                        ip: Some("203.0.113.10".to_string()),
                        ..Default::default()
                    },
                    LoadBalancerIngress {
                        hostname: Some("lb.example.com".to_string()),
                        ..Default::default()
                    },
                ]),
            }),
            ..Default::default()
        });

        let services = build_services(&[svc], &BTreeMap::new());

        assert_eq!(
            services["lb@default"].external_addresses(),
            &["203.0.113.10".to_string(), "lb.example.com".to_string()]
        );
    }
}
