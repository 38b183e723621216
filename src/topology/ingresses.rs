//! Ingress conversion and Ingress to Service correlation

use k8s_openapi::api::networking::v1::{Ingress as KubeIngress, IngressBackend};
use std::collections::BTreeMap;

use super::cluster::{Ingress, IngressController};
use super::key::object_key;

const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";

/// Build the Ingress map.
///
/// Backend Services are recorded by name even when no such Service was
/// listed in this pass; the reference resolves once the Service shows up.
pub(crate) fn build_ingresses(
    cluster_id: &str,
    ingresses: &[KubeIngress],
    controllers: &BTreeMap<String, IngressController>,
    default_class: Option<&str>,
) -> BTreeMap<String, Ingress> {
    ingresses
        .iter()
        .map(|ing| {
            let ingress = convert(cluster_id, ing, controllers, default_class);
            (object_key(&ingress.name, &ingress.namespace), ingress)
        })
        .collect()
}

fn convert(
    cluster_id: &str,
    ing: &KubeIngress,
    controllers: &BTreeMap<String, IngressController>,
    default_class: Option<&str>,
) -> Ingress {
    let spec = ing.spec.clone().unwrap_or_default();
    let annotations = ing.metadata.annotations.clone().unwrap_or_default();

    let class = spec
        .ingress_class_name
        .as_deref()
        .or_else(|| annotations.get(INGRESS_CLASS_ANNOTATION).map(String::as_str))
        .or(default_class);

    let controller = class
        .and_then(|class| {
            controllers
                .iter()
                .find(|(_, c)| c.ingress_classes.iter().any(|served| served == class))
        })
        .map(|(key, _)| key.clone())
        .unwrap_or_default();

    let rules = spec.rules.as_deref().unwrap_or_default();
    let services = referenced_services(&spec.default_backend, rules);

    Ingress {
        name: ing.metadata.name.clone().unwrap_or_default(),
        namespace: ing.metadata.namespace.clone().unwrap_or_default(),
        cluster_id: cluster_id.to_string(),
        controller,
        annotations,
        tls: spec.tls.unwrap_or_default(),
        rules: spec.rules.unwrap_or_default(),
        default_service: spec.default_backend,
        services,
    }
}

/// Service names referenced by the default backend, then by each rule's
/// paths in declaration order, without duplicates.
pub(crate) fn referenced_services(
    default_backend: &Option<IngressBackend>,
    rules: &[k8s_openapi::api::networking::v1::IngressRule],
) -> Vec<String> {
    let backends = default_backend.iter().chain(
        rules
            .iter()
            .filter_map(|rule| rule.http.as_ref())
            .flat_map(|http| http.paths.iter().map(|path| &path.backend)),
    );

    let mut services: Vec<String> = Vec::new();
    for name in backends.filter_map(|b| b.service.as_ref().map(|s| &s.name)) {
        if !services.contains(name) {
            services.push(name.clone());
        }
    }
    services
}
