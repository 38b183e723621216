//! Ingress controller detection
//!
//! Which Apps are ingress controllers is a heuristic. The fetcher only
//! depends on the `IngressControllerDetector` trait; `ImageDetector` is the
//! bundled implementation based on container images.

use k8s_openapi::api::networking::v1::IngressClass;
use std::collections::BTreeMap;

use super::cluster::{App, IngressController, Service};

const METRICS_PORT_ANNOTATION: &str = "prometheus.io/port";
const METRICS_PATH_ANNOTATION: &str = "prometheus.io/path";
const DEFAULT_CLASS_ANNOTATION: &str = "ingressclass.kubernetes.io/is-default-class";

/// Known ingress controller implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerType {
    Traefik,
    Nginx,
    HaProxy,
}

impl ControllerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerType::Traefik => "traefik",
            ControllerType::Nginx => "nginx",
            ControllerType::HaProxy => "haproxy",
        }
    }

    /// Value of `IngressClass.spec.controller` for this implementation
    pub fn controller_name(&self) -> &'static str {
        match self {
            ControllerType::Traefik => "traefik.io/ingress-controller",
            ControllerType::Nginx => "k8s.io/ingress-nginx",
            ControllerType::HaProxy => "haproxy-ingress.github.io/controller",
        }
    }
}

/// Decides whether an App is an ingress controller
pub trait IngressControllerDetector: Send + Sync {
    fn detect(&self, app: &App) -> Option<ControllerType>;
}

/// Detects controllers from their container images
#[derive(Debug, Clone, Default)]
pub struct ImageDetector;

impl IngressControllerDetector for ImageDetector {
    fn detect(&self, app: &App) -> Option<ControllerType> {
        app.images.iter().find_map(|image| detect_image(image))
    }
}

fn detect_image(image: &str) -> Option<ControllerType> {
    // Drop the tag or digest, keep registry and repository.
    let repository = image.split('@').next().unwrap_or(image);
    let repository = match repository.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => repo,
        _ => repository,
    };
    let name = repository.rsplit('/').next().unwrap_or(repository);

    if name == "traefik" || repository.ends_with("traefik/traefik") {
        return Some(ControllerType::Traefik);
    }
    if repository.ends_with("ingress-nginx/controller") || name == "nginx-ingress-controller" {
        return Some(ControllerType::Nginx);
    }
    if name == "haproxy-ingress"
        || (name == "kubernetes-ingress" && repository.contains("haproxy"))
    {
        return Some(ControllerType::HaProxy);
    }

    None
}

/// Build the ingress controller map from the detected Apps.
///
/// Served classes come from the IngressClasses naming the controller type,
/// public IPs and metrics URLs from the Services selecting the controller.
pub(crate) fn build_ingress_controllers(
    detector: &dyn IngressControllerDetector,
    apps: &BTreeMap<String, App>,
    services: &BTreeMap<String, Service>,
    ingress_classes: &[IngressClass],
) -> BTreeMap<String, IngressController> {
    let mut controllers = BTreeMap::new();

    for (key, app) in apps {
        let Some(controller_type) = detector.detect(app) else {
            continue;
        };

        let selecting: Vec<&Service> = services
            .values()
            .filter(|svc| svc.apps.iter().any(|k| k == key))
            .collect();

        let controller = IngressController {
            app: app.clone(),
            controller_type: controller_type.as_str().to_string(),
            ingress_classes: served_classes(controller_type, ingress_classes),
            metrics_urls: metrics_urls(app, &selecting),
            public_ips: public_ips(&selecting),
        };

        tracing::debug!(
            key = %key,
            controller_type = %controller.controller_type,
            classes = ?controller.ingress_classes,
            "Detected ingress controller"
        );

        controllers.insert(key.clone(), controller);
    }

    controllers
}

fn served_classes(
    controller_type: ControllerType,
    ingress_classes: &[IngressClass],
) -> Vec<String> {
    let mut classes: Vec<String> = ingress_classes
        .iter()
        .filter(|class| {
            class.spec.as_ref().and_then(|s| s.controller.as_deref())
                == Some(controller_type.controller_name())
        })
        .filter_map(|class| class.metadata.name.clone())
        .collect();
    classes.sort();
    classes
}

fn public_ips(services: &[&Service]) -> Vec<String> {
    let mut ips: Vec<String> = services
        .iter()
        .filter(|svc| svc.service_type == "LoadBalancer")
        .flat_map(|svc| svc.external_addresses().iter().cloned())
        .collect();
    ips.sort();
    ips.dedup();
    ips
}

fn metrics_urls(app: &App, services: &[&Service]) -> Vec<String> {
    let Some(port) = app.pod_annotations().get(METRICS_PORT_ANNOTATION) else {
        return Vec::new();
    };
    let path = app
        .pod_annotations()
        .get(METRICS_PATH_ANNOTATION)
        .map(String::as_str)
        .unwrap_or("/metrics");

    services
        .iter()
        .map(|svc| {
            format!(
                "http://{}.{}.svc.cluster.local:{}{}",
                svc.name, svc.namespace, port, path
            )
        })
        .collect()
}

/// Name of the IngressClass marked as the cluster default, if any
pub(crate) fn default_ingress_class(ingress_classes: &[IngressClass]) -> Option<String> {
    ingress_classes
        .iter()
        .find(|class| {
            class
                .metadata
                .annotations
                .as_ref()
                .and_then(|a| a.get(DEFAULT_CLASS_ANNOTATION))
                .is_some_and(|v| v == "true")
        })
        .and_then(|class| class.metadata.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::key::object_key;
    use k8s_openapi::api::networking::v1::IngressClassSpec;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn app_with_image(image: &str) -> App {
        App {
            name: "controller".to_string(),
            kind: "Deployment".to_string(),
            namespace: "ingress".to_string(),
            images: vec![image.to_string()],
            ..Default::default()
        }
    }

    fn ingress_class(name: &str, controller: &str, default: bool) -> IngressClass {
        IngressClass {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                annotations: default.then(|| {
                    BTreeMap::from([(DEFAULT_CLASS_ANNOTATION.to_string(), "true".to_string())])
                }),
                ..Default::default()
            },
            spec: Some(IngressClassSpec {
                controller: Some(controller.to_string()),
                parameters: None,
            }),
        }
    }

    #[test]
    fn test_detect_images() {
        let detector = ImageDetector;
        for (image, expected) in [
            ("traefik:v3.1", Some(ControllerType::Traefik)),
            ("docker.io/traefik/traefik:v3.1", Some(ControllerType::Traefik)),
            (
                "registry.k8s.io/ingress-nginx/controller:v1.11.2@sha256:abc",
                Some(ControllerType::Nginx),
            ),
            ("quay.io/jcmoraisjr/haproxy-ingress:v0.14", Some(ControllerType::HaProxy)),
            ("localhost:5000/traefik", Some(ControllerType::Traefik)),
            ("traefik/whoami:v1.8", None),
            ("nginx:1.27", None),
        ] {
            assert_eq!(detector.detect(&app_with_image(image)), expected, "{}", image);
        }
    }

    #[test]
    fn test_controller_gets_classes_ips_and_metrics() {
        let app = app_with_image("traefik:v3.1").with_pod_annotations(BTreeMap::from([(
            METRICS_PORT_ANNOTATION.to_string(),
            "9100".to_string(),
        )]));
        let key = object_key(&app.name, &app.namespace);
        let apps = BTreeMap::from([(key.clone(), app)]);

        let service = Service {
            name: "traefik".to_string(),
            namespace: "ingress".to_string(),
            service_type: "LoadBalancer".to_string(),
            apps: vec![key.clone()],
            external_addresses: vec!["203.0.113.10".to_string()],
            ..Default::default()
        };
        let services = BTreeMap::from([("traefik@ingress".to_string(), service)]);

        let classes = vec![
            ingress_class("traefik", "traefik.io/ingress-controller", true),
            ingress_class("nginx", "k8s.io/ingress-nginx", false),
        ];

        let controllers = build_ingress_controllers(&ImageDetector, &apps, &services, &classes);

        let controller = &controllers[&key];
        assert_eq!(controller.controller_type, "traefik");
        assert_eq!(controller.ingress_classes, vec!["traefik".to_string()]);
        assert_eq!(controller.public_ips, vec!["203.0.113.10".to_string()]);
        assert_eq!(
            controller.metrics_urls,
            vec!["http://traefik.ingress.svc.cluster.local:9100/metrics".to_string()]
        );
        assert_eq!(default_ingress_class(&classes), Some("traefik".to_string()));
    }
}
