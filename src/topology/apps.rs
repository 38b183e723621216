//! Workload to App conversion

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

use super::cluster::App;
use super::key::object_key;

/// Build the App map from every workload kind.
///
/// Keys are `name@namespace`. On a collision the earlier kind wins, in the
/// order Deployment, StatefulSet, DaemonSet, ReplicaSet. ReplicaSets owned
/// by a Deployment are skipped: the Deployment already stands for them.
pub(crate) fn build_apps(
    deployments: &[Deployment],
    stateful_sets: &[StatefulSet],
    daemon_sets: &[DaemonSet],
    replica_sets: &[ReplicaSet],
) -> BTreeMap<String, App> {
    let mut apps: BTreeMap<String, App> = BTreeMap::new();

    let candidates = deployments
        .iter()
        .map(app_from_deployment)
        .chain(stateful_sets.iter().map(app_from_stateful_set))
        .chain(daemon_sets.iter().map(app_from_daemon_set))
        .chain(
            replica_sets
                .iter()
                .filter(|rs| !is_owned_by_deployment(&rs.metadata))
                .map(app_from_replica_set),
        );

    for app in candidates {
        let key = object_key(&app.name, &app.namespace);
        if let Some(existing) = apps.get(&key) {
            tracing::warn!(
                key = %key,
                kept = %existing.kind,
                dropped = %app.kind,
                "Workloads share a name and namespace, keeping the first one"
            );
            continue;
        }
        apps.insert(key, app);
    }

    apps
}

fn app_from_deployment(deployment: &Deployment) -> App {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();

    new_app(
        &deployment.metadata,
        "Deployment",
        spec.and_then(|s| s.replicas).unwrap_or(1),
        status.and_then(|s| s.ready_replicas).unwrap_or(0),
        spec.map(|s| &s.template),
    )
}

fn app_from_stateful_set(stateful_set: &StatefulSet) -> App {
    let spec = stateful_set.spec.as_ref();
    let status = stateful_set.status.as_ref();

    new_app(
        &stateful_set.metadata,
        "StatefulSet",
        spec.and_then(|s| s.replicas).unwrap_or(1),
        status.and_then(|s| s.ready_replicas).unwrap_or(0),
        spec.map(|s| &s.template),
    )
}

fn app_from_daemon_set(daemon_set: &DaemonSet) -> App {
    let status = daemon_set.status.as_ref();

    new_app(
        &daemon_set.metadata,
        "DaemonSet",
        status.map(|s| s.desired_number_scheduled).unwrap_or(0),
        status.map(|s| s.number_ready).unwrap_or(0),
        daemon_set.spec.as_ref().map(|s| &s.template),
    )
}

fn app_from_replica_set(replica_set: &ReplicaSet) -> App {
    let spec = replica_set.spec.as_ref();
    let status = replica_set.status.as_ref();

    new_app(
        &replica_set.metadata,
        "ReplicaSet",
        spec.and_then(|s| s.replicas).unwrap_or(1),
        status.and_then(|s| s.ready_replicas).unwrap_or(0),
        spec.and_then(|s| s.template.as_ref()),
    )
}

fn new_app(
    meta: &ObjectMeta,
    kind: &str,
    replicas: i32,
    ready_replicas: i32,
    template: Option<&PodTemplateSpec>,
) -> App {
    let template_meta = template.and_then(|t| t.metadata.as_ref());

    let images = template
        .and_then(|t| t.spec.as_ref())
        .map(|spec| {
            spec.containers
                .iter()
                .filter_map(|c| c.image.clone())
                .collect()
        })
        .unwrap_or_default();

    App {
        name: meta.name.clone().unwrap_or_default(),
        kind: kind.to_string(),
        namespace: meta.namespace.clone().unwrap_or_default(),
        replicas,
        ready_replicas,
        images,
        labels: meta.labels.clone().unwrap_or_default(),
        pod_labels: template_meta
            .and_then(|m| m.labels.clone())
            .unwrap_or_default(),
        pod_annotations: template_meta
            .and_then(|m| m.annotations.clone())
            .unwrap_or_default(),
    }
}

fn is_owned_by_deployment(meta: &ObjectMeta) -> bool {
    meta.owner_references
        .iter()
        .flatten()
        .any(|owner| owner.kind == "Deployment")
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::{DeploymentSpec, DeploymentStatus, ReplicaSetSpec};
    use k8s_openapi::api::core::v1::{Container, PodSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

    fn meta(name: &str, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }
    }

    fn template(app: &str, image: &str) -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(BTreeMap::from([("app".to_string(), app.to_string())])),
                ..Default::default()
            }),
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "main".to_string(),
                    image: Some(image.to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
        }
    }

    fn deployment(name: &str, namespace: &str) -> Deployment {
        Deployment {
            metadata: meta(name, namespace),
            spec: Some(DeploymentSpec {
                replicas: Some(3),
                template: template(name, "traefik/whoami:v1.8"),
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                ready_replicas: Some(2),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_deployment_becomes_app() {
        let apps = build_apps(&[deployment("whoami", "default")], &[], &[], &[]);

        let app = &apps["whoami@default"];
        assert_eq!(app.kind, "Deployment");
        assert_eq!(app.replicas, 3);
        assert_eq!(app.ready_replicas, 2);
        assert_eq!(app.images, vec!["traefik/whoami:v1.8".to_string()]);
        assert_eq!(app.pod_labels().get("app").map(String::as_str), Some("whoami"));
    }

    #[test]
    fn test_replica_set_owned_by_deployment_is_skipped() {
        let mut owned = ReplicaSet {
            metadata: meta("whoami-6d4f", "default"),
            spec: Some(ReplicaSetSpec {
                template: Some(template("whoami", "traefik/whoami:v1.8")),
                ..Default::default()
            }),
            status: None,
        };
        owned.metadata.owner_references = Some(vec![OwnerReference {
            kind: "Deployment".to_string(),
            name: "whoami".to_string(),
            ..Default::default()
        }]);
        let standalone = ReplicaSet {
            metadata: meta("standalone", "default"),
            spec: None,
            status: None,
        };

        let apps = build_apps(&[], &[], &[], &[owned, standalone]);

        assert_eq!(apps.len(), 1);
        assert_eq!(apps["standalone@default"].kind, "ReplicaSet");
    }

    #[test]
    fn test_key_collision_keeps_deployment() {
        let stateful_set = StatefulSet {
            metadata: meta("db", "default"),
            spec: None,
            status: None,
        };

        let apps = build_apps(&[deployment("db", "default")], &[stateful_set], &[], &[]);

        assert_eq!(apps.len(), 1);
        assert_eq!(apps["db@default"].kind, "Deployment");
    }
}
