//! Snapshot map keys

/// Key of a namespaced object: `name@namespace`
pub fn object_key(name: &str, namespace: &str) -> String {
    format!("{}@{}", name, namespace)
}

/// Key of a cluster-scoped object: its name
pub fn cluster_key(name: &str) -> String {
    name.to_string()
}
