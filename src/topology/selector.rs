//! Label selector evaluation
//!
//! One predicate shared by every entity that supports selector matching, so
//! API collections and API accesses cannot drift apart. Service selectors
//! are plain maps and use `is_subset` instead: an empty Service selector
//! matches nothing, while an empty label selector matches everything.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use std::collections::BTreeMap;

/// Check whether a label selector matches a label set.
///
/// `matchLabels` and `matchExpressions` must all hold. A missing or empty
/// selector matches everything.
pub fn matches(selector: Option<&LabelSelector>, labels: &BTreeMap<String, String>) -> bool {
    let Some(selector) = selector else {
        return true;
    };

    if let Some(match_labels) = &selector.match_labels {
        for (key, value) in match_labels {
            if labels.get(key) != Some(value) {
                return false;
            }
        }
    }

    if let Some(match_expressions) = &selector.match_expressions {
        for expr in match_expressions {
            if !expression_matches(expr, labels) {
                return false;
            }
        }
    }

    true
}

fn expression_matches(expr: &LabelSelectorRequirement, labels: &BTreeMap<String, String>) -> bool {
    let label_value = labels.get(&expr.key);
    let values = expr.values.as_deref().unwrap_or_default();

    match expr.operator.as_str() {
        "In" => label_value.is_some_and(|value| values.contains(value)),
        "NotIn" => label_value.is_none_or(|value| !values.contains(value)),
        "Exists" => label_value.is_some(),
        "DoesNotExist" => label_value.is_none(),
        // The API server rejects unknown operators.
        _ => false,
    }
}

/// Check whether every pair of a Service selector is present in `labels`.
///
/// An empty selector selects nothing.
pub fn is_subset(selector: &BTreeMap<String, String>, labels: &BTreeMap<String, String>) -> bool {
    !selector.is_empty() && selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}
