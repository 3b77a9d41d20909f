use crate::{PolicySource, Severity};
use chrono::{DateTime, Utc};
use std::fmt;

/// Normalized view of one per-cluster occurrence of a discovered policy.
///
/// Identity fields are always present. Kind-specific fields are set only for
/// their originating kind and stay `None` everywhere else.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiscoveredPolicyItem {
    pub uid: String,
    pub kind: String,
    pub apigroup: String,
    pub apiversion: String,
    pub kind_plural: String,
    pub name: String,
    // Gatekeeper constraints are cluster-scoped.
    pub namespace: Option<String>,

    pub cluster: String,
    pub hub_cluster_resource: bool,

    pub compliant: Option<String>,
    pub severity: Option<Severity>,
    pub response_action: Option<String>,
    pub disabled: bool,

    pub created: Option<DateTime<Utc>>,
    /// Flattened `"key=value; ..."` labels as reported by the search index.
    pub label: Option<String>,
    /// Flattened `"key=value; ..."` annotations as reported by the search
    /// index.
    pub annotation: Option<String>,
    pub is_external: bool,

    // OperatorPolicy
    pub deployment_available: Option<bool>,
    pub upgrade_available: Option<bool>,

    // Gatekeeper constraints
    pub total_violations: Option<u64>,

    // ValidatingAdmissionPolicyBinding
    pub policy_name: Option<String>,
    pub owned_by_gatekeeper: bool,
    pub validation_actions: Option<String>,

    // Kyverno ClusterPolicy and Policy
    pub validation_failure_action: Option<String>,
    pub missing_resources: Option<String>,
    pub non_compliant_resources: Option<String>,

    /// Attached by the source resolver, not reported by the search index.
    pub source: Option<PolicySource>,
}

/// Rollup of the member response actions for one aggregated row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResponseAction {
    Action(String),
    /// Members disagree.
    Mixed,
}

/// One aggregated row: a logical policy rolled up from its per-cluster
/// occurrences. Rebuilt wholesale on every aggregation pass.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiscoveredPolicyTableItem {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub apigroup: String,
    pub severity: Option<Severity>,
    pub response_action: Option<ResponseAction>,
    pub total_violations: Option<u64>,
    pub source: Option<PolicySource>,
    pub policies: Vec<DiscoveredPolicyItem>,
}

// === impl DiscoveredPolicyTableItem ===

impl DiscoveredPolicyTableItem {
    /// The synthetic row id: name, kind, and API group concatenated.
    pub fn id_for(name: &str, kind: &str, apigroup: &str) -> String {
        format!("{name}{kind}{apigroup}")
    }
}

impl fmt::Display for ResponseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => action.fmt(f),
            Self::Mixed => "Mixed".fmt(f),
        }
    }
}
