use serde::{Deserialize, Serialize};

/// Related-kind sentinel that matches no kind, used on clauses that do not
/// need related items. Passing null or an empty list returns all related
/// items.
pub const DO_NOT_RETURN: &str = "$DO-NOT-RETURN";

pub const DEFAULT_SEARCH_LIMIT: u32 = 100_000;

const OCM_POLICY_GROUP: &str = "policy.open-cluster-management.io";
const GATEKEEPER_CONSTRAINT_GROUP: &str = "constraints.gatekeeper.sh";
const GATEKEEPER_MUTATION_GROUP: &str = "mutations.gatekeeper.sh";
const ADMISSION_GROUP: &str = "admissionregistration.k8s.io";
const KYVERNO_GROUP: &str = "kyverno.io";

/// One property filter in a search clause.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct SearchFilter {
    pub property: String,
    pub values: Vec<String>,
}

/// One clause of a search query.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInput {
    pub filters: Vec<SearchFilter>,
    pub related_kinds: Vec<String>,
    pub limit: u32,
}

/// Identifies a single discovered policy for the scoped view.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyTarget {
    pub name: String,
    pub kind: String,
    pub apigroup: String,
}

// === impl SearchFilter ===

impl SearchFilter {
    fn new(property: &str, values: &[&str]) -> Self {
        Self {
            property: property.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Builds the search clauses for the discovered-policies view.
///
/// With a target, a single clause scoped to that policy; otherwise the
/// fleet-wide clause set covering every supported policy engine.
pub fn discovered_policy_queries(target: Option<&PolicyTarget>, limit: u32) -> Vec<SearchInput> {
    let target = match target {
        Some(target) => target,
        None => return fleet_queries(limit),
    };

    vec![SearchInput {
        filters: vec![
            SearchFilter::new("apigroup", &[&target.apigroup]),
            SearchFilter::new("name", &[&target.name]),
            SearchFilter::new("kind", &[&target.kind]),
        ],
        related_kinds: scoped_related_kinds(&target.apigroup, &target.kind),
        limit,
    }]
}

fn fleet_queries(limit: u32) -> Vec<SearchInput> {
    vec![
        SearchInput {
            filters: vec![
                SearchFilter::new("apigroup", &[OCM_POLICY_GROUP]),
                SearchFilter::new(
                    "kind",
                    &["CertificatePolicy", "ConfigurationPolicy", "OperatorPolicy"],
                ),
            ],
            related_kinds: vec![DO_NOT_RETURN.to_string()],
            limit,
        },
        // All Gatekeeper constraints, whatever their template-defined kind.
        SearchInput {
            filters: vec![SearchFilter::new("apigroup", &[GATEKEEPER_CONSTRAINT_GROUP])],
            related_kinds: vec![DO_NOT_RETURN.to_string()],
            limit,
        },
        SearchInput {
            filters: vec![SearchFilter::new("apigroup", &[GATEKEEPER_MUTATION_GROUP])],
            related_kinds: vec![DO_NOT_RETURN.to_string()],
            limit,
        },
        SearchInput {
            filters: vec![
                SearchFilter::new("apigroup", &[ADMISSION_GROUP]),
                SearchFilter::new("kind", &["ValidatingAdmissionPolicyBinding"]),
            ],
            related_kinds: vec![DO_NOT_RETURN.to_string()],
            limit,
        },
        SearchInput {
            filters: vec![
                SearchFilter::new("apigroup", &[KYVERNO_GROUP]),
                SearchFilter::new("kind", &["ClusterPolicy", "Policy"]),
            ],
            related_kinds: vec![
                "ClusterPolicyReport".to_string(),
                "PolicyReport".to_string(),
            ],
            limit,
        },
    ]
}

fn scoped_related_kinds(apigroup: &str, kind: &str) -> Vec<String> {
    // All resources when the page is specific to one Kyverno policy; an
    // empty list returns everything.
    if apigroup == KYVERNO_GROUP {
        return Vec::new();
    }

    if kind == "CertificatePolicy" {
        return vec!["Secret".to_string()];
    }

    Vec::new()
}
