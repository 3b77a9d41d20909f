use chrono::{DateTime, Utc};
use hub_policy_aggregator_core::{
    parse_string_map, DiscoveredPolicyItem, Severity, SEVERITY_ANNOTATION,
};
use hub_policy_aggregator_search::SearchItem;

const OCM_POLICY_GROUP: &str = "policy.open-cluster-management.io";
const GATEKEEPER_CONSTRAINT_GROUP: &str = "constraints.gatekeeper.sh";
const GATEKEEPER_MUTATION_GROUP: &str = "mutations.gatekeeper.sh";
const ADMISSION_GROUP: &str = "admissionregistration.k8s.io";
const KYVERNO_GROUP: &str = "kyverno.io";

/// Maps raw search records of mixed kinds into the uniform
/// discovered-policy shape.
///
/// Records of unrecognized kinds keep their identity and common fields and
/// pass through otherwise untouched; nothing is dropped.
pub fn normalize(items: &[SearchItem]) -> Vec<DiscoveredPolicyItem> {
    items.iter().map(normalize_item).collect()
}

fn normalize_item(raw: &SearchItem) -> DiscoveredPolicyItem {
    let mut item = DiscoveredPolicyItem {
        uid: field(raw, "_uid").unwrap_or_default(),
        kind: field(raw, "kind").unwrap_or_default(),
        apigroup: field(raw, "apigroup").unwrap_or_default(),
        apiversion: field(raw, "apiversion").unwrap_or_default(),
        kind_plural: field(raw, "kind_plural").unwrap_or_default(),
        name: field(raw, "name").unwrap_or_default(),
        namespace: field(raw, "namespace"),
        cluster: field(raw, "cluster").unwrap_or_default(),
        hub_cluster_resource: raw.bool_field("_hubClusterResource").unwrap_or(false),
        compliant: field(raw, "compliant"),
        disabled: raw.bool_field("disabled").unwrap_or(false),
        created: raw.str_field("created").and_then(parse_timestamp),
        label: field(raw, "label"),
        annotation: field(raw, "annotation"),
        is_external: raw.bool_field("_isExternal").unwrap_or(false),
        ..Default::default()
    };

    match (item.apigroup.as_str(), item.kind.as_str()) {
        (OCM_POLICY_GROUP, _) => {
            item.severity = raw.str_field("severity").and_then(Severity::parse);
            item.response_action = raw.str_field("remediationAction").map(str::to_ascii_lowercase);
            if item.kind == "OperatorPolicy" {
                item.deployment_available = raw.bool_field("deploymentAvailable");
                item.upgrade_available = raw.bool_field("upgradeAvailable");
            }
        }

        (GATEKEEPER_CONSTRAINT_GROUP, _) => {
            item.severity = annotation_severity(raw);
            item.response_action =
                Some(raw.str_field("enforcementAction").unwrap_or("deny").to_string());
            item.total_violations = raw.u64_field("totalViolations");
        }

        (GATEKEEPER_MUTATION_GROUP, _) => {
            // Mutations have no compliance state.
            item.compliant = None;
            item.severity = annotation_severity(raw);
            item.response_action = field(raw, "mutationAction");
        }

        (ADMISSION_GROUP, "ValidatingAdmissionPolicyBinding") => {
            item.policy_name = field(raw, "policyName");
            item.owned_by_gatekeeper = raw.bool_field("_ownedByGatekeeper").unwrap_or(false);
            item.validation_actions = field(raw, "validationActions");
            item.response_action = item.validation_actions.clone();
        }

        (KYVERNO_GROUP, "ClusterPolicy" | "Policy") => {
            item.severity = annotation_severity(raw);
            item.validation_failure_action = field(raw, "validationFailureAction");
            item.response_action = item.validation_failure_action.clone();
            item.missing_resources = field(raw, "_missingResources");
            item.non_compliant_resources = field(raw, "_nonCompliantResources");
        }

        // Unrecognized kinds keep whatever common fields they carry.
        _ => {
            item.severity = raw.str_field("severity").and_then(Severity::parse);
            item.response_action = field(raw, "remediationAction");
        }
    }

    item
}

fn field(raw: &SearchItem, key: &str) -> Option<String> {
    raw.str_field(key).map(str::to_string)
}

/// Some engines carry their severity in a policy annotation rather than an
/// API field.
fn annotation_severity(raw: &SearchItem) -> Option<Severity> {
    let annotations = parse_string_map(raw.str_field("annotation")?);
    Severity::parse(annotations.get(SEVERITY_ANNOTATION)?)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
