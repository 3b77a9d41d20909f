use super::*;
use hub_policy_aggregator_core::{
    ChannelKind, DiscoveredPolicyItem, HelmReleaseEdge, ObjectRef, PolicySource,
    ProvenanceSnapshot, ProvenanceView, ResponseAction, Severity, SourceKind, SubscriptionEdge,
};
use hub_policy_aggregator_search::{SearchItem, SearchResults};
use serde_json::Value;

pub(crate) fn mk_raw(fields: &[(&str, &str)]) -> SearchItem {
    SearchItem(
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect(),
    )
}

fn mk_item(name: &str, kind: &str, apigroup: &str, cluster: &str) -> DiscoveredPolicyItem {
    DiscoveredPolicyItem {
        name: name.to_string(),
        kind: kind.to_string(),
        apigroup: apigroup.to_string(),
        cluster: cluster.to_string(),
        ..Default::default()
    }
}

/// Serves a fixed snapshot, standing in for the watch-driven index.
#[derive(Clone, Debug, Default)]
pub(crate) struct StaticProvenance(ProvenanceSnapshot);

impl ProvenanceView for StaticProvenance {
    fn snapshot(&self) -> ProvenanceSnapshot {
        self.0.clone()
    }
}

fn mk_provenance() -> ProvenanceSnapshot {
    let mut snap = ProvenanceSnapshot::default();
    snap.channels
        .insert(ObjectRef::new("gitops", "policies"), ChannelKind::Git);
    snap.channels
        .insert(ObjectRef::new("charts", "stable"), ChannelKind::HelmRepo);
    snap.subscriptions.insert(
        ObjectRef::new("gitops", "git-sub"),
        SubscriptionEdge {
            channel: Some(ObjectRef::new("gitops", "policies")),
        },
    );
    snap.subscriptions.insert(
        ObjectRef::new("charts", "helm-sub"),
        SubscriptionEdge {
            channel: Some(ObjectRef::new("charts", "stable")),
        },
    );
    snap.subscriptions.insert(
        ObjectRef::new("apps", "orphan-sub"),
        SubscriptionEdge { channel: None },
    );
    snap.helm_releases.insert(
        ObjectRef::new("apps", "search-prod"),
        HelmReleaseEdge {
            hosting_subscription: Some(ObjectRef::new("gitops", "git-sub")),
        },
    );
    snap
}

// === normalizer ===

#[test]
fn normalizes_configuration_policy() {
    let raw = mk_raw(&[
        ("_uid", "c1/abc"),
        ("kind", "ConfigurationPolicy"),
        ("apigroup", "policy.open-cluster-management.io"),
        ("apiversion", "v1"),
        ("kind_plural", "configurationpolicies"),
        ("name", "p1"),
        ("namespace", "open-cluster-management"),
        ("cluster", "c1"),
        ("compliant", "NonCompliant"),
        ("severity", "High"),
        ("remediationAction", "Enforce"),
        ("created", "2024-05-02T10:15:00Z"),
        ("_hubClusterResource", "true"),
    ]);

    let items = normalize(&[raw]);
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.uid, "c1/abc");
    assert_eq!(item.name, "p1");
    assert_eq!(item.namespace.as_deref(), Some("open-cluster-management"));
    assert_eq!(item.cluster, "c1");
    assert!(item.hub_cluster_resource);
    assert_eq!(item.compliant.as_deref(), Some("NonCompliant"));
    assert_eq!(item.severity, Some(Severity::High));
    assert_eq!(item.response_action.as_deref(), Some("enforce"));
    assert!(item.created.is_some());
    assert_eq!(item.total_violations, None);
}

#[test]
fn normalizes_operator_policy_availability() {
    let raw = mk_raw(&[
        ("kind", "OperatorPolicy"),
        ("apigroup", "policy.open-cluster-management.io"),
        ("name", "op"),
        ("cluster", "c1"),
        ("deploymentAvailable", "true"),
        ("upgradeAvailable", "false"),
    ]);

    let item = &normalize(&[raw])[0];
    assert_eq!(item.deployment_available, Some(true));
    assert_eq!(item.upgrade_available, Some(false));
}

#[test]
fn normalizes_gatekeeper_constraint() {
    let raw = mk_raw(&[
        ("kind", "K8sRequiredLabels"),
        ("apigroup", "constraints.gatekeeper.sh"),
        ("name", "require-team"),
        ("cluster", "c2"),
        ("totalViolations", "7"),
        (
            "annotation",
            "policy.open-cluster-management.io/severity=critical",
        ),
    ]);

    let item = &normalize(&[raw])[0];
    // Constraints are cluster-scoped and default to deny enforcement.
    assert_eq!(item.namespace, None);
    assert_eq!(item.response_action.as_deref(), Some("deny"));
    assert_eq!(item.severity, Some(Severity::Critical));
    assert_eq!(item.total_violations, Some(7));
}

#[test]
fn gatekeeper_mutation_has_no_compliance() {
    let raw = mk_raw(&[
        ("kind", "Assign"),
        ("apigroup", "mutations.gatekeeper.sh"),
        ("name", "set-labels"),
        ("cluster", "c1"),
        ("compliant", "Compliant"),
    ]);

    let item = &normalize(&[raw])[0];
    assert_eq!(item.compliant, None);
}

#[test]
fn normalizes_admission_policy_binding() {
    let raw = mk_raw(&[
        ("kind", "ValidatingAdmissionPolicyBinding"),
        ("apigroup", "admissionregistration.k8s.io"),
        ("name", "binding-1"),
        ("cluster", "c1"),
        ("policyName", "deny-exec"),
        ("validationActions", "Deny"),
        ("_ownedByGatekeeper", "true"),
    ]);

    let item = &normalize(&[raw])[0];
    assert_eq!(item.policy_name.as_deref(), Some("deny-exec"));
    assert!(item.owned_by_gatekeeper);
    assert_eq!(item.validation_actions.as_deref(), Some("Deny"));
    assert_eq!(item.response_action.as_deref(), Some("Deny"));
}

#[test]
fn normalizes_kyverno_policy() {
    let raw = mk_raw(&[
        ("kind", "ClusterPolicy"),
        ("apigroup", "kyverno.io"),
        ("name", "require-labels"),
        ("cluster", "c3"),
        ("validationFailureAction", "audit"),
        (
            "annotation",
            "policy.open-cluster-management.io/severity=medium; other=x",
        ),
        ("_missingResources", "ns-a/cm-a"),
    ]);

    let item = &normalize(&[raw])[0];
    assert_eq!(item.validation_failure_action.as_deref(), Some("audit"));
    assert_eq!(item.response_action.as_deref(), Some("audit"));
    assert_eq!(item.severity, Some(Severity::Medium));
    assert_eq!(item.missing_resources.as_deref(), Some("ns-a/cm-a"));
}

#[test]
fn unknown_kind_passes_through() {
    let raw = mk_raw(&[
        ("kind", "FancyPolicy"),
        ("apigroup", "policies.example.io"),
        ("name", "experimental"),
        ("cluster", "c1"),
        ("severity", "low"),
    ]);

    let items = normalize(&[raw]);
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.kind, "FancyPolicy");
    assert_eq!(item.name, "experimental");
    assert_eq!(item.severity, Some(Severity::Low));
    assert_eq!(item.total_violations, None);
    assert_eq!(item.policy_name, None);
}

// === source resolver ===

#[test]
fn parent_policy_label_wins() {
    let mut item = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    item.label = Some("policy.open-cluster-management.io/policy=policies.require-labels".into());
    // A hosting subscription is also present, but the policy edge has
    // priority.
    item.annotation =
        Some("apps.open-cluster-management.io/hosting-subscription=gitops/git-sub".into());

    let source = resolve_source(&item, &mk_provenance()).expect("resolves");
    assert_eq!(source.kind, SourceKind::Policy);
    assert_eq!(source.parent_ns, "policies");
    assert_eq!(source.parent_name, "require-labels");
}

#[test]
fn subscription_channel_kind_refines_the_source() {
    let provenance = mk_provenance();

    let mut git = mk_item("p1", "ClusterPolicy", "kyverno.io", "c1");
    git.annotation =
        Some("apps.open-cluster-management.io/hosting-subscription=gitops/git-sub".into());
    assert_eq!(
        resolve_source(&git, &provenance).map(|s| s.kind),
        Some(SourceKind::Git)
    );

    let mut helm = mk_item("p2", "ClusterPolicy", "kyverno.io", "c1");
    helm.annotation =
        Some("apps.open-cluster-management.io/hosting-subscription=charts/helm-sub".into());
    assert_eq!(
        resolve_source(&helm, &provenance).map(|s| s.kind),
        Some(SourceKind::Helm)
    );

    // A subscription without a resolvable channel stays generic.
    let mut orphan = mk_item("p3", "ClusterPolicy", "kyverno.io", "c1");
    orphan.annotation =
        Some("apps.open-cluster-management.io/hosting-subscription=apps/orphan-sub".into());
    let source = resolve_source(&orphan, &provenance).expect("resolves");
    assert_eq!(source.kind, SourceKind::Subscription);
    assert_eq!(source.parent_name, "orphan-sub");
}

#[test]
fn unindexed_subscription_is_still_a_subscription_source() {
    let mut item = mk_item("p1", "ClusterPolicy", "kyverno.io", "c1");
    item.annotation =
        Some("apps.open-cluster-management.io/hosting-subscription=gone/never-seen".into());

    let source = resolve_source(&item, &ProvenanceSnapshot::default()).expect("resolves");
    assert_eq!(source.kind, SourceKind::Subscription);
    assert_eq!(source.parent_ns, "gone");
}

#[test]
fn helm_release_resolves_through_its_hosting_subscription() {
    let mut item = mk_item("p1", "K8sRequiredLabels", "constraints.gatekeeper.sh", "c1");
    item.namespace = Some("apps".into());
    item.annotation = Some("meta.helm.sh/release-name=search-prod".into());

    let source = resolve_source(&item, &mk_provenance()).expect("resolves");
    // search-prod is hosted by git-sub, which points at a Git channel.
    assert_eq!(source.kind, SourceKind::Git);
    assert_eq!(source.parent_name, "git-sub");
}

#[test]
fn unindexed_helm_release_is_a_helm_source() {
    let mut item = mk_item("p1", "ClusterPolicy", "kyverno.io", "c1");
    item.annotation = Some(
        "meta.helm.sh/release-name=standalone; meta.helm.sh/release-namespace=apps".into(),
    );

    let source = resolve_source(&item, &mk_provenance()).expect("resolves");
    assert_eq!(source.kind, SourceKind::Helm);
    assert_eq!(source.parent_ns, "apps");
    assert_eq!(source.parent_name, "standalone");
}

#[test]
fn no_provenance_edge_resolves_to_none() {
    let item = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    assert_eq!(resolve_source(&item, &mk_provenance()), None);
}

// === grouping engine ===

#[test]
fn groups_per_cluster_occurrences() {
    let mut a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    a.compliant = Some("NonCompliant".into());
    let mut b = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c2");
    b.compliant = Some("Compliant".into());

    let rows = group(vec![a, b]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "p1");
    assert_eq!(rows[0].policies.len(), 2);
    assert_eq!(
        rows[0].id,
        "p1ConfigurationPolicypolicy.open-cluster-management.io"
    );
}

#[test]
fn same_name_different_kind_stays_separate() {
    let a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    let b = mk_item("p1", "CertificatePolicy", "policy.open-cluster-management.io", "c1");

    let rows = group(vec![a, b]);
    assert_eq!(rows.len(), 2);
}

#[test]
fn row_order_follows_first_appearance() {
    let items = vec![
        mk_item("b", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1"),
        mk_item("a", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1"),
        mk_item("b", "ConfigurationPolicy", "policy.open-cluster-management.io", "c2"),
    ];

    let rows = group(items);
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn grouping_is_idempotent() {
    let mut a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    a.severity = Some(Severity::High);
    let mut b = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c2");
    b.severity = Some(Severity::Low);
    let c = mk_item("p2", "ClusterPolicy", "kyverno.io", "c1");

    let input = vec![a, b, c];
    assert_eq!(group(input.clone()), group(input));
}

#[test]
fn severity_rollup_is_the_member_maximum() {
    let mut a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    a.severity = Some(Severity::Low);
    let mut b = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c2");
    b.severity = Some(Severity::Critical);
    let mut c = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c3");
    c.severity = None;

    let rows = group(vec![a, b, c]);
    assert_eq!(rows[0].severity, Some(Severity::Critical));
}

#[test]
fn group_without_severities_has_none() {
    let a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    let b = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c2");

    let rows = group(vec![a, b]);
    // Rendered as "no status" by consumers.
    assert_eq!(rows[0].severity, None);
}

#[test]
fn uniform_response_action_is_kept() {
    let mut a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    a.response_action = Some("inform".into());
    let mut b = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c2");
    b.response_action = Some("inform".into());

    let rows = group(vec![a, b]);
    assert_eq!(
        rows[0].response_action,
        Some(ResponseAction::Action("inform".into()))
    );
}

#[test]
fn disagreeing_response_actions_are_mixed() {
    let mut a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    a.response_action = Some("inform".into());
    let mut b = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c2");
    b.response_action = Some("enforce".into());
    let c = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c3");

    let rows = group(vec![a.clone(), b]);
    assert_eq!(rows[0].response_action, Some(ResponseAction::Mixed));

    // A member with no action also disagrees with one that has an action.
    let rows = group(vec![a, c]);
    assert_eq!(rows[0].response_action, Some(ResponseAction::Mixed));
}

#[test]
fn sums_violations_across_constraint_members() {
    let mut a = mk_item("require-team", "K8sRequiredLabels", "constraints.gatekeeper.sh", "c1");
    a.total_violations = Some(2);
    let mut b = mk_item("require-team", "K8sRequiredLabels", "constraints.gatekeeper.sh", "c2");
    b.total_violations = Some(3);
    let c = mk_item("require-team", "K8sRequiredLabels", "constraints.gatekeeper.sh", "c3");

    let rows = group(vec![a, b, c]);
    assert_eq!(rows[0].total_violations, Some(5));
}

#[test]
fn group_without_violation_counts_has_none() {
    let a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    let rows = group(vec![a]);
    assert_eq!(rows[0].total_violations, None);
}

#[test]
fn distinct_member_sources_roll_up_to_multiple() {
    let mut a = mk_item("p1", "ClusterPolicy", "kyverno.io", "c1");
    a.source = Some(PolicySource::new(
        SourceKind::Git,
        ObjectRef::new("gitops", "git-sub"),
    ));
    let mut b = mk_item("p1", "ClusterPolicy", "kyverno.io", "c2");
    b.source = Some(PolicySource::new(
        SourceKind::Helm,
        ObjectRef::new("charts", "helm-sub"),
    ));

    let rows = group(vec![a, b]);
    let source = rows[0].source.clone().expect("has a source");
    assert_eq!(source.kind, SourceKind::Multiple);
    assert!(source.parent_name.is_empty());
}

#[test]
fn unresolved_members_keep_the_single_resolved_source() {
    let mut a = mk_item("p1", "ClusterPolicy", "kyverno.io", "c1");
    a.source = Some(PolicySource::new(
        SourceKind::Git,
        ObjectRef::new("gitops", "git-sub"),
    ));
    let b = mk_item("p1", "ClusterPolicy", "kyverno.io", "c2");

    let rows = group(vec![a, b.clone()]);
    assert_eq!(rows[0].source.as_ref().map(|s| s.kind), Some(SourceKind::Git));

    let rows = group(vec![b]);
    assert_eq!(rows[0].source, None);
}

// === label indexer ===

#[test]
fn label_options_are_deduplicated_and_sorted() {
    let mut a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    a.label = Some("env=prod; team=search".into());
    let mut b = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c2");
    b.label = Some("env=prod".into());
    let mut c = mk_item("p2", "ClusterPolicy", "kyverno.io", "c1");
    c.label = Some("env=dev".into());

    let rows = group(vec![a, b, c]);
    let data = index_labels(&rows);

    let options: Vec<(String, String)> = data
        .options
        .iter()
        .map(|o| (o.label.clone(), o.value.clone()))
        .collect();
    assert_eq!(
        options,
        vec![
            ("env".to_string(), "dev".to_string()),
            ("env".to_string(), "prod".to_string()),
            ("team".to_string(), "search".to_string()),
        ]
    );
}

#[test]
fn rows_carry_parsed_pairs_and_rendered_labels() {
    let mut a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    a.label = Some("team=search; env=prod".into());

    let rows = group(vec![a]);
    let data = index_labels(&rows);
    let row = data.rows.get(&rows[0].id).expect("row indexed");
    assert_eq!(row.pairs.get("team").map(String::as_str), Some("search"));
    assert_eq!(
        row.labels,
        vec!["env=prod".to_string(), "team=search".to_string()]
    );
}

#[test]
fn malformed_label_segments_are_skipped() {
    let mut a = mk_item("p1", "ConfigurationPolicy", "policy.open-cluster-management.io", "c1");
    a.label = Some("env=prod; garbage; =missing-key".into());

    let rows = group(vec![a]);
    let data = index_labels(&rows);
    assert_eq!(data.options.len(), 1);
    assert_eq!(data.options[0].label, "env");
}

// === full pipeline ===

#[test]
fn aggregates_the_two_cluster_example() {
    let results = SearchResults {
        items: vec![
            mk_raw(&[
                ("name", "p1"),
                ("kind", "ConfigurationPolicy"),
                ("apigroup", "policy.open-cluster-management.io"),
                ("cluster", "c1"),
                ("compliant", "NonCompliant"),
            ]),
            mk_raw(&[
                ("name", "p1"),
                ("kind", "ConfigurationPolicy"),
                ("apigroup", "policy.open-cluster-management.io"),
                ("cluster", "c2"),
                ("compliant", "Compliant"),
            ]),
        ],
        related: Vec::new(),
    };

    let output = aggregate(results, &ProvenanceSnapshot::default());
    assert_eq!(output.policy_items.len(), 1);
    let row = &output.policy_items[0];
    assert_eq!(row.name, "p1");
    assert_eq!(row.policies.len(), 2);
    let clusters: Vec<&str> = row.policies.iter().map(|p| p.cluster.as_str()).collect();
    assert_eq!(clusters, vec!["c1", "c2"]);
    assert!(output.related_resources.is_empty());
}
