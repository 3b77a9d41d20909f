use ahash::AHashMap as HashMap;
use hub_policy_aggregator_core::{
    DiscoveredPolicyItem, DiscoveredPolicyTableItem, PolicySource, ResponseAction,
};

/// Groups per-cluster occurrences by `(name, kind, apigroup)` into one row
/// per logical policy.
///
/// Row order follows first appearance in the input, so the output is
/// deterministic for a given input order.
pub fn group(items: Vec<DiscoveredPolicyItem>) -> Vec<DiscoveredPolicyTableItem> {
    let mut keys: Vec<(String, String, String)> = Vec::new();
    let mut buckets: HashMap<(String, String, String), Vec<DiscoveredPolicyItem>> =
        HashMap::default();

    for item in items {
        let key = (item.name.clone(), item.kind.clone(), item.apigroup.clone());
        let bucket = buckets.entry(key.clone()).or_insert_with(|| {
            keys.push(key);
            Vec::new()
        });
        bucket.push(item);
    }

    keys.into_iter()
        .map(|key| {
            let policies = buckets.remove(&key).expect("bucket exists for every key");
            aggregate_row(key, policies)
        })
        .collect()
}

fn aggregate_row(
    (name, kind, apigroup): (String, String, String),
    policies: Vec<DiscoveredPolicyItem>,
) -> DiscoveredPolicyTableItem {
    let severity = policies.iter().filter_map(|p| p.severity).max();

    // The first member's action stands for the group unless any member
    // disagrees.
    let first_action = policies.first().and_then(|p| p.response_action.clone());
    let response_action = if policies
        .iter()
        .any(|p| p.response_action != first_action)
    {
        Some(ResponseAction::Mixed)
    } else {
        first_action.map(ResponseAction::Action)
    };

    let total_violations = policies
        .iter()
        .filter_map(|p| p.total_violations)
        .fold(None, |sum: Option<u64>, v| Some(sum.unwrap_or(0) + v));

    let source = rolled_source(&policies);

    DiscoveredPolicyTableItem {
        id: DiscoveredPolicyTableItem::id_for(&name, &kind, &apigroup),
        name,
        kind,
        apigroup,
        severity,
        response_action,
        total_violations,
        source,
        policies,
    }
}

/// The single source all resolved members agree on, `Multiple` when they
/// disagree, or `None` when no member resolved at all.
fn rolled_source(policies: &[DiscoveredPolicyItem]) -> Option<PolicySource> {
    let mut resolved: Option<&PolicySource> = None;
    for source in policies.iter().filter_map(|p| p.source.as_ref()) {
        match resolved {
            None => resolved = Some(source),
            Some(prior) if prior == source => {}
            Some(_) => return Some(PolicySource::multiple()),
        }
    }
    resolved.cloned()
}
