use hub_policy_aggregator_core::{
    parse_string_map, ChannelKind, DiscoveredPolicyItem, ObjectRef, PolicySource,
    ProvenanceSnapshot, SourceKind, HELM_RELEASE_NAMESPACE_ANNOTATION,
    HELM_RELEASE_NAME_ANNOTATION, HOSTING_SUBSCRIPTION_ANNOTATION, PARENT_POLICY_LABEL,
};
use std::collections::BTreeMap;

/// Attaches a resolved source to each normalized item.
pub fn attach_sources(items: &mut [DiscoveredPolicyItem], provenance: &ProvenanceSnapshot) {
    for item in items.iter_mut() {
        item.source = resolve_source(item, provenance);
    }
}

/// Determines how a discovered policy was deployed.
///
/// Lookups run in priority order and the first match wins: the parent-policy
/// label, then the hosting-subscription annotation, then Helm release
/// annotations. `None` when no provenance edge is found.
pub fn resolve_source(
    item: &DiscoveredPolicyItem,
    provenance: &ProvenanceSnapshot,
) -> Option<PolicySource> {
    let labels = string_map(item.label.as_deref());
    if let Some(parent) = labels
        .get(PARENT_POLICY_LABEL)
        .and_then(|v| ObjectRef::parse_dotted(v))
    {
        return Some(PolicySource::new(SourceKind::Policy, parent));
    }

    let annotations = string_map(item.annotation.as_deref());
    if let Some(subscription) = annotations
        .get(HOSTING_SUBSCRIPTION_ANNOTATION)
        .and_then(|v| ObjectRef::parse_slashed(v))
    {
        return Some(subscription_source(subscription, provenance));
    }

    if let Some(release) = helm_release_ref(item, &annotations) {
        if let Some(subscription) = provenance
            .helm_releases
            .get(&release)
            .and_then(|edge| edge.hosting_subscription.clone())
        {
            return Some(subscription_source(subscription, provenance));
        }
        return Some(PolicySource::new(SourceKind::Helm, release));
    }

    None
}

/// A subscription's channel type refines the source: Git channels are `Git`,
/// Helm-repo channels are `Helm`, anything else stays `Subscription`.
fn subscription_source(subscription: ObjectRef, provenance: &ProvenanceSnapshot) -> PolicySource {
    let kind = provenance
        .subscriptions
        .get(&subscription)
        .and_then(|edge| edge.channel.as_ref())
        .and_then(|channel| provenance.channels.get(channel))
        .map(|kind| match kind {
            ChannelKind::Git => SourceKind::Git,
            ChannelKind::HelmRepo => SourceKind::Helm,
            _ => SourceKind::Subscription,
        })
        .unwrap_or(SourceKind::Subscription);
    PolicySource::new(kind, subscription)
}

fn helm_release_ref(
    item: &DiscoveredPolicyItem,
    annotations: &BTreeMap<String, String>,
) -> Option<ObjectRef> {
    let name = annotations.get(HELM_RELEASE_NAME_ANNOTATION)?;
    let namespace = annotations
        .get(HELM_RELEASE_NAMESPACE_ANNOTATION)
        .map(String::as_str)
        .or(item.namespace.as_deref())?;
    Some(ObjectRef::new(namespace, name))
}

fn string_map(raw: Option<&str>) -> BTreeMap<String, String> {
    raw.map(parse_string_map).unwrap_or_default()
}
