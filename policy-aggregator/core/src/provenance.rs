use crate::ObjectRef;
use std::collections::BTreeMap;

/// Channel types distinguished by the source resolver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChannelKind {
    Git,
    HelmRepo,
    ObjectBucket,
    Namespace,
    Other(String),
}

/// A subscription's edge to its channel. `None` when the reference was
/// malformed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubscriptionEdge {
    pub channel: Option<ObjectRef>,
}

/// A Helm release's edge back to the subscription that installed it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct HelmReleaseEdge {
    pub hosting_subscription: Option<ObjectRef>,
}

/// Point-in-time copy of the provenance collections.
///
/// Passed by value into each aggregation pass so the transform never reads
/// shared mutable state.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProvenanceSnapshot {
    pub channels: BTreeMap<ObjectRef, ChannelKind>,
    pub subscriptions: BTreeMap<ObjectRef, SubscriptionEdge>,
    pub helm_releases: BTreeMap<ObjectRef, HelmReleaseEdge>,
}

/// Provides provenance snapshots to the aggregator.
pub trait ProvenanceView: Send + Sync + 'static {
    fn snapshot(&self) -> ProvenanceSnapshot;
}

// === impl ChannelKind ===

impl ChannelKind {
    /// Parses a channel's `spec.type`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Git" | "GitHub" => Self::Git,
            "HelmRepo" => Self::HelmRepo,
            "ObjectBucket" => Self::ObjectBucket,
            "Namespace" => Self::Namespace,
            other => Self::Other(other.to_string()),
        }
    }
}
