//! Provenance index for discovered-policy aggregation.
//!
//! The source resolver traces where a discovered policy was deployed from by
//! cross-referencing three application-lifecycle collections watched on the
//! hub cluster:
//!
//! - A `Channel` describes a source repository (Git, Helm repo, object
//!   storage).
//! - A `Subscription` references a channel and places its resources into
//!   managed clusters.
//! - A `HelmRelease` records a chart installed on behalf of a subscription.
//!
//! ```text
//! [ Channel ] <- [ Subscription ] <- [ HelmRelease ]
//! ```
//!
//! Watch events keep the maps below up to date. Each aggregation pass takes
//! a point-in-time snapshot, so the transform never reads shared mutable
//! state and a slow transform never blocks indexing.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod metrics;


use ahash::AHashMap as HashMap;
use hub_policy_aggregator_core::{
    ChannelKind, HelmReleaseEdge, ObjectRef, ProvenanceSnapshot, SubscriptionEdge,
    HOSTING_SUBSCRIPTION_ANNOTATION,
};
use hub_policy_aggregator_k8s_api as k8s;
use k8s::ResourceExt;
use parking_lot::RwLock;
use std::sync::Arc;

pub type SharedIndex = Arc<RwLock<Index>>;

/// Holds the provenance collections. Owned and updated by the tasks that
/// process watch events; read by the aggregator when it snapshots.
#[derive(Debug, Default)]
pub struct Index {
    channels: HashMap<ObjectRef, ChannelKind>,
    subscriptions: HashMap<ObjectRef, SubscriptionEdge>,
    helm_releases: HashMap<ObjectRef, HelmReleaseEdge>,
}

// === impl Index ===

impl Index {
    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::default()))
    }

    /// Takes a point-in-time copy of the provenance collections.
    pub fn snapshot(&self) -> ProvenanceSnapshot {
        ProvenanceSnapshot {
            channels: self
                .channels
                .iter()
                .map(|(id, kind)| (id.clone(), kind.clone()))
                .collect(),
            subscriptions: self
                .subscriptions
                .iter()
                .map(|(id, edge)| (id.clone(), edge.clone()))
                .collect(),
            helm_releases: self
                .helm_releases
                .iter()
                .map(|(id, edge)| (id.clone(), edge.clone()))
                .collect(),
        }
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Channel> for Index {
    fn apply(&mut self, channel: k8s::Channel) {
        let namespace = channel.namespace().expect("Channel must have a namespace");
        let name = channel.name_unchecked();
        let kind = ChannelKind::parse(&channel.spec.channel_type);
        tracing::debug!(%namespace, %name, ?kind, "indexing channel");
        self.channels.insert(ObjectRef::new(namespace, name), kind);
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.channels.remove(&ObjectRef::new(namespace, name));
    }
}

impl kubert::index::IndexNamespacedResource<k8s::Subscription> for Index {
    fn apply(&mut self, subscription: k8s::Subscription) {
        let namespace = subscription
            .namespace()
            .expect("Subscription must have a namespace");
        let name = subscription.name_unchecked();

        let channel = ObjectRef::parse_slashed(&subscription.spec.channel);
        if channel.is_none() {
            tracing::warn!(
                %namespace,
                %name,
                channel = %subscription.spec.channel,
                "subscription references a malformed channel",
            );
        }

        tracing::debug!(%namespace, %name, ?channel, "indexing subscription");
        self.subscriptions
            .insert(ObjectRef::new(namespace, name), SubscriptionEdge { channel });
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.subscriptions.remove(&ObjectRef::new(namespace, name));
    }
}

impl kubert::index::IndexNamespacedResource<k8s::HelmRelease> for Index {
    fn apply(&mut self, release: k8s::HelmRelease) {
        let namespace = release
            .namespace()
            .expect("HelmRelease must have a namespace");
        let name = release.name_unchecked();

        let hosting_subscription = release
            .annotations()
            .get(HOSTING_SUBSCRIPTION_ANNOTATION)
            .and_then(|s| ObjectRef::parse_slashed(s));

        tracing::debug!(%namespace, %name, ?hosting_subscription, "indexing helm release");
        self.helm_releases.insert(
            ObjectRef::new(namespace, name),
            HelmReleaseEdge {
                hosting_subscription,
            },
        );
    }

    fn delete(&mut self, namespace: String, name: String) {
        self.helm_releases.remove(&ObjectRef::new(namespace, name));
    }
}
