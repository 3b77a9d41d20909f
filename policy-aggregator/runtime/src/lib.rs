pub use hub_policy_aggregator_aggregate as aggregate;
pub use hub_policy_aggregator_core as core;
pub use hub_policy_aggregator_k8s_api as k8s;
pub use hub_policy_aggregator_k8s_index as index;
pub use hub_policy_aggregator_search as search;

mod args;

pub use self::args::Args;

/// Serves provenance snapshots from the shared watch-driven index.
#[derive(Clone, Debug)]
struct Provenance(index::SharedIndex);

impl Provenance {
    fn new(index: index::SharedIndex) -> Self {
        Self(index)
    }
}

impl core::ProvenanceView for Provenance {
    fn snapshot(&self) -> core::ProvenanceSnapshot {
        self.0.read().snapshot()
    }
}
