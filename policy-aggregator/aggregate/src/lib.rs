//! Discovered-policy aggregation.
//!
//! A polling query fetches raw search results on a fixed interval. When new
//! data arrives, the payload and a provenance snapshot are handed to a
//! blocking-thread transform that runs the normalizer, source resolver,
//! grouping engine, and label indexer in sequence:
//!
//! ```text
//! [ SearchItem ] -> normalize -> attach_sources -> group -> index_labels
//! ```
//!
//! The [`Poller`] publishes each pass's grouped table and label index on a
//! watch channel, discarding passes that a newer poll has superseded.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod group;
mod labels;
pub mod metrics;
mod normalize;
mod poll;
mod source;

#[cfg(test)]
mod tests;

pub use self::{
    group::group,
    labels::index_labels,
    metrics::PollerMetrics,
    normalize::normalize,
    poll::{Aggregation, Poller},
    source::{attach_sources, resolve_source},
};

use hub_policy_aggregator_core::{DiscoveredPolicyTableItem, LabelData, ProvenanceSnapshot};
use hub_policy_aggregator_search::{SearchRelated, SearchResults};

/// Output of one aggregation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregate {
    pub policy_items: Vec<DiscoveredPolicyTableItem>,
    pub labels: LabelData,
    /// Related resources from the search response, passed through untouched.
    pub related_resources: Vec<SearchRelated>,
}

/// Runs the full transform over one search payload.
pub fn aggregate(results: SearchResults, provenance: &ProvenanceSnapshot) -> Aggregate {
    let mut items = normalize(&results.items);
    attach_sources(&mut items, provenance);
    let policy_items = group(items);
    let labels = index_labels(&policy_items);
    Aggregate {
        policy_items,
        labels,
        related_resources: results.related,
    }
}
