use crate::{aggregate, metrics::PollerMetrics, Aggregate};
use hub_policy_aggregator_core::{DiscoveredPolicyTableItem, LabelData, ProvenanceView};
use hub_policy_aggregator_search::{SearchInput, SearchPolicies, SearchRelated};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::{sync::watch, task::JoinHandle, time};

/// Aggregated state published to consumers.
///
/// `is_fetching` is set while a query or transform is outstanding. The
/// remaining fields are `None` until the first pass completes and otherwise
/// hold the most recent successful result, surviving later query failures.
#[derive(Clone, Debug, Default)]
pub struct Aggregation {
    pub is_fetching: bool,
    pub policy_items: Option<Arc<Vec<DiscoveredPolicyTableItem>>>,
    pub related_resources: Option<Arc<Vec<SearchRelated>>>,
    pub labels: Option<Arc<LabelData>>,
    pub error: Option<Arc<anyhow::Error>>,
}

/// Drives the poll → transform → publish loop.
///
/// At most one transform is live: starting a new pass aborts the prior
/// transform task and bumps the generation counter, and results are applied
/// only while their generation is still current, so a superseded pass is
/// never delivered.
pub struct Poller<S, P> {
    client: S,
    provenance: P,
    queries: Vec<SearchInput>,
    interval: time::Duration,
    metrics: PollerMetrics,
    tx: watch::Sender<Aggregation>,
    generation: Arc<AtomicU64>,
    transform: Option<JoinHandle<()>>,
}

// === impl Poller ===

impl<S, P> Poller<S, P>
where
    S: SearchPolicies,
    P: ProvenanceView,
{
    pub fn new(
        client: S,
        provenance: P,
        queries: Vec<SearchInput>,
        interval: time::Duration,
        metrics: PollerMetrics,
    ) -> (Self, watch::Receiver<Aggregation>) {
        let (tx, rx) = watch::channel(Aggregation::default());
        let poller = Self {
            client,
            provenance,
            queries,
            interval,
            metrics,
            tx,
            generation: Arc::new(AtomicU64::new(0)),
            transform: None,
        };
        (poller, rx)
    }

    /// Polls on the configured interval until every receiver is dropped.
    pub async fn run(mut self) {
        let mut ticks = time::interval(self.interval);
        ticks.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            if self.tx.is_closed() {
                break;
            }
            self.poll_once().await;
        }

        self.supersede();
        tracing::debug!("all aggregation receivers dropped");
    }

    /// Runs one poll cycle: query the search index, then publish directly
    /// (error and empty fast paths) or dispatch the transform.
    pub async fn poll_once(&mut self) {
        self.metrics.polls.inc();
        self.tx.send_modify(|agg| agg.is_fetching = true);

        let results = match self.client.search(&self.queries).await {
            Ok(results) => results,
            Err(error) => {
                self.metrics.poll_errors.inc();
                tracing::warn!(%error, "search query failed");
                // Previously published rows stay available; the next tick
                // retries.
                self.supersede();
                self.tx.send_modify(|agg| {
                    agg.is_fetching = false;
                    agg.error = Some(Arc::new(error));
                });
                return;
            }
        };

        if results.is_empty() {
            self.metrics.empty_results.inc();
            self.supersede();
            self.tx.send_modify(|agg| {
                *agg = Aggregation {
                    is_fetching: false,
                    policy_items: Some(Arc::new(Vec::new())),
                    related_resources: Some(Arc::new(Vec::new())),
                    labels: Some(Arc::new(LabelData::default())),
                    error: None,
                };
            });
            return;
        }

        let generation = self.supersede();
        let snapshot = self.provenance.snapshot();
        let current = self.generation.clone();
        let tx = self.tx.clone();
        let metrics = self.metrics.clone();
        let items = results.items.len();

        self.transform = Some(tokio::spawn(async move {
            let start = time::Instant::now();
            let output =
                match tokio::task::spawn_blocking(move || aggregate(results, &snapshot)).await {
                    Ok(output) => output,
                    // The blocking task only fails if it was cancelled at
                    // shutdown or panicked; either way there is nothing to
                    // publish.
                    Err(_) => return,
                };

            if publish(&tx, &current, generation, output) {
                metrics
                    .transform_seconds
                    .observe(start.elapsed().as_secs_f64());
                tracing::debug!(items, generation, "aggregation pass complete");
            } else {
                metrics.superseded.inc();
                tracing::debug!(generation, "discarding superseded aggregation pass");
            }
        }));
    }

    /// Invalidates any in-flight transform and returns the generation for
    /// the next pass.
    fn supersede(&mut self) -> u64 {
        if let Some(task) = self.transform.take() {
            task.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Applies a completed pass unless a newer one has superseded it. The
/// generation is re-checked under the watch lock so a stale pass cannot
/// overwrite a newer publication.
fn publish(
    tx: &watch::Sender<Aggregation>,
    current: &AtomicU64,
    generation: u64,
    output: Aggregate,
) -> bool {
    let mut published = false;
    tx.send_if_modified(|agg| {
        if current.load(Ordering::SeqCst) != generation {
            return false;
        }
        let Aggregate {
            policy_items,
            labels,
            related_resources,
        } = output;
        agg.is_fetching = false;
        agg.error = None;
        agg.policy_items = Some(Arc::new(policy_items));
        agg.related_resources = Some(Arc::new(related_resources));
        agg.labels = Some(Arc::new(labels));
        published = true;
        true
    });
    published
}
