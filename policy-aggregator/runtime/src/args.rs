use crate::{aggregate, index, k8s, search, Provenance};
use anyhow::{bail, Context, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use std::path::PathBuf;
use tokio::time::Duration;
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "policy-aggregator",
    about = "Aggregates discovered policies across managed clusters"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "policy_aggregator=info,warn",
        env = "POLICY_AGGREGATOR_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// GraphQL endpoint of the cluster-wide search API.
    #[clap(
        long,
        default_value = "https://search-search-api:4010/searchapi/graphql",
        env = "SEARCH_API_URL"
    )]
    search_api_url: String,

    /// File holding the bearer token used to authenticate against the search
    /// API.
    #[clap(long)]
    search_token_path: Option<PathBuf>,

    #[clap(long, default_value = "30000")]
    search_timeout_ms: u64,

    /// How often the search index is polled, in seconds.
    #[clap(long, default_value = "15")]
    poll_interval_secs: u64,

    /// Maximum number of items requested per search clause.
    #[clap(long, default_value = "100000")]
    search_limit: u32,

    /// Restricts aggregation to one policy. Must be set together with
    /// `--policy-kind` and `--policy-apigroup`.
    #[clap(long)]
    policy_name: Option<String>,

    #[clap(long)]
    policy_kind: Option<String>,

    #[clap(long)]
    policy_apigroup: Option<String>,
}

// === impl Args ===

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            search_api_url,
            search_token_path,
            search_timeout_ms,
            poll_interval_secs,
            search_limit,
            policy_name,
            policy_kind,
            policy_apigroup,
        } = self;

        let target = match (policy_name, policy_kind, policy_apigroup) {
            (Some(name), Some(kind), Some(apigroup)) => Some(search::PolicyTarget {
                name,
                kind,
                apigroup,
            }),
            (None, None, None) => None,
            _ => bail!("--policy-name, --policy-kind, and --policy-apigroup must be set together"),
        };

        let provenance_index = index::Index::shared();

        let mut prom = <Registry>::default();
        index::metrics::register(
            prom.sub_registry_with_prefix("provenance_index"),
            provenance_index.clone(),
        );
        let poller_metrics =
            aggregate::PollerMetrics::register(prom.sub_registry_with_prefix("aggregator"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        // Watch the provenance collections that the source resolver
        // cross-references.
        let channels = runtime.watch_all::<k8s::Channel>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(provenance_index.clone(), channels)
                .instrument(info_span!("channels")),
        );

        let subscriptions = runtime.watch_all::<k8s::Subscription>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(provenance_index.clone(), subscriptions)
                .instrument(info_span!("subscriptions")),
        );

        let helm_releases = runtime.watch_all::<k8s::HelmRelease>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(provenance_index.clone(), helm_releases)
                .instrument(info_span!("helmreleases")),
        );

        let token = match search_token_path {
            Some(path) => Some(
                std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?
                    .trim()
                    .to_string(),
            ),
            None => None,
        };
        let search_client = search::SearchApiClient::new(
            search_api_url,
            token,
            Duration::from_millis(search_timeout_ms),
        )?;

        let queries = search::discovered_policy_queries(target.as_ref(), search_limit);
        let (poller, mut aggregations) = aggregate::Poller::new(
            search_client,
            Provenance::new(provenance_index),
            queries,
            Duration::from_secs(poll_interval_secs),
            poller_metrics,
        );
        tokio::spawn(poller.run().instrument(info_span!("poller")));

        // Log a summary of each delivered pass.
        tokio::spawn(async move {
            while aggregations.changed().await.is_ok() {
                let agg = aggregations.borrow_and_update().clone();
                if let Some(rows) = agg.policy_items {
                    info!(
                        rows = rows.len(),
                        label_options = agg.labels.map(|l| l.options.len()).unwrap_or(0),
                        "aggregated discovered policies",
                    );
                }
            }
        });

        // Block the main thread on the shutdown signal. Once it fires, wait
        // for the background tasks to complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
