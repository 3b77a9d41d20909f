use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Subscribes resources from a channel into placed clusters.
#[derive(Clone, Debug, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "apps.open-cluster-management.io",
    version = "v1",
    kind = "Subscription",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSpec {
    /// The channel this subscription pulls from, in `namespace/name` form.
    pub channel: String,

    /// Restricts the subscription to one package within the channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
