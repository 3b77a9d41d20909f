use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A source repository that subscriptions deploy resources from.
#[derive(Clone, Debug, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "apps.open-cluster-management.io",
    version = "v1",
    kind = "Channel",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSpec {
    /// `Git`, `GitHub`, `HelmRepo`, `ObjectBucket`, or `Namespace`.
    #[serde(rename = "type")]
    pub channel_type: String,

    /// Location of the repository, e.g. a Git URL.
    pub pathname: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_verify: Option<bool>,
}
