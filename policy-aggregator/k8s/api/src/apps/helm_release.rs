use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A Helm chart installed by the application-lifecycle operator.
///
/// The installing subscription is recorded in the release's
/// `apps.open-cluster-management.io/hosting-subscription` annotation.
#[derive(Clone, Debug, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "apps.open-cluster-management.io",
    version = "v1",
    kind = "HelmRelease",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct HelmReleaseSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<HelmReleaseRepo>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HelmReleaseRepo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
