#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod discovered;
mod labels;
mod object_ref;
mod provenance;
mod severity;
mod source;
mod string_map;

pub use self::{
    discovered::{DiscoveredPolicyItem, DiscoveredPolicyTableItem, ResponseAction},
    labels::{LabelData, LabelOption, RowLabels},
    object_ref::ObjectRef,
    provenance::{
        ChannelKind, HelmReleaseEdge, ProvenanceSnapshot, ProvenanceView, SubscriptionEdge,
    },
    severity::Severity,
    source::{PolicySource, SourceKind},
    string_map::parse_string_map,
};

/// Annotation linking a deployed resource back to the subscription that
/// placed it, in `namespace/name` form.
pub const HOSTING_SUBSCRIPTION_ANNOTATION: &str =
    "apps.open-cluster-management.io/hosting-subscription";

/// Label linking a replicated resource back to its parent policy, in
/// `namespace.name` form.
pub const PARENT_POLICY_LABEL: &str = "policy.open-cluster-management.io/policy";

/// Annotation carrying a severity on kinds whose API has no severity field.
pub const SEVERITY_ANNOTATION: &str = "policy.open-cluster-management.io/severity";

/// Annotations recorded by Helm on resources it installed.
pub const HELM_RELEASE_NAME_ANNOTATION: &str = "meta.helm.sh/release-name";
pub const HELM_RELEASE_NAMESPACE_ANNOTATION: &str = "meta.helm.sh/release-namespace";
