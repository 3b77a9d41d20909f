#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod apps;

pub use self::apps::{
    Channel, ChannelSpec, HelmRelease, HelmReleaseRepo, HelmReleaseSpec, Subscription,
    SubscriptionSpec,
};
pub use kube::api::{ObjectMeta, ResourceExt};

/// API group of the application-lifecycle resources.
pub const APPS_API_GROUP: &str = "apps.open-cluster-management.io";
