mod channel;
mod helm_release;
mod subscription;

pub use self::{
    channel::{Channel, ChannelSpec},
    helm_release::{HelmRelease, HelmReleaseRepo, HelmReleaseSpec},
    subscription::{Subscription, SubscriptionSpec},
};
