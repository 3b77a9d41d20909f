use prometheus_client::{
    collector::Collector,
    encoding::{DescriptorEncoder, EncodeMetric},
    metrics::{gauge::ConstGauge, MetricType},
    registry::Registry,
};

use crate::SharedIndex;

#[derive(Debug)]
struct Instrumented(SharedIndex);

pub fn register(reg: &mut Registry, index: SharedIndex) {
    reg.register_collector(Box::new(Instrumented(index)));
}

impl Collector for Instrumented {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), std::fmt::Error> {
        let this = self.0.read();

        let channel_encoder = encoder.encode_descriptor(
            "channel_index_size",
            "The number of channels in the index",
            None,
            MetricType::Gauge,
        )?;
        ConstGauge::new(this.channels.len() as u32).encode(channel_encoder)?;

        let subscription_encoder = encoder.encode_descriptor(
            "subscription_index_size",
            "The number of subscriptions in the index",
            None,
            MetricType::Gauge,
        )?;
        ConstGauge::new(this.subscriptions.len() as u32).encode(subscription_encoder)?;

        let helm_release_encoder = encoder.encode_descriptor(
            "helm_release_index_size",
            "The number of Helm releases in the index",
            None,
            MetricType::Gauge,
        )?;
        ConstGauge::new(this.helm_releases.len() as u32).encode(helm_release_encoder)?;

        Ok(())
    }
}
