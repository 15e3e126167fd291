use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub deliveries_total: IntCounterVec,
    pub feasibility_checks_total: IntCounterVec,
    pub requests_in_queue: IntGauge,
    pub delivery_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let deliveries_total = IntCounterVec::new(
            Opts::new("deliveries_total", "Total delivery runs by outcome"),
            &["outcome"],
        )
        .expect("valid deliveries_total metric");

        let feasibility_checks_total = IntCounterVec::new(
            Opts::new("feasibility_checks_total", "Range checks by result"),
            &["result"],
        )
        .expect("valid feasibility_checks_total metric");

        let requests_in_queue =
            IntGauge::new("requests_in_queue", "Current number of queued delivery requests")
                .expect("valid requests_in_queue metric");

        let delivery_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "delivery_latency_seconds",
                "Time spent processing a delivery request in seconds",
            ),
            &["outcome"],
        )
        .expect("valid delivery_latency_seconds metric");

        registry
            .register(Box::new(deliveries_total.clone()))
            .expect("register deliveries_total");
        registry
            .register(Box::new(feasibility_checks_total.clone()))
            .expect("register feasibility_checks_total");
        registry
            .register(Box::new(requests_in_queue.clone()))
            .expect("register requests_in_queue");
        registry
            .register(Box::new(delivery_latency_seconds.clone()))
            .expect("register delivery_latency_seconds");

        Self {
            registry,
            deliveries_total,
            feasibility_checks_total,
            requests_in_queue,
            delivery_latency_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
