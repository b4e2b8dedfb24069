use crate::metrics_defs::{MetricDef, describe_all};
use metrics_exporter_statsd::{StatsdBuilder, StatsdError};

#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    #[error("could not build statsd exporter: {0}")]
    Exporter(#[from] StatsdError),
    #[error("a metrics recorder is already installed")]
    AlreadyInstalled,
}

/// Installs a StatsD exporter as the process-wide metrics recorder.
///
/// Every metric is sent with `prefix` prepended. Descriptions of `defs` are
/// registered once the recorder is in place.
pub fn install_statsd(
    statsd_host: &str,
    statsd_port: u16,
    prefix: &str,
    defs: &[MetricDef],
) -> Result<(), MetricsError> {
    let recorder = StatsdBuilder::from(statsd_host, statsd_port).build(Some(prefix))?;
    metrics::set_global_recorder(recorder).map_err(|_| MetricsError::AlreadyInstalled)?;

    describe_all(defs);
    tracing::info!(statsd_host, statsd_port, prefix, "Metrics exporter installed");
    Ok(())
}
