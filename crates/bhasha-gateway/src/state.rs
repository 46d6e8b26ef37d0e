//! Gateway shared state.

use std::sync::Arc;

use bhasha_capabilities::Capabilities;
use bhasha_core::config::{Config, LimitsConfig};
use bhasha_pipeline::PipelineExecutor;

/// Shared state accessible from all handlers.
pub struct GatewayState {
    pub config: Arc<Config>,
    pub capabilities: Capabilities,
    pub executor: PipelineExecutor,
    #[cfg(feature = "metrics")]
    pub metrics_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
}

impl GatewayState {
    /// Build state with capability clients created from `config`.
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        let capabilities = Capabilities::from_config(&config)?;
        Ok(Self::with_capabilities(config, capabilities))
    }

    pub fn with_capabilities(config: Arc<Config>, capabilities: Capabilities) -> Self {
        let executor = PipelineExecutor::new(capabilities.clone(), config.limits());
        Self {
            config,
            capabilities,
            executor,
            #[cfg(feature = "metrics")]
            metrics_handle: None,
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        self.executor.limits()
    }
}
