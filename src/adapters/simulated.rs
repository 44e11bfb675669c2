//! 模拟OLT适配器
//!
//! 不连接真实设备，用于演示和本地运行

use super::core::{Adapter, AdapterType};
use super::registry::{AdapterPackage, PackageExport};
use crate::error::LoaderError;
use crate::types::{AdapterConfig, AdapterDescriptor};
use crate::Result;
use async_trait::async_trait;
use tracing::info;

/// 包名
pub const SIMULATED_OLT: &str = "simulated_olt";

pub struct SimulatedOltAdapter {
    config: AdapterConfig,
    running: bool,
}

impl From<AdapterConfig> for SimulatedOltAdapter {
    fn from(config: AdapterConfig) -> Self {
        Self { config, running: false }
    }
}

#[async_trait]
impl Adapter for SimulatedOltAdapter {
    async fn start(&mut self) -> Result<()> {
        if self.running {
            return Err(LoaderError::adapter("simulated OLT adapter is already running"));
        }
        self.running = true;
        info!(log_level = %self.config.log_level, "simulated OLT adapter started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.running = false;
        info!("simulated OLT adapter stopped");
        Ok(())
    }

    fn adapter_descriptor(&self) -> AdapterDescriptor {
        AdapterDescriptor::new(SIMULATED_OLT, "Simulated Devices", env!("CARGO_PKG_VERSION"))
            .with_config(self.config.clone())
            .with_description(serde_json::json!({
                "device_type": "olt",
                "max_onus_per_port": 64,
            }))
    }
}

/// 模拟适配器包
pub fn simulated_package() -> AdapterPackage {
    AdapterPackage::with_exports(
        SIMULATED_OLT,
        vec![
            PackageExport::Symbol("SIMULATED_OLT".to_string()),
            PackageExport::Adapter(AdapterType::of::<SimulatedOltAdapter>()),
        ],
    )
}
