//! 适配器能力契约
//!
//! 所有适配器必须实现的统一接口（start/stop/adapter_descriptor），
//! 以及包导出的可实例化适配器类型。

use crate::types::{AdapterConfig, AdapterDescriptor};
use crate::Result;
use async_trait::async_trait;
use semver::{Version, VersionReq};
use std::fmt;
use std::sync::Arc;

/// 加载器支持的契约版本
pub const CONTRACT_VERSION: Version = Version::new(1, 0, 0);

/// 核心适配器特征 - 所有适配器必须实现
#[async_trait]
pub trait Adapter: Send + Sync {
    /// 启动适配器
    async fn start(&mut self) -> Result<()>;

    /// 停止适配器
    async fn stop(&mut self) -> Result<()>;

    /// 适配器自我描述，启动成功后发布
    fn adapter_descriptor(&self) -> AdapterDescriptor;
}

/// 适配器构造函数
pub type AdapterConstructor = Arc<dyn Fn(AdapterConfig) -> Box<dyn Adapter> + Send + Sync>;

/// 适配器类型 - 包导出的一个适配器实现
#[derive(Clone)]
pub struct AdapterType {
    type_name: String,
    /// 实现所依据的契约版本要求
    contract: String,
    constructor: AdapterConstructor,
}

impl AdapterType {
    /// 创建适配器类型，默认要求与当前契约主版本兼容
    pub fn new<F>(type_name: &str, constructor: F) -> Self
    where
        F: Fn(AdapterConfig) -> Box<dyn Adapter> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.to_string(),
            contract: format!("^{}", CONTRACT_VERSION.major),
            constructor: Arc::new(constructor),
        }
    }

    /// 由实现了 `From<AdapterConfig>` 的适配器创建类型
    pub fn of<A>() -> Self
    where
        A: Adapter + From<AdapterConfig> + 'static,
    {
        let full_name = std::any::type_name::<A>();
        let type_name = full_name.rsplit("::").next().unwrap_or(full_name);
        Self::new(type_name, |config| Box::new(A::from(config)))
    }

    /// 设置契约版本要求
    pub fn with_contract(mut self, requirement: &str) -> Self {
        self.contract = requirement.to_string();
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// 契约一致性校验
    pub fn verify(&self) -> std::result::Result<(), String> {
        if self.type_name.trim().is_empty() {
            return Err("type name is empty".to_string());
        }

        let requirement = VersionReq::parse(&self.contract)
            .map_err(|e| format!("invalid contract requirement '{}': {}", self.contract, e))?;

        if !requirement.matches(&CONTRACT_VERSION) {
            return Err(format!(
                "requires contract {} but loader provides {}",
                self.contract, CONTRACT_VERSION
            ));
        }

        Ok(())
    }

    /// 用给定配置实例化适配器
    pub fn instantiate(&self, config: AdapterConfig) -> Box<dyn Adapter> {
        (self.constructor)(config)
    }
}

impl fmt::Debug for AdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterType")
            .field("type_name", &self.type_name)
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogLevel;

    struct EchoAdapter {
        config: AdapterConfig,
        running: bool,
    }

    impl From<AdapterConfig> for EchoAdapter {
        fn from(config: AdapterConfig) -> Self {
            Self { config, running: false }
        }
    }

    #[async_trait]
    impl Adapter for EchoAdapter {
        async fn start(&mut self) -> Result<()> {
            self.running = true;
            Ok(())
        }

        async fn stop(&mut self) -> Result<()> {
            self.running = false;
            Ok(())
        }

        fn adapter_descriptor(&self) -> AdapterDescriptor {
            AdapterDescriptor::new("echo", "Test", if self.running { "running" } else { "idle" })
                .with_config(self.config.clone())
        }
    }

    #[test]
    fn test_type_of_uses_short_name() {
        let adapter_type = AdapterType::of::<EchoAdapter>();
        assert_eq!(adapter_type.type_name(), "EchoAdapter");
        assert_eq!(adapter_type.contract(), "^1");
        assert!(adapter_type.verify().is_ok());
    }

    #[test]
    fn test_verify_rejects_incompatible_contract() {
        let adapter_type = AdapterType::of::<EchoAdapter>().with_contract("^2.0");
        let reason = adapter_type.verify().unwrap_err();
        assert!(reason.contains("requires contract ^2.0"));

        let adapter_type = AdapterType::of::<EchoAdapter>().with_contract("not a version");
        assert!(adapter_type.verify().unwrap_err().contains("invalid contract requirement"));
    }

    #[test]
    fn test_verify_rejects_empty_name() {
        let adapter_type = AdapterType::new(" ", |config| Box::new(EchoAdapter::from(config)));
        assert_eq!(adapter_type.verify().unwrap_err(), "type name is empty");
    }

    #[tokio::test]
    async fn test_instantiate_and_lifecycle() {
        let adapter_type = AdapterType::of::<EchoAdapter>();
        let config = AdapterConfig { log_level: LogLevel::Debug };
        let mut adapter = adapter_type.instantiate(config.clone());

        adapter.start().await.unwrap();
        let descriptor = adapter.adapter_descriptor();
        assert_eq!(descriptor.version, "running");
        assert_eq!(descriptor.config, config);

        adapter.stop().await.unwrap();
        assert_eq!(adapter.adapter_descriptor().version, "idle");
    }
}
