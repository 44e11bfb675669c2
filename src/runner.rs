//! 配置驱动的适配器宿主
//!
//! 创建共享状态树和RPC服务器，登记到组件注册表，构造加载器并运行到收到停止信号

use crate::adapters::registry::AdapterRegistry;
use crate::config::{ConfigManager, LoaderConfig};
use crate::core::component_registry::{ComponentRegistry, CORE_COMPONENT, GRPC_SERVER_COMPONENT};
use crate::core::state_tree::{MemoryStateTree, StateTree};
use crate::loader::AdapterLoader;
use crate::services::rpc_server::RpcServer;
use crate::Result;
use std::future::Future;
use std::sync::Arc;

/// 适配器宿主
pub struct AdapterHost {
    rpc_server: Arc<RpcServer>,
    tree: Arc<dyn StateTree>,
    loader: AdapterLoader,
}

impl AdapterHost {
    /// 从配置创建宿主，组件登记在私有注册表中
    pub fn from_config(config: &LoaderConfig, adapters: Arc<AdapterRegistry>) -> Result<Self> {
        Self::with_components(config, adapters, &ComponentRegistry::new())
    }

    /// 从配置创建宿主，把状态树和RPC服务器登记到给定注册表
    ///
    /// 注册表中已有 `core` 或 `grpc_server` 时失败。
    pub fn with_components(
        config: &LoaderConfig,
        adapters: Arc<AdapterRegistry>,
        components: &ComponentRegistry,
    ) -> Result<Self> {
        let tree: Arc<dyn StateTree> = Arc::new(MemoryStateTree::new());
        let rpc_server = Arc::new(RpcServer::new(&config.rpc));

        components.register(CORE_COMPONENT, tree.clone())?;
        components.register(GRPC_SERVER_COMPONENT, rpc_server.clone())?;

        let loader = AdapterLoader::new(config, adapters, components)?;
        tracing::info!(
            components = ?components.names(),
            max_workers = rpc_server.max_workers(),
            "adapter host ready"
        );

        Ok(Self {
            rpc_server,
            tree,
            loader,
        })
    }

    /// 从配置文件创建宿主
    pub async fn from_config_file<P: AsRef<std::path::Path>>(
        path: P,
        adapters: Arc<AdapterRegistry>,
    ) -> Result<Self> {
        let config_manager = ConfigManager::load_from_file(path).await?;
        config_manager.validate()?;

        Self::from_config(config_manager.get_config(), adapters)
    }

    pub fn loader(&self) -> &AdapterLoader {
        &self.loader
    }

    pub fn rpc_server(&self) -> Arc<RpcServer> {
        self.rpc_server.clone()
    }

    pub fn state_tree(&self) -> Arc<dyn StateTree> {
        self.tree.clone()
    }

    /// 启动适配器，等待停止信号后停止
    ///
    /// 启动失败时直接返回错误：已启动的适配器保持运行和发布，RPC服务器继续服务，
    /// 由调用方决定何时调用 [`AdapterHost::stop`]。
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if let Err(e) = self.loader.start().await {
            tracing::error!(error = %e, "adapter loader failed to start");
            return Err(e);
        }

        tracing::info!(adapters = ?self.loader.active_adapters().await, "adapters running");
        shutdown.await;

        self.stop().await
    }

    /// 停止所有活动适配器并关闭RPC服务器
    pub async fn stop(&self) -> Result<()> {
        let result = self.loader.stop().await;
        self.rpc_server.shutdown();
        result
    }

    /// 运行到 Ctrl-C
    pub async fn run_until_ctrl_c(&self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for ctrl-c, shutting down");
            }
        })
        .await
    }
}
