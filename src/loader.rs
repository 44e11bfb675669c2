//! 适配器加载器
//!
//! 构造时从组件注册表取得共享状态树和RPC服务器，向RPC服务器登记查询服务；
//! start/stop 委托给生命周期协调器。

use crate::adapters::lifecycle::{AdapterStatus, LifecycleCoordinator};
use crate::adapters::publisher::DescriptorPublisher;
use crate::adapters::registry::AdapterRegistry;
use crate::config::LoaderConfig;
use crate::core::component_registry::{ComponentRegistry, CORE_COMPONENT, GRPC_SERVER_COMPONENT};
use crate::core::state_tree::StateTree;
use crate::services::adapter_service::AdapterQueryService;
use crate::services::rpc_server::{AdapterServiceServicer, RpcServer};
use crate::types::{AdapterName, Adapters, ListAdaptersRequest};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct AdapterLoader {
    coordinator: LifecycleCoordinator,
    service: Arc<AdapterQueryService>,
}

impl AdapterLoader {
    /// 创建加载器并向 `grpc_server` 组件登记 AdapterService
    pub fn new(
        config: &LoaderConfig,
        adapters: Arc<AdapterRegistry>,
        components: &ComponentRegistry,
    ) -> Result<Self> {
        let tree = components.lookup::<dyn StateTree>(CORE_COMPONENT)?;
        let rpc_server = components.lookup::<RpcServer>(GRPC_SERVER_COMPONENT)?;

        let publisher = DescriptorPublisher::new(tree);
        let service = Arc::new(AdapterQueryService::from_publisher(publisher.clone()));
        rpc_server.register_adapter_service(service.clone());

        let coordinator = LifecycleCoordinator::new(adapters, publisher, config.loader.clone());
        debug!("adapter loader constructed");

        Ok(Self { coordinator, service })
    }

    /// 启动所有已发现的适配器
    pub async fn start(&self) -> Result<&Self> {
        info!("starting adapter loader");
        self.coordinator.start().await?;
        Ok(self)
    }

    /// 停止所有活动适配器
    pub async fn stop(&self) -> Result<()> {
        info!("stopping adapter loader");
        self.coordinator.stop().await
    }

    /// 直接调用查询服务（不经过RPC工作线程）
    pub fn list_adapters(&self, request: ListAdaptersRequest) -> Result<Adapters> {
        self.service.list_adapters(request)
    }

    pub async fn active_adapters(&self) -> Vec<AdapterName> {
        self.coordinator.active_adapters().await
    }

    pub fn adapter_statuses(&self) -> HashMap<AdapterName, AdapterStatus> {
        self.coordinator.adapter_statuses()
    }
}
