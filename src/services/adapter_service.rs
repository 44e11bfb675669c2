//! 适配器查询服务
//!
//! ListAdapters 的实现：整体读取 `/adapters` 集合作为响应，不做过滤或分页。
//! 由RPC工作线程调用，只读共享状态树。

use super::rpc_server::AdapterServiceServicer;
use crate::adapters::publisher::DescriptorPublisher;
use crate::core::state_tree::StateTree;
use crate::types::{Adapters, ListAdaptersRequest};
use crate::Result;
use std::sync::Arc;
use tracing::info;

pub struct AdapterQueryService {
    descriptors: DescriptorPublisher,
}

impl AdapterQueryService {
    pub fn new(tree: Arc<dyn StateTree>) -> Self {
        Self {
            descriptors: DescriptorPublisher::new(tree),
        }
    }

    pub fn from_publisher(descriptors: DescriptorPublisher) -> Self {
        Self { descriptors }
    }
}

impl AdapterServiceServicer for AdapterQueryService {
    fn list_adapters(&self, request: ListAdaptersRequest) -> Result<Adapters> {
        info!(request = ?request, "list-adapters");
        let items = self.descriptors.published()?;
        Ok(Adapters { items })
    }
}
