//! 描述符发布器
//!
//! 把已启动适配器的描述符追加到共享状态树的 `/adapters` 集合

use super::core::Adapter;
use crate::core::state_tree::StateTree;
use crate::types::{AdapterDescriptor, ADAPTERS_PATH};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct DescriptorPublisher {
    tree: Arc<dyn StateTree>,
    path: String,
}

impl DescriptorPublisher {
    pub fn new(tree: Arc<dyn StateTree>) -> Self {
        Self {
            tree,
            path: ADAPTERS_PATH.to_string(),
        }
    }

    /// 发布适配器描述符，每次成功启动调用一次
    pub fn publish(&self, name: &str, adapter: &dyn Adapter) -> Result<AdapterDescriptor> {
        let descriptor = adapter.adapter_descriptor();
        let value = serde_json::to_value(&descriptor)?;
        self.tree.add(&self.path, value)?;
        info!(adapter = name, id = %descriptor.id, path = %self.path, "exposed adapter");
        Ok(descriptor)
    }

    /// 撤回描述符
    pub fn retract(&self, id: &str) -> Result<bool> {
        let removed = self.tree.remove(&self.path, id)?;
        debug!(id, removed, "retracted adapter descriptor");
        Ok(removed)
    }

    /// 读取已发布的全部描述符
    ///
    /// 集合中无法解码为描述符的条目不属于加载器，跳过。
    pub fn published(&self) -> Result<Vec<AdapterDescriptor>> {
        let descriptors = self
            .tree
            .get(&self.path)?
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    warn!(path = %self.path, error = %e, "skipping undecodable descriptor entry");
                    None
                }
            })
            .collect();
        Ok(descriptors)
    }
}
