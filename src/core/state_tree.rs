//! 共享状态树代理
//!
//! 按路径组织的集合存储。加载器只向集合追加描述符，查询接口整体读取集合。

use crate::error::LoaderError;
use crate::Result;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::trace;

/// 共享状态树接口
#[cfg_attr(test, mockall::automock)]
pub trait StateTree: Send + Sync {
    /// 向集合路径追加一个值
    fn add(&self, path: &str, value: Value) -> Result<()>;

    /// 读取集合当前内容，集合不存在时返回空列表
    fn get(&self, path: &str) -> Result<Vec<Value>>;

    /// 删除集合中`id`字段等于给定值的条目，返回是否删除了条目
    fn remove(&self, path: &str, id: &str) -> Result<bool>;
}

/// 内存状态树
#[derive(Debug, Default)]
pub struct MemoryStateTree {
    nodes: RwLock<BTreeMap<String, Vec<Value>>>,
}

impl MemoryStateTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前存在的集合路径
    pub fn paths(&self) -> Vec<String> {
        self.nodes.read().keys().cloned().collect()
    }
}

fn normalize(path: &str) -> Result<String> {
    if !path.starts_with('/') {
        return Err(LoaderError::state_tree(path, "path must be absolute"));
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

impl StateTree for MemoryStateTree {
    fn add(&self, path: &str, value: Value) -> Result<()> {
        let path = normalize(path)?;
        trace!(path = %path, "add");
        self.nodes.write().entry(path).or_default().push(value);
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Vec<Value>> {
        let path = normalize(path)?;
        Ok(self.nodes.read().get(&path).cloned().unwrap_or_default())
    }

    fn remove(&self, path: &str, id: &str) -> Result<bool> {
        let path = normalize(path)?;
        let mut nodes = self.nodes.write();
        let Some(items) = nodes.get_mut(&path) else {
            return Ok(false);
        };

        let before = items.len();
        items.retain(|item| item.get("id").and_then(Value::as_str) != Some(id));
        Ok(items.len() != before)
    }
}
