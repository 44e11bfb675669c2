//! 进程级组件注册表
//!
//! 按名称注册和查找共享单例（状态树、RPC服务器等），构造加载器时查询一次

use crate::error::LoaderError;
use crate::Result;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

/// 共享状态树组件名
pub const CORE_COMPONENT: &str = "core";

/// RPC服务器组件名
pub const GRPC_SERVER_COMPONENT: &str = "grpc_server";

/// 组件注册表
#[derive(Default)]
pub struct ComponentRegistry {
    /// 每个条目保存一个 `Arc<T>`，T 可以是 trait 对象
    components: DashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册组件
    pub fn register<T>(&self, name: &str, component: Arc<T>) -> Result<()>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.components.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(LoaderError::ComponentAlreadyRegistered {
                name: name.to_string(),
            }),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(Box::new(component));
                debug!(component = name, "registered component");
                Ok(())
            }
        }
    }

    /// 按名称和类型查找组件
    pub fn lookup<T>(&self, name: &str) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let entry = self
            .components
            .get(name)
            .ok_or_else(|| LoaderError::ComponentNotFound { name: name.to_string() })?;

        (**entry)
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| LoaderError::ComponentTypeMismatch { name: name.to_string() })
    }

    /// 注销组件
    pub fn unregister(&self, name: &str) -> bool {
        self.components.remove(name).is_some()
    }

    /// 已注册的组件名
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

static REGISTRY: Lazy<ComponentRegistry> = Lazy::new(ComponentRegistry::new);

/// 进程级注册表
pub fn registry() -> &'static ComponentRegistry {
    &REGISTRY
}
