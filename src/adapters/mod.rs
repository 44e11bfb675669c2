//! 适配器层模块
//!
//! 能力契约、注册表与发现、生命周期协调和描述符发布

pub mod core;
pub mod lifecycle;
pub mod publisher;
pub mod registry;
pub mod simulated;

#[cfg(test)]
pub(crate) mod test_support;

// 重新导出核心组件
pub use self::core::*;
pub use lifecycle::*;
pub use publisher::*;
pub use registry::*;
pub use simulated::*;

use crate::Result;

/// 内置适配器注册表
pub fn builtin_registry() -> Result<AdapterRegistry> {
    AdapterRegistry::new().with_package(simulated_package())
}
