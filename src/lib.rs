//! AdapterLoader - 可插拔设备适配器加载器
//!
//! 发现已注册的适配器包，按顺序启动与停止适配器，并把适配器描述符发布到共享状态树，
//! 供 ListAdapters 查询接口读取。
//!
//! # 分层
//!
//! - **适配器层**: 能力契约、注册表与发现、生命周期协调、描述符发布
//! - **服务层**: ListAdapters 查询服务与RPC工作线程池
//! - **核心基础层**: 共享状态树、组件注册表

pub mod types;
pub mod error;
pub mod core;
pub mod adapters;
pub mod services;
pub mod config;
pub mod loader;
pub mod runner;

// 重新导出常用类型
pub use self::adapters::{
    builtin_registry, Adapter, AdapterPackage, AdapterRegistry, AdapterType, LifecycleCoordinator,
    PackageExport, CONTRACT_VERSION,
};
pub use self::config::{ConfigManager, LoaderConfig, LoggingConfig};
pub use self::core::component_registry::ComponentRegistry;
pub use self::core::state_tree::{MemoryStateTree, StateTree};
pub use self::error::{LoaderError, Result};
pub use self::loader::AdapterLoader;
pub use self::runner::AdapterHost;
pub use self::types::*;

/// 版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LOADER_NAME: &str = "AdapterLoader";

/// 初始化日志系统
///
/// 已有全局订阅者时返回 `false`。
pub fn init_tracing(logging: &LoggingConfig) -> bool {
    let initialized = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(logging.level))
        .with_target(logging.with_target)
        .try_init()
        .is_ok();

    if initialized {
        tracing::info!("Initializing {} v{}", LOADER_NAME, VERSION);
    }
    initialized
}
