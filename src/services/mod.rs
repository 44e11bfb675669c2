//! 服务层模块
//!
//! ListAdapters 查询服务与承载它的RPC服务器

pub mod adapter_service;
pub mod rpc_server;

// 重新导出核心服务
pub use adapter_service::*;
pub use rpc_server::*;
