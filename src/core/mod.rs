//! 核心基础层模块
//!
//! 共享状态树和组件注册表

pub mod component_registry;
pub mod state_tree;

// 重新导出核心组件
pub use component_registry::*;
pub use state_tree::*;
