//! 适配器加载器错误处理系统
//!
//! 统一的错误类型：发现、契约校验、生命周期、组件注册和RPC

use std::time::Duration;
use thiserror::Error;

/// 加载器统一错误类型
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 候选包加载失败（发现阶段本地恢复）
    #[error("Adapter package '{package}' failed to load: {message}")]
    PackageLoad { package: String, message: String },

    /// 导出类型不满足适配器契约（中止本次启动）
    #[error("Adapter type '{type_name}' in package '{package}' violates the adapter contract: {reason}")]
    ContractViolation {
        package: String,
        type_name: String,
        reason: String,
    },

    #[error("Adapter package '{package}' is already registered")]
    AdapterAlreadyRegistered { package: String },

    #[error("Adapter '{adapter}' is already active")]
    DuplicateAdapter { adapter: String },

    #[error("Adapter '{adapter}' failed to start: {source}")]
    AdapterStart {
        adapter: String,
        #[source]
        source: Box<LoaderError>,
    },

    #[error("Adapter '{adapter}' failed to stop: {source}")]
    AdapterStop {
        adapter: String,
        #[source]
        source: Box<LoaderError>,
    },

    #[error("Adapter '{adapter}' did not finish {phase} within {timeout:?}")]
    AdapterTimeout {
        adapter: String,
        phase: &'static str,
        timeout: Duration,
    },

    #[error("{} adapter(s) failed to stop: {}", failed.len(), failed.join(", "))]
    StopIncomplete { failed: Vec<String> },

    /// 适配器自身上报的错误
    #[error("Adapter error: {message}")]
    Adapter { message: String },

    #[error("Component '{name}' is not registered")]
    ComponentNotFound { name: String },

    #[error("Component '{name}' is not of the requested type")]
    ComponentTypeMismatch { name: String },

    #[error("Component '{name}' is already registered")]
    ComponentAlreadyRegistered { name: String },

    #[error("State tree error at '{path}': {message}")]
    StateTree { path: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("RPC error: {message}")]
    Rpc { message: String },
}

impl LoaderError {
    /// 创建适配器上报的错误
    pub fn adapter(message: &str) -> Self {
        Self::Adapter {
            message: message.to_string(),
        }
    }

    /// 创建包加载错误
    pub fn package_load(package: &str, message: &str) -> Self {
        Self::PackageLoad {
            package: package.to_string(),
            message: message.to_string(),
        }
    }

    /// 创建配置相关错误
    pub fn config(message: &str) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    /// 创建状态树错误
    pub fn state_tree(path: &str, message: &str) -> Self {
        Self::StateTree {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// 创建RPC错误
    pub fn rpc(message: &str) -> Self {
        Self::Rpc {
            message: message.to_string(),
        }
    }

    /// 是否为契约校验失败
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, LoaderError>;
