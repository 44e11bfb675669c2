//! 适配器加载器核心数据类型
//!
//! 适配器名称、描述符、适配器配置以及查询接口的请求/响应结构

use serde::{Deserialize, Serialize};
use std::fmt;

/// 适配器名称（候选包名），活动适配器集合的唯一键
pub type AdapterName = String;

/// 描述符在共享状态树中的集合路径
pub const ADAPTERS_PATH: &str = "/adapters";

/// 适配器日志级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        };
        f.write_str(level)
    }
}

/// 适配器配置（持久化加载尚未实现，当前总是默认值）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// 日志级别
    #[serde(default)]
    pub log_level: LogLevel,
}

/// 适配器描述符 - 适配器启动后自我报告的不可变描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    /// 适配器标识
    pub id: String,
    /// 厂商
    pub vendor: String,
    /// 版本
    pub version: String,
    /// 生效配置
    #[serde(default)]
    pub config: AdapterConfig,
    /// 附加描述（由适配器自定义）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_description: Option<serde_json::Value>,
}

impl AdapterDescriptor {
    pub fn new(id: &str, vendor: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            vendor: vendor.to_string(),
            version: version.to_string(),
            config: AdapterConfig::default(),
            additional_description: None,
        }
    }

    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_description(mut self, description: serde_json::Value) -> Self {
        self.additional_description = Some(description);
        self
    }
}

/// ListAdapters 请求（无过滤条件）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAdaptersRequest {}

/// ListAdapters 响应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Adapters {
    pub items: Vec<AdapterDescriptor>,
}
