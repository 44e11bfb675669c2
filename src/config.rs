//! 适配器加载器配置管理
//!
//! 支持YAML/TOML配置文件驱动的加载器运行

use crate::error::LoaderError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 加载器配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// 生命周期设置
    #[serde(default)]
    pub loader: LifecycleSettings,
    /// RPC设置
    #[serde(default)]
    pub rpc: RpcSettings,
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 生命周期设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleSettings {
    /// 单个适配器启动超时（秒），None或0表示不限
    #[serde(default)]
    pub start_timeout_secs: Option<u64>,
    /// 单个适配器停止超时（秒），None或0表示不限
    #[serde(default)]
    pub stop_timeout_secs: Option<u64>,
    /// 停止时是否从状态树撤回描述符
    #[serde(default)]
    pub retract_on_stop: bool,
    /// 不参与发现的适配器
    #[serde(default)]
    pub disabled_adapters: Vec<String>,
}

impl LifecycleSettings {
    pub fn start_timeout(&self) -> Option<Duration> {
        as_timeout(self.start_timeout_secs)
    }

    pub fn stop_timeout(&self) -> Option<Duration> {
        as_timeout(self.stop_timeout_secs)
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            start_timeout_secs: Some(30),
            stop_timeout_secs: Some(10),
            retract_on_stop: false,
            disabled_adapters: Vec::new(),
        }
    }
}

fn as_timeout(secs: Option<u64>) -> Option<Duration> {
    secs.filter(|s| *s > 0).map(Duration::from_secs)
}

/// RPC设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcSettings {
    /// 处理请求的工作线程上限
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_max_workers() -> usize {
    10
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default)]
    pub level: LogLevelSetting,
    /// 是否输出target
    #[serde(default)]
    pub with_target: bool,
}

/// 日志级别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelSetting {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevelSetting> for tracing::Level {
    fn from(level: LogLevelSetting) -> Self {
        match level {
            LogLevelSetting::Error => tracing::Level::ERROR,
            LogLevelSetting::Warn => tracing::Level::WARN,
            LogLevelSetting::Info => tracing::Level::INFO,
            LogLevelSetting::Debug => tracing::Level::DEBUG,
            LogLevelSetting::Trace => tracing::Level::TRACE,
        }
    }
}

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: LoaderConfig,
}

impl ConfigManager {
    /// 从文件加载配置（按扩展名选择YAML或TOML）
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoaderError::config(&format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: LoaderConfig = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)
                .map_err(|e| LoaderError::config(&format!("Failed to parse config file: {}", e)))?,
            ConfigFormat::Toml => toml::from_str(&content)
                .map_err(|e| LoaderError::config(&format!("Failed to parse config file: {}", e)))?,
        };

        Ok(Self { config })
    }

    /// 创建默认配置
    pub fn new_default() -> Self {
        Self {
            config: LoaderConfig::default(),
        }
    }

    pub fn from_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// 保存配置到文件
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::to_string(&self.config)
                .map_err(|e| LoaderError::config(&format!("Failed to serialize config: {}", e)))?,
            ConfigFormat::Toml => toml::to_string_pretty(&self.config)
                .map_err(|e| LoaderError::config(&format!("Failed to serialize config: {}", e)))?,
        };

        tokio::fs::write(path, content)
            .await
            .map_err(|e| LoaderError::config(&format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// 获取配置
    pub fn get_config(&self) -> &LoaderConfig {
        &self.config
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.config.rpc.max_workers == 0 {
            return Err(LoaderError::config("rpc.max_workers must be positive"));
        }

        if self
            .config
            .loader
            .disabled_adapters
            .iter()
            .any(|name| name.trim().is_empty())
        {
            return Err(LoaderError::config("loader.disabled_adapters contains an empty name"));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

/// 生成默认配置文件
pub async fn generate_default_config_file<P: AsRef<Path>>(path: P) -> Result<()> {
    ConfigManager::new_default().save_to_file(path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_manager_default() {
        let config_manager = ConfigManager::new_default();
        let config = config_manager.get_config();

        assert_eq!(config.rpc.max_workers, 10);
        assert_eq!(config.loader.start_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.loader.stop_timeout(), Some(Duration::from_secs(10)));
        assert!(!config.loader.retract_on_stop);
        assert!(config_manager.validate().is_ok());
    }

    #[tokio::test]
    async fn test_yaml_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("adapter_loader.yaml");

        let mut config = LoaderConfig::default();
        config.loader.disabled_adapters = vec!["maple_olt".to_string()];
        let config_manager = ConfigManager::from_config(config);
        config_manager.save_to_file(&path).await.unwrap();

        let loaded = ConfigManager::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.get_config(), config_manager.get_config());
    }

    #[tokio::test]
    async fn test_toml_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("adapter_loader.toml");
        tokio::fs::write(
            &path,
            "[loader]\nstart_timeout_secs = 0\nretract_on_stop = true\n\n[rpc]\nmax_workers = 4\n",
        )
        .await
        .unwrap();

        let loaded = ConfigManager::load_from_file(&path).await.unwrap();
        let config = loaded.get_config();
        assert_eq!(config.loader.start_timeout(), None);
        assert_eq!(config.loader.stop_timeout(), None);
        assert!(config.loader.retract_on_stop);
        assert_eq!(config.rpc.max_workers, 4);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[tokio::test]
    async fn test_partial_sections_use_field_defaults() {
        let dir = TempDir::new().unwrap();

        let yaml_path = dir.path().join("partial.yaml");
        tokio::fs::write(&yaml_path, "logging:\n  with_target: true\n").await.unwrap();
        let loaded = ConfigManager::load_from_file(&yaml_path).await.unwrap();
        assert_eq!(loaded.get_config().logging.level, LogLevelSetting::Info);
        assert!(loaded.get_config().logging.with_target);

        let toml_path = dir.path().join("partial.toml");
        tokio::fs::write(&toml_path, "[rpc]\n\n[logging]\nlevel = \"debug\"\n").await.unwrap();
        let loaded = ConfigManager::load_from_file(&toml_path).await.unwrap();
        assert_eq!(loaded.get_config().rpc.max_workers, 10);
        assert_eq!(loaded.get_config().logging.level, LogLevelSetting::Debug);
        assert!(loaded.validate().is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let result = ConfigManager::load_from_file(dir.path().join("absent.yaml")).await;
        assert!(matches!(result, Err(LoaderError::Config { .. })));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = LoaderConfig::default();
        config.rpc.max_workers = 0;
        assert!(ConfigManager::from_config(config).validate().is_err());

        let mut config = LoaderConfig::default();
        config.loader.disabled_adapters = vec![" ".to_string()];
        assert!(ConfigManager::from_config(config).validate().is_err());
    }

    #[tokio::test]
    async fn test_generate_default_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("generated.yaml");

        generate_default_config_file(&path).await.unwrap();

        let loaded = ConfigManager::load_from_file(&path).await.unwrap();
        assert!(loaded.validate().is_ok());
        assert_eq!(loaded.get_config(), &LoaderConfig::default());
    }
}
