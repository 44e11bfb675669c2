//! 适配器生命周期协调器
//!
//! 按发现顺序逐个实例化并启动适配器，成功后立即发布描述符；
//! 停止时逐个停止所有活动适配器，全部完成后整体清空活动集合。
//! 启动与停止都是单飞的：同一时刻只有一个适配器处于 start/stop 中。

use super::core::Adapter;
use super::publisher::DescriptorPublisher;
use super::registry::AdapterRegistry;
use crate::config::LifecycleSettings;
use crate::error::LoaderError;
use crate::types::{AdapterConfig, AdapterName};
use crate::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock as SyncRwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// 单个适配器的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdapterState {
    /// 启动中
    Starting,
    /// 运行中
    Running,
    /// 启动或停止失败
    Failed,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
}

/// 单个适配器的状态记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterStatus {
    pub state: AdapterState,
    pub last_error: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// 活动适配器集合
type ActiveAdapters = HashMap<AdapterName, Box<dyn Adapter>>;

/// 生命周期协调器
pub struct LifecycleCoordinator {
    registry: Arc<AdapterRegistry>,
    publisher: DescriptorPublisher,
    settings: LifecycleSettings,
    /// 活动适配器：名称存在当且仅当已成功启动且尚未停止
    active: RwLock<ActiveAdapters>,
    /// 每个适配器最近一次的生命周期结果，可从任意线程读取
    statuses: SyncRwLock<HashMap<AdapterName, AdapterStatus>>,
    /// 串行化 start/stop
    sequencer: Mutex<()>,
}

impl LifecycleCoordinator {
    pub fn new(
        registry: Arc<AdapterRegistry>,
        publisher: DescriptorPublisher,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            registry,
            publisher,
            settings,
            active: RwLock::new(HashMap::new()),
            statuses: SyncRwLock::new(HashMap::new()),
            sequencer: Mutex::new(()),
        }
    }

    /// 发现并逐个启动适配器
    ///
    /// 任一适配器启动失败时整体失败，已启动的适配器保持运行和发布状态。
    pub async fn start(&self) -> Result<()> {
        let _flight = self.sequencer.lock().await;
        debug!("starting");

        for candidate in self.registry.discover(&self.settings.disabled_adapters) {
            let (name, adapter_type) = candidate?;

            if self.active.read().await.contains_key(&name) {
                return Err(LoaderError::DuplicateAdapter { adapter: name });
            }

            let config = self.load_adapter_config(&name);
            let mut adapter = adapter_type.instantiate(config);
            debug!(adapter = %name, type_name = adapter_type.type_name(), "starting adapter");
            self.set_status(&name, AdapterState::Starting, None);

            let outcome = bounded(&name, "start", self.settings.start_timeout(), adapter.start()).await;
            if let Err(e) = outcome {
                let e = wrap_start_error(&name, e);
                error!(adapter = %name, error = %e, "adapter failed to start");
                self.set_status(&name, AdapterState::Failed, Some(e.to_string()));
                return Err(e);
            }

            let mut active = self.active.write().await;
            let adapter = active.entry(name.clone()).or_insert(adapter);
            self.set_status(&name, AdapterState::Running, None);
            self.publisher.publish(&name, adapter.as_ref())?;
        }

        info!("started");
        Ok(())
    }

    /// 逐个停止所有活动适配器，然后整体清空活动集合
    ///
    /// 单个适配器停止失败只记录并继续；全部处理完后以 `StopIncomplete` 报告。
    pub async fn stop(&self) -> Result<()> {
        let _flight = self.sequencer.lock().await;
        debug!("stopping");

        let mut active = self.active.write().await;
        let mut failed = Vec::new();

        for (name, adapter) in active.iter_mut() {
            let descriptor_id = adapter.adapter_descriptor().id;
            self.set_status(name, AdapterState::Stopping, None);

            match bounded(name, "stop", self.settings.stop_timeout(), adapter.stop()).await {
                Ok(()) => {
                    debug!(adapter = %name, "adapter stopped");
                    self.set_status(name, AdapterState::Stopped, None);
                }
                Err(e) => {
                    let e = wrap_stop_error(name, e);
                    error!(adapter = %name, error = %e, "adapter failed to stop");
                    self.set_status(name, AdapterState::Failed, Some(e.to_string()));
                    failed.push(name.clone());
                }
            }

            if self.settings.retract_on_stop {
                if let Err(e) = self.publisher.retract(&descriptor_id) {
                    warn!(adapter = %name, error = %e, "failed to retract adapter descriptor");
                }
            }
        }

        *active = HashMap::new();
        info!("stopped");

        if failed.is_empty() {
            Ok(())
        } else {
            failed.sort();
            Err(LoaderError::StopIncomplete { failed })
        }
    }

    /// 加载持久化的适配器配置
    ///
    /// 持久化尚未实现，总是返回默认配置。
    pub fn load_adapter_config(&self, name: &str) -> AdapterConfig {
        debug!(adapter = name, "no persisted adapter configuration, using defaults");
        AdapterConfig::default()
    }

    /// 当前活动的适配器名（排序后）
    pub async fn active_adapters(&self) -> Vec<AdapterName> {
        let mut names: Vec<AdapterName> = self.active.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn is_active(&self, name: &str) -> bool {
        self.active.read().await.contains_key(name)
    }

    /// 各适配器状态快照
    pub fn adapter_statuses(&self) -> HashMap<AdapterName, AdapterStatus> {
        self.statuses.read().clone()
    }

    pub fn adapter_status(&self, name: &str) -> Option<AdapterStatus> {
        self.statuses.read().get(name).cloned()
    }

    fn set_status(&self, name: &str, state: AdapterState, last_error: Option<String>) {
        self.statuses.write().insert(
            name.to_string(),
            AdapterStatus {
                state,
                last_error,
                changed_at: Utc::now(),
            },
        );
    }
}

/// 可选超时地等待适配器的 start/stop
async fn bounded<F>(name: &str, phase: &'static str, limit: Option<Duration>, operation: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match limit {
        None => operation.await,
        Some(timeout) => tokio::time::timeout(timeout, operation)
            .await
            .map_err(|_| LoaderError::AdapterTimeout {
                adapter: name.to_string(),
                phase,
                timeout,
            })?,
    }
}

fn wrap_start_error(name: &str, e: LoaderError) -> LoaderError {
    match e {
        LoaderError::AdapterTimeout { .. } => e,
        other => LoaderError::AdapterStart {
            adapter: name.to_string(),
            source: Box::new(other),
        },
    }
}

fn wrap_stop_error(name: &str, e: LoaderError) -> LoaderError {
    match e {
        LoaderError::AdapterTimeout { .. } => e,
        other => LoaderError::AdapterStop {
            adapter: name.to_string(),
            source: Box::new(other),
        },
    }
}
