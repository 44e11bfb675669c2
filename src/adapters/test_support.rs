//! 测试用适配器：记录生命周期事件，可配置失败和延迟

use super::core::{Adapter, AdapterType};
use crate::error::LoaderError;
use crate::types::AdapterDescriptor;
use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// 跨适配器共享的事件记录
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: String) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Behavior {
    pub fail_start: bool,
    pub fail_stop: bool,
    pub start_delay: Option<Duration>,
    pub stop_delay: Option<Duration>,
}

pub struct RecordingAdapter {
    id: String,
    log: EventLog,
    behavior: Behavior,
}

impl RecordingAdapter {
    pub fn new(id: &str, log: EventLog) -> Self {
        Self::with_behavior(id, log, Behavior::default())
    }

    pub fn with_behavior(id: &str, log: EventLog, behavior: Behavior) -> Self {
        Self {
            id: id.to_string(),
            log,
            behavior,
        }
    }
}

#[async_trait]
impl Adapter for RecordingAdapter {
    async fn start(&mut self) -> Result<()> {
        self.log.push(format!("{}:start:begin", self.id));
        if let Some(delay) = self.behavior.start_delay {
            tokio::time::sleep(delay).await;
        }
        self.log.push(format!("{}:start:end", self.id));
        if self.behavior.fail_start {
            return Err(LoaderError::adapter("start refused"));
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.log.push(format!("{}:stop:begin", self.id));
        if let Some(delay) = self.behavior.stop_delay {
            tokio::time::sleep(delay).await;
        }
        self.log.push(format!("{}:stop:end", self.id));
        if self.behavior.fail_stop {
            return Err(LoaderError::adapter("stop refused"));
        }
        Ok(())
    }

    fn adapter_descriptor(&self) -> AdapterDescriptor {
        descriptor_for(&self.id)
    }
}

/// 测试适配器报告的描述符
pub fn descriptor_for(id: &str) -> AdapterDescriptor {
    AdapterDescriptor::new(id, &format!("{} vendor", id), "1.0.0")
        .with_description(serde_json::json!({"ports": 16, "family": id}))
}

/// 构造记录型适配器类型
pub fn recording_type(id: &str, log: &EventLog, behavior: Behavior) -> AdapterType {
    let id = id.to_string();
    let log = log.clone();
    let type_name = format!("{}Adapter", id);
    AdapterType::new(&type_name, move |_config| {
        Box::new(RecordingAdapter::with_behavior(&id, log.clone(), behavior.clone()))
    })
}
