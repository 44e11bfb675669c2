//! RPC服务分发
//!
//! 服务实现登记到服务器后，每个调用都在独立的阻塞工作线程上执行，
//! 与加载器自身的执行上下文无关。并发调用数受 `max_workers` 限制。

use crate::config::RpcSettings;
use crate::error::LoaderError;
use crate::types::{Adapters, ListAdaptersRequest};
use crate::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// 适配器查询服务接口（在RPC工作线程上调用）
pub trait AdapterServiceServicer: Send + Sync {
    fn list_adapters(&self, request: ListAdaptersRequest) -> Result<Adapters>;
}

/// RPC服务器
pub struct RpcServer {
    adapter_service: RwLock<Option<Arc<dyn AdapterServiceServicer>>>,
    workers: Arc<Semaphore>,
    max_workers: usize,
}

impl RpcServer {
    pub fn new(settings: &RpcSettings) -> Self {
        let max_workers = settings.max_workers.max(1);
        Self {
            adapter_service: RwLock::new(None),
            workers: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// 登记 AdapterService 实现，后登记的替换先登记的
    pub fn register_adapter_service(&self, service: Arc<dyn AdapterServiceServicer>) {
        let replaced = self.adapter_service.write().replace(service).is_some();
        info!(replaced, "registered AdapterService");
    }

    pub fn has_adapter_service(&self) -> bool {
        self.adapter_service.read().is_some()
    }

    /// 分发 ListAdapters 调用到工作线程
    pub async fn list_adapters(&self, request: ListAdaptersRequest) -> Result<Adapters> {
        let service = self
            .adapter_service
            .read()
            .clone()
            .ok_or_else(|| LoaderError::rpc("AdapterService is not implemented"))?;

        let _permit = self
            .workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| LoaderError::rpc("worker pool is closed"))?;

        debug!("dispatching ListAdapters");
        tokio::task::spawn_blocking(move || service.list_adapters(request))
            .await
            .map_err(|e| LoaderError::rpc(&format!("ListAdapters worker failed: {}", e)))?
    }

    /// 关闭工作池，之后的调用立即失败
    pub fn shutdown(&self) {
        self.workers.close();
        info!("rpc server shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::descriptor_for;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedService {
        calls: AtomicUsize,
        concurrent: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FixedService {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                concurrent: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl AdapterServiceServicer for FixedService {
        fn list_adapters(&self, _request: ListAdaptersRequest) -> Result<Adapters> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.concurrent.fetch_sub(1, Ordering::SeqCst);
            Ok(Adapters {
                items: vec![descriptor_for("foo")],
            })
        }
    }

    #[tokio::test]
    async fn test_unregistered_service_is_unimplemented() {
        let server = RpcServer::new(&RpcSettings::default());
        let result = server.list_adapters(ListAdaptersRequest::default()).await;
        assert!(matches!(result, Err(LoaderError::Rpc { .. })));
        assert!(!server.has_adapter_service());
    }

    #[tokio::test]
    async fn test_dispatch_to_registered_service() {
        let server = RpcServer::new(&RpcSettings::default());
        let service = Arc::new(FixedService::new());
        server.register_adapter_service(service.clone());

        let response = server.list_adapters(ListAdaptersRequest::default()).await.unwrap();
        assert_eq!(response.items, vec![descriptor_for("foo")]);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_worker_limit_is_respected() {
        let server = Arc::new(RpcServer::new(&RpcSettings { max_workers: 2 }));
        let service = Arc::new(FixedService::new());
        server.register_adapter_service(service.clone());

        let calls = (0..8).map(|_| {
            let server = server.clone();
            async move { server.list_adapters(ListAdaptersRequest::default()).await }
        });
        for result in futures::future::join_all(calls).await {
            assert!(result.is_ok());
        }

        assert_eq!(service.calls.load(Ordering::SeqCst), 8);
        assert!(service.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_calls() {
        let server = RpcServer::new(&RpcSettings::default());
        server.register_adapter_service(Arc::new(FixedService::new()));
        server.shutdown();

        let result = server.list_adapters(ListAdaptersRequest::default()).await;
        assert!(matches!(result, Err(LoaderError::Rpc { .. })));
    }
}
