//! 适配器注册表和发现系统
//!
//! 每个适配器包在注册表中登记一次（包名即候选适配器名），
//! 发现过程按登记顺序加载包的源单元并筛选满足契约的导出类型。

use super::core::AdapterType;
use crate::error::LoaderError;
use crate::types::AdapterName;
use crate::Result;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// 包源单元加载函数，返回该单元的全部导出
pub type PackageLoader = Arc<dyn Fn() -> Result<Vec<PackageExport>> + Send + Sync>;

/// 源单元导出的顶层符号
#[derive(Debug, Clone)]
pub enum PackageExport {
    /// 适配器实现
    Adapter(AdapterType),
    /// 非适配器符号（辅助函数、常量等）
    Symbol(String),
}

/// 适配器包
#[derive(Clone)]
pub struct AdapterPackage {
    name: AdapterName,
    unit: Option<PackageLoader>,
}

impl AdapterPackage {
    /// 没有同名源单元的包
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: None,
        }
    }

    /// 带源单元加载函数的包
    pub fn with_unit<F>(name: &str, loader: F) -> Self
    where
        F: Fn() -> Result<Vec<PackageExport>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            unit: Some(Arc::new(loader)),
        }
    }

    /// 导出固定符号列表的包
    pub fn with_exports(name: &str, exports: Vec<PackageExport>) -> Self {
        Self::with_unit(name, move || Ok(exports.clone()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for AdapterPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterPackage")
            .field("name", &self.name)
            .field("has_unit", &self.unit.is_some())
            .finish()
    }
}

/// 适配器注册表
#[derive(Debug, Default)]
pub struct AdapterRegistry {
    packages: RwLock<Vec<AdapterPackage>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记适配器包
    pub fn register(&self, package: AdapterPackage) -> Result<()> {
        let mut packages = self.packages.write();
        if packages.iter().any(|p| p.name == package.name) {
            return Err(LoaderError::AdapterAlreadyRegistered { package: package.name });
        }

        debug!(package = %package.name, "registered adapter package");
        packages.push(package);
        Ok(())
    }

    /// 链式登记
    pub fn with_package(self, package: AdapterPackage) -> Result<Self> {
        self.register(package)?;
        Ok(self)
    }

    /// 已登记的包名（登记顺序）
    pub fn package_names(&self) -> Vec<AdapterName> {
        self.packages.read().iter().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }

    /// 开始一次发现，跳过被禁用的包
    ///
    /// 返回惰性序列；每次调用都从头扫描当前登记的包。
    pub fn discover(&self, disabled: &[String]) -> Discovery {
        let candidates: Vec<AdapterPackage> = self
            .packages
            .read()
            .iter()
            .filter(|p| {
                let skip = disabled.iter().any(|d| d == &p.name);
                if skip {
                    info!(package = %p.name, "adapter disabled by configuration");
                }
                !skip
            })
            .cloned()
            .collect();

        Discovery {
            candidates: candidates.into_iter().collect(),
            pending: VecDeque::new(),
            current: None,
            finished: false,
        }
    }
}

/// 惰性发现序列
///
/// 产出 `(适配器名, 类型)`。契约校验失败产出一次错误后序列结束。
pub struct Discovery {
    candidates: VecDeque<AdapterPackage>,
    pending: VecDeque<AdapterType>,
    current: Option<AdapterName>,
    finished: bool,
}

impl Discovery {
    /// 加载下一个候选包的源单元，返回是否还有候选
    fn load_next_candidate(&mut self) -> bool {
        let Some(package) = self.candidates.pop_front() else {
            return false;
        };

        let Some(unit) = package.unit.as_ref() else {
            debug!(package = %package.name, "no source unit, skipping");
            return true;
        };

        match unit() {
            Ok(exports) => {
                for export in exports {
                    match export {
                        PackageExport::Adapter(adapter_type) => self.pending.push_back(adapter_type),
                        PackageExport::Symbol(symbol) => {
                            trace!(package = %package.name, symbol = %symbol, "ignoring non-adapter symbol");
                        }
                    }
                }
                if self.pending.is_empty() {
                    debug!(package = %package.name, "package exports no adapter types");
                }
                self.current = Some(package.name.clone());
            }
            Err(e) => {
                warn!(package = %package.name, error = %e, "cannot-load");
            }
        }

        true
    }
}

impl Iterator for Discovery {
    type Item = Result<(AdapterName, AdapterType)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if let Some(adapter_type) = self.pending.pop_front() {
                let name = self.current.clone().unwrap_or_default();
                if let Err(reason) = adapter_type.verify() {
                    self.finished = true;
                    return Some(Err(LoaderError::ContractViolation {
                        package: name,
                        type_name: adapter_type.type_name().to_string(),
                        reason,
                    }));
                }
                return Some(Ok((name, adapter_type)));
            }

            if !self.load_next_candidate() {
                self.finished = true;
                return None;
            }
        }
    }
}
