//! 监听器发现（ListenerDiscovery）
//!
//! 按范围（`DiscoveryScope`）枚举可注册的监听器能力声明，供分发器批量注册。
//! 不做运行时类型扫描：`ListenerCatalog` 是显式构建的注册清单，
//! 保证“范围内每个监听器实现恰好注册一次”（重复项由注册表去重）。
//!
use super::listener::{EventListener, ListenerDescriptor};
use crate::event::{Event, process_identity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 发现范围（部署单元/模块名）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscoveryScope(String);

impl DiscoveryScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 当前进程对应的默认范围
    pub fn process() -> Self {
        Self::new(process_identity())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for DiscoveryScope {
    fn default() -> Self {
        Self::process()
    }
}

impl fmt::Display for DiscoveryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DiscoveryScope {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DiscoveryScope {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 以调用方 crate 的包名构造发现范围
#[macro_export]
macro_rules! current_scope {
    () => {
        $crate::eventing::DiscoveryScope::new(env!("CARGO_PKG_NAME"))
    };
}

/// 监听器发现协作者：枚举某范围内的全部能力声明
pub trait ListenerDiscovery: Send + Sync {
    fn enumerate_capable_types(&self, scope: &DiscoveryScope) -> Vec<ListenerDescriptor>;
}

/// 显式的监听器清单
#[derive(Clone, Debug, Default)]
pub struct ListenerCatalog {
    entries: Vec<(DiscoveryScope, ListenerDescriptor)>,
}

impl ListenerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在进程默认范围内登记 `L` 对 `E` 的处理能力
    pub fn with<E, L>(self) -> Self
    where
        E: Event,
        L: EventListener<E>,
    {
        self.with_in::<E, L>(DiscoveryScope::process())
    }

    pub fn with_in<E, L>(mut self, scope: impl Into<DiscoveryScope>) -> Self
    where
        E: Event,
        L: EventListener<E>,
    {
        self.add::<E, L>(scope);
        self
    }

    pub fn add<E, L>(&mut self, scope: impl Into<DiscoveryScope>) -> &mut Self
    where
        E: Event,
        L: EventListener<E>,
    {
        self.entries
            .push((scope.into(), ListenerDescriptor::of::<E, L>()));
        self
    }

    /// 清单中出现过的范围（按首次出现顺序）
    pub fn scopes(&self) -> Vec<DiscoveryScope> {
        let mut scopes: Vec<DiscoveryScope> = Vec::new();
        for (scope, _) in &self.entries {
            if !scopes.contains(scope) {
                scopes.push(scope.clone());
            }
        }
        scopes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ListenerDiscovery for ListenerCatalog {
    fn enumerate_capable_types(&self, scope: &DiscoveryScope) -> Vec<ListenerDescriptor> {
        self.entries
            .iter()
            .filter(|(s, _)| s == scope)
            .map(|(_, d)| d.clone())
            .collect()
    }
}
