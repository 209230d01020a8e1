//! 监听器解析（ListenerResolver）
//!
//! 分发器在每次分发时按监听器类型解析实例，不缓存、不池化；
//! 实例的生命周期完全交给解析器决定（每次新建或共享同一实例）。
//!
use crate::type_key::TypeKey;
use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的监听器实例
pub type ListenerInstance = Arc<dyn Any + Send + Sync>;

/// 监听器解析器：按监听器类型提供实例，无法提供时返回 `None`
pub trait ListenerResolver: Send + Sync {
    fn resolve(&self, listener_type: TypeKey) -> Option<ListenerInstance>;
}

impl<F> ListenerResolver for F
where
    F: Fn(TypeKey) -> Option<ListenerInstance> + Send + Sync,
{
    fn resolve(&self, listener_type: TypeKey) -> Option<ListenerInstance> {
        self(listener_type)
    }
}

type Factory = Arc<dyn Fn() -> ListenerInstance + Send + Sync>;

/// 基于内存的监听器容器
/// - 通过 TypeKey 注册监听器工厂
/// - `add_transient` 每次解析新建实例，`add_singleton` 每次返回同一实例
#[derive(Default)]
pub struct ListenerContainer {
    factories: DashMap<TypeKey, Factory>,
}

impl ListenerContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册瞬态监听器：每次解析调用一次工厂
    pub fn add_transient<L, F>(&self, factory: F)
    where
        L: Send + Sync + 'static,
        F: Fn() -> L + Send + Sync + 'static,
    {
        let f: Factory = Arc::new(move || Arc::new(factory()) as ListenerInstance);
        self.factories.insert(TypeKey::of::<L>(), f);
    }

    /// 注册单例监听器：所有解析共享同一实例
    pub fn add_singleton<L>(&self, instance: Arc<L>)
    where
        L: Send + Sync + 'static,
    {
        let f: Factory = Arc::new(move || instance.clone() as ListenerInstance);
        self.factories.insert(TypeKey::of::<L>(), f);
    }

    pub fn remove<L: 'static>(&self) -> bool {
        self.factories.remove(&TypeKey::of::<L>()).is_some()
    }

    pub fn contains<L: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeKey::of::<L>())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl ListenerResolver for ListenerContainer {
    fn resolve(&self, listener_type: TypeKey) -> Option<ListenerInstance> {
        // 先取出工厂再调用，避免持有分片锁执行用户代码
        let factory = self.factories.get(&listener_type).map(|f| f.clone())?;
        Some(factory())
    }
}
