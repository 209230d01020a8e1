//! 监听器注册表（ListenerRegistry）
//!
//! 维护“事件类型 → 监听器类型集合”的并发映射：
//! - 同一 (事件类型, 监听器类型) 至多出现一次，重复注册为空操作；
//! - 基于分片的 `DashMap`，不同事件类型的读写互不串行；
//! - `lookup` 返回当前快照，分发期间的新注册不影响进行中的分发。
//!
use super::listener::{EventListener, ListenerDescriptor};
use crate::event::Event;
use crate::type_key::TypeKey;
use dashmap::DashMap;

#[derive(Default)]
pub struct ListenerRegistry {
    by_event: DashMap<TypeKey, Vec<ListenerDescriptor>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听器；已存在时不做任何修改并返回 `false`
    pub fn register(&self, descriptor: ListenerDescriptor) -> bool {
        let mut listeners = self.by_event.entry(descriptor.event_type()).or_default();
        if listeners
            .iter()
            .any(|d| d.listener_type() == descriptor.listener_type())
        {
            return false;
        }
        listeners.push(descriptor);
        true
    }

    pub fn register_listener<E, L>(&self) -> bool
    where
        E: Event,
        L: EventListener<E>,
    {
        self.register(ListenerDescriptor::of::<E, L>())
    }

    /// 注销监听器；未注册时为空操作并返回 `false`
    pub fn unregister(&self, event_type: TypeKey, listener_type: TypeKey) -> bool {
        let removed = match self.by_event.get_mut(&event_type) {
            Some(mut listeners) => {
                let before = listeners.len();
                listeners.retain(|d| d.listener_type() != listener_type);
                listeners.len() != before
            }
            None => false,
        };

        if removed {
            self.by_event
                .remove_if(&event_type, |_, listeners| listeners.is_empty());
        }
        removed
    }

    /// 批量注册（逐项原子，不构成整体事务），返回新增数量
    pub fn bulk_register<I>(&self, descriptors: I) -> usize
    where
        I: IntoIterator<Item = ListenerDescriptor>,
    {
        descriptors
            .into_iter()
            .filter(|d| self.register(d.clone()))
            .count()
    }

    /// 当前已注册监听器的快照（按注册顺序）；无注册时返回空集合
    pub fn lookup(&self, event_type: TypeKey) -> Vec<ListenerDescriptor> {
        self.by_event
            .get(&event_type)
            .map(|listeners| listeners.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, event_type: TypeKey, listener_type: TypeKey) -> bool {
        self.by_event
            .get(&event_type)
            .is_some_and(|listeners| listeners.iter().any(|d| d.listener_type() == listener_type))
    }

    pub fn listener_count(&self, event_type: TypeKey) -> usize {
        self.by_event
            .get(&event_type)
            .map_or(0, |listeners| listeners.len())
    }

    /// 至少有一个监听器的事件类型
    pub fn event_types(&self) -> Vec<TypeKey> {
        self.by_event.iter().map(|e| *e.key()).collect()
    }

    /// 已注册的 (事件类型, 监听器类型) 对总数
    pub fn len(&self) -> usize {
        self.by_event.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
