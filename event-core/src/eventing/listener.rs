//! 事件监听器（EventListener）
//!
//! 监听器为某一事件类型实现 `EventListener<E>`；同一类型可为多个事件类型分别实现。
//! `ListenerDescriptor` 是编译期的能力声明：记录 (事件类型, 监听器类型) 并携带
//! 类型擦除后的调用闭包，供注册表与分发器在运行时使用。
//!
use super::resolver::ListenerInstance;
use crate::event::Event;
use crate::type_key::TypeKey;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 事件监听器：处理某一类型的事件
#[async_trait]
pub trait EventListener<E: Event>: Send + Sync + 'static {
    /// 处理事件；取消信号由监听器自行决定是否响应
    async fn handle(&self, event: &E, cancel: &CancellationToken) -> anyhow::Result<()>;
}

pub(crate) type ErasedEvent = Arc<dyn Any + Send + Sync>;

pub(crate) type Invocation = BoxFuture<'static, anyhow::Result<()>>;

type InvokeFn =
    dyn Fn(ListenerInstance, ErasedEvent, CancellationToken) -> Option<Invocation> + Send + Sync;

/// 监听器能力声明：(事件类型, 监听器类型) 与调用闭包
#[derive(Clone)]
pub struct ListenerDescriptor {
    event_type: TypeKey,
    listener_type: TypeKey,
    invoke: Arc<InvokeFn>,
}

impl ListenerDescriptor {
    pub fn of<E, L>() -> Self
    where
        E: Event,
        L: EventListener<E>,
    {
        let invoke: Arc<InvokeFn> = Arc::new(
            |instance: ListenerInstance,
             event: ErasedEvent,
             cancel: CancellationToken|
             -> Option<Invocation> {
                // 解析出的实例不是 L 时返回 None，由分发器记为“监听器不可用”
                let listener = instance.downcast::<L>().ok()?;
                let event = event.downcast::<E>().ok()?;
                Some(Box::pin(async move {
                    <L as EventListener<E>>::handle(&*listener, &*event, &cancel).await
                }))
            },
        );

        Self {
            event_type: TypeKey::of::<E>(),
            listener_type: TypeKey::of::<L>(),
            invoke,
        }
    }

    pub fn event_type(&self) -> TypeKey {
        self.event_type
    }

    pub fn listener_type(&self) -> TypeKey {
        self.listener_type
    }

    pub(crate) fn bind(
        &self,
        instance: ListenerInstance,
        event: ErasedEvent,
        cancel: CancellationToken,
    ) -> Option<Invocation> {
        (self.invoke)(instance, event, cancel)
    }
}

impl fmt::Debug for ListenerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerDescriptor")
            .field("event_type", &self.event_type)
            .field("listener_type", &self.listener_type)
            .finish_non_exhaustive()
    }
}
