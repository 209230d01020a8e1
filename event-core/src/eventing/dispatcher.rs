//! 事件分发器（EventDispatcher）
//!
//! 一次分发的流程：查找注册表 → 逐个解析监听器实例 → 每个监听器一个 tokio 任务并发执行
//! → 等待全部结束 → 按失败策略返回 `DispatchReport` 或 `EventError::DispatchFailed`。
//! - 监听器不可用（解析失败）永远不致命，只记录在报告中；
//! - 宽松模式（默认）下监听器失败只记录，整体仍成功；
//! - 严格模式下任一监听器失败，在全部任务结束后整体失败，不中止已启动的任务；
//! - 不内置超时与重试；取消信号原样传给每个监听器，由监听器自行响应。
//!
use super::discovery::{DiscoveryScope, ListenerDiscovery};
use super::listener::{ErasedEvent, EventListener, Invocation, ListenerDescriptor};
use super::options::EventOptions;
use super::registry::ListenerRegistry;
use super::report::{DispatchReport, ListenerOutcome, ListenerReport};
use super::resolver::ListenerResolver;
use crate::error::{EventError, EventResult};
use crate::event::Event;
use crate::type_key::TypeKey;
use bon::bon;
use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};

/// 可按自身变体路由到具体事件类型的分发入口（由 `#[event_enum]` 生成）
pub trait Dispatchable: Send + 'static {
    fn dispatch_on<'a>(
        self,
        dispatcher: &'a EventDispatcher,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, EventResult<DispatchReport>>;
}

pub struct EventDispatcher {
    registry: ListenerRegistry,
    resolver: Arc<dyn ListenerResolver>,
    discovery: Option<Arc<dyn ListenerDiscovery>>,
    continue_on_error: bool,
}

#[bon]
impl EventDispatcher {
    /// 构建分发器；`options.auto_register` 为真且提供了发现协作者时，
    /// 立即对 `options.scopes_to_scan` 中的每个范围执行批量注册。
    #[builder]
    pub fn new(
        resolver: Arc<dyn ListenerResolver>,
        discovery: Option<Arc<dyn ListenerDiscovery>>,
        #[builder(default)] options: EventOptions,
    ) -> Self {
        let dispatcher = Self {
            registry: ListenerRegistry::new(),
            resolver,
            discovery,
            continue_on_error: options.continue_on_error,
        };

        if options.auto_register && dispatcher.discovery.is_some() {
            for scope in &options.scopes_to_scan {
                if let Err(err) = dispatcher.subscribe_all_from(scope) {
                    warn!(scope = %scope, error = %err, "skipping listener discovery for scope");
                }
            }
        }

        dispatcher
    }
}

impl EventDispatcher {
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn continue_on_error(&self) -> bool {
        self.continue_on_error
    }

    /// 以监听器实例的具体类型为 `E` 注册；重复注册为空操作
    pub fn subscribe<E, L>(&self, _listener: &L) -> bool
    where
        E: Event,
        L: EventListener<E>,
    {
        let added = self.registry.register_listener::<E, L>();
        debug!(
            listener = %TypeKey::of::<L>(),
            event = %TypeKey::of::<E>(),
            added,
            "listener subscribed"
        );
        added
    }

    /// 注销 `L` 对 `E` 的注册；未注册时为空操作
    pub fn unsubscribe<E, L>(&self, _listener: &L) -> bool
    where
        E: Event,
        L: EventListener<E>,
    {
        let removed = self
            .registry
            .unregister(TypeKey::of::<E>(), TypeKey::of::<L>());
        debug!(
            listener = %TypeKey::of::<L>(),
            event = %TypeKey::of::<E>(),
            removed,
            "listener unsubscribed"
        );
        removed
    }

    /// 通过发现协作者枚举范围内的全部监听器并批量注册，返回新增数量
    pub fn subscribe_all_from(&self, scope: &DiscoveryScope) -> EventResult<usize> {
        if scope.is_empty() {
            return Err(EventError::precondition("discovery scope must not be empty"));
        }
        let Some(discovery) = self.discovery.as_ref() else {
            return Err(EventError::precondition(
                "no listener discovery collaborator configured",
            ));
        };

        let descriptors = discovery.enumerate_capable_types(scope);
        let discovered = descriptors.len();
        let added = self.registry.bulk_register(descriptors);

        info!(scope = %scope, discovered, added, "listeners registered from scope");
        Ok(added)
    }

    pub async fn dispatch<E: Event>(&self, event: E) -> EventResult<DispatchReport> {
        self.dispatch_with_cancel(event, &CancellationToken::new())
            .await
    }

    /// 分发事件；取消信号传递给每个监听器
    pub async fn dispatch_with_cancel<E: Event>(
        &self,
        event: E,
        cancel: &CancellationToken,
    ) -> EventResult<DispatchReport> {
        let span = info_span!(
            "dispatch_event",
            event.name = %event.event_name(),
            event.id = %event.event_id(),
        );
        self.dispatch_inner(Arc::new(event), cancel.clone())
            .instrument(span)
            .await
    }

    /// 分发按变体路由的事件集合（如 `#[event_enum]` 生成的枚举）
    pub async fn publish<D: Dispatchable>(&self, event: D) -> EventResult<DispatchReport> {
        let cancel = CancellationToken::new();
        event.dispatch_on(self, &cancel).await
    }

    async fn dispatch_inner<E: Event>(
        &self,
        event: Arc<E>,
        cancel: CancellationToken,
    ) -> EventResult<DispatchReport> {
        let event_name = event.event_name().to_string();
        let event_id = event.event_id();
        debug!("dispatch started");

        let descriptors = self.registry.lookup(TypeKey::of::<E>());
        if descriptors.is_empty() {
            warn!("no listeners registered for event");
            return Ok(DispatchReport::new(event_name, event_id, Vec::new()));
        }

        info!(listener_count = descriptors.len(), "dispatching event to listeners");

        let erased: ErasedEvent = event;
        let pending: Vec<BoxFuture<'static, ListenerReport>> = descriptors
            .iter()
            .map(|descriptor| self.start_listener(descriptor, &erased, &cancel))
            .collect();
        let reports = future::join_all(pending).await;

        let report = DispatchReport::new(event_name, event_id, reports);
        if !self.continue_on_error && report.has_failures() {
            let event_name = report.event_name().to_string();
            let failures = report.into_failures();
            error!(failed = failures.len(), "dispatch failed");
            return Err(EventError::DispatchFailed {
                event_name,
                event_id,
                failures,
            });
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            cancelled = report.cancelled(),
            unavailable = report.unavailable(),
            "dispatch completed"
        );
        Ok(report)
    }

    /// 解析监听器并在独立任务中启动；返回的 future 在任务结束时给出结果
    fn start_listener(
        &self,
        descriptor: &ListenerDescriptor,
        event: &ErasedEvent,
        cancel: &CancellationToken,
    ) -> BoxFuture<'static, ListenerReport> {
        let listener = descriptor.listener_type();
        // 解析器中的 panic 同样只影响当前监听器
        let resolved = panic::catch_unwind(AssertUnwindSafe(|| {
            self.resolver
                .resolve(listener)
                .and_then(|instance| descriptor.bind(instance, event.clone(), cancel.clone()))
        }));

        let invocation = match resolved {
            Ok(Some(invocation)) => invocation,
            Ok(None) => {
                warn!(listener = %listener, "unable to resolve listener");
                return unavailable(listener);
            }
            Err(panic) => {
                warn!(
                    listener = %listener,
                    panic = panic_message(panic.as_ref()),
                    "unable to resolve listener"
                );
                return unavailable(listener);
            }
        };

        let span = info_span!("process_listener", listener.type = %listener);
        let handle = tokio::spawn(run_listener(listener, invocation, cancel.clone()).instrument(span));

        async move {
            match handle.await {
                Ok(report) => report,
                Err(err) => {
                    error!(listener = %listener, error = %err, "listener task aborted");
                    let outcome = ListenerOutcome::Failed(anyhow::anyhow!("listener task aborted: {err}"));
                    ListenerReport::new(listener, outcome, Duration::ZERO)
                }
            }
        }
        .boxed()
    }
}

async fn run_listener(
    listener: TypeKey,
    invocation: Invocation,
    cancel: CancellationToken,
) -> ListenerReport {
    trace!("executing listener");
    let started = Instant::now();
    let result = AssertUnwindSafe(invocation).catch_unwind().await;
    let elapsed = started.elapsed();

    let outcome = match result {
        Ok(Ok(())) => {
            debug!(?elapsed, "listener completed");
            ListenerOutcome::Succeeded
        }
        Ok(Err(err)) if cancel.is_cancelled() => {
            warn!(error = %err, "listener stopped after cancellation");
            ListenerOutcome::Cancelled(err)
        }
        Ok(Err(err)) => {
            error!(error = %err, "listener failed");
            ListenerOutcome::Failed(err)
        }
        Err(panic) => {
            let err = anyhow::anyhow!("listener panicked: {}", panic_message(panic.as_ref()));
            error!(error = %err, "listener failed");
            ListenerOutcome::Failed(err)
        }
    };

    ListenerReport::new(listener, outcome, elapsed)
}

fn unavailable(listener: TypeKey) -> BoxFuture<'static, ListenerReport> {
    let report = ListenerReport::new(listener, ListenerOutcome::Unavailable, Duration::ZERO);
    future::ready(report).boxed()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventing::{ListenerCatalog, ListenerContainer};
    use async_trait::async_trait;
    use event_macros::event;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tracing_test::traced_test;

    #[event]
    struct OrderPlaced {
        order_id: u64,
    }

    #[event]
    struct OrderCancelled {
        order_id: u64,
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(u64, crate::event::EventId)>>,
    }

    #[async_trait]
    impl EventListener<OrderPlaced> for Recorder {
        async fn handle(&self, e: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push((e.order_id, e.event_id()));
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl EventListener<OrderPlaced> for Broken {
        async fn handle(&self, _e: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
            anyhow::bail!("inventory service down")
        }
    }

    struct Panicky;

    #[async_trait]
    impl EventListener<OrderPlaced> for Panicky {
        async fn handle(&self, _e: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
            panic!("boom")
        }
    }

    struct Unregistered;

    #[async_trait]
    impl EventListener<OrderPlaced> for Unregistered {
        async fn handle(&self, _e: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn dispatcher(container: Arc<ListenerContainer>, continue_on_error: bool) -> EventDispatcher {
        EventDispatcher::builder()
            .resolver(container)
            .options(
                EventOptions::builder()
                    .continue_on_error(continue_on_error)
                    .build(),
            )
            .build()
    }

    #[tokio::test(flavor = "multi_thread")]
    #[traced_test]
    async fn no_listeners_is_a_successful_noop() {
        let d = dispatcher(Arc::new(ListenerContainer::new()), true);
        let report = d.dispatch(OrderPlaced::new(1)).await.unwrap();

        assert!(report.is_noop());
        assert_eq!(report.event_name(), "OrderPlaced");
        assert!(logs_contain("no listeners registered for event"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn each_listener_sees_the_same_event_once() {
        let container = Arc::new(ListenerContainer::new());
        let recorder = Arc::new(Recorder::default());
        container.add_singleton(recorder.clone());

        let d = dispatcher(container, true);
        d.subscribe::<OrderPlaced, _>(recorder.as_ref());

        let event = OrderPlaced::new(42);
        let id = event.event_id();
        let report = d.dispatch(event).await.unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.event_id(), id);
        assert_eq!(*recorder.seen.lock().unwrap(), vec![(42, id)]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn routing_uses_the_static_event_type() {
        let container = Arc::new(ListenerContainer::new());
        let recorder = Arc::new(Recorder::default());
        container.add_singleton(recorder.clone());

        let d = dispatcher(container, true);
        d.subscribe::<OrderPlaced, _>(recorder.as_ref());

        let report = d.dispatch(OrderCancelled::new(9)).await.unwrap();
        assert!(report.is_noop());
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    #[traced_test]
    async fn lenient_mode_records_failures_and_succeeds() {
        let container = Arc::new(ListenerContainer::new());
        let recorder = Arc::new(Recorder::default());
        container.add_singleton(recorder.clone());
        container.add_transient(|| Broken);
        container.add_transient(|| Panicky);

        let d = dispatcher(container, true);
        d.subscribe::<OrderPlaced, _>(&Broken);
        d.subscribe::<OrderPlaced, _>(&Panicky);
        d.subscribe::<OrderPlaced, _>(recorder.as_ref());

        let report = d.dispatch(OrderPlaced::new(7)).await.unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);

        let broken = report.outcome_of(TypeKey::of::<Broken>()).unwrap();
        assert!(broken.error().unwrap().to_string().contains("inventory service down"));
        let panicky = report.outcome_of(TypeKey::of::<Panicky>()).unwrap();
        assert!(panicky.error().unwrap().to_string().contains("boom"));
        assert!(logs_contain("listener failed"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn strict_mode_fails_after_all_listeners_settle() {
        let container = Arc::new(ListenerContainer::new());
        let recorder = Arc::new(Recorder::default());
        container.add_singleton(recorder.clone());
        container.add_transient(|| Broken);

        let d = dispatcher(container, false);
        d.subscribe::<OrderPlaced, _>(&Broken);
        d.subscribe::<OrderPlaced, _>(recorder.as_ref());

        let err = d.dispatch(OrderPlaced::new(3)).await.unwrap_err();

        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
        match &err {
            EventError::DispatchFailed {
                event_name,
                failures,
                ..
            } => {
                assert_eq!(event_name, "OrderPlaced");
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].listener(), TypeKey::of::<Broken>());
                assert!(!failures[0].is_cancelled());
                assert!(failures[0].to_string().contains("inventory service down"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.failures().len(), 1);
    }

    struct Slow {
        done: AtomicBool,
    }

    #[async_trait]
    impl EventListener<OrderPlaced> for Slow {
        async fn handle(&self, _e: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.done.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn strict_mode_waits_for_slow_siblings() {
        let container = Arc::new(ListenerContainer::new());
        let slow = Arc::new(Slow {
            done: AtomicBool::new(false),
        });
        container.add_transient(|| Broken);
        container.add_singleton(slow.clone());

        let d = dispatcher(container, false);
        d.subscribe::<OrderPlaced, _>(&Broken);
        d.subscribe::<OrderPlaced, _>(slow.as_ref());

        let err = d.dispatch(OrderPlaced::new(8)).await.unwrap_err();
        assert_eq!(err.failures().len(), 1);
        assert!(slow.done.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread")]
    #[traced_test]
    async fn unresolvable_listener_is_never_fatal() {
        let container = Arc::new(ListenerContainer::new());
        let recorder = Arc::new(Recorder::default());
        container.add_singleton(recorder.clone());

        // 严格模式下，解析失败依旧不致命
        let d = dispatcher(container, false);
        d.subscribe::<OrderPlaced, _>(&Unregistered);
        d.subscribe::<OrderPlaced, _>(recorder.as_ref());

        let report = d.dispatch(OrderPlaced::new(5)).await.unwrap();
        assert_eq!(report.unavailable(), 1);
        assert_eq!(report.attempted(), 1);
        assert!(matches!(
            report.outcome_of(TypeKey::of::<Unregistered>()),
            Some(ListenerOutcome::Unavailable)
        ));
        assert!(logs_contain("unable to resolve listener"));
    }

    struct Exploding;

    #[async_trait]
    impl EventListener<OrderPlaced> for Exploding {
        async fn handle(&self, _e: &OrderPlaced, _c: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    #[traced_test]
    async fn panicking_factory_only_affects_its_listener() {
        for continue_on_error in [true, false] {
            let container = Arc::new(ListenerContainer::new());
            let recorder = Arc::new(Recorder::default());
            container.add_transient::<Exploding, _>(|| panic!("factory blew up"));
            container.add_singleton(recorder.clone());

            let d = dispatcher(container, continue_on_error);
            d.subscribe::<OrderPlaced, _>(&Exploding);
            d.subscribe::<OrderPlaced, _>(recorder.as_ref());

            let report = d.dispatch(OrderPlaced::new(11)).await.unwrap();
            assert_eq!(report.unavailable(), 1);
            assert_eq!(report.succeeded(), 1);
            assert!(matches!(
                report.outcome_of(TypeKey::of::<Exploding>()),
                Some(ListenerOutcome::Unavailable)
            ));
            assert_eq!(recorder.seen.lock().unwrap().len(), 1);
        }
        assert!(logs_contain("factory blew up"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn wrong_instance_type_counts_as_unavailable() {
        let resolver = |_key: TypeKey| Some(Arc::new(String::from("impostor")) as crate::eventing::ListenerInstance);
        let d = EventDispatcher::builder().resolver(Arc::new(resolver)).build();
        d.subscribe::<OrderPlaced, _>(&Unregistered);

        let report = d.dispatch(OrderPlaced::new(1)).await.unwrap();
        assert_eq!(report.unavailable(), 1);
    }

    struct Patient {
        stopped: AtomicUsize,
    }

    #[async_trait]
    impl EventListener<OrderPlaced> for Patient {
        async fn handle(&self, _e: &OrderPlaced, cancel: &CancellationToken) -> anyhow::Result<()> {
            cancel.cancelled().await;
            self.stopped.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("cancelled before completion")
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancellation_reaches_every_listener() {
        let container = Arc::new(ListenerContainer::new());
        let patient = Arc::new(Patient {
            stopped: AtomicUsize::new(0),
        });
        container.add_singleton(patient.clone());

        let d = dispatcher(container, true);
        d.subscribe::<OrderPlaced, _>(patient.as_ref());

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let report = d
            .dispatch_with_cancel(OrderPlaced::new(1), &cancel)
            .await
            .unwrap();
        assert_eq!(report.cancelled(), 1);
        assert_eq!(report.failed(), 0);
        assert_eq!(patient.stopped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unsubscribe_stops_delivery() {
        let container = Arc::new(ListenerContainer::new());
        let recorder = Arc::new(Recorder::default());
        container.add_singleton(recorder.clone());

        let d = dispatcher(container, true);
        assert!(d.subscribe::<OrderPlaced, _>(recorder.as_ref()));
        assert!(!d.subscribe::<OrderPlaced, _>(recorder.as_ref()));
        assert!(d.unsubscribe::<OrderPlaced, _>(recorder.as_ref()));
        assert!(!d.unsubscribe::<OrderPlaced, _>(recorder.as_ref()));

        let report = d.dispatch(OrderPlaced::new(1)).await.unwrap();
        assert!(report.is_noop());
    }

    #[test]
    fn subscribe_all_from_requires_discovery_and_scope() {
        let d = EventDispatcher::builder()
            .resolver(Arc::new(ListenerContainer::new()))
            .build();
        assert!(matches!(
            d.subscribe_all_from(&DiscoveryScope::new("orders")),
            Err(EventError::Precondition { .. })
        ));

        let d = EventDispatcher::builder()
            .resolver(Arc::new(ListenerContainer::new()))
            .discovery(Arc::new(ListenerCatalog::new()))
            .build();
        assert!(matches!(
            d.subscribe_all_from(&DiscoveryScope::new("")),
            Err(EventError::Precondition { .. })
        ));
    }

    #[test]
    fn construction_runs_discovery_only_when_enabled() {
        let catalog = Arc::new(ListenerCatalog::new().with_in::<OrderPlaced, Recorder>("orders"));
        let scopes = vec![DiscoveryScope::new("orders")];

        let auto = EventDispatcher::builder()
            .resolver(Arc::new(ListenerContainer::new()))
            .discovery(catalog.clone())
            .options(EventOptions::builder().scopes_to_scan(scopes.clone()).build())
            .build();
        assert_eq!(auto.registry().len(), 1);

        let manual = EventDispatcher::builder()
            .resolver(Arc::new(ListenerContainer::new()))
            .discovery(catalog)
            .options(
                EventOptions::builder()
                    .scopes_to_scan(scopes)
                    .auto_register(false)
                    .build(),
            )
            .build();
        assert!(manual.registry().is_empty());
    }
}
