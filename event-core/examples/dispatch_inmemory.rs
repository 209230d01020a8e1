/// 事件分发器（内存版）示例
/// 展示 清单发现 -> 注册表 -> 容器解析 -> 并发执行 的闭环，以及宽松/严格两种失败策略
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use event_core::event::{DomainEvent, Event};
use event_core::eventing::{
    CancellationToken, DiscoveryScope, EventDispatcher, EventListener, EventOptions,
    ListenerCatalog, ListenerContainer,
};
use event_macros::{domain_event, event, event_enum};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ============================================================================
// 事件定义
// ============================================================================

#[domain_event(aggregate_type = "User")]
struct UserCreated {
    email: String,
}

#[event(version = "2.0")]
struct UserDeleted {
    user_id: String,
}

#[event_enum]
enum UserEvent {
    Created(UserCreated),
    Deleted(UserDeleted),
}

// ============================================================================
// 示例监听器
// ============================================================================

struct PrintListener;

#[async_trait]
impl EventListener<UserCreated> for PrintListener {
    async fn handle(&self, event: &UserCreated, _cancel: &CancellationToken) -> AnyResult<()> {
        println!(
            "listener=printer type={} aggregate={} email={}",
            event.event_name(),
            event.aggregate_id(),
            event.email
        );
        Ok(())
    }
}

#[async_trait]
impl EventListener<UserDeleted> for PrintListener {
    async fn handle(&self, event: &UserDeleted, _cancel: &CancellationToken) -> AnyResult<()> {
        println!(
            "listener=printer type={} version={} user={}",
            event.event_name(),
            event.schema_version(),
            event.user_id
        );
        Ok(())
    }
}

/// 删除用户时总是失败的监听器
struct ArchiveListener;

#[async_trait]
impl EventListener<UserDeleted> for ArchiveListener {
    async fn handle(&self, event: &UserDeleted, cancel: &CancellationToken) -> AnyResult<()> {
        tokio::select! {
            _ = cancel.cancelled() => anyhow::bail!("archive cancelled"),
            _ = tokio::time::sleep(Duration::from_millis(50)) => {}
        }
        anyhow::bail!("archive store unavailable for {}", event.user_id)
    }
}

fn build_dispatcher(continue_on_error: bool) -> EventDispatcher {
    let container = Arc::new(ListenerContainer::new());
    container.add_singleton(Arc::new(PrintListener));
    container.add_transient(|| ArchiveListener);

    let catalog = ListenerCatalog::new()
        .with_in::<UserCreated, PrintListener>("users")
        .with_in::<UserDeleted, PrintListener>("users")
        .with_in::<UserDeleted, ArchiveListener>("users");

    EventDispatcher::builder()
        .resolver(container)
        .discovery(Arc::new(catalog))
        .options(
            EventOptions::builder()
                .continue_on_error(continue_on_error)
                .scopes_to_scan(vec![DiscoveryScope::new("users")])
                .build(),
        )
        .build()
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== 事件分发器（内存版）示例 ===\n");

    let dispatcher = build_dispatcher(true);
    println!(
        "✅ 已注册 {} 个事件类型",
        dispatcher.registry().event_types().len()
    );

    let created = UserCreated::new("ada@example.com".to_string()).with_aggregate("u-1", 1);
    let report = dispatcher.publish(UserEvent::from(created)).await?;
    println!("✅ {}: 成功 {}", report.event_name(), report.succeeded());

    let report = dispatcher
        .publish(UserEvent::from(UserDeleted::new("u-1".to_string())))
        .await?;
    println!(
        "✅ {}: 成功 {}，失败 {}（宽松模式仍返回成功）",
        report.event_name(),
        report.succeeded(),
        report.failed()
    );

    let strict = build_dispatcher(false);
    match strict.dispatch(UserDeleted::new("u-2".to_string())).await {
        Ok(_) => println!("❌ 严格模式应当失败"),
        Err(err) => {
            println!("✅ 严格模式返回错误: {err}");
            for failure in err.failures() {
                println!("   - {failure}");
            }
        }
    }

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = dispatcher
        .dispatch_with_cancel(UserDeleted::new("u-3".to_string()), &cancel)
        .await?;
    println!(
        "\n✅ 取消后分发完成：取消 {}，成功 {}",
        report.cancelled(),
        report.succeeded()
    );
    Ok(())
}
