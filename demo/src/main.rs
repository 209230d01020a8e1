use anyhow::Context;
use async_trait::async_trait;
use event_core::current_scope;
use event_core::event::DomainEvent;
use event_core::eventing::{
    CancellationToken, DiscoveryScope, EventDispatcher, EventListener, EventOptions,
    ListenerCatalog, ListenerContainer,
};
use event_macros::{domain_event, event, event_enum};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[domain_event(aggregate_type = "Account")]
struct Deposited {
    amount: i64,
}

#[domain_event(aggregate_type = "Account")]
struct Withdrawn {
    amount: i64,
}

#[event(source = "fraud-monitor")]
struct LimitExceeded {
    account_id: String,
    attempted: i64,
}

#[event_enum]
enum AccountEvent {
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    LimitExceeded(LimitExceeded),
}

/// 账户余额投影
#[derive(Default)]
struct BalanceProjection {
    balance: AtomicI64,
}

#[async_trait]
impl EventListener<Deposited> for BalanceProjection {
    async fn handle(&self, event: &Deposited, _cancel: &CancellationToken) -> anyhow::Result<()> {
        self.balance.fetch_add(event.amount, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl EventListener<Withdrawn> for BalanceProjection {
    async fn handle(&self, event: &Withdrawn, _cancel: &CancellationToken) -> anyhow::Result<()> {
        self.balance.fetch_sub(event.amount, Ordering::SeqCst);
        Ok(())
    }
}

struct AuditTrail;

#[async_trait]
impl EventListener<Deposited> for AuditTrail {
    async fn handle(&self, event: &Deposited, _cancel: &CancellationToken) -> anyhow::Result<()> {
        info!(
            account = event.aggregate_id(),
            version = event.aggregate_version(),
            amount = event.amount,
            "audit: deposit"
        );
        Ok(())
    }
}

#[async_trait]
impl EventListener<Withdrawn> for AuditTrail {
    async fn handle(&self, event: &Withdrawn, _cancel: &CancellationToken) -> anyhow::Result<()> {
        info!(
            account = event.aggregate_id(),
            version = event.aggregate_version(),
            amount = event.amount,
            "audit: withdrawal"
        );
        Ok(())
    }
}

/// 告警通道不可用，用于演示失败策略
struct PagerAlert;

#[async_trait]
impl EventListener<LimitExceeded> for PagerAlert {
    async fn handle(&self, event: &LimitExceeded, _cancel: &CancellationToken) -> anyhow::Result<()> {
        anyhow::bail!(
            "pager gateway rejected alert for {} ({})",
            event.account_id,
            event.attempted
        )
    }
}

/// 读取可选的 JSON 配置文件（第一个命令行参数），缺省字段使用默认值
fn load_options() -> anyhow::Result<EventOptions> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(EventOptions::builder()
            .scopes_to_scan(vec![current_scope!()])
            .build());
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("read options from {path}"))?;
    let options = serde_json::from_str(&raw).with_context(|| format!("parse options in {path}"))?;
    Ok(options)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = load_options()?;
    info!(?options, "starting demo");

    let projection = Arc::new(BalanceProjection::default());
    let container = Arc::new(ListenerContainer::new());
    container.add_singleton(projection.clone());
    container.add_transient(|| AuditTrail);
    container.add_transient(|| PagerAlert);

    let scope: DiscoveryScope = current_scope!();
    let catalog = ListenerCatalog::new()
        .with_in::<Deposited, BalanceProjection>(scope.clone())
        .with_in::<Withdrawn, BalanceProjection>(scope.clone())
        .with_in::<Deposited, AuditTrail>(scope.clone())
        .with_in::<Withdrawn, AuditTrail>(scope.clone())
        .with_in::<LimitExceeded, PagerAlert>(scope);

    let dispatcher = EventDispatcher::builder()
        .resolver(container)
        .discovery(Arc::new(catalog))
        .options(options)
        .build();

    let events: Vec<AccountEvent> = vec![
        Deposited::new(500).with_aggregate("acc-1", 1).into(),
        Withdrawn::new(120).with_aggregate("acc-1", 2).into(),
        LimitExceeded::new("acc-1".to_string(), 10_000).into(),
    ];

    for event in events {
        let name = event.event_name().to_string();
        match dispatcher.publish(event).await {
            Ok(report) => info!(
                event = %name,
                succeeded = report.succeeded(),
                failed = report.failed(),
                unavailable = report.unavailable(),
                "published"
            ),
            Err(err) => {
                for failure in err.failures() {
                    error!(listener = %failure.listener(), error = %failure.error(), "listener failure");
                }
                error!(event = %name, error = %err, "publish failed");
            }
        }
    }

    info!(
        balance = projection.balance.load(Ordering::SeqCst),
        "final balance"
    );
    Ok(())
}
