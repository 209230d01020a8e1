//! 事件分发子系统（eventing）
//!
//! 提供进程内事件发布/订阅的协议与运行时：
//! - `EventListener`：按事件类型声明处理能力的监听器；
//! - `ListenerRegistry`：事件类型到监听器类型的并发注册表；
//! - `ListenerResolver`：按监听器类型解析实例的外部协作者（`ListenerContainer` 为内存实现）；
//! - `ListenerDiscovery`：按范围枚举可注册监听器的外部协作者（`ListenerCatalog` 为显式清单）；
//! - `EventDispatcher`：解析监听器、并发执行、按失败策略汇总并返回 `DispatchReport`。
//!
pub mod discovery;
pub mod dispatcher;
pub mod listener;
pub mod options;
pub mod registry;
pub mod report;
pub mod resolver;

pub use discovery::{DiscoveryScope, ListenerCatalog, ListenerDiscovery};
pub use dispatcher::{Dispatchable, EventDispatcher};
pub use listener::{EventListener, ListenerDescriptor};
pub use options::EventOptions;
pub use registry::ListenerRegistry;
pub use report::{DispatchReport, ListenerOutcome, ListenerReport};
pub use resolver::{ListenerContainer, ListenerInstance, ListenerResolver};
pub use tokio_util::sync::CancellationToken;
