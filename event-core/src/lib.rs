//! 进程内事件分发核心（event-core）
//!
//! 提供强类型的发布/订阅机制，发布者无需知道谁在消费事件：
//! - 事件模型（`event`）：事件身份与来源元数据、领域事件的聚合信息
//! - 监听器契约（`eventing::EventListener`）：按事件类型声明处理能力
//! - 监听器注册表（`eventing::ListenerRegistry`）：事件类型到监听器类型的并发映射
//! - 分发器（`eventing::EventDispatcher`）：解析监听器、并发执行、按失败策略汇总结果
//!
//! 监听器实例的创建（`ListenerResolver`）与候选实现的发现（`ListenerDiscovery`）
//! 均作为外部协作者以 trait 形式注入，本 crate 仅提供内存版的参考实现。
//!
//! 典型用法：
//! 1. 使用 `#[event]` / `#[domain_event]` 定义事件；
//! 2. 为监听器实现 `EventListener<E>`，并在 `ListenerContainer` 中注册其工厂；
//! 3. 通过 `EventDispatcher::builder()` 构建分发器，`subscribe` 或批量发现注册监听器；
//! 4. 调用 `dispatch` 发布事件，读取 `DispatchReport` 了解每个监听器的执行结果。
//!
pub mod error;
pub mod event;
pub mod eventing;
pub mod type_key;

// 允许在本 crate 内部通过 ::event_core 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::event_core 路径。
extern crate self as event_core;
