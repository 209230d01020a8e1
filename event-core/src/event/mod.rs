//! 事件模型（Event）与领域事件（Domain Event）
//!
//! 定义可分发事件需要实现的最小接口（`Event`）、构造时即固定的身份/来源元数据
//! （`EventMetadata`），以及领域事件附带的聚合信息（`AggregateInfo`）。

mod aggregate_info;
mod domain_event_trait;
mod event_trait;
mod metadata;

pub use aggregate_info::AggregateInfo;
pub use domain_event_trait::DomainEvent;
pub use event_trait::Event;
pub use metadata::{EventId, EventMetadata, process_identity};
