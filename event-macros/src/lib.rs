//! 事件模型过程宏（event-macros）
//!
//! - `#[event]`：为具名字段结构体注入 `metadata` 字段并实现 `Event`
//! - `#[domain_event]`：在 `#[event]` 基础上注入 `aggregate` 字段并实现 `DomainEvent`
//! - `#[event_enum]`：为已知事件类型的标签联合生成 `From` 与按变体分发的 `Dispatchable`
//!
//! 生成代码通过 `::event_core` 路径引用运行时类型。
use proc_macro::TokenStream;

mod event;
mod event_enum;
mod utils;

use event::EventKind;

/// 事件宏
/// - 若缺失则在最前追加字段 `metadata: EventMetadata`
/// - 合并默认派生 `Debug, Clone`
/// - 实现 `::event_core::event::Event`，生成 `new(<其余字段>)`，构造时生成 id/时间/名称
/// - 支持参数：`#[event(version = "2.0", source = "billing")]`
#[proc_macro_attribute]
pub fn event(attr: TokenStream, item: TokenStream) -> TokenStream {
    event::expand(attr, item, EventKind::Plain)
}

/// 领域事件宏
/// - 同 `#[event]`，另追加字段 `aggregate: AggregateInfo` 并实现 `DomainEvent`
/// - 支持参数：`#[domain_event(aggregate_type = "Order", version = "1.0", source = "orders")]`
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    event::expand(attr, item, EventKind::Domain)
}

/// 事件枚举宏：`enum ShopEvent { Placed(OrderPlaced), Shipped(OrderShipped) }`
#[proc_macro_attribute]
pub fn event_enum(attr: TokenStream, item: TokenStream) -> TokenStream {
    event_enum::expand(attr, item)
}
