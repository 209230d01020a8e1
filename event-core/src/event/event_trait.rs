use chrono::{DateTime, Utc};

use super::metadata::{EventId, EventMetadata};

/// 可分发事件需要满足的能力边界
///
/// 路由以事件的静态类型为键，`event_name` 仅用于日志与追踪。
/// 通常通过 `#[event]` / `#[domain_event]` 宏实现，而非手写。
pub trait Event: Send + Sync + 'static {
    /// 事件载荷的 schema 版本（用于前后向兼容）
    const SCHEMA_VERSION: &'static str = "1.0";

    /// 事件来源（服务/限界上下文名）；为 `None` 时使用进程标识
    const SOURCE: Option<&'static str> = None;

    /// 构造时生成的元数据
    fn metadata(&self) -> &EventMetadata;

    fn event_id(&self) -> EventId {
        self.metadata().id()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        *self.metadata().occurred_at()
    }

    fn event_name(&self) -> &str {
        self.metadata().name()
    }

    fn schema_version(&self) -> &str {
        self.metadata().schema_version()
    }

    fn source(&self) -> &str {
        self.metadata().source()
    }
}
