use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::sync::LazyLock;
use uuid::Uuid;

use super::event_trait::Event;
use crate::type_key::short_type_name;

/// 事件唯一标识
pub type EventId = Uuid;

static PROCESS_IDENTITY: LazyLock<String> = LazyLock::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
});

/// 当前进程的标识（可执行文件名），作为事件来源与发现范围的默认值
pub fn process_identity() -> &'static str {
    PROCESS_IDENTITY.as_str()
}

/// 事件元数据：构造时一次性生成，之后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    id: EventId,
    occurred_at: DateTime<Utc>,
    name: String,
    schema_version: String,
    source: String,
}

impl EventMetadata {
    /// 为事件类型 `E` 生成新的身份：随机 id、当前 UTC 时间、由类型名派生的事件名
    pub fn of<E: Event>() -> Self {
        Self::stamp(short_type_name(type_name::<E>()), E::SCHEMA_VERSION, E::SOURCE)
    }

    fn stamp(name: &str, schema_version: &str, source: Option<&'static str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            name: name.to_string(),
            schema_version: schema_version.to_string(),
            source: source.unwrap_or_else(process_identity).to_string(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}
