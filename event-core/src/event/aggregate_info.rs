use serde::{Deserialize, Serialize};

/// 领域事件关联的聚合根信息（事件发生后的聚合版本）
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateInfo {
    aggregate_id: String,
    aggregate_type: String,
    aggregate_version: usize,
}

impl AggregateInfo {
    pub fn new(aggregate_type: impl Into<String>) -> Self {
        Self {
            aggregate_type: aggregate_type.into(),
            ..Default::default()
        }
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn aggregate_version(&self) -> usize {
        self.aggregate_version
    }

    pub fn set_aggregate_id(&mut self, aggregate_id: impl Into<String>) {
        self.aggregate_id = aggregate_id.into();
    }

    pub fn set_aggregate_type(&mut self, aggregate_type: impl Into<String>) {
        self.aggregate_type = aggregate_type.into();
    }

    pub fn set_aggregate_version(&mut self, aggregate_version: usize) {
        self.aggregate_version = aggregate_version;
    }
}
