use super::aggregate_info::AggregateInfo;
use super::event_trait::Event;

/// 领域事件：表示一次有业务意义的事实，额外携带聚合根信息
///
/// 聚合信息只能在发布前由构造方修改；`dispatch` 按值接收事件，
/// 分发开始后不再存在可变引用。
pub trait DomainEvent: Event {
    fn aggregate(&self) -> &AggregateInfo;

    fn aggregate_mut(&mut self) -> &mut AggregateInfo;

    fn aggregate_id(&self) -> &str {
        self.aggregate().aggregate_id()
    }

    fn aggregate_type(&self) -> &str {
        self.aggregate().aggregate_type()
    }

    fn aggregate_version(&self) -> usize {
        self.aggregate().aggregate_version()
    }

    /// 链式设置聚合 id 与版本
    fn with_aggregate(mut self, aggregate_id: impl Into<String>, aggregate_version: usize) -> Self
    where
        Self: Sized,
    {
        let info = self.aggregate_mut();
        info.set_aggregate_id(aggregate_id);
        info.set_aggregate_version(aggregate_version);
        self
    }
}
