//! 分发结果（DispatchReport）
//!
//! 记录一次分发中每个监听器的结果（按注册顺序）：成功、执行失败、被取消或不可用。
//!
use crate::error::ListenerFailure;
use crate::event::EventId;
use crate::type_key::TypeKey;
use std::time::Duration;

/// 单个监听器的执行结果
#[derive(Debug)]
pub enum ListenerOutcome {
    Succeeded,
    /// 监听器返回错误或 panic
    Failed(anyhow::Error),
    /// 取消信号触发后监听器返回错误
    Cancelled(anyhow::Error),
    /// 解析器未能提供实现所需能力的实例，监听器未被调用
    Unavailable,
}

impl ListenerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// 计入严格模式失败的结果（执行失败或取消）
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Cancelled(_))
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Failed(err) | Self::Cancelled(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ListenerReport {
    listener: TypeKey,
    outcome: ListenerOutcome,
    elapsed: Duration,
}

impl ListenerReport {
    pub(crate) fn new(listener: TypeKey, outcome: ListenerOutcome, elapsed: Duration) -> Self {
        Self {
            listener,
            outcome,
            elapsed,
        }
    }

    pub fn listener(&self) -> TypeKey {
        self.listener
    }

    pub fn outcome(&self) -> &ListenerOutcome {
        &self.outcome
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn into_failure(self) -> Option<ListenerFailure> {
        match self.outcome {
            ListenerOutcome::Failed(err) => Some(ListenerFailure::new(self.listener, false, err)),
            ListenerOutcome::Cancelled(err) => {
                Some(ListenerFailure::new(self.listener, true, err))
            }
            _ => None,
        }
    }
}

/// 一次分发的汇总结果
#[derive(Debug)]
pub struct DispatchReport {
    event_name: String,
    event_id: EventId,
    listeners: Vec<ListenerReport>,
}

impl DispatchReport {
    pub(crate) fn new(event_name: String, event_id: EventId, listeners: Vec<ListenerReport>) -> Self {
        Self {
            event_name,
            event_id,
            listeners,
        }
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn listeners(&self) -> &[ListenerReport] {
        &self.listeners
    }

    /// 没有任何已注册的监听器
    pub fn is_noop(&self) -> bool {
        self.listeners.is_empty()
    }

    /// 实际被调用的监听器数量（不含不可用）
    pub fn attempted(&self) -> usize {
        self.count(|o| !matches!(o, ListenerOutcome::Unavailable))
    }

    pub fn succeeded(&self) -> usize {
        self.count(ListenerOutcome::is_success)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ListenerOutcome::Failed(_)))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, ListenerOutcome::Cancelled(_)))
    }

    pub fn unavailable(&self) -> usize {
        self.count(|o| matches!(o, ListenerOutcome::Unavailable))
    }

    pub fn has_failures(&self) -> bool {
        self.listeners.iter().any(|r| r.outcome.is_failure())
    }

    pub fn outcome_of(&self, listener: TypeKey) -> Option<&ListenerOutcome> {
        self.listeners
            .iter()
            .find(|r| r.listener == listener)
            .map(|r| &r.outcome)
    }

    pub(crate) fn into_failures(self) -> Vec<ListenerFailure> {
        self.listeners
            .into_iter()
            .filter_map(ListenerReport::into_failure)
            .collect()
    }

    fn count(&self, pred: impl Fn(&ListenerOutcome) -> bool) -> usize {
        self.listeners.iter().filter(|r| pred(&r.outcome)).count()
    }
}
