//! 事件分发统一错误定义
//!
//! 只有两类错误会返回给调用方：前置条件违例（立即失败）与严格模式下的分发失败。
//! 监听器不可用、以及宽松模式下的监听器执行失败，只记录在 `DispatchReport` 中。
//!
use crate::event::EventId;
use crate::type_key::TypeKey;
use std::fmt;
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventError {
    #[error("precondition violated: {reason}")]
    Precondition { reason: String },

    #[error(
        "dispatch failed: event={event_name}, id={event_id}, failed_listeners={}",
        .failures.len()
    )]
    DispatchFailed {
        event_name: String,
        event_id: EventId,
        failures: Vec<ListenerFailure>,
    },
}

impl EventError {
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition {
            reason: reason.into(),
        }
    }

    /// 严格模式下失败的监听器（其他错误返回空切片）
    pub fn failures(&self) -> &[ListenerFailure] {
        match self {
            Self::DispatchFailed { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// 统一 Result 类型别名
pub type EventResult<T> = Result<T, EventError>;

/// 单个监听器的失败记录，保留原始错误
#[derive(Debug)]
pub struct ListenerFailure {
    listener: TypeKey,
    cancelled: bool,
    error: anyhow::Error,
}

impl ListenerFailure {
    pub(crate) fn new(listener: TypeKey, cancelled: bool, error: anyhow::Error) -> Self {
        Self {
            listener,
            cancelled,
            error,
        }
    }

    pub fn listener(&self) -> TypeKey {
        self.listener
    }

    /// 失败发生时取消信号已触发
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    pub fn into_error(self) -> anyhow::Error {
        self.error
    }
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.cancelled { "cancelled" } else { "failed" };
        write!(f, "listener {} {state}: {:#}", self.listener, self.error)
    }
}

impl std::error::Error for ListenerFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.error)
    }
}
