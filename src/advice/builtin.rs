use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{IntegrationError, Result};
use crate::message::Message;

use super::types::{Execution, HandlerAdvice, MessageEndpoint};

/// 重试增强：处理器失败时重新触发，直到成功或尝试次数耗尽
pub struct RetryAdvice {
    max_attempts: u32,
}

impl RetryAdvice {
    /// `max_attempts` 为总尝试次数，至少为 1
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

#[async_trait]
impl HandlerAdvice for RetryAdvice {
    fn name(&self) -> &str {
        "retry"
    }

    async fn around(
        &self,
        execution: Execution<'_>,
        _target: &dyn MessageEndpoint,
        message: &Message,
    ) -> Result<Option<Message>> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match execution.proceed().await {
                Ok(reply) => return Ok(reply),
                Err(err) if attempt < self.max_attempts => {
                    warn!(
                        message_id = %message.id,
                        attempt,
                        max_attempts = self.max_attempts,
                        "handler call failed, retrying: {err}"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// 超时增强：处理器调用超过期限时返回 [`IntegrationError::Timeout`]
pub struct TimeoutAdvice {
    timeout: Duration,
}

impl TimeoutAdvice {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl HandlerAdvice for TimeoutAdvice {
    fn name(&self) -> &str {
        "timeout"
    }

    async fn around(
        &self,
        execution: Execution<'_>,
        _target: &dyn MessageEndpoint,
        message: &Message,
    ) -> Result<Option<Message>> {
        match tokio::time::timeout(self.timeout, execution.proceed()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    message_id = %message.id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "handler call timed out"
                );
                Err(IntegrationError::Timeout(self.timeout))
            }
        }
    }
}

/// 计时增强：记录每次处理器调用的耗时与结果
#[derive(Default)]
pub struct TimingAdvice;

impl TimingAdvice {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HandlerAdvice for TimingAdvice {
    fn name(&self) -> &str {
        "timing"
    }

    async fn around(
        &self,
        execution: Execution<'_>,
        _target: &dyn MessageEndpoint,
        message: &Message,
    ) -> Result<Option<Message>> {
        let started = Instant::now();
        let result = execution.proceed().await;
        debug!(
            message_id = %message.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "handler call finished"
        );
        result
    }
}
