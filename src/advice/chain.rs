use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::message::Message;

use super::types::{EndpointCall, Execution, HandlerAdvice, MessageEndpoint};

/// 带增强链的消息处理端点
///
/// 只有 [`EndpointCall::HandleMessage`] 会经过增强链；`Start`/`Stop`
/// 这类调用直接透传给目标，增强链完全不感知。增强链在构造后不可变，
/// 实例可被任意多个调用方并发复用。
pub struct AdvisedEndpoint {
    target: Arc<dyn MessageEndpoint>,
    advices: Vec<Arc<dyn HandlerAdvice>>,
}

impl AdvisedEndpoint {
    pub fn new(target: Arc<dyn MessageEndpoint>) -> Self {
        Self {
            target,
            advices: Vec::new(),
        }
    }

    pub fn with_advices(target: Arc<dyn MessageEndpoint>, advices: Vec<Arc<dyn HandlerAdvice>>) -> Self {
        Self { target, advices }
    }

    pub fn add_advice(mut self, advice: Arc<dyn HandlerAdvice>) -> Self {
        self.advices.push(advice);
        self
    }

    pub fn component_type(&self) -> &'static str {
        "advised-endpoint"
    }

    pub fn advice_count(&self) -> usize {
        self.advices.len()
    }

    /// 分发一次被拦截的调用
    pub async fn invoke(&self, call: EndpointCall) -> Result<Option<Message>> {
        match call {
            EndpointCall::HandleMessage(message) => {
                if self.advices.is_empty() {
                    return self.target.handle_message(&message).await;
                }
                debug!(
                    message_id = %message.id,
                    advices = self.advices.len(),
                    "dispatching message call through advice chain"
                );
                Execution::new(&*self.target, &self.advices, &message)
                    .proceed()
                    .await
            }
            EndpointCall::Start => {
                self.target.on_start().await?;
                Ok(None)
            }
            EndpointCall::Stop => {
                self.target.on_stop().await?;
                Ok(None)
            }
        }
    }
}
