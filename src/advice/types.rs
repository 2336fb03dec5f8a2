use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// 消息处理端点
///
/// `handle_message` 是被增强的目标调用；生命周期回调带默认实现，
/// 不参与增强链。
#[async_trait]
pub trait MessageEndpoint: Send + Sync {
    /// 处理一条消息，返回应答消息（可能为空）
    async fn handle_message(&self, message: &Message) -> Result<Option<Message>>;

    async fn on_start(&self) -> Result<()> {
        Ok(())
    }

    async fn on_stop(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T> MessageEndpoint for Arc<T>
where
    T: MessageEndpoint + ?Sized,
{
    async fn handle_message(&self, message: &Message) -> Result<Option<Message>> {
        (**self).handle_message(message).await
    }

    async fn on_start(&self) -> Result<()> {
        (**self).on_start().await
    }

    async fn on_stop(&self) -> Result<()> {
        (**self).on_stop().await
    }
}

/// 被拦截的调用，由调度运行时构造
///
/// 用标签区分消息处理调用与其他调用，增强层不做名称/参数形状嗅探。
#[derive(Debug, Clone)]
pub enum EndpointCall {
    HandleMessage(Message),
    Start,
    Stop,
}

impl EndpointCall {
    pub fn is_message_call(&self) -> bool {
        matches!(self, EndpointCall::HandleMessage(_))
    }
}

/// 环绕增强扩展点
///
/// 实现方通过 `execution.proceed()` 触发真实的处理器调用（或链上的
/// 下一个增强），并拿到其结果。处理器的失败通过 `Result` 原样穿过，
/// 增强自身的失败应使用 [`IntegrationError::Advice`] 加以区分。
///
/// [`IntegrationError::Advice`]: crate::error::IntegrationError::Advice
#[async_trait]
pub trait HandlerAdvice: Send + Sync {
    /// 增强名称，用于日志与错误标注
    fn name(&self) -> &str;

    async fn around(
        &self,
        execution: Execution<'_>,
        target: &dyn MessageEndpoint,
        message: &Message,
    ) -> Result<Option<Message>>;
}

#[async_trait]
impl<T> HandlerAdvice for Arc<T>
where
    T: HandlerAdvice + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn around(
        &self,
        execution: Execution<'_>,
        target: &dyn MessageEndpoint,
        message: &Message,
    ) -> Result<Option<Message>> {
        (**self).around(execution, target, message).await
    }
}

/// 执行句柄：增强链向实现方暴露的唯一继续能力
///
/// `Copy` 语义允许重试类增强多次 `proceed`。
#[derive(Clone, Copy)]
pub struct Execution<'a> {
    target: &'a dyn MessageEndpoint,
    remaining: &'a [Arc<dyn HandlerAdvice>],
    message: &'a Message,
}

impl<'a> Execution<'a> {
    pub(crate) fn new(
        target: &'a dyn MessageEndpoint,
        remaining: &'a [Arc<dyn HandlerAdvice>],
        message: &'a Message,
    ) -> Self {
        Self {
            target,
            remaining,
            message,
        }
    }

    /// 触发链上的下一个增强，链尾则触发真实处理器
    ///
    /// 处理器返回的 `Result` 不经任何包装直接向外传播。
    pub async fn proceed(self) -> Result<Option<Message>> {
        match self.remaining.split_first() {
            None => self.target.handle_message(self.message).await,
            Some((head, rest)) => {
                let next = Execution::new(self.target, rest, self.message);
                head.around(next, self.target, self.message).await
            }
        }
    }
}
