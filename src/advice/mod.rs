//! 消息处理调用的环绕增强模块
//!
//! - 调度运行时把拦截到的调用构造成带标签的 [`EndpointCall`]
//! - 只有消息处理调用会经过增强链，生命周期调用直接透传
//! - 处理器的原始错误跨越增强边界时原样传播，不做包装

mod builtin;
mod chain;
mod types;

pub use builtin::{RetryAdvice, TimeoutAdvice, TimingAdvice};
pub use chain::AdvisedEndpoint;
pub use types::{EndpointCall, Execution, HandlerAdvice, MessageEndpoint};
