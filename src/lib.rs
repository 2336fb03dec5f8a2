//! Ember Integration Core 公共库
//!
//! 消息集成层的两个独立组件：
//! - `advice`：消息处理调用的拦截与环绕增强（重试/超时/计时等横切能力）
//! - `router`：基于选择器的收件人列表路由（一条消息扇出到多个通道）
//!
//! 传输、通道实现与调度运行时由外部提供，本库只负责调用分类与路由决策。

pub mod advice;
pub mod config;
pub mod error;
pub mod message;
pub mod router;

pub use advice::{
    AdvisedEndpoint, EndpointCall, Execution, HandlerAdvice, MessageEndpoint, RetryAdvice,
    TimeoutAdvice, TimingAdvice,
};
pub use config::{
    AdviceDefinition, IntegrationConfig, IntegrationConfigLoader, RecipientDefinition,
    RouterDefinition, SelectorConfig,
};
pub use error::{IntegrationError, Result};
pub use message::Message;
pub use router::{
    AcceptAll, HeaderSelector, MatchRule, MessageSelector, Recipient, RecipientListRouter,
};
