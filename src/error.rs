//! Ember Integration Core 错误工具模块
//!
//! - 区分配置错误、增强逻辑自身的错误与被包裹处理器的原始错误
//! - 处理器错误透传，跨越 advice 边界时不做二次包装

use std::time::Duration;

/// 集成层错误类型
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// 配置错误（启动期致命，组件拒绝进入工作状态）
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 增强逻辑施加的超时
    #[error("handler call timed out after {0:?}")]
    Timeout(Duration),

    /// 增强逻辑自身失败（区别于被包裹调用的失败）
    #[error("advice '{advice}' failed: {source}")]
    Advice {
        advice: String,
        #[source]
        source: anyhow::Error,
    },

    /// 被包裹的处理器调用失败，原样向外传播
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, IntegrationError>;

impl IntegrationError {
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        IntegrationError::Configuration(message.into())
    }

    pub fn advice<T: Into<String>, E: Into<anyhow::Error>>(advice: T, source: E) -> Self {
        IntegrationError::Advice {
            advice: advice.into(),
            source: source.into(),
        }
    }

    pub fn is_handler_failure(&self) -> bool {
        matches!(self, IntegrationError::Handler(_))
    }
}
