//! 收件人列表路由模块
//!
//! - 一条入站消息按选择器规则扇出到多个通道
//! - 规则集为有序的 (选择器, 通道组) 列表，命中结果取并集
//! - 支持整组规则的原子热替换，路由调用始终读取一致快照

mod recipient;
mod selector;

pub use recipient::{Recipient, RecipientListRouter};
pub use selector::{AcceptAll, HeaderSelector, MatchRule, MessageSelector};
