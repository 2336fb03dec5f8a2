use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// 消息选择器：决定一条消息是否属于某个路由分组
pub trait MessageSelector: Send + Sync {
    fn accept(&self, message: &Message) -> bool;
}

impl<F> MessageSelector for F
where
    F: Fn(&Message) -> bool + Send + Sync,
{
    fn accept(&self, message: &Message) -> bool {
        self(message)
    }
}

/// 恒真选择器，静态通道列表模式使用
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl MessageSelector for AcceptAll {
    fn accept(&self, _message: &Message) -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchRule {
    Any,
    Exact { values: HashSet<String> },
}

impl Default for MatchRule {
    fn default() -> Self {
        MatchRule::Any
    }
}

impl MatchRule {
    pub fn any() -> Self {
        MatchRule::Any
    }

    pub fn of<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        MatchRule::Exact {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            MatchRule::Any => true,
            MatchRule::Exact { values } => value.map(|val| values.contains(val)).unwrap_or(false),
        }
    }
}

/// 按指定消息头匹配的选择器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderSelector {
    pub header: String,
    #[serde(default)]
    pub rule: MatchRule,
}

impl HeaderSelector {
    pub fn new<T: Into<String>>(header: T, rule: MatchRule) -> Self {
        Self {
            header: header.into(),
            rule,
        }
    }
}

impl MessageSelector for HeaderSelector {
    fn accept(&self, message: &Message) -> bool {
        self.rule.matches(message.header(&self.header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_rule_any_accepts_missing_values() {
        assert!(MatchRule::any().matches(None));
        assert!(MatchRule::any().matches(Some("whatever")));
    }

    #[test]
    fn match_rule_exact_requires_membership() {
        let rule = MatchRule::of(["text", "image"]);
        assert!(rule.matches(Some("text")));
        assert!(!rule.matches(Some("video")));
        assert!(!rule.matches(None));
    }

    #[test]
    fn header_selector_reads_the_configured_header() {
        let selector = HeaderSelector::new("message_type", MatchRule::of(["order"]));
        let order = Message::new(Vec::new()).with_header("message_type", "order");
        let other = Message::new(Vec::new()).with_header("message_type", "chat");

        assert!(selector.accept(&order));
        assert!(!selector.accept(&other));
    }

    #[test]
    fn closures_are_selectors() {
        let selector = |message: &Message| message.payload.is_empty();
        assert!(MessageSelector::accept(&selector, &Message::new(Vec::new())));
        assert!(!MessageSelector::accept(
            &selector,
            &Message::new(b"x".to_vec())
        ));
    }
}
