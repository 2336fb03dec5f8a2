use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{IntegrationError, Result};
use crate::message::Message;

use super::selector::{AcceptAll, MessageSelector};

/// 路由规则：一个选择器对应一组目标通道
///
/// 通道组不允许为空，构造时校验。
#[derive(Clone)]
pub struct Recipient {
    selector: Arc<dyn MessageSelector>,
    channels: Vec<String>,
}

impl Recipient {
    pub fn new(selector: Arc<dyn MessageSelector>, channels: Vec<String>) -> Result<Self> {
        if channels.is_empty() {
            return Err(IntegrationError::configuration(
                "recipient channel group must not be empty",
            ));
        }
        Ok(Self { selector, channels })
    }

    /// 恒真规则，消息无条件发往整组通道
    pub fn broadcast(channels: Vec<String>) -> Result<Self> {
        Self::new(Arc::new(AcceptAll), channels)
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn accepts(&self, message: &Message) -> bool {
        self.selector.accept(message)
    }
}

/// 收件人列表路由器
///
/// 路由调用读取规则集的一致快照；整组规则可在运行期原子替换，
/// 并发读者要么看到旧集合要么看到新集合，绝不会看到混合视图。
pub struct RecipientListRouter {
    recipients: RwLock<Arc<Vec<Recipient>>>,
}

impl RecipientListRouter {
    /// 静态通道列表模式：所有消息都发往给定通道
    pub fn with_channels(channels: Vec<String>) -> Result<Self> {
        if channels.is_empty() {
            return Err(IntegrationError::configuration(
                "channel list must not be empty",
            ));
        }
        Self::with_recipients(vec![Recipient::broadcast(channels)?])
    }

    /// 显式规则模式：调用方提供有序的 (选择器, 通道组) 列表
    pub fn with_recipients(recipients: Vec<Recipient>) -> Result<Self> {
        Self::validate(&recipients)?;
        Ok(Self {
            recipients: RwLock::new(Arc::new(recipients)),
        })
    }

    pub fn component_type(&self) -> &'static str {
        "recipient-list-router"
    }

    /// 计算一条消息的目标通道集合（命中规则的通道组取并集）
    ///
    /// 无规则命中时返回空集，是否视为错误由调度运行时决定。
    pub async fn route(&self, message: &Message) -> HashSet<String> {
        let snapshot = self.snapshot().await;
        let mut targets = HashSet::new();
        for recipient in snapshot.iter() {
            if recipient.accepts(message) {
                targets.extend(recipient.channels().iter().cloned());
            }
        }
        if targets.is_empty() {
            debug!(message_id = %message.id, "no recipient matched, empty route");
        }
        targets
    }

    /// 原子替换整组规则（热更新）
    pub async fn replace_recipients(&self, recipients: Vec<Recipient>) -> Result<()> {
        Self::validate(&recipients)?;
        let next = Arc::new(recipients);
        let mut guard = self.recipients.write().await;
        *guard = next;
        Ok(())
    }

    pub async fn recipient_count(&self) -> usize {
        self.snapshot().await.len()
    }

    async fn snapshot(&self) -> Arc<Vec<Recipient>> {
        // 克隆 Arc 后立即释放读锁，规则评估不持锁
        let guard = self.recipients.read().await;
        Arc::clone(&guard)
    }

    fn validate(recipients: &[Recipient]) -> Result<()> {
        if recipients.is_empty() {
            return Err(IntegrationError::configuration(
                "a non-empty recipient list is required",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::router::selector::{HeaderSelector, MatchRule};

    use super::*;

    fn channels<const N: usize>(names: [&str; N]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn header_recipient<const N: usize>(value: &str, targets: [&str; N]) -> Recipient {
        Recipient::new(
            Arc::new(HeaderSelector::new("message_type", MatchRule::of([value]))),
            channels(targets),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn static_channel_list_routes_every_message() {
        let router = RecipientListRouter::with_channels(channels(["x", "y", "z"])).unwrap();

        let targets = router.route(&Message::new(Vec::new())).await;

        assert_eq!(
            targets,
            channels(["x", "y", "z"]).into_iter().collect::<HashSet<_>>()
        );
        assert_eq!(router.component_type(), "recipient-list-router");
    }

    #[tokio::test]
    async fn overlapping_groups_union_without_duplicates() {
        let router = RecipientListRouter::with_recipients(vec![
            header_recipient("order", ["a", "b"]),
            header_recipient("order", ["b", "c"]),
            header_recipient("chat", ["d"]),
        ])
        .unwrap();

        let message = Message::new(Vec::new()).with_header("message_type", "order");
        let targets = router.route(&message).await;

        assert_eq!(
            targets,
            channels(["a", "b", "c"]).into_iter().collect::<HashSet<_>>()
        );
    }

    #[tokio::test]
    async fn no_matching_rule_yields_an_empty_set() {
        let router =
            RecipientListRouter::with_recipients(vec![header_recipient("order", ["a"])]).unwrap();

        let message = Message::new(Vec::new()).with_header("message_type", "chat");
        assert!(router.route(&message).await.is_empty());
    }

    #[test]
    fn empty_configuration_is_rejected_at_construction() {
        assert!(matches!(
            RecipientListRouter::with_channels(Vec::new()),
            Err(IntegrationError::Configuration(_))
        ));
        assert!(matches!(
            RecipientListRouter::with_recipients(Vec::new()),
            Err(IntegrationError::Configuration(_))
        ));
        assert!(matches!(
            Recipient::broadcast(Vec::new()),
            Err(IntegrationError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn hot_replacement_rejects_an_empty_rule_set() {
        let router = RecipientListRouter::with_channels(channels(["x"])).unwrap();
        let err = router.replace_recipients(Vec::new()).await.unwrap_err();

        assert!(matches!(err, IntegrationError::Configuration(_)));
        // 旧规则集保持生效
        assert_eq!(router.recipient_count().await, 1);
    }

    #[tokio::test]
    async fn concurrent_replacement_never_mixes_snapshots() {
        let old_set: HashSet<String> = channels(["old-1", "old-2"]).into_iter().collect();
        let new_set: HashSet<String> = channels(["new-1", "new-2"]).into_iter().collect();

        let router = Arc::new(
            RecipientListRouter::with_channels(channels(["old-1", "old-2"])).unwrap(),
        );

        let swapper = {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                for round in 0..200 {
                    let targets = if round % 2 == 0 {
                        channels(["new-1", "new-2"])
                    } else {
                        channels(["old-1", "old-2"])
                    };
                    router
                        .replace_recipients(vec![Recipient::broadcast(targets).unwrap()])
                        .await
                        .unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..4 {
            let router = Arc::clone(&router);
            let old_set = old_set.clone();
            let new_set = new_set.clone();
            readers.push(tokio::spawn(async move {
                let message = Message::new(Vec::new());
                for _ in 0..200 {
                    let targets = router.route(&message).await;
                    assert!(
                        targets == old_set || targets == new_set,
                        "route mixed two rule sets: {targets:?}"
                    );
                    tokio::task::yield_now().await;
                }
            }));
        }

        swapper.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
