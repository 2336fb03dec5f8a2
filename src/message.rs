use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 消息（不透明载荷 + 头部元数据）
///
/// 路由与增强层只读，载荷内容不做任何解释。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub payload: Vec<u8>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub extra: HashMap<String, JsonValue>,
}

impl Message {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
            headers: HashMap::new(),
            extra: HashMap::new(),
        }
    }

    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_header<T: Into<String>, U: Into<String>>(mut self, key: T, value: U) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_extra<T: Into<String>>(mut self, key: T, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}
