//! Mock LLM 客户端（用于测试与 dry run，无需 API）
//!
//! 固定返回预设回复（默认字面量 PASS），并记录最近一次请求，便于断言 Prompt 内容。

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, Message};

/// Mock 客户端：回放预设回复
#[derive(Debug)]
pub struct MockLlmClient {
    reply: String,
    last_request: Mutex<Option<Vec<Message>>>,
}

impl MockLlmClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            last_request: Mutex::new(None),
        }
    }

    /// 最近一次 complete 收到的消息（尚未调用时为 None）
    pub fn last_request(&self) -> Option<Vec<Message>> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new("PASS")
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(messages.to_vec());
        }
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_reply_is_pass() {
        let client = MockLlmClient::default();
        let reply = client.complete(&[Message::user("hi")]).await.unwrap();
        assert_eq!(reply, "PASS");
    }

    #[tokio::test]
    async fn test_records_last_request() {
        let client = MockLlmClient::new("{}");
        assert!(client.last_request().is_none());

        client
            .complete(&[Message::system("sys"), Message::user("usr")])
            .await
            .unwrap();

        let request = client.last_request().unwrap();
        assert_eq!(request.len(), 2);
        assert_eq!(request[0].content, "sys");
        assert_eq!(request[1].content, "usr");
    }
}
