//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient：一次请求、一次完整回复，无流式、无重试。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::Message;

/// 模型调用错误
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("Failed to build request: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Model returned no content")]
    EmptyResponse,
}

/// LLM 客户端 trait：给定消息序列（system + user），返回一段自由文本
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
