//! 运行错误类型
//!
//! 输入错误、模型回复解码错误、模型调用与持久化错误均为致命错误，直接向上传播；
//! 策略约束不满足不是错误，由 Validator 降级为 PASS 结果。

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::LlmError;

/// 单次运行中可能出现的致命错误
#[derive(Error, Debug)]
pub enum TaskweaveError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Task file {path:?} is not a JSON array: {source}")]
    TaskFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 第 index 条记录缺少必需字段或字段类型不对
    #[error("Invalid task record at index {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("No (subdomain, website) pair has at least {min_tasks} tasks")]
    InsufficientData { min_tasks: usize },

    #[error("Task index is empty")]
    EmptyIndex,

    #[error("Nothing to choose from: {0}")]
    EmptyChoice(String),

    #[error("Unknown sampling mode: {0}")]
    UnknownMode(String),

    /// 回复既不是字面量 PASS，也不是含三个必需键的 JSON 对象
    #[error("Model reply is neither PASS nor a valid scenario object: {source}; raw reply: {raw}")]
    ReplyDecode {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to write result to {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}
