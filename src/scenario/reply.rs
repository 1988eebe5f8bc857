//! 模型回复解码
//!
//! 回复要么是字面量哨兵 `PASS`，要么是含 `scenario`、`combined_task`、`selected_subtasks` 的 JSON 对象。
//! 在解码边界就区分两者，后续校验不再做字符串比较。

use serde::{Deserialize, Serialize};

use crate::core::TaskweaveError;

/// 模型判断无法组合时返回的哨兵
pub const PASS_SENTINEL: &str = "PASS";

/// 模型给出的场景
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReply {
    pub scenario: String,
    pub combined_task: String,
    pub selected_subtasks: Vec<String>,
}

/// 解码后的回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    /// 模型明确放弃
    Pass,
    Scenario(ScenarioReply),
}

impl ModelReply {
    /// 解析原始回复；既不是 PASS 也无法解码为场景对象时返回 ReplyDecode（不降级为 PASS）
    pub fn parse(raw: &str) -> Result<Self, TaskweaveError> {
        let trimmed = raw.trim();
        if trimmed == PASS_SENTINEL {
            return Ok(ModelReply::Pass);
        }

        serde_json::from_str::<ScenarioReply>(strip_code_fence(trimmed))
            .map(ModelReply::Scenario)
            .map_err(|source| TaskweaveError::ReplyDecode {
                raw: raw.to_string(),
                source,
            })
    }
}

/// 去掉 ```json ... ``` 包裹（无包裹时原样返回）
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
