//! 任务记录与任务文件加载
//!
//! 任务文件为 JSON 数组，每个对象至少含 `sub_domain`、`website`、`confirmed_task` 三个字符串字段，
//! 其余字段忽略。逐条解码，出错时报告数组下标。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::TaskweaveError;

/// 一条原子任务（不可变输入）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(rename = "sub_domain")]
    pub subdomain: String,
    pub website: String,
    #[serde(rename = "confirmed_task")]
    pub task: String,
}

impl TaskRecord {
    pub fn new(
        subdomain: impl Into<String>,
        website: impl Into<String>,
        task: impl Into<String>,
    ) -> Self {
        Self {
            subdomain: subdomain.into(),
            website: website.into(),
            task: task.into(),
        }
    }
}

/// 读取并解码任务文件
pub fn load_records(path: &Path) -> Result<Vec<TaskRecord>, TaskweaveError> {
    let data = std::fs::read_to_string(path).map_err(|source| TaskweaveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = decode_records(&data, path)?;
    tracing::info!("Loaded {} task records from {:?}", records.len(), path);
    Ok(records)
}

/// 从内存中的 JSON 文本解码任务记录（不经过文件）
pub fn parse_records(json: &str) -> Result<Vec<TaskRecord>, TaskweaveError> {
    decode_records(json, Path::new("<memory>"))
}

/// 任一记录缺字段或类型不对即整体失败
fn decode_records(json: &str, origin: &Path) -> Result<Vec<TaskRecord>, TaskweaveError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|source| TaskweaveError::TaskFile {
            path: origin.to_path_buf(),
            source,
        })?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value)
                .map_err(|source| TaskweaveError::InvalidRecord { index, source })
        })
        .collect()
}
