//! 运行记录与结果目录
//!
//! 每次运行写一个 `combined_task_<YYYYmmdd_HHMMSS.mmm>.json`；目录不存在时自动创建，已有文件不会被覆盖。

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::core::TaskweaveError;
use crate::sampling::SamplingMode;
use crate::scenario::ValidationResult;

/// 一次运行的最终记录：策略名 + 所选子领域 + 校验结果（平铺）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub mode: SamplingMode,
    /// 跨子领域策略不输出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(flatten)]
    pub result: ValidationResult,
}

impl RunRecord {
    pub fn to_json_pretty(&self) -> Result<String, TaskweaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 结果目录
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 写入记录，返回文件路径
    pub fn save(&self, record: &RunRecord) -> Result<PathBuf, TaskweaveError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| TaskweaveError::Output {
            path: self.dir.clone(),
            source,
        })?;

        let json = record.to_json_pretty()?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S%.3f").to_string();

        // 同名文件已存在时追加序号，不覆盖已有结果
        let mut attempt = 0usize;
        let (path, mut file) = loop {
            let name = match attempt {
                0 => format!("combined_task_{timestamp}.json"),
                n => format!("combined_task_{timestamp}_{n}.json"),
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => return Err(TaskweaveError::Output { path, source }),
            }
        };

        file.write_all(json.as_bytes())
            .map_err(|source| TaskweaveError::Output {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Saved to {:?}", path);
        Ok(path)
    }
}
