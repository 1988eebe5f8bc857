//! 候选抽样：三种可互换的抽样策略
//!
//! 每种策略读取只读的 TaskIndex，返回同一形状的 CandidateSet：
//! 展示给模型的候选块、task → website（及跨子领域时的 task → subdomain）反查表、
//! 以及用于报告的所选子领域。反查表在抽样时一次性构建，校验阶段只读。

pub mod candidates;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::TaskweaveError;
use crate::dataset::TaskIndex;

/// 抽样策略（名称与结果记录中的 `mode` 字段一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// 单一子领域、单一网站：给出该网站的全部任务
    SameSubdomainSameWebsite,
    /// 单一子领域、多个网站：每个网站各抽一条任务
    SameSubdomainDiffWebsite,
    /// 多个子领域、多个网站：每个子领域抽一个网站、一条任务
    DiffSubdomainDiffWebsite,
}

impl SamplingMode {
    pub const ALL: [SamplingMode; 3] = [
        SamplingMode::SameSubdomainSameWebsite,
        SamplingMode::SameSubdomainDiffWebsite,
        SamplingMode::DiffSubdomainDiffWebsite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SamplingMode::SameSubdomainSameWebsite => "same_subdomain_same_website",
            SamplingMode::SameSubdomainDiffWebsite => "same_subdomain_diff_website",
            SamplingMode::DiffSubdomainDiffWebsite => "diff_subdomain_diff_website",
        }
    }

    /// 按策略抽取候选集
    pub fn sample<R: Rng + ?Sized>(
        self,
        index: &TaskIndex,
        options: &SamplingOptions,
        rng: &mut R,
    ) -> Result<CandidateSet, TaskweaveError> {
        let set = match self {
            SamplingMode::SameSubdomainSameWebsite => {
                candidates::same_subdomain_same_website(index, options.min_tasks_in_website, rng)?
            }
            SamplingMode::SameSubdomainDiffWebsite => {
                candidates::same_subdomain_diff_website(index, rng)?
            }
            SamplingMode::DiffSubdomainDiffWebsite => {
                candidates::diff_subdomain_diff_website(index, rng)?
            }
        };

        tracing::info!(
            mode = self.as_str(),
            blocks = set.blocks.len(),
            subdomain = set.selected_subdomain.as_deref().unwrap_or("-"),
            "Candidates sampled"
        );
        Ok(set)
    }
}

impl fmt::Display for SamplingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SamplingMode {
    type Err = TaskweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| TaskweaveError::UnknownMode(s.to_string()))
    }
}

/// 抽样参数
#[derive(Debug, Clone)]
pub struct SamplingOptions {
    /// 单网站策略中，网站至少需要的任务数
    pub min_tasks_in_website: usize,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            min_tasks_in_website: 2,
        }
    }
}

/// 候选块：一个网站（跨子领域时附带子领域）提供给模型的任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    pub website: String,
    pub tasks: Vec<String>,
}

/// 反查表：由展示给模型的同一批候选块构建
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskLookup {
    pub task_to_website: HashMap<String, String>,
    /// 仅 diff_subdomain_diff_website 策略构建
    pub task_to_subdomain: Option<HashMap<String, String>>,
}

impl TaskLookup {
    pub fn website_of(&self, task: &str) -> Option<&str> {
        self.task_to_website.get(task).map(String::as_str)
    }

    pub fn subdomain_of(&self, task: &str) -> Option<&str> {
        self.task_to_subdomain
            .as_ref()
            .and_then(|map| map.get(task))
            .map(String::as_str)
    }
}

/// 一次抽样的完整结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    pub mode: SamplingMode,
    pub blocks: Vec<CandidateBlock>,
    pub lookup: TaskLookup,
    /// 单一子领域策略下所选子领域（跨子领域策略为 None）
    pub selected_subdomain: Option<String>,
}
