//! Taskweave - 组合式 Web Agent 基准场景生成
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与主控流程（索引 → 抽样 → Prompt → 模型 → 校验 → 持久化）
//! - **dataset**: 任务记录加载、subdomain → website → tasks 两级索引
//! - **sampling**: 三种候选抽样策略与反查表
//! - **scenario**: Prompt 组装、模型回复解码与按策略校验
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **output**: 运行记录与结果目录

pub mod config;
pub mod core;
pub mod dataset;
pub mod llm;
pub mod output;
pub mod sampling;
pub mod scenario;

pub use crate::core::{TaskweaveError, RunSettings, ScenarioPipeline};
pub use sampling::SamplingMode;
