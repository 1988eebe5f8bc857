//! 主控流程：索引 → 抽样 → 组装 Prompt → 调用模型 → 校验 → 持久化
//!
//! 单线程、顺序执行，唯一的挂起点是一次模型调用（无重试）。
//! 编排器不读取任何环境配置，所需参数由调用方通过 RunSettings 显式传入。

use std::path::PathBuf;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::LlmSection;
use crate::core::TaskweaveError;
use crate::dataset::{TaskIndex, TaskRecord};
use crate::llm::{create_deepseek_client, LlmClient, LlmError, MockLlmClient, OpenAiClient};
use crate::output::{ResultStore, RunRecord};
use crate::sampling::{CandidateSet, SamplingMode, SamplingOptions};
use crate::scenario::{validate_raw, ComposedPrompt, PromptComposer};

/// 按配置创建 LLM 客户端；API Key 优先取配置，其次环境变量
pub fn create_llm_from_config(cfg: &LlmSection) -> Result<Arc<dyn LlmClient>, LlmError> {
    let env_key = |name: &str| std::env::var(name).ok().filter(|k| !k.is_empty());

    match cfg.provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = cfg
                .api_key
                .clone()
                .or_else(|| env_key("OPENAI_API_KEY"))
                .ok_or(LlmError::MissingApiKey("OPENAI_API_KEY"))?;
            tracing::info!("Using OpenAI LLM ({})", cfg.model);
            Ok(Arc::new(OpenAiClient::new(
                cfg.base_url.as_deref(),
                &cfg.model,
                &api_key,
            )))
        }
        "deepseek" => {
            let api_key = cfg
                .api_key
                .clone()
                .or_else(|| env_key("DEEPSEEK_API_KEY"))
                .or_else(|| env_key("OPENAI_API_KEY"))
                .ok_or(LlmError::MissingApiKey("DEEPSEEK_API_KEY"))?;
            let model = Some(cfg.model.as_str()).filter(|m| m.starts_with("deepseek"));
            let client = create_deepseek_client(model, &api_key);
            tracing::info!("Using DeepSeek LLM ({})", client.model());
            Ok(Arc::new(client))
        }
        "mock" => {
            tracing::warn!("Using Mock LLM, every reply is PASS");
            Ok(Arc::new(MockLlmClient::default()))
        }
        other => Err(LlmError::UnknownProvider(other.to_string())),
    }
}

/// 单次运行参数
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: SamplingMode,
    pub sampling: SamplingOptions,
    /// 设置后抽样可复现
    pub seed: Option<u64>,
}

impl RunSettings {
    pub fn new(mode: SamplingMode) -> Self {
        Self {
            mode,
            sampling: SamplingOptions::default(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_min_tasks_in_website(mut self, min_tasks: usize) -> Self {
        self.sampling.min_tasks_in_website = min_tasks;
        self
    }
}

/// 抽样 + 组装结果（模型调用前的全部输入）
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub candidates: CandidateSet,
    pub prompt: ComposedPrompt,
}

/// 场景生成流水线：持有 LLM、Prompt 组装器与运行参数
pub struct ScenarioPipeline {
    llm: Arc<dyn LlmClient>,
    composer: PromptComposer,
    settings: RunSettings,
}

impl ScenarioPipeline {
    pub fn new(llm: Arc<dyn LlmClient>, settings: RunSettings) -> Self {
        Self {
            llm,
            composer: PromptComposer::default(),
            settings,
        }
    }

    /// 替换默认 system 指令
    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    /// 建索引、抽样并组装 Prompt（不调用模型）
    pub fn prepare(&self, records: &[TaskRecord]) -> Result<PreparedRun, TaskweaveError> {
        let index = TaskIndex::build(records);
        let mut rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let candidates = self
            .settings
            .mode
            .sample(&index, &self.settings.sampling, &mut rng)?;
        let prompt = self.composer.compose(&candidates.blocks);

        Ok(PreparedRun { candidates, prompt })
    }

    /// 完整跑一次：返回最终记录（不落盘）
    #[tracing::instrument(skip_all, fields(mode = %self.settings.mode))]
    pub async fn run(&self, records: &[TaskRecord]) -> Result<RunRecord, TaskweaveError> {
        let PreparedRun { candidates, prompt } = self.prepare(records)?;

        let raw = self.llm.complete(&prompt.messages()).await?;
        tracing::info!("Model replied with {} chars", raw.len());

        let result = validate_raw(&raw, candidates.mode, &candidates.lookup)?;
        tracing::info!(
            status = result.status(),
            reason = result.reason().unwrap_or("-"),
            "Reply validated"
        );

        Ok(RunRecord {
            mode: candidates.mode,
            subdomain: candidates.selected_subdomain,
            result,
        })
    }

    /// 跑一次并把记录交给结果目录
    pub async fn run_and_save(
        &self,
        records: &[TaskRecord],
        store: &ResultStore,
    ) -> Result<(RunRecord, PathBuf), TaskweaveError> {
        let record = self.run(records).await?;
        let path = store.save(&record)?;
        Ok((record, path))
    }
}
