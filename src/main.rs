//! Taskweave 命令行入口
//!
//! 初始化日志（stderr）、加载配置与任务文件，跑一次流水线，把最终记录打印到 stdout 并落盘。

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use taskweave::{
    config::{load_config, ConfigOverrides},
    core::create_llm_from_config,
    dataset::load_records,
    llm::MockLlmClient,
    output::ResultStore,
    scenario::PromptComposer,
    RunSettings, SamplingMode, ScenarioPipeline,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 从原子任务合成组合式基准场景
#[derive(Parser)]
#[command(name = "taskweave", author, version, about)]
struct Cli {
    /// 额外的配置文件（覆盖 config/default.toml）
    #[arg(long, env = "TASKWEAVE_CONFIG")]
    config: Option<PathBuf>,

    /// 抽样策略：same_subdomain_same_website / same_subdomain_diff_website / diff_subdomain_diff_website
    #[arg(long)]
    mode: Option<String>,

    /// 任务文件（JSON 数组）
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// 结果目录
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// 随机种子
    #[arg(long)]
    seed: Option<u64>,

    /// 模型名
    #[arg(long)]
    model: Option<String>,

    /// 只打印 Prompt，不调用模型也不落盘
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖；写 stderr，stdout 只留最终记录
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mode = cli
        .mode
        .as_deref()
        .map(|mode| {
            mode.parse::<SamplingMode>()
                .with_context(|| format!("Invalid --mode {mode}"))
        })
        .transpose()?;

    let mut cfg = load_config(cli.config.clone()).context("Failed to load config")?;
    cfg.apply_overrides(ConfigOverrides {
        mode,
        task_file: cli.tasks,
        output_dir: cli.output_dir,
        seed: cli.seed,
        model: cli.model,
    });

    let records = load_records(&cfg.data.task_file).context("Failed to load task file")?;

    let composer = match &cfg.prompt.system_prompt_file {
        Some(path) => PromptComposer::new(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read system prompt {path:?}"))?,
        ),
        None => PromptComposer::default(),
    };

    let settings = RunSettings::new(cfg.sampling.mode)
        .with_seed(cfg.sampling.seed)
        .with_min_tasks_in_website(cfg.sampling.min_tasks_in_website);

    if cli.dry_run {
        let pipeline = ScenarioPipeline::new(std::sync::Arc::new(MockLlmClient::default()), settings)
            .with_composer(composer);
        let prepared = pipeline.prepare(&records).context("Failed to sample candidates")?;
        println!("=== system ===\n{}\n", prepared.prompt.system);
        println!("=== user ===\n{}", prepared.prompt.user);
        return Ok(());
    }

    let llm = create_llm_from_config(&cfg.llm).context("Failed to create LLM client")?;
    let pipeline = ScenarioPipeline::new(llm, settings).with_composer(composer);
    let store = ResultStore::new(&cfg.data.output_dir);

    let (record, path) = pipeline
        .run_and_save(&records, &store)
        .await
        .context("Scenario run failed")?;

    println!("{}", record.to_json_pretty()?);
    tracing::debug!("Result file: {}", path.display());

    let (prompt_tokens, completion_tokens, total_tokens) = pipeline.token_usage();
    tracing::info!(
        "Token usage: prompt={} completion={} total={}",
        prompt_tokens,
        completion_tokens,
        total_tokens
    );

    Ok(())
}
