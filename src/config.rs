//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TASKWEAVE__*` 覆盖（双下划线表示嵌套，如 `TASKWEAVE__SAMPLING__MODE=diff_subdomain_diff_website`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::sampling::SamplingMode;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataSection,
    pub sampling: SamplingSection,
    pub llm: LlmSection,
    pub prompt: PromptSection,
}

/// [data] 段：任务文件与结果目录
#[derive(Debug, Clone, Deserialize)]
pub struct DataSection {
    #[serde(default = "default_task_file")]
    pub task_file: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            task_file: default_task_file(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_task_file() -> PathBuf {
    PathBuf::from("data/tasks.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output/combined_task")
}

/// [sampling] 段：策略、单网站最少任务数、随机种子
#[derive(Debug, Clone, Deserialize)]
pub struct SamplingSection {
    #[serde(default = "default_mode")]
    pub mode: SamplingMode,
    #[serde(default = "default_min_tasks_in_website")]
    pub min_tasks_in_website: usize,
    /// 设置后抽样可复现
    pub seed: Option<u64>,
}

impl Default for SamplingSection {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            min_tasks_in_website: default_min_tasks_in_website(),
            seed: None,
        }
    }
}

fn default_mode() -> SamplingMode {
    SamplingMode::SameSubdomainDiffWebsite
}

fn default_min_tasks_in_website() -> usize {
    2
}

/// [llm] 段：后端选择；provider 为 openai / deepseek / mock
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// 未设置时读取 OPENAI_API_KEY / DEEPSEEK_API_KEY
    pub api_key: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            api_key: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-5-mini".to_string()
}

/// [prompt] 段：可选的 system 指令覆盖文件
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PromptSection {
    pub system_prompt_file: Option<PathBuf>,
}

/// 从 config 目录加载配置，环境变量 TASKWEAVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path，则追加该文件（可覆盖前面的键；文件不存在时返回错误）
/// 3. 最后叠加环境变量 TASKWEAVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    // 显式指定的配置文件必须存在，否则报错而不是静默回退到默认值
    if let Some(ref path) = config_path {
        builder = builder.add_source(config::File::from(path.clone()).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TASKWEAVE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

/// 命令行覆盖项：在文件与环境变量之后最后生效
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mode: Option<SamplingMode>,
    pub task_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub model: Option<String>,
}

impl AppConfig {
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(mode) = overrides.mode {
            self.sampling.mode = mode;
        }
        if let Some(task_file) = overrides.task_file {
            self.data.task_file = task_file;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.data.output_dir = output_dir;
        }
        if overrides.seed.is_some() {
            self.sampling.seed = overrides.seed;
        }
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.sampling.mode, SamplingMode::SameSubdomainDiffWebsite);
        assert_eq!(cfg.sampling.min_tasks_in_website, 2);
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.model, "gpt-5-mini");
        assert!(cfg.prompt.system_prompt_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
[sampling]
mode = "diff_subdomain_diff_website"
seed = 7

[llm]
provider = "mock"
"#,
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.sampling.mode, SamplingMode::DiffSubdomainDiffWebsite);
        assert_eq!(cfg.sampling.seed, Some(7));
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.llm.model, "gpt-5-mini");
    }

    #[test]
    fn test_unknown_mode_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[sampling]\nmode = \"same_planet\"\n").unwrap();
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("absent.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_layer_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "[sampling]\nmin_tasks_in_website = 3\n").unwrap();

        std::env::set_var("TASKWEAVE__SAMPLING__MIN_TASKS_IN_WEBSITE", "5");
        let loaded = load_config(Some(path));
        std::env::remove_var("TASKWEAVE__SAMPLING__MIN_TASKS_IN_WEBSITE");

        assert_eq!(loaded.unwrap().sampling.min_tasks_in_website, 5);
    }

    #[test]
    fn test_cli_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            r#"
[sampling]
mode = "same_subdomain_same_website"
seed = 1

[llm]
model = "gpt-4o-mini"
"#,
        )
        .unwrap();

        let mut cfg = load_config(Some(path)).unwrap();
        cfg.apply_overrides(ConfigOverrides {
            mode: Some(SamplingMode::DiffSubdomainDiffWebsite),
            task_file: Some(PathBuf::from("tasks.json")),
            seed: Some(9),
            ..ConfigOverrides::default()
        });

        assert_eq!(cfg.sampling.mode, SamplingMode::DiffSubdomainDiffWebsite);
        assert_eq!(cfg.sampling.seed, Some(9));
        assert_eq!(cfg.data.task_file, PathBuf::from("tasks.json"));
        // 未覆盖的键保持文件中的值
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.data.output_dir, PathBuf::from("output/combined_task"));
    }
}
