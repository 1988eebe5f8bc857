//! 核心编排层：错误类型、主控流程

pub mod error;
pub mod orchestrator;

pub use error::TaskweaveError;
pub use orchestrator::{
    create_llm_from_config, PreparedRun, RunSettings, ScenarioPipeline,
};
