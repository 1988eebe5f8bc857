//! 场景层：Prompt 组装、回复解码、按策略校验

pub mod prompt;
pub mod reply;
pub mod validator;

pub use prompt::{flatten_subtasks, ComposedPrompt, PromptComposer, SYSTEM_PROMPT};
pub use reply::{ModelReply, ScenarioReply, PASS_SENTINEL};
pub use validator::{
    validate, validate_by_name, validate_raw, AcceptedScenario, ValidationResult,
};
