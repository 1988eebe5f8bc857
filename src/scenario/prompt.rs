//! Prompt 组装：固定 system 指令 + 动态子任务清单
//!
//! 候选块的任务按出现顺序展开并去重（首次出现的位置保留），每条渲染为一行 `- task`。

use std::collections::HashSet;

use crate::llm::Message;
use crate::sampling::CandidateBlock;

/// 与抽样策略无关的 system 指令
pub const SYSTEM_PROMPT: &str = "\
You are designing realistic user scenarios for a web agent benchmark.
You will be given several concrete subtasks that a web agent could perform.

Your job is to:
1) Select a subset of 2 to 4 subtasks that a single user would realistically do in ONE sitting.
2) Only select subtasks that are tightly connected.
3) Write a short natural-language 'scenario' that makes the connection obvious.
4) Write a single high-level 'combined_task' that naturally unifies them.

Tight-connection rule (MUST FOLLOW):
- The selected subtasks must share at least TWO of the following anchors:
  (A) same object/entity (e.g., same order, same person/patient, same dog, same recipe menu)
  (B) same user goal/decision (one clear outcome the user wants)
  (C) same time window (e.g., before an appointment, today, this weekend)
  (D) same workflow/transaction chain (e.g., find -> compare -> choose -> verify/submit)
- If you cannot find a subset satisfying the rule, return ONLY the string \"PASS\".

Realism constraints:
- Avoid 'kitchen-sink' stories that bundle unrelated errands.
- Do NOT add new subtasks. Use only the provided ones.

Output constraints:
- You MUST include the exact selected subtasks verbatim in 'selected_subtasks'. Do NOT rewrite them.
- Keep scenario to 2-4 sentences. No long backstory.
- Do NOT repeat the same information across sentences.
- If you return a scenario, return ONLY valid JSON with exactly these keys:
  {\"scenario\": \"...\", \"combined_task\": \"...\", \"selected_subtasks\": [...]}
";

/// 组装好的一对指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

impl ComposedPrompt {
    /// 转为一次请求的消息序列（system + user）
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(self.user.clone()),
        ]
    }
}

/// Prompt 组装器：持有 system 指令（默认 SYSTEM_PROMPT，可由文件覆盖）
#[derive(Debug, Clone)]
pub struct PromptComposer {
    system_prompt: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(SYSTEM_PROMPT)
    }
}

impl PromptComposer {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn compose(&self, blocks: &[CandidateBlock]) -> ComposedPrompt {
        let subtasks = flatten_subtasks(blocks);
        tracing::debug!("Prompt composed with {} subtasks", subtasks.len());

        let listing = subtasks
            .iter()
            .map(|task| format!("- {task}"))
            .collect::<Vec<_>>()
            .join("\n");

        let user = format!(
            "Here are the subtasks:\n\n{listing}\n\n\
             Now produce a realistic 'scenario' and a high-level \
             'combined_task' that naturally includes all of these subtasks."
        );

        ComposedPrompt {
            system: self.system_prompt.clone(),
            user,
        }
    }
}

/// 展开所有候选块的任务，去重并保留首次出现顺序
pub fn flatten_subtasks(blocks: &[CandidateBlock]) -> Vec<&str> {
    let mut seen = HashSet::new();
    blocks
        .iter()
        .flat_map(|block| block.tasks.iter())
        .map(String::as_str)
        .filter(|task| seen.insert(*task))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(website: &str, tasks: &[&str]) -> CandidateBlock {
        CandidateBlock {
            subdomain: None,
            website: website.to_string(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_flatten_dedups_in_first_occurrence_order() {
        let blocks = vec![
            block("a.com", &["t1", "t2"]),
            block("b.com", &["t3", "t1"]),
            block("c.com", &["t2", "t4"]),
        ];
        assert_eq!(flatten_subtasks(&blocks), ["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_user_prompt_lists_each_task_once() {
        let blocks = vec![
            block("a.com", &["find a laptop"]),
            block("b.com", &["find a laptop", "add laptop to cart"]),
        ];
        let prompt = PromptComposer::default().compose(&blocks);

        assert_eq!(prompt.user.matches("- find a laptop\n").count(), 1);
        assert!(prompt
            .user
            .contains("- find a laptop\n- add laptop to cart\n\n"));
        assert!(prompt.user.starts_with("Here are the subtasks:\n\n"));
    }

    #[test]
    fn test_system_prompt_is_policy_independent() {
        let composer = PromptComposer::default();
        let a = composer.compose(&[block("a.com", &["t1", "t2"])]);
        let b = composer.compose(&[block("b.com", &["t3"]), block("c.com", &["t4"])]);
        assert_eq!(a.system, b.system);
        assert_eq!(a.system, SYSTEM_PROMPT);
        assert!(SYSTEM_PROMPT.contains("Tight-connection rule"));
        assert!(SYSTEM_PROMPT.contains("\"PASS\""));
    }

    #[test]
    fn test_custom_system_prompt() {
        let composer = PromptComposer::new("custom");
        assert_eq!(composer.system_prompt(), "custom");
        assert_eq!(PromptComposer::default().system_prompt(), SYSTEM_PROMPT);

        let prompt = composer.compose(&[block("a.com", &["t1"])]);
        assert_eq!(prompt.system, "custom");

        let messages = prompt.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, crate::llm::Role::System);
        assert_eq!(messages[1].content, prompt.user);
    }
}
