//! 回复校验：按抽样策略检查模型所选子任务覆盖的网站/子领域数
//!
//! 状态流转：RAW →（非 PASS 时解码）→ PASS / OK。
//! 约束不满足时降级为带 reason 的 PASS；反查表中不存在的子任务直接忽略，不报错。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::TaskweaveError;
use crate::sampling::{SamplingMode, TaskLookup};
use crate::scenario::{ModelReply, ScenarioReply};

pub const REASON_EXPECTED_ONE_WEBSITE: &str = "expected exactly 1 website";
pub const REASON_TOO_FEW_WEBSITES: &str = "selected_subtasks use < 2 websites";
pub const REASON_TOO_FEW_SUBDOMAINS: &str = "selected_subtasks use < 2 subdomains";

/// 通过校验的场景（模型字段原样透传）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedScenario {
    /// 所选子任务解析出的网站集合（排序后）
    pub selected_websites: Vec<String>,
    /// 仅 diff_subdomain_diff_website 策略给出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_subdomains: Option<Vec<String>>,
    pub scenario: String,
    pub combined_task: String,
    pub selected_subtasks: Vec<String>,
}

/// 校验结果：`status` 为 PASS 或 OK
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ValidationResult {
    #[serde(rename = "PASS")]
    Pass {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    #[serde(rename = "OK")]
    Accepted(AcceptedScenario),
}

impl ValidationResult {
    fn rejected(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!("Scenario rejected: {}", reason);
        ValidationResult::Pass {
            reason: Some(reason),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationResult::Accepted(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            ValidationResult::Pass { .. } => "PASS",
            ValidationResult::Accepted(_) => "OK",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationResult::Pass { reason } => reason.as_deref(),
            ValidationResult::Accepted(_) => None,
        }
    }
}

/// 解码原始回复后按策略校验；解码失败为致命错误
pub fn validate_raw(
    raw: &str,
    mode: SamplingMode,
    lookup: &TaskLookup,
) -> Result<ValidationResult, TaskweaveError> {
    let reply = ModelReply::parse(raw)?;
    Ok(validate(reply, mode, lookup))
}

/// 以策略名校验：未知策略名降级为 PASS（reason 为 "unknown mode <name>"）
pub fn validate_by_name(
    raw: &str,
    mode: &str,
    lookup: &TaskLookup,
) -> Result<ValidationResult, TaskweaveError> {
    let reply = ModelReply::parse(raw)?;
    Ok(match mode.parse::<SamplingMode>() {
        Ok(mode) => validate(reply, mode, lookup),
        Err(_) if matches!(reply, ModelReply::Pass) => ValidationResult::Pass { reason: None },
        Err(_) => ValidationResult::rejected(format!("unknown mode {mode}")),
    })
}

/// 按策略校验已解码的回复
pub fn validate(reply: ModelReply, mode: SamplingMode, lookup: &TaskLookup) -> ValidationResult {
    let scenario = match reply {
        ModelReply::Pass => return ValidationResult::Pass { reason: None },
        ModelReply::Scenario(scenario) => scenario,
    };

    let websites = resolve(&scenario.selected_subtasks, |t| lookup.website_of(t));

    match mode {
        SamplingMode::SameSubdomainSameWebsite => {
            if websites.len() != 1 {
                return ValidationResult::rejected(REASON_EXPECTED_ONE_WEBSITE);
            }
            accept(scenario, websites, None)
        }
        SamplingMode::SameSubdomainDiffWebsite => {
            if websites.len() < 2 {
                return ValidationResult::rejected(REASON_TOO_FEW_WEBSITES);
            }
            accept(scenario, websites, None)
        }
        SamplingMode::DiffSubdomainDiffWebsite => {
            let subdomains = resolve(&scenario.selected_subtasks, |t| lookup.subdomain_of(t));
            // 网站数先于子领域数检查
            if websites.len() < 2 {
                return ValidationResult::rejected(REASON_TOO_FEW_WEBSITES);
            }
            if subdomains.len() < 2 {
                return ValidationResult::rejected(REASON_TOO_FEW_SUBDOMAINS);
            }
            accept(scenario, websites, Some(subdomains))
        }
    }
}

/// 经反查表把子任务映射为去重后的集合；查不到的子任务忽略
fn resolve<'a>(
    subtasks: &[String],
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> BTreeSet<&'a str> {
    subtasks
        .iter()
        .filter_map(|task| {
            let resolved = lookup(task.as_str());
            if resolved.is_none() {
                tracing::debug!("Ignoring unresolved subtask: {:?}", task);
            }
            resolved
        })
        .collect()
}

fn accept(
    scenario: ScenarioReply,
    websites: BTreeSet<&str>,
    subdomains: Option<BTreeSet<&str>>,
) -> ValidationResult {
    let to_vec = |set: BTreeSet<&str>| set.into_iter().map(String::from).collect::<Vec<_>>();
    ValidationResult::Accepted(AcceptedScenario {
        selected_websites: to_vec(websites),
        selected_subdomains: subdomains.map(to_vec),
        scenario: scenario.scenario,
        combined_task: scenario.combined_task,
        selected_subtasks: scenario.selected_subtasks,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str, &str)], with_subdomains: bool) -> TaskLookup {
        let task_to_website = pairs
            .iter()
            .map(|(t, w, _)| (t.to_string(), w.to_string()))
            .collect();
        let task_to_subdomain: HashMap<String, String> = pairs
            .iter()
            .map(|(t, _, sd)| (t.to_string(), sd.to_string()))
            .collect();
        TaskLookup {
            task_to_website,
            task_to_subdomain: with_subdomains.then_some(task_to_subdomain),
        }
    }

    fn reply(subtasks: &[&str]) -> String {
        serde_json::json!({
            "scenario": "A user plans a trip.",
            "combined_task": "Plan the trip",
            "selected_subtasks": subtasks,
        })
        .to_string()
    }

    fn table() -> TaskLookup {
        lookup(
            &[
                ("t1", "W1", "travel"),
                ("t2", "W1", "travel"),
                ("t3", "W2", "travel"),
                ("t4", "W3", "shopping"),
            ],
            true,
        )
    }

    #[test]
    fn test_literal_pass_under_every_mode() {
        for mode in SamplingMode::ALL {
            let result = validate_raw("PASS", mode, &table()).unwrap();
            assert_eq!(result, ValidationResult::Pass { reason: None });
            assert_eq!(
                serde_json::to_value(&result).unwrap(),
                serde_json::json!({"status": "PASS"})
            );
        }
    }

    #[test]
    fn test_single_website_threshold() {
        let mode = SamplingMode::SameSubdomainSameWebsite;
        let ok = validate_raw(&reply(&["t1", "t2"]), mode, &table()).unwrap();
        match ok {
            ValidationResult::Accepted(accepted) => {
                assert_eq!(accepted.selected_websites, ["W1"]);
                assert!(accepted.selected_subdomains.is_none());
            }
            other => panic!("Expected OK, got {other:?}"),
        }

        let rejected = validate_raw(&reply(&["t1", "t3"]), mode, &table()).unwrap();
        assert_eq!(rejected.reason(), Some(REASON_EXPECTED_ONE_WEBSITE));

        let none_resolved = validate_raw(&reply(&["ghost"]), mode, &table()).unwrap();
        assert_eq!(none_resolved.reason(), Some(REASON_EXPECTED_ONE_WEBSITE));
    }

    #[test]
    fn test_multi_website_threshold() {
        let mode = SamplingMode::SameSubdomainDiffWebsite;
        let rejected = validate_raw(&reply(&["t1", "t2"]), mode, &table()).unwrap();
        assert_eq!(rejected.status(), "PASS");
        assert_eq!(rejected.reason(), Some(REASON_TOO_FEW_WEBSITES));

        let ok = validate_raw(&reply(&["t3", "t1"]), mode, &table()).unwrap();
        match ok {
            ValidationResult::Accepted(accepted) => {
                assert_eq!(accepted.selected_websites, ["W1", "W2"]);
                assert_eq!(accepted.selected_subtasks, ["t3", "t1"]);
            }
            other => panic!("Expected OK, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_subdomain_thresholds() {
        let mode = SamplingMode::DiffSubdomainDiffWebsite;

        let same_subdomain = validate_raw(&reply(&["t1", "t3"]), mode, &table()).unwrap();
        assert_eq!(same_subdomain.reason(), Some(REASON_TOO_FEW_SUBDOMAINS));

        // 网站与子领域都不足时报告网站不足
        let both_short = validate_raw(&reply(&["t1", "t2"]), mode, &table()).unwrap();
        assert_eq!(both_short.reason(), Some(REASON_TOO_FEW_WEBSITES));

        let ok = validate_raw(&reply(&["t1", "t4"]), mode, &table()).unwrap();
        match ok {
            ValidationResult::Accepted(accepted) => {
                assert_eq!(accepted.selected_websites, ["W1", "W3"]);
                assert_eq!(
                    accepted.selected_subdomains.as_deref(),
                    Some(&["shopping".to_string(), "travel".to_string()][..])
                );
            }
            other => panic!("Expected OK, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_subdomain_without_subdomain_table() {
        let lookup = lookup(&[("t1", "W1", "a"), ("t2", "W2", "b")], false);
        let result = validate_raw(
            &reply(&["t1", "t2"]),
            SamplingMode::DiffSubdomainDiffWebsite,
            &lookup,
        )
        .unwrap();
        assert_eq!(result.reason(), Some(REASON_TOO_FEW_SUBDOMAINS));
    }

    #[test]
    fn test_unknown_subtasks_are_ignored() {
        let result = validate_raw(
            &reply(&["t1", "made-up task", "t3"]),
            SamplingMode::SameSubdomainDiffWebsite,
            &table(),
        )
        .unwrap();
        assert!(result.is_accepted());

        match result {
            ValidationResult::Accepted(accepted) => {
                assert_eq!(accepted.selected_websites, ["W1", "W2"]);
                assert_eq!(accepted.selected_subtasks, ["t1", "made-up task", "t3"]);
            }
            other => panic!("Expected OK, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_mode_name() {
        let result = validate_by_name(&reply(&["t1", "t3"]), "same_planet", &table()).unwrap();
        assert_eq!(result.reason(), Some("unknown mode same_planet"));

        let pass = validate_by_name("PASS", "same_planet", &table()).unwrap();
        assert_eq!(pass, ValidationResult::Pass { reason: None });

        let known = validate_by_name(
            &reply(&["t1", "t3"]),
            "same_subdomain_diff_website",
            &table(),
        )
        .unwrap();
        assert!(known.is_accepted());
    }

    #[test]
    fn test_decode_error_propagates() {
        for mode in SamplingMode::ALL {
            assert!(matches!(
                validate_raw("not json", mode, &table()),
                Err(TaskweaveError::ReplyDecode { .. })
            ));
        }
        assert!(validate_by_name("not json", "same_planet", &table()).is_err());
    }

    #[test]
    fn test_accepted_wire_shape() {
        let result = validate_raw(
            &reply(&["t1", "t4"]),
            SamplingMode::DiffSubdomainDiffWebsite,
            &table(),
        )
        .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "OK");
        assert_eq!(value["selected_websites"], serde_json::json!(["W1", "W3"]));
        assert_eq!(
            value["selected_subdomains"],
            serde_json::json!(["shopping", "travel"])
        );
        assert_eq!(value["combined_task"], "Plan the trip");

        let back: ValidationResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }
}
