//! 三种策略的候选构建
//!
//! 每个选择点都是均匀随机，不按任务数加权。空的选择域是致命错误，绝不返回空候选集。

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::TaskweaveError;
use crate::dataset::TaskIndex;
use crate::sampling::{CandidateBlock, CandidateSet, SamplingMode, TaskLookup};

fn choose<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    rng: &mut R,
    what: impl FnOnce() -> String,
) -> Result<&'a T, TaskweaveError> {
    items
        .choose(rng)
        .ok_or_else(|| TaskweaveError::EmptyChoice(what()))
}

/// 单一子领域、单一网站
///
/// 在所有任务数 ≥ `min_tasks` 的 (subdomain, website) 组合中均匀选一个，
/// 候选集即该网站的完整任务列表（不再抽样）。
pub fn same_subdomain_same_website<R: Rng + ?Sized>(
    index: &TaskIndex,
    min_tasks: usize,
    rng: &mut R,
) -> Result<CandidateSet, TaskweaveError> {
    let pairs: Vec<(&str, &str, &[String])> = index
        .subdomains()
        .flat_map(|(sd, web_map)| {
            web_map
                .iter()
                .filter(|(_, tasks)| tasks.len() >= min_tasks)
                .map(move |(website, tasks)| (sd, website.as_str(), tasks.as_slice()))
        })
        .collect();

    let &(subdomain, website, tasks) = pairs
        .choose(rng)
        .ok_or(TaskweaveError::InsufficientData { min_tasks })?;

    if tasks.is_empty() {
        return Err(TaskweaveError::EmptyChoice(format!(
            "website {website} in subdomain {subdomain} has no tasks"
        )));
    }

    let task_to_website = tasks
        .iter()
        .map(|t| (t.clone(), website.to_string()))
        .collect();

    Ok(CandidateSet {
        mode: SamplingMode::SameSubdomainSameWebsite,
        blocks: vec![CandidateBlock {
            subdomain: None,
            website: website.to_string(),
            tasks: tasks.to_vec(),
        }],
        lookup: TaskLookup {
            task_to_website,
            task_to_subdomain: None,
        },
        selected_subdomain: Some(subdomain.to_string()),
    })
}

/// 单一子领域、多个网站
///
/// 均匀选一个子领域，再为其下每个网站各均匀抽一条任务，每个网站一个候选块。
pub fn same_subdomain_diff_website<R: Rng + ?Sized>(
    index: &TaskIndex,
    rng: &mut R,
) -> Result<CandidateSet, TaskweaveError> {
    let subdomains: Vec<&str> = index.subdomains().map(|(sd, _)| sd).collect();
    let subdomain = *subdomains.choose(rng).ok_or(TaskweaveError::EmptyIndex)?;
    let web_map = index
        .websites(subdomain)
        .ok_or(TaskweaveError::EmptyIndex)?;

    if web_map.is_empty() {
        return Err(TaskweaveError::EmptyChoice(format!(
            "subdomain {subdomain} has no websites"
        )));
    }

    let mut blocks = Vec::with_capacity(web_map.len());
    let mut task_to_website = HashMap::new();

    for (website, tasks) in web_map {
        let task = choose(tasks.as_slice(), rng, || format!("website {website} has no tasks"))?;
        blocks.push(CandidateBlock {
            subdomain: None,
            website: website.clone(),
            tasks: vec![task.clone()],
        });
        task_to_website.insert(task.clone(), website.clone());
    }

    Ok(CandidateSet {
        mode: SamplingMode::SameSubdomainDiffWebsite,
        blocks,
        lookup: TaskLookup {
            task_to_website,
            task_to_subdomain: None,
        },
        selected_subdomain: Some(subdomain.to_string()),
    })
}

/// 多个子领域、多个网站
///
/// 对索引中的每个子领域：均匀选一个网站，再均匀选一条任务。每个子领域一个候选块，
/// 同时构建 task → website 与 task → subdomain。
pub fn diff_subdomain_diff_website<R: Rng + ?Sized>(
    index: &TaskIndex,
    rng: &mut R,
) -> Result<CandidateSet, TaskweaveError> {
    if index.is_empty() {
        return Err(TaskweaveError::EmptyIndex);
    }

    let mut blocks = Vec::with_capacity(index.subdomain_count());
    let mut task_to_website = HashMap::new();
    let mut task_to_subdomain = HashMap::new();

    for (subdomain, web_map) in index.subdomains() {
        let websites: Vec<(&String, &Vec<String>)> = web_map.iter().collect();
        let &(website, tasks) = choose(websites.as_slice(), rng, || {
            format!("subdomain {subdomain} has no websites")
        })?;
        let task = choose(tasks.as_slice(), rng, || format!("website {website} has no tasks"))?;

        blocks.push(CandidateBlock {
            subdomain: Some(subdomain.to_string()),
            website: website.clone(),
            tasks: vec![task.clone()],
        });
        task_to_website.insert(task.clone(), website.clone());
        task_to_subdomain.insert(task.clone(), subdomain.to_string());
    }

    Ok(CandidateSet {
        mode: SamplingMode::DiffSubdomainDiffWebsite,
        blocks,
        lookup: TaskLookup {
            task_to_website,
            task_to_subdomain: Some(task_to_subdomain),
        },
        selected_subdomain: None,
    })
}
