//! 任务索引：subdomain → website → 任务描述列表
//!
//! 构建一次，之后只读。子领域与网站按名称排序（BTreeMap），保证固定种子下抽样可复现；
//! 同一网站下的任务保持输入顺序，重复任务原样保留。

use std::collections::BTreeMap;

use crate::dataset::TaskRecord;

/// website → 任务描述列表
pub type WebsiteTasks = BTreeMap<String, Vec<String>>;

/// 两级任务索引
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskIndex {
    subdomains: BTreeMap<String, WebsiteTasks>,
}

impl TaskIndex {
    /// 按 (subdomain, website) 分组任务记录
    pub fn build<'a>(records: impl IntoIterator<Item = &'a TaskRecord>) -> Self {
        let mut subdomains: BTreeMap<String, WebsiteTasks> = BTreeMap::new();
        for record in records {
            subdomains
                .entry(record.subdomain.clone())
                .or_default()
                .entry(record.website.clone())
                .or_default()
                .push(record.task.clone());
        }

        let index = Self { subdomains };
        tracing::info!(
            "Task index built: {} subdomains, {} websites",
            index.subdomain_count(),
            index.website_count()
        );
        index
    }

    pub fn is_empty(&self) -> bool {
        self.subdomains.is_empty()
    }

    pub fn subdomain_count(&self) -> usize {
        self.subdomains.len()
    }

    /// 所有子领域下网站总数
    pub fn website_count(&self) -> usize {
        self.subdomains.values().map(BTreeMap::len).sum()
    }

    pub fn subdomains(&self) -> impl Iterator<Item = (&str, &WebsiteTasks)> {
        self.subdomains.iter().map(|(sd, web)| (sd.as_str(), web))
    }

    pub fn websites(&self, subdomain: &str) -> Option<&WebsiteTasks> {
        self.subdomains.get(subdomain)
    }

    pub fn tasks(&self, subdomain: &str, website: &str) -> Option<&[String]> {
        self.subdomains
            .get(subdomain)
            .and_then(|web| web.get(website))
            .map(Vec::as_slice)
    }
}

impl<'a> FromIterator<&'a TaskRecord> for TaskIndex {
    fn from_iter<I: IntoIterator<Item = &'a TaskRecord>>(iter: I) -> Self {
        Self::build(iter)
    }
}
