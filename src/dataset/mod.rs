//! 数据层：任务记录加载与两级索引

pub mod index;
pub mod record;

pub use index::{TaskIndex, WebsiteTasks};
pub use record::{load_records, parse_records, TaskRecord};
