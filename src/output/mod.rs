//! 结果持久化：运行记录写入带时间戳的 JSON 文件

pub mod store;

pub use store::{RunRecord, ResultStore};
