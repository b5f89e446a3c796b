//! 搜索层：缓冲区内查找/替换 + 跨文件扫描

pub mod engine;
pub mod global;
pub mod query;

pub use engine::{
    find_and_select, find_next, replace_all, replace_one, FindOutcome, ReplaceOutcome, SearchMatch,
};
pub use global::{
    FileMatch, FindInFilesService, ScanError, ScanMessage, ScanOptions, ScanTask,
};
pub use query::{SearchDirection, SearchError, SearchQuery, SearchScope};
