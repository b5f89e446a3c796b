//! 服务层模块
//!
//! 在工作线程上执行 I/O，把结果作为消息送回交互线程：
//! - FileService: 文件读写（编码回退、EOL 探测）
//! - DiskWatcher: 磁盘变更轮询与自动重载判定

pub mod file;
pub mod watch;

pub use file::{
    read_document, write_document, write_text, FileError, FileMessage, FileService, LoadedFile,
    TabId,
};
pub use watch::{should_auto_reload, DiskWatcher, WatchMessage, DEFAULT_POLL_INTERVAL};
