//! padcore - Notepad++ 风格编辑器核心库
//!
//! 模块结构：
//! - models: 数据模型（Document, Selection, BookmarkSet, Session）
//! - syntax: 语法高亮（语言识别、规则注册表、按行高亮）
//! - search: 搜索引擎（缓冲区查找/替换、跨文件搜索）
//! - services: 服务层（FileService, DiskWatcher）
//! - symbols: 函数/符号大纲
//!
//! UI 外壳（窗口、菜单、对话框、会话持久化）由上层实现。

pub mod logging;
pub mod models;
pub mod search;
pub mod services;
pub mod symbols;
pub mod syntax;
