//! 会话设置
//!
//! 编辑核心不读写这份状态；由外壳加载、传入、落盘。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MAX_RECENTS: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub recent_files: Vec<PathBuf>,
    pub wrap_enabled: bool,
    pub show_eol: bool,
    pub theme: String,
    pub last_microphone_index: Option<usize>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            recent_files: Vec::new(),
            wrap_enabled: false,
            show_eol: false,
            theme: "light".to_string(),
            last_microphone_index: None,
        }
    }
}

impl Session {
    /// 最近文件提到队首，去重，截断到上限
    pub fn add_recent(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENTS);
    }

    pub fn clear_recents(&mut self) {
        self.recent_files.clear();
    }
}
