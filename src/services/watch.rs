//! 磁盘变更监视
//!
//! 固定间隔轮询已打开文件的 mtime（notify PollWatcher）。
//! 自动重载只在文档无未保存修改时发生；有修改则跳过，
//! 冲突留给用户手工处理，不做合并。

use crate::models::Document;
use notify::{Config, PollWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchMessage {
    FileChanged(PathBuf),
}

/// 轮询式文件监视器。注册打开的文件，周期性比对 mtime，
/// 变化通过 `drain_changes` 在交互线程取走。
pub struct DiskWatcher {
    watcher: PollWatcher,
    raw_rx: mpsc::Receiver<notify::Event>,
    watched: FxHashSet<PathBuf>,
}

impl DiskWatcher {
    pub fn new(poll_interval: Duration) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let watcher = PollWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                let _ = tx.send(event);
            },
            Config::default()
                .with_poll_interval(poll_interval)
                .with_compare_contents(false),
        )?;
        Ok(Self {
            watcher,
            raw_rx: rx,
            watched: FxHashSet::default(),
        })
    }

    pub fn watch_file(&mut self, path: &Path) -> Result<(), notify::Error> {
        if self.watched.insert(path.to_path_buf()) {
            self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        }
        Ok(())
    }

    pub fn unwatch_file(&mut self, path: &Path) {
        if self.watched.remove(path) {
            let _ = self.watcher.unwatch(path);
        }
    }

    pub fn is_watching(&self, path: &Path) -> bool {
        self.watched.contains(path)
    }

    /// 取走积累的变更事件，按注册文件过滤、去重
    pub fn drain_changes(&mut self) -> Vec<WatchMessage> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        while let Ok(event) = self.raw_rx.try_recv() {
            if !event.kind.is_modify() && !event.kind.is_create() {
                continue;
            }
            for path in event.paths {
                if self.watched.contains(&path) && seen.insert(path.clone()) {
                    out.push(WatchMessage::FileChanged(path));
                }
            }
        }
        out
    }
}

/// 磁盘文件变了之后是否自动重载：只有缓冲区干净时才重载
pub fn should_auto_reload(doc: &Document) -> bool {
    !doc.is_modified()
}
