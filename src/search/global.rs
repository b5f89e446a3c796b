//! 跨文件搜索服务
//!
//! 在目录子树中扫描模式匹配：
//! - 掩码列表（`*.py;*.txt`）之间取或，空列表扫描全部文件
//! - 文件按 UTF-8 宽容读取（非法字节替换），读不了的文件跳过并记日志
//! - 结果按文件枚举顺序批量异步送回，取消通过共享标志位

use super::query::{SearchError, SearchQuery};
use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use memchr::memmem::Finder;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::debug;

static SCAN_ID: AtomicU64 = AtomicU64::new(0);

fn next_scan_id() -> u64 {
    SCAN_ID.fetch_add(1, Ordering::Relaxed)
}

/// 预览截取的前后上下文长度（字节，对齐到字符边界）
const PREVIEW_CONTEXT: usize = 40;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// 分号分隔的文件名掩码列表，空串表示不过滤
    pub masks: String,
    pub pattern: String,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub is_regex: bool,
    pub recursive: bool,
}

/// 单个匹配：1 起始的行列号加定宽预览
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub preview: String,
}

#[derive(Debug, Clone)]
pub enum ScanMessage {
    /// 一个文件内的全部匹配，按出现顺序
    FileMatches {
        scan_id: u64,
        matches: Vec<FileMatch>,
    },
    Complete {
        scan_id: u64,
        files_scanned: usize,
        files_skipped: usize,
        total_matches: usize,
    },
    Cancelled {
        scan_id: u64,
    },
}

#[derive(Debug)]
pub enum ScanError {
    InvalidPattern(String),
    InvalidMask(String),
    RootNotFound(PathBuf),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::InvalidPattern(msg) => write!(f, "invalid pattern: {}", msg),
            ScanError::InvalidMask(msg) => write!(f, "invalid file mask: {}", msg),
            ScanError::RootNotFound(p) => write!(f, "folder not found: {}", p.display()),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<SearchError> for ScanError {
    fn from(err: SearchError) -> Self {
        let SearchError::InvalidPattern(msg) = err;
        ScanError::InvalidPattern(msg)
    }
}

/// 编译好的匹配引擎。字面量大小写敏感时走 memchr 快路径，
/// 其余情况统一编译为 regex。
enum PatternMatcher {
    Literal { finder: Finder<'static>, len: usize },
    Regex { regex: Regex },
}

impl PatternMatcher {
    fn build(opts: &ScanOptions) -> Result<Self, ScanError> {
        if !opts.is_regex && !opts.whole_word && opts.case_sensitive {
            let bytes: &'static [u8] =
                Box::leak(opts.pattern.clone().into_bytes().into_boxed_slice());
            return Ok(Self::Literal {
                finder: Finder::new(bytes),
                len: bytes.len(),
            });
        }
        let query = SearchQuery {
            pattern: opts.pattern.clone(),
            case_sensitive: opts.case_sensitive,
            whole_word: opts.whole_word,
            is_regex: opts.is_regex,
            ..SearchQuery::literal("")
        };
        Ok(Self::Regex {
            regex: query.compile()?,
        })
    }

    /// 按字节区间返回所有（不重叠的）匹配
    fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        match self {
            Self::Literal { finder, len } => {
                if *len == 0 {
                    return Vec::new();
                }
                finder
                    .find_iter(text.as_bytes())
                    .map(|pos| (pos, pos + *len))
                    .collect()
            }
            Self::Regex { regex } => regex
                .find_iter(text)
                .map(|m| (m.start(), m.end()))
                .collect(),
        }
    }
}

pub struct ScanTask {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl ScanTask {
    fn new() -> Self {
        Self {
            id: next_scan_id(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn cancelled_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

/// 跨文件搜索服务
pub struct FindInFilesService {
    runtime: tokio::runtime::Handle,
}

impl FindInFilesService {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// 启动一次目录扫描。模式和掩码在触碰文件系统之前校验；
    /// 返回的 `ScanTask` 可用于取消，丢弃它则扫描继续到结束。
    pub fn scan(
        &self,
        opts: ScanOptions,
        tx: Sender<ScanMessage>,
    ) -> Result<ScanTask, ScanError> {
        let matcher = PatternMatcher::build(&opts)?;
        let overrides = build_mask_overrides(&opts.root, &opts.masks)?;
        if !opts.root.is_dir() {
            return Err(ScanError::RootNotFound(opts.root));
        }

        let task = ScanTask::new();
        let scan_id = task.id();
        let cancelled = task.cancelled_flag();

        self.runtime.spawn(async move {
            let _ = tokio::task::spawn_blocking(move || {
                scan_sync(&opts, &matcher, overrides, scan_id, &cancelled, &tx);
            })
            .await;
        });

        Ok(task)
    }
}

/// 掩码列表 → 白名单 glob 集合；掩码之间取或
fn build_mask_overrides(root: &Path, masks: &str) -> Result<Option<Override>, ScanError> {
    let list: Vec<&str> = masks
        .split(';')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .collect();
    if list.is_empty() {
        return Ok(None);
    }
    let mut builder = OverrideBuilder::new(root);
    for mask in list {
        builder
            .add(mask)
            .map_err(|err| ScanError::InvalidMask(err.to_string()))?;
    }
    let overrides = builder
        .build()
        .map_err(|err| ScanError::InvalidMask(err.to_string()))?;
    Ok(Some(overrides))
}

fn scan_sync(
    opts: &ScanOptions,
    matcher: &PatternMatcher,
    overrides: Option<Override>,
    scan_id: u64,
    cancelled: &AtomicBool,
    tx: &Sender<ScanMessage>,
) {
    let mut builder = WalkBuilder::new(&opts.root);
    // 原始行为：扫描根目录下所有文件,不做 gitignore/隐藏文件过滤
    builder.standard_filters(false);
    if let Some(ov) = overrides {
        builder.overrides(ov);
    }
    if !opts.recursive {
        builder.max_depth(Some(1));
    }

    let mut files_scanned = 0usize;
    let mut files_skipped = 0usize;
    let mut total_matches = 0usize;

    for entry in builder.build().flatten() {
        if cancelled.load(Ordering::Relaxed) {
            let _ = tx.send(ScanMessage::Cancelled { scan_id });
            return;
        }

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(err) => {
                // 原始行为：读不了的文件静默跳过；这里留一条诊断日志
                files_skipped += 1;
                debug!(path = %path.display(), %err, "skipping unreadable file");
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        files_scanned += 1;

        let spans = matcher.find_spans(&text);
        if spans.is_empty() {
            continue;
        }

        let mut matches = Vec::with_capacity(spans.len());
        let mut line = 0usize;
        let mut line_start = 0usize;
        let mut counted_to = 0usize;
        for (start, end) in spans {
            for pos in memchr::memchr_iter(b'\n', &text.as_bytes()[counted_to..start]) {
                line += 1;
                line_start = counted_to + pos + 1;
            }
            counted_to = start;
            let column = text[line_start..start].chars().count() + 1;
            matches.push(FileMatch {
                path: path.to_path_buf(),
                line: line + 1,
                column,
                preview: make_preview(&text, start, end),
            });
            total_matches += 1;
        }
        let _ = tx.send(ScanMessage::FileMatches { scan_id, matches });
    }

    let _ = tx.send(ScanMessage::Complete {
        scan_id,
        files_scanned,
        files_skipped,
        total_matches,
    });
}

/// 匹配前后各取约 40 字节上下文（对齐字符边界），换行折叠成空格
fn make_preview(text: &str, start: usize, end: usize) -> String {
    let mut s = start.saturating_sub(PREVIEW_CONTEXT);
    while s > 0 && !text.is_char_boundary(s) {
        s -= 1;
    }
    let mut e = (end + PREVIEW_CONTEXT).min(text.len());
    while e < text.len() && !text.is_char_boundary(e) {
        e += 1;
    }
    text[s..e].replace(['\r', '\n'], " ")
}
