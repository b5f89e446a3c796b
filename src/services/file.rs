//! 文件服务
//!
//! 同步核心：读文件（UTF-8 严格解码，失败回退 Latin-1 宽容解码）、
//! 探测 EOL、写回时套用文档的 EOL 和编码。
//! 异步包装：后台执行读写，结果带 tab 标识送回交互线程，
//! tab 已关闭时调用方直接丢弃消息即可。

use crate::models::{Document, EncodingTag, EolMode};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::SystemTime;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug)]
pub enum FileError {
    Io(io::Error),
    NotFound(PathBuf),
    PermissionDenied(PathBuf),
    /// 前 8KB 出现 NUL 字节，按二进制处理，两种编码都不尝试
    Decode(PathBuf),
    /// 文档包含目标编码放不下的字符
    Encode(PathBuf),
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::Io(e) => write!(f, "IO error: {}", e),
            FileError::NotFound(p) => write!(f, "Not found: {}", p.display()),
            FileError::PermissionDenied(p) => write!(f, "Permission denied: {}", p.display()),
            FileError::Decode(p) => {
                write!(f, "Unable to decode with UTF-8 or Latin-1: {}", p.display())
            }
            FileError::Encode(p) => {
                write!(f, "Document contains characters outside Latin-1: {}", p.display())
            }
        }
    }
}

impl std::error::Error for FileError {}

impl From<io::Error> for FileError {
    fn from(e: io::Error) -> Self {
        FileError::Io(e)
    }
}

fn classify_io(path: &Path, err: io::Error) -> FileError {
    match err.kind() {
        io::ErrorKind::NotFound => FileError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => FileError::PermissionDenied(path.to_path_buf()),
        _ => FileError::Io(err),
    }
}

/// 读取结果：原始文本（EOL 未归一化）+ 判定的编码/EOL + mtime
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub content: String,
    pub encoding: EncodingTag,
    pub eol: EolMode,
    pub mtime: Option<SystemTime>,
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(8192).any(|&b| b == 0)
}

/// 读文件：UTF-8 严格解码，失败回退 Latin-1（每个字节一个字符）。
/// 含 NUL 的文件视为二进制，拒绝。
pub fn read_document(path: &Path) -> Result<LoadedFile> {
    let bytes = std::fs::read(path).map_err(|e| classify_io(path, e))?;
    if looks_binary(&bytes) {
        return Err(FileError::Decode(path.to_path_buf()));
    }
    let mtime = std::fs::metadata(path).ok().and_then(|m| m.modified().ok());

    let (content, encoding) = match String::from_utf8(bytes) {
        Ok(text) => (text, EncodingTag::Utf8),
        Err(err) => {
            debug!(path = %path.display(), "not valid UTF-8, falling back to Latin-1");
            let bytes = err.into_bytes();
            let text: String = bytes.iter().map(|&b| b as char).collect();
            (text, EncodingTag::Latin1)
        }
    };
    let eol = EolMode::detect(&content);
    Ok(LoadedFile {
        content,
        encoding,
        eol,
        mtime,
    })
}

/// 按编码序列化文本。Latin-1 下遇到 U+00FF 以上的字符报错，
/// 不写半个文件。
fn encode(path: &Path, text: &str, encoding: EncodingTag) -> Result<Vec<u8>> {
    match encoding {
        EncodingTag::Utf8 => Ok(text.as_bytes().to_vec()),
        EncodingTag::Latin1 => {
            let mut out = Vec::with_capacity(text.len());
            for c in text.chars() {
                if (c as u32) > 0xFF {
                    return Err(FileError::Encode(path.to_path_buf()));
                }
                out.push(c as u8);
            }
            Ok(out)
        }
    }
}

/// 写文本到磁盘；失败时文件内容由调用方（仍持有未保存的缓冲区）兜底
pub fn write_text(path: &Path, text: &str, encoding: EncodingTag) -> Result<Option<SystemTime>> {
    let bytes = encode(path, text, encoding)?;
    std::fs::write(path, bytes).map_err(|e| classify_io(path, e))?;
    Ok(std::fs::metadata(path).ok().and_then(|m| m.modified().ok()))
}

/// 应用 EOL 模式后把文档写到磁盘
pub fn write_document(path: &Path, doc: &Document) -> Result<Option<SystemTime>> {
    write_text(path, &doc.text(), doc.encoding())
}

/// 标识一次加载/保存属于哪个编辑页；页关闭后收到的旧消息直接丢弃
pub type TabId = u64;

#[derive(Debug)]
pub enum FileMessage {
    Loaded {
        tab: TabId,
        path: PathBuf,
        file: LoadedFile,
    },
    LoadFailed {
        tab: TabId,
        path: PathBuf,
        error: String,
    },
    Saved {
        tab: TabId,
        path: PathBuf,
        mtime: Option<SystemTime>,
    },
    SaveFailed {
        tab: TabId,
        path: PathBuf,
        error: String,
    },
}

/// 后台文件读写服务
pub struct FileService {
    runtime: tokio::runtime::Handle,
}

impl FileService {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    pub fn load(&self, tab: TabId, path: PathBuf, tx: Sender<FileMessage>) {
        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking({
                let path = path.clone();
                move || read_document(&path)
            })
            .await;
            let msg = match result {
                Ok(Ok(file)) => FileMessage::Loaded { tab, path, file },
                Ok(Err(err)) => FileMessage::LoadFailed {
                    tab,
                    path,
                    error: err.to_string(),
                },
                Err(join_err) => {
                    warn!(%join_err, "file load task panicked");
                    FileMessage::LoadFailed {
                        tab,
                        path,
                        error: join_err.to_string(),
                    }
                }
            };
            let _ = tx.send(msg);
        });
    }

    /// `text` 是已应用 EOL 的序列化结果（`Document::text`），
    /// 避免把缓冲区借到工作线程上
    pub fn save(
        &self,
        tab: TabId,
        path: PathBuf,
        text: String,
        encoding: EncodingTag,
        tx: Sender<FileMessage>,
    ) {
        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking({
                let path = path.clone();
                move || write_text(&path, &text, encoding)
            })
            .await;
            let msg = match result {
                Ok(Ok(mtime)) => FileMessage::Saved { tab, path, mtime },
                Ok(Err(err)) => FileMessage::SaveFailed {
                    tab,
                    path,
                    error: err.to_string(),
                },
                Err(join_err) => {
                    warn!(%join_err, "file save task panicked");
                    FileMessage::SaveFailed {
                        tab,
                        path,
                        error: join_err.to_string(),
                    }
                }
            };
            let _ = tx.send(msg);
        });
    }
}
