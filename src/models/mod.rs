//! 数据模型层

pub mod bookmarks;
pub mod document;
pub mod selection;
pub mod session;

pub use bookmarks::BookmarkSet;
pub use document::{
    normalize_eol, ChangedLines, Document, DocumentError, EncodingTag, EolMode,
};
pub use selection::Selection;
pub use session::{Session, MAX_RECENTS};
