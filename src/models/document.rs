//! 文档模型
//!
//! 职责：
//! - 文本存储（Rope，内部统一 `\n` 换行）
//! - 行列 ↔ 字符偏移映射
//! - 编辑操作（返回受影响行区间，供高亮层消费）
//! - EOL 模式 / 编码标记 / 修改标志

use super::selection::Selection;
use ropey::Rope;
use std::borrow::Cow;
use std::io::{self, Write};
use std::ops::Range;

/// 序列化时使用的换行约定。内存中的行切分始终基于 `\n`，
/// EOL 模式只在加载/保存边界生效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EolMode {
    #[default]
    Lf,
    Crlf,
    Cr,
}

impl EolMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EolMode::Lf => "\n",
            EolMode::Crlf => "\r\n",
            EolMode::Cr => "\r",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EolMode::Lf => "LF",
            EolMode::Crlf => "CRLF",
            EolMode::Cr => "CR",
        }
    }

    /// 从原始文本推断 EOL 模式：出现过 `\r\n` 记为 CRLF，
    /// 否则出现过 `\r` 记为 CR，默认 LF。
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            EolMode::Crlf
        } else if text.contains('\r') {
            EolMode::Cr
        } else {
            EolMode::Lf
        }
    }
}

/// 文件编码标记，保存时生效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingTag {
    #[default]
    Utf8,
    Latin1,
}

impl EncodingTag {
    pub fn display_name(self) -> &'static str {
        match self {
            EncodingTag::Utf8 => "UTF-8",
            EncodingTag::Latin1 => "Latin-1",
        }
    }
}

/// 一次编辑波及的行区间（编辑完成后的行号），高亮层据此增量重算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangedLines {
    pub first: usize,
    pub last: usize,
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug)]
pub enum DocumentError {
    OutOfBounds { offset: usize, len: usize },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::OutOfBounds { offset, len } => {
                write!(f, "offset {} out of bounds (len {})", offset, len)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// 把任意换行风格统一为 `\n`
pub fn normalize_eol(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[derive(Clone)]
pub struct Document {
    rope: Rope,
    eol: EolMode,
    encoding: EncodingTag,
    modified: bool,
    cursor: (usize, usize),
    selection: Option<Selection>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            eol: EolMode::Lf,
            encoding: EncodingTag::Utf8,
            modified: false,
            cursor: (0, 0),
            selection: None,
        }
    }

    pub fn from_text(text: &str, eol: EolMode) -> Self {
        let mut doc = Self::new();
        doc.load_text(text, eol);
        doc
    }

    /// 整体替换文档内容并清除修改标志。
    /// 输入可以带任意换行风格，内部一律归一化为 `\n`。
    pub fn load_text(&mut self, text: &str, eol: EolMode) {
        self.rope = Rope::from_str(&normalize_eol(text));
        self.eol = eol;
        self.modified = false;
        self.cursor = (0, 0);
        self.selection = None;
    }

    // ==================== 只读访问 ====================

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// 保存成功后由调用方清除
    pub fn clear_modified(&mut self) {
        self.modified = false;
    }

    pub fn eol_mode(&self) -> EolMode {
        self.eol
    }

    /// 只影响保存时的序列化，不改写内存内容
    pub fn set_eol_mode(&mut self, eol: EolMode) {
        self.eol = eol;
    }

    pub fn encoding(&self) -> EncodingTag {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: EncodingTag) {
        self.encoding = encoding;
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// 指定行内容（不含换行符）
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line).to_string();
        Some(s.strip_suffix('\n').map(str::to_string).unwrap_or(s))
    }

    /// 应用 EOL 模式后的完整文本
    pub fn text(&self) -> String {
        let flat = self.rope.to_string();
        match self.eol {
            EolMode::Lf => flat,
            EolMode::Crlf => flat.replace('\n', "\r\n"),
            EolMode::Cr => flat.replace('\n', "\r"),
        }
    }

    /// 内部 `\n` 形式的完整文本（搜索、符号提取用的快照）
    pub fn content(&self) -> String {
        self.rope.to_string()
    }

    /// 流式写出应用 EOL 后的内容，避免大文件整体复制
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let eol = self.eol.as_str().as_bytes();
        for chunk in self.rope.chunks() {
            if self.eol == EolMode::Lf {
                writer.write_all(chunk.as_bytes())?;
                continue;
            }
            for part in chunk.split_inclusive('\n') {
                match part.strip_suffix('\n') {
                    Some(head) => {
                        writer.write_all(head.as_bytes())?;
                        writer.write_all(eol)?;
                    }
                    None => writer.write_all(part.as_bytes())?,
                }
            }
        }
        Ok(())
    }

    // ==================== 坐标转换 ====================

    /// 字符偏移 → (行, 列)。与 `line_col_to_offset` 互逆。
    pub fn offset_to_line_col(&self, offset: usize) -> Result<(usize, usize)> {
        if offset > self.rope.len_chars() {
            return Err(DocumentError::OutOfBounds {
                offset,
                len: self.rope.len_chars(),
            });
        }
        let line = self.rope.char_to_line(offset);
        let col = offset - self.rope.line_to_char(line);
        Ok((line, col))
    }

    /// (行, 列) → 字符偏移。列以字符为单位，含行尾换行符位置。
    pub fn line_col_to_offset(&self, line: usize, col: usize) -> Result<usize> {
        if line >= self.rope.len_lines() {
            return Err(DocumentError::OutOfBounds {
                offset: line,
                len: self.rope.len_lines(),
            });
        }
        let line_start = self.rope.line_to_char(line);
        let line_len = self.rope.line(line).len_chars();
        if col > line_len {
            return Err(DocumentError::OutOfBounds {
                offset: line_start + col,
                len: self.rope.len_chars(),
            });
        }
        Ok(line_start + col)
    }

    /// (行, 列) → 字符偏移，越界时压回有效范围
    pub fn pos_to_char(&self, pos: (usize, usize)) -> usize {
        let (line, col) = self.clamp_pos(pos);
        self.rope.line_to_char(line) + col
    }

    // ==================== 光标与选区 ====================

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    pub fn set_cursor(&mut self, line: usize, col: usize) {
        self.cursor = self.clamp_pos((line, col));
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection.map(|mut sel| {
            sel.clamp(&self.rope);
            sel
        });
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn has_selection(&self) -> bool {
        self.selection
            .as_ref()
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }

    fn clamp_pos(&self, pos: (usize, usize)) -> (usize, usize) {
        let line = pos.0.min(self.rope.len_lines().saturating_sub(1));
        let col = pos.1.min(self.rope.line(line).len_chars());
        (line, col)
    }

    /// 编辑后把光标和选区压回有效范围
    fn clamp_positions(&mut self) {
        self.cursor = self.clamp_pos(self.cursor);
        if let Some(sel) = &mut self.selection {
            sel.clamp(&self.rope);
        }
    }

    // ==================== 编辑操作 ====================

    /// 在字符偏移处插入文本
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<ChangedLines> {
        if offset > self.rope.len_chars() {
            return Err(DocumentError::OutOfBounds {
                offset,
                len: self.rope.len_chars(),
            });
        }
        let first = self.rope.char_to_line(offset);
        self.rope.insert(offset, text);
        self.modified = true;
        self.clamp_positions();
        let last = self.rope.char_to_line(offset + text.chars().count());
        Ok(ChangedLines { first, last })
    }

    /// 删除字符区间
    pub fn delete(&mut self, range: Range<usize>) -> Result<ChangedLines> {
        self.check_range(&range)?;
        let first = self.rope.char_to_line(range.start);
        self.rope.remove(range);
        self.modified = true;
        self.clamp_positions();
        Ok(ChangedLines { first, last: first })
    }

    /// 删除区间并插入替换文本，作为单次编辑
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> Result<ChangedLines> {
        self.check_range(&range)?;
        let start = range.start;
        let first = self.rope.char_to_line(start);
        self.rope.remove(range);
        self.rope.insert(start, text);
        self.modified = true;
        self.clamp_positions();
        let last = self.rope.char_to_line(start + text.chars().count());
        Ok(ChangedLines { first, last })
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        let len = self.rope.len_chars();
        if range.start > range.end || range.end > len {
            return Err(DocumentError::OutOfBounds {
                offset: range.end,
                len,
            });
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_on_load() {
        let doc = Document::from_text("a\r\nb\rc\nd", EolMode::Crlf);
        assert_eq!(doc.content(), "a\nb\nc\nd");
        assert_eq!(doc.len_lines(), 4);
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_eol_roundtrip() {
        let src = "one\r\ntwo\r\nthree";
        let doc = Document::from_text(src, EolMode::Crlf);
        assert_eq!(doc.text(), src);

        // 输入风格与声明不一致时，输出是归一化后的风格，
        // 再加载一次结果不变
        let mixed = Document::from_text("one\ntwo\r\nthree", EolMode::Crlf);
        let out = mixed.text();
        assert_eq!(out, "one\r\ntwo\r\nthree");
        let again = Document::from_text(&out, EolMode::Crlf);
        assert_eq!(again.text(), out);
    }

    #[test]
    fn test_offset_line_col_inverse() {
        let doc = Document::from_text("hello\nwörld\n\nend", EolMode::Lf);
        for offset in 0..=doc.len_chars() {
            let (l, c) = doc.offset_to_line_col(offset).unwrap();
            assert_eq!(doc.line_col_to_offset(l, c).unwrap(), offset);
        }
    }

    #[test]
    fn test_line_col_to_offset_inverse() {
        let doc = Document::from_text("ab\ncd\n", EolMode::Lf);
        assert_eq!(doc.line_col_to_offset(1, 0).unwrap(), 3);
        assert_eq!(doc.offset_to_line_col(3).unwrap(), (1, 0));
        assert!(doc.line_col_to_offset(5, 0).is_err());
    }

    #[test]
    fn test_insert_then_delete_is_noop_but_sticky() {
        let mut doc = Document::from_text("hello world", EolMode::Lf);
        doc.insert(5, "XYZ").unwrap();
        doc.delete(5..8).unwrap();
        assert_eq!(doc.content(), "hello world");
        assert!(doc.is_modified());
    }

    #[test]
    fn test_out_of_bounds_edit() {
        let mut doc = Document::from_text("abc", EolMode::Lf);
        assert!(doc.insert(4, "x").is_err());
        assert!(doc.delete(2..9).is_err());
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_changed_lines_span() {
        let mut doc = Document::from_text("a\nb\nc", EolMode::Lf);
        let changed = doc.insert(2, "x\ny\n").unwrap();
        assert_eq!(changed.first, 1);
        assert_eq!(changed.last, 3);

        let changed = doc.delete(0..2).unwrap();
        assert_eq!(changed.first, 0);
        assert_eq!(changed.last, 0);
    }

    #[test]
    fn test_cursor_clamped_after_edit() {
        let mut doc = Document::from_text("abc\ndef", EolMode::Lf);
        doc.set_cursor(1, 3);
        doc.delete(3..7).unwrap();
        assert_eq!(doc.cursor(), (0, 3));
    }

    #[test]
    fn test_set_eol_mode_does_not_rewrite() {
        let mut doc = Document::from_text("a\nb", EolMode::Lf);
        doc.set_eol_mode(EolMode::Crlf);
        assert_eq!(doc.content(), "a\nb");
        assert_eq!(doc.text(), "a\r\nb");
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_write_to_applies_eol() {
        let mut doc = Document::from_text("a\nb\n", EolMode::Lf);
        doc.set_eol_mode(EolMode::Crlf);
        let mut out = Vec::new();
        doc.write_to(&mut out).unwrap();
        assert_eq!(out, b"a\r\nb\r\n");
    }
}
