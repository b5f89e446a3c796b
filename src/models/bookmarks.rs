//! 书签集合：按行号标记，支持循环 next/previous 查找

use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct BookmarkSet {
    lines: BTreeSet<usize>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, line: usize) -> bool {
        self.lines.contains(&line)
    }

    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().copied()
    }

    /// 有则删，无则加
    pub fn toggle(&mut self, line: usize) {
        if !self.lines.remove(&line) {
            self.lines.insert(line);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// 严格大于 `from` 的最小标记行；没有则绕回最小标记行
    pub fn next(&self, from: usize) -> Option<usize> {
        self.lines
            .range(from + 1..)
            .next()
            .or_else(|| self.lines.iter().next())
            .copied()
    }

    /// 严格小于 `from` 的最大标记行；没有则绕回最大标记行
    pub fn previous(&self, from: usize) -> Option<usize> {
        self.lines
            .range(..from)
            .next_back()
            .or_else(|| self.lines.iter().next_back())
            .copied()
    }

    /// 缓冲区在 `edit_line` 处增删行后调用。
    /// `delta` 为净行数变化；位于编辑点之后的书签整体平移，
    /// 落在被删除行上的书签移除。
    pub fn on_lines_changed(&mut self, edit_line: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        let mut shifted = BTreeSet::new();
        for &line in &self.lines {
            if line < edit_line {
                shifted.insert(line);
            } else if delta > 0 {
                shifted.insert(line + delta as usize);
            } else {
                let removed = (-delta) as usize;
                if line >= edit_line + removed {
                    shifted.insert(line - removed);
                }
                // edit_line..edit_line+removed 的书签随行一起消失
            }
        }
        self.lines = shifted;
    }
}
