//! 选区模型：anchor/active 位置对
//!
//! `anchor == active` 表示没有选区。两端在每次编辑后都被压回文档边界。

use ropey::Rope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    anchor: (usize, usize),
    active: (usize, usize),
}

impl Selection {
    pub fn new(anchor: (usize, usize), active: (usize, usize)) -> Self {
        Self { anchor, active }
    }

    pub fn caret(pos: (usize, usize)) -> Self {
        Self {
            anchor: pos,
            active: pos,
        }
    }

    pub fn anchor(&self) -> (usize, usize) {
        self.anchor
    }

    pub fn active(&self) -> (usize, usize) {
        self.active
    }

    pub fn set_active(&mut self, pos: (usize, usize)) {
        self.active = pos;
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    /// 有序的 (起点, 终点)
    pub fn range(&self) -> ((usize, usize), (usize, usize)) {
        if self.anchor <= self.active {
            (self.anchor, self.active)
        } else {
            (self.active, self.anchor)
        }
    }

    pub fn start(&self) -> (usize, usize) {
        self.range().0
    }

    pub fn end(&self) -> (usize, usize) {
        self.range().1
    }

    /// 把两端压回文档有效范围
    pub fn clamp(&mut self, rope: &Rope) {
        self.anchor = clamp_pos(self.anchor, rope);
        self.active = clamp_pos(self.active, rope);
    }
}

fn clamp_pos(pos: (usize, usize), rope: &Rope) -> (usize, usize) {
    let line = pos.0.min(rope.len_lines().saturating_sub(1));
    let col = pos.1.min(rope.line(line).len_chars());
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_ordered() {
        let sel = Selection::new((2, 4), (1, 0));
        assert_eq!(sel.range(), ((1, 0), (2, 4)));
        assert_eq!(sel.start(), (1, 0));
        assert!(!sel.is_empty());
    }

    #[test]
    fn test_caret_is_empty() {
        assert!(Selection::caret((3, 1)).is_empty());
    }

    #[test]
    fn test_clamp() {
        let rope = Rope::from_str("ab\ncd");
        let mut sel = Selection::new((0, 0), (9, 9));
        sel.clamp(&rope);
        assert_eq!(sel.active(), (1, 2));
    }
}
