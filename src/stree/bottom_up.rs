use std::collections::VecDeque;

use super::{EmptyEdges, Node, Tree};
use crate::error::Result;
use crate::index::Index;

/// 后序自底向上遍历，只用 SA 与 LCP。
///
/// 从左到右扫描 LCP 表，栈中保存尚未闭合的 lcp 区间 `(左端, 深度)`；
/// 虚拟的 `LCP[0] = LCP[n] = -1` 保证扫描结束时根被弹出。
/// 每个节点（叶子与内部节点）恰好输出一次，子节点先于父节点，
/// 顺序与同一 [`EmptyEdges`] 设置下子表驱动的后序遍历相同。
#[derive(Debug, Clone)]
pub struct BottomUp<'a> {
    tree: Tree<'a>,
    empty_edges: EmptyEdges,
    stack: Vec<(usize, i64)>,
    pending: VecDeque<Node>,
    i: usize,
}

impl<'a> BottomUp<'a> {
    pub fn new(index: &'a Index<'_>) -> Result<Self> {
        Self::with_empty_edges(index, EmptyEdges::default())
    }

    pub fn with_empty_edges(index: &'a Index<'_>, edges: EmptyEdges) -> Result<Self> {
        Ok(Self::from_tree(Tree::new(index)?, edges))
    }

    pub fn from_tree(tree: Tree<'a>, empty_edges: EmptyEdges) -> Self {
        Self {
            tree,
            empty_edges,
            stack: vec![(0, -1)],
            pending: VecDeque::new(),
            i: 1,
        }
    }

    pub fn tree(&self) -> &Tree<'a> {
        &self.tree
    }

    #[inline]
    fn ell(&self, i: usize) -> i64 {
        if i == 0 || i >= self.tree.len() {
            -1
        } else {
            self.tree.lcp()[i] as i64
        }
    }

    /// 处理边界 `i`：先输出叶子 `i-1`，再输出所有在 `i` 处闭合的区间
    fn step(&mut self, i: usize) {
        let li = self.ell(i);
        let leaf_parent = self.ell(i - 1).max(li).max(0) as usize;
        self.pending.push_back(Node {
            lo: i - 1,
            hi: i,
            rep_length: self.tree.text().suffix_len(self.tree.sa()[i - 1] as usize),
            parent_rep_length: leaf_parent,
        });

        let mut lb = i - 1;
        while let Some(&(b, l)) = self.stack.last() {
            if li >= l {
                break;
            }
            self.stack.pop();
            lb = b;
            let above = self.stack.last().map_or(-1, |&(_, l)| l);
            self.pending.push_back(Node {
                lo: b,
                hi: i,
                rep_length: l as usize,
                parent_rep_length: above.max(li).max(0) as usize,
            });
        }
        if self.stack.last().map_or(true, |&(_, l)| li > l) {
            self.stack.push((lb, li));
        }
    }
}

impl Iterator for BottomUp<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        loop {
            if let Some(node) = self.pending.pop_front() {
                if self.empty_edges.hides(&node) {
                    continue;
                }
                return Some(node);
            }
            if self.i > self.tree.len() {
                return None;
            }
            let i = self.i;
            self.step(i);
            self.i += 1;
        }
    }
}
