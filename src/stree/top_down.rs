use super::{EmptyEdges, Node, Tree};
use crate::error::{IndexError, Result};
use crate::index::childtab::{first_boundary, next_boundary};
use crate::index::{Fibre, Index};

/// 子表驱动的自顶向下迭代器，只能向下、向右移动。
///
/// 状态为当前节点与父节点的右端；根没有父节点，到达终止状态后
/// `node()` 返回 `None`。空文本上的迭代器一开始就处于终止状态。
/// 默认情况下 `go_down` / `go_right` 跳过 `$` 叶子，见 [`EmptyEdges`]。
#[derive(Debug, Clone)]
pub struct TopDown<'a> {
    tree: Tree<'a>,
    cld: &'a [u32],
    empty_edges: EmptyEdges,
    node: Option<Node>,
    parent_hi: Option<usize>,
}

impl<'a> TopDown<'a> {
    pub fn new(index: &'a Index<'_>) -> Result<Self> {
        Self::from_tree(Tree::new(index)?, EmptyEdges::default())
    }

    pub fn with_empty_edges(index: &'a Index<'_>, edges: EmptyEdges) -> Result<Self> {
        Self::from_tree(Tree::new(index)?, edges)
    }

    pub fn from_tree(tree: Tree<'a>, empty_edges: EmptyEdges) -> Result<Self> {
        let cld = tree
            .child_tab()
            .ok_or(IndexError::NotConstructed(Fibre::ChildTab))?;
        Ok(Self {
            node: tree.root(),
            tree,
            cld,
            empty_edges,
            parent_hi: None,
        })
    }

    pub fn tree(&self) -> &Tree<'a> {
        &self.tree
    }

    pub fn empty_edges(&self) -> EmptyEdges {
        self.empty_edges
    }

    pub fn node(&self) -> Option<Node> {
        self.node
    }

    pub fn at_end(&self) -> bool {
        self.node.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.node.is_some() && self.parent_hi.is_none()
    }

    pub fn go_root(&mut self) {
        self.node = self.tree.root();
        self.parent_hi = None;
    }

    /// 当前节点表示的字符串；终止状态下为空
    pub fn representative(&self) -> &'a [u8] {
        match self.node {
            Some(n) => self.tree.representative(&n),
            None => &[],
        }
    }

    /// `node` 右边紧挨着的兄弟，不论是否隐藏
    fn next_sibling(&self, node: &Node, parent_hi: usize) -> Option<Node> {
        if node.hi >= parent_hi {
            return None;
        }
        let lo = node.hi;
        let hi = next_boundary(self.tree.lcp(), self.cld, lo).unwrap_or(parent_hi);
        Some(Node {
            lo,
            hi,
            rep_length: self.tree.depth(lo, hi),
            parent_rep_length: node.parent_rep_length,
        })
    }

    /// 从 `node` 起向右第一个可见的节点（含自身）
    fn first_visible(&self, mut node: Node, parent_hi: usize) -> Option<Node> {
        while self.empty_edges.hides(&node) {
            node = self.next_sibling(&node, parent_hi)?;
        }
        Some(node)
    }

    /// 进入第一个可见子节点；叶子（或子节点全部隐藏）时返回 false
    pub fn go_down(&mut self) -> bool {
        let Some(node) = self.node else {
            return false;
        };
        if node.is_leaf() {
            return false;
        }
        let k = first_boundary(self.cld, node.lo, node.hi);
        let first = Node {
            lo: node.lo,
            hi: k,
            rep_length: self.tree.depth(node.lo, k),
            parent_rep_length: node.rep_length,
        };
        match self.first_visible(first, node.hi) {
            Some(child) => {
                self.parent_hi = Some(node.hi);
                self.node = Some(child);
                true
            }
            None => false,
        }
    }

    /// 移到下一个可见兄弟；根或最后一个子节点返回 false
    pub fn go_right(&mut self) -> bool {
        let (Some(node), Some(parent_hi)) = (self.node, self.parent_hi) else {
            return false;
        };
        let next = self
            .next_sibling(&node, parent_hi)
            .and_then(|n| self.first_visible(n, parent_hi));
        match next {
            Some(n) => {
                self.node = Some(n);
                true
            }
            None => false,
        }
    }

    /// 进入边标签以 `c` 开头的子节点；不存在时位置不变
    pub fn go_down_symbol(&mut self, c: u8) -> bool {
        let Some(node) = self.node else {
            return false;
        };
        let tree = self.tree;
        let depth = node.rep_length;
        match tree.children(&node).find(|ch| tree.symbol_at(ch.lo, depth) == Some(c)) {
            Some(child) => {
                self.parent_hi = Some(node.hi);
                self.node = Some(child);
                true
            }
            None => false,
        }
    }

    /// 沿模式串下降到其 locus（表示串以模式串为前缀的最高节点）。
    /// 失败时迭代器停在最后一个匹配成功的节点上。
    pub fn go_down_pattern(&mut self, pattern: &[u8]) -> bool {
        let mut matched = 0;
        loop {
            let Some(node) = self.node else {
                return false;
            };
            let label = self.tree.representative(&node);
            let end = node.rep_length.min(pattern.len());
            while matched < end {
                if label[matched] != pattern[matched] {
                    return false;
                }
                matched += 1;
            }
            if matched == pattern.len() {
                return true;
            }
            if !self.go_down_symbol(pattern[matched]) {
                return false;
            }
        }
    }
}

/// 深度优先遍历的顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfsOrder {
    /// 先父后子，从根开始
    Preorder,
    /// 先子后父，从最左叶子开始，根最后
    Postorder,
}

/// 带祖先栈的自顶向下迭代器，支持 `go_up` 与按序 `go_next`。
#[derive(Debug, Clone)]
pub struct TopDownHistory<'a> {
    inner: TopDown<'a>,
    /// 祖先节点及各自的父节点右端
    history: Vec<(Node, Option<usize>)>,
    order: DfsOrder,
}

impl<'a> TopDownHistory<'a> {
    pub fn new(index: &'a Index<'_>, order: DfsOrder) -> Result<Self> {
        Self::with_empty_edges(index, order, EmptyEdges::default())
    }

    pub fn with_empty_edges(index: &'a Index<'_>, order: DfsOrder, edges: EmptyEdges) -> Result<Self> {
        Self::from_tree(Tree::new(index)?, order, edges)
    }

    pub fn from_tree(tree: Tree<'a>, order: DfsOrder, edges: EmptyEdges) -> Result<Self> {
        let mut it = Self {
            inner: TopDown::from_tree(tree, edges)?,
            history: Vec::new(),
            order,
        };
        if order == DfsOrder::Postorder {
            while it.go_down() {}
        }
        Ok(it)
    }

    pub fn tree(&self) -> &Tree<'a> {
        self.inner.tree()
    }

    pub fn order(&self) -> DfsOrder {
        self.order
    }

    pub fn node(&self) -> Option<Node> {
        self.inner.node()
    }

    pub fn at_end(&self) -> bool {
        self.inner.at_end()
    }

    pub fn is_root(&self) -> bool {
        self.inner.is_root()
    }

    /// 当前节点在树中的深度（边数），根为 0
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    pub fn representative(&self) -> &'a [u8] {
        self.inner.representative()
    }

    /// 父节点；根没有父节点
    pub fn node_up(&self) -> Option<Node> {
        self.history.last().map(|&(node, _)| node)
    }

    pub fn parent_rep_length(&self) -> usize {
        self.node().map_or(0, |n| n.parent_rep_length)
    }

    pub fn go_down(&mut self) -> bool {
        let Some(node) = self.inner.node else {
            return false;
        };
        let saved = (node, self.inner.parent_hi);
        if self.inner.go_down() {
            self.history.push(saved);
            true
        } else {
            false
        }
    }

    pub fn go_down_symbol(&mut self, c: u8) -> bool {
        let Some(node) = self.inner.node else {
            return false;
        };
        let saved = (node, self.inner.parent_hi);
        if self.inner.go_down_symbol(c) {
            self.history.push(saved);
            true
        } else {
            false
        }
    }

    pub fn go_right(&mut self) -> bool {
        self.inner.go_right()
    }

    /// 回到父节点；已在根（或终止状态）时返回 false
    pub fn go_up(&mut self) -> bool {
        match self.history.pop() {
            Some((node, parent_hi)) => {
                self.inner.node = Some(node);
                self.inner.parent_hi = parent_hi;
                true
            }
            None => false,
        }
    }

    /// 按遍历顺序前进一步，越过最后一个节点后进入终止状态
    pub fn go_next(&mut self) {
        if self.at_end() {
            return;
        }
        match self.order {
            DfsOrder::Preorder => {
                if !self.go_down() {
                    self.skip_subtree();
                }
            }
            DfsOrder::Postorder => {
                if self.go_right() {
                    while self.go_down() {}
                } else if !self.go_up() {
                    self.finish();
                }
            }
        }
    }

    /// 先序下不进入当前子树，移到其后的第一个节点
    fn skip_subtree(&mut self) {
        loop {
            if self.go_right() {
                return;
            }
            if !self.go_up() {
                self.finish();
                return;
            }
        }
    }

    fn finish(&mut self) {
        self.inner.node = None;
        self.inner.parent_hi = None;
        self.history.clear();
    }

    /// 以迭代器形式逐个给出节点，从当前位置开始
    pub fn into_nodes(self) -> DfsNodes<'a> {
        DfsNodes {
            it: self,
            started: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DfsNodes<'a> {
    it: TopDownHistory<'a>,
    started: bool,
}

impl Iterator for DfsNodes<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if self.started {
            self.it.go_next();
        } else {
            self.started = true;
        }
        self.it.node()
    }
}

/// 带剪枝的先序遍历：谓词在每个节点上求值一次，为假时该节点
/// 不输出、其子树也不进入。常用于限定字符串深度或出现次数范围。
pub struct Pruned<'a, P> {
    it: TopDownHistory<'a>,
    predicate: P,
    started: bool,
}

impl<'a, P> Pruned<'a, P>
where
    P: FnMut(&Node) -> bool,
{
    pub fn new(index: &'a Index<'_>, predicate: P) -> Result<Self> {
        Ok(Self {
            it: TopDownHistory::new(index, DfsOrder::Preorder)?,
            predicate,
            started: false,
        })
    }

    /// 底层迭代器，可用于查询父节点等
    pub fn cursor(&self) -> &TopDownHistory<'a> {
        &self.it
    }
}

impl<P> Iterator for Pruned<'_, P>
where
    P: FnMut(&Node) -> bool,
{
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let mut descend = true;
        if !self.started {
            self.started = true;
            let root = self.it.node()?;
            if (self.predicate)(&root) {
                return Some(root);
            }
            descend = false;
        }
        loop {
            if self.it.at_end() {
                return None;
            }
            if !(descend && self.it.go_down()) {
                self.it.skip_subtree();
            }
            let node = self.it.node()?;
            if (self.predicate)(&node) {
                return Some(node);
            }
            descend = false;
        }
    }
}
