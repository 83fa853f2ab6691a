//! 在 SA / LCP / 子表之上的隐式后缀树。
//!
//! 树节点不落地：一个节点就是 SA 上的区间 `[lo, hi)` 加上缓存的字符串深度。
//! 父子、兄弟关系由子表和 LCP 表即时计算。

use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::index::childtab::{first_boundary, interval_depth, next_boundary};
use crate::index::{Fibre, Index, Text};

pub mod bottom_up;
pub mod repeats;
pub mod top_down;

pub use bottom_up::BottomUp;
pub use repeats::{MaxRepeat, MaxRepeats, SuperMaxRepeats};
pub use top_down::{DfsNodes, DfsOrder, Pruned, TopDown, TopDownHistory};

/// 后缀树节点（lcp 区间）。相等与哈希只看 `(lo, hi)`。
#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub lo: usize,
    pub hi: usize,
    /// 节点所表示字符串的长度（字符串深度）
    pub rep_length: usize,
    /// 父节点的字符串深度；根为 0
    pub parent_rep_length: usize,
}

impl Node {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.hi - self.lo == 1
    }

    /// 所表示字符串在文本中的出现次数
    #[inline]
    pub fn count_occurrences(&self) -> usize {
        self.hi - self.lo
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.lo..self.hi
    }

    /// `$` 叶子：后缀恰好在父节点深度处结束，边标签为空。
    /// 它与父节点表示同一个字符串，但只计一次出现。
    #[inline]
    pub fn is_empty_edge(&self) -> bool {
        self.is_leaf() && self.rep_length == self.parent_rep_length
    }
}

/// 遍历时如何对待 `$` 叶子（边标签为空的叶子）。
///
/// 默认隐藏，这样遍历到的每个节点的出现次数都等于其表示串在文本中的
/// 出现次数。需要逐个后缀的信息（如左上下文）时改用 `Show`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyEdges {
    #[default]
    Hide,
    Show,
}

impl EmptyEdges {
    #[inline]
    pub(crate) fn hides(self, node: &Node) -> bool {
        self == EmptyEdges::Hide && node.is_empty_edge()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.lo == other.lo && self.hi == other.hi
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lo.hash(state);
        self.hi.hash(state);
    }
}

/// 索引 fibre 的只读视图，提供节点查询。需要 SA 与 LCP；有子表时用它加速。
#[derive(Debug, Clone, Copy)]
pub struct Tree<'a> {
    text: &'a Text<'a>,
    sa: &'a [u32],
    lcp: &'a [u32],
    child_tab: Option<&'a [u32]>,
}

impl<'a> Tree<'a> {
    pub fn new(index: &'a Index<'_>) -> Result<Self> {
        Ok(Self {
            text: index.text(),
            sa: index.sa()?,
            lcp: index.lcp()?,
            child_tab: index
                .supplied(Fibre::ChildTab)
                .then(|| index.child_tab())
                .transpose()?,
        })
    }

    pub fn len(&self) -> usize {
        self.sa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    pub fn text(&self) -> &'a Text<'a> {
        self.text
    }

    pub fn sa(&self) -> &'a [u32] {
        self.sa
    }

    pub fn lcp(&self) -> &'a [u32] {
        self.lcp
    }

    pub fn child_tab(&self) -> Option<&'a [u32]> {
        self.child_tab
    }

    /// 根节点；空文本没有根
    pub fn root(&self) -> Option<Node> {
        let n = self.len();
        (n > 0).then(|| Node {
            lo: 0,
            hi: n,
            rep_length: self.depth(0, n),
            parent_rep_length: 0,
        })
    }

    /// 区间 `[lo, hi)` 的字符串深度：叶子为后缀剩余长度，内部节点为区间内 LCP 最小值
    pub fn depth(&self, lo: usize, hi: usize) -> usize {
        if hi - lo == 1 {
            return self.text.suffix_len(self.sa[lo] as usize);
        }
        match self.child_tab {
            Some(cld) => interval_depth(self.lcp, cld, lo, hi),
            None => self.lcp[lo + 1..hi].iter().copied().min().unwrap_or(0) as usize,
        }
    }

    /// 内部节点 `[lo, hi)` 中第一个子区间边界
    fn first_child_boundary(&self, lo: usize, hi: usize, ell: usize) -> usize {
        match self.child_tab {
            Some(cld) => first_boundary(cld, lo, hi),
            None => (lo + 1..hi).find(|&i| self.lcp[i] as usize == ell).unwrap_or(hi),
        }
    }

    fn next_child_boundary(&self, k: usize, hi: usize, ell: usize) -> Option<usize> {
        match self.child_tab {
            Some(cld) => next_boundary(self.lcp, cld, k),
            None => (k + 1..hi).find(|&i| self.lcp[i] as usize == ell),
        }
    }

    /// 节点表示的字符串
    pub fn representative(&self, node: &Node) -> &'a [u8] {
        let start = self.sa[node.lo] as usize;
        &self.text.concat()[start..start + node.rep_length]
    }

    /// 父节点到该节点的边标签；叶子的后缀恰好在父节点处结束时为空
    pub fn parent_edge_label(&self, node: &Node) -> &'a [u8] {
        &self.representative(node)[node.parent_rep_length..]
    }

    /// 出现位置（全局坐标，SA 顺序）
    pub fn occurrences(&self, node: &Node) -> &'a [u32] {
        &self.sa[node.lo..node.hi]
    }

    /// 出现位置映射为 (序列编号, 偏移)
    pub fn local_occurrences(&self, node: &Node) -> Vec<(usize, usize)> {
        self.occurrences(node)
            .iter()
            .map(|&p| self.text.to_local(p as usize))
            .collect()
    }

    /// 含有该字符串的不同序列数
    pub fn count_sequences(&self, node: &Node) -> usize {
        let mut seqs: Vec<usize> = self.local_occurrences(node).into_iter().map(|(s, _)| s).collect();
        seqs.sort_unstable();
        seqs.dedup();
        seqs.len()
    }

    /// 是否有某个出现恰好在序列末尾结束（SA 区间内最小的后缀最短）
    pub fn is_right_terminal(&self, node: &Node) -> bool {
        self.text.suffix_len(self.sa[node.lo] as usize) == node.rep_length
    }

    /// 字符串深度 `depth` 处的符号；后缀在此之前结束时为 `None`
    pub fn symbol_at(&self, sa_index: usize, depth: usize) -> Option<u8> {
        let p = self.sa[sa_index] as usize;
        (self.text.suffix_len(p) > depth).then(|| self.text.concat()[p + depth])
    }

    /// 全部子节点，包括 `$` 叶子
    pub fn children(&self, node: &Node) -> Children<'a> {
        let next = if node.is_leaf() {
            None
        } else {
            Some(self.first_child_boundary(node.lo, node.hi, node.rep_length))
        };
        Children {
            tree: *self,
            parent: *node,
            lo: node.lo,
            boundary: next,
            done: node.is_leaf(),
        }
    }

    pub fn count_children(&self, node: &Node) -> usize {
        self.children(node).count()
    }
}

/// 节点的子节点，按字典序
#[derive(Debug, Clone)]
pub struct Children<'a> {
    tree: Tree<'a>,
    parent: Node,
    lo: usize,
    boundary: Option<usize>,
    done: bool,
}

impl Iterator for Children<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if self.done {
            return None;
        }
        let lo = self.lo;
        let hi = match self.boundary {
            Some(k) => {
                self.boundary = self
                    .tree
                    .next_child_boundary(k, self.parent.hi, self.parent.rep_length);
                k
            }
            None => {
                self.done = true;
                self.parent.hi
            }
        };
        self.lo = hi;
        Some(Node {
            lo,
            hi,
            rep_length: self.tree.depth(lo, hi),
            parent_rep_length: self.parent.rep_length,
        })
    }
}

impl Index<'_> {
    /// 节点查询视图；需要 SA 与 LCP 已构建
    pub fn tree(&self) -> Result<Tree<'_>> {
        Tree::new(self)
    }

    /// 自顶向下迭代器；需要子表已构建。`$` 叶子被跳过
    pub fn top_down(&self) -> Result<TopDown<'_>> {
        TopDown::new(self)
    }

    pub fn top_down_history(&self, order: DfsOrder) -> Result<TopDownHistory<'_>> {
        TopDownHistory::new(self, order)
    }

    pub fn top_down_history_with(&self, order: DfsOrder, edges: EmptyEdges) -> Result<TopDownHistory<'_>> {
        TopDownHistory::with_empty_edges(self, order, edges)
    }

    /// 后序自底向上遍历；只需要 SA 与 LCP。`$` 叶子被跳过
    pub fn bottom_up(&self) -> Result<BottomUp<'_>> {
        BottomUp::new(self)
    }

    pub fn bottom_up_with(&self, edges: EmptyEdges) -> Result<BottomUp<'_>> {
        BottomUp::with_empty_edges(self, edges)
    }

    /// 先序遍历，谓词为假的节点连同其子树被跳过
    pub fn pruned<P>(&self, predicate: P) -> Result<Pruned<'_, P>>
    where
        P: FnMut(&Node) -> bool,
    {
        Pruned::new(self, predicate)
    }

    /// 长度不小于 `min_len` 的极大重复；需要 SA、LCP 与 BWT
    pub fn max_repeats(&self, min_len: usize) -> Result<MaxRepeats<'_>> {
        MaxRepeats::new(self, min_len)
    }

    pub fn super_max_repeats(&self, min_len: usize) -> Result<SuperMaxRepeats<'_>> {
        SuperMaxRepeats::new(self, min_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built(seqs: &[&str]) -> Index<'static> {
        let mut index = Index::from_sequences(seqs);
        index.require(Fibre::ChildTab).unwrap();
        index
    }

    fn count_substring(text: &Text<'_>, pat: &[u8]) -> usize {
        text.sequences()
            .map(|s| {
                if pat.len() > s.len() {
                    0
                } else {
                    s.windows(pat.len()).filter(|w| *w == pat).count()
                }
            })
            .sum()
    }

    #[test]
    fn node_equality_ignores_depth() {
        let a = Node { lo: 1, hi: 4, rep_length: 2, parent_rep_length: 0 };
        let b = Node { lo: 1, hi: 4, rep_length: 9, parent_rep_length: 3 };
        assert_eq!(a, b);
        assert_ne!(a, Node { lo: 1, hi: 3, ..a });
    }

    #[test]
    fn root_of_mississippi() {
        let index = built(&["mississippi"]);
        let tree = index.tree().unwrap();
        let root = tree.root().unwrap();
        assert_eq!(root.range(), 0..11);
        assert_eq!(root.rep_length, 0);
        let labels: Vec<&[u8]> = tree
            .children(&root)
            .map(|c| &tree.representative(&c)[..1])
            .collect();
        assert_eq!(labels, vec![&b"i"[..], &b"m"[..], &b"p"[..], &b"s"[..]]);
        assert_eq!(tree.count_children(&root), 4);
    }

    #[test]
    fn children_agree_with_and_without_child_table() {
        let mut with = Index::from_sequences(["abracadabra", "cadabra"]);
        with.require(Fibre::ChildTab).unwrap();
        let mut without = Index::from_sequences(["abracadabra", "cadabra"]);
        without.require(Fibre::Lcp).unwrap();

        let a = with.tree().unwrap();
        let b = without.tree().unwrap();
        assert!(a.child_tab().is_some());
        assert!(b.child_tab().is_none());

        let mut stack = vec![a.root().unwrap()];
        while let Some(node) = stack.pop() {
            let ca: Vec<Node> = a.children(&node).collect();
            let cb: Vec<Node> = b.children(&node).collect();
            assert_eq!(ca, cb);
            for (x, y) in ca.iter().zip(&cb) {
                assert_eq!(x.rep_length, y.rep_length);
                assert_eq!(x.parent_rep_length, node.rep_length);
            }
            stack.extend(ca);
        }
    }

    #[test]
    fn internal_occurrences_match_brute_force() {
        let index = built(&["caterpillar", "catwoman", "pillow", "willow", "ill", "wow"]);
        let tree = index.tree().unwrap();
        let mut stack = vec![tree.root().unwrap()];
        while let Some(node) = stack.pop() {
            if !node.is_leaf() && node.rep_length > 0 {
                let rep = tree.representative(&node);
                assert_eq!(node.count_occurrences(), count_substring(tree.text(), rep));
                for (s, o) in tree.local_occurrences(&node) {
                    assert_eq!(&tree.text().sequence(s)[o..o + rep.len()], rep);
                }
            }
            stack.extend(tree.children(&node));
        }
    }

    #[test]
    fn unary_text_queries() {
        let index = built(&["aaaa"]);
        let tree = index.tree().unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.representative(&root), b"a");
        assert!(tree.is_right_terminal(&root));
        let kids: Vec<Node> = tree.children(&root).collect();
        assert_eq!(kids.len(), 2);
        assert!(kids[0].is_leaf());
        assert!(tree.parent_edge_label(&kids[0]).is_empty());
        assert_eq!(tree.parent_edge_label(&kids[1]), b"a");
    }

    #[test]
    fn count_sequences_dedups() {
        let index = built(&["abab", "ab", "b"]);
        let tree = index.tree().unwrap();
        let root = tree.root().unwrap();
        let b_node = tree
            .children(&root)
            .find(|c| tree.representative(c).starts_with(b"b"))
            .unwrap();
        assert_eq!(b_node.count_occurrences(), 4);
        assert_eq!(tree.count_sequences(&b_node), 3);
    }

    #[test]
    fn empty_index_has_no_root() {
        let mut index = Index::borrowed(b"");
        index.require(Fibre::ChildTab).unwrap();
        assert!(index.tree().unwrap().root().is_none());
    }
}
