//! 极大重复与超极大重复，基于自底向上遍历。
//!
//! 内部节点天然右极大；左极大性由子树内各出现位置的左邻符号（取自 BWT）
//! 合并得到，序列起点视为与任何符号都不同。

use std::collections::HashSet;

use super::{BottomUp, EmptyEdges, Node, Tree};
use crate::error::Result;
use crate::index::{Bwt, Index};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeftContext {
    Uniform(u8),
    Diverse,
}

impl LeftContext {
    fn merge(self, other: LeftContext) -> LeftContext {
        match (self, other) {
            (LeftContext::Uniform(a), LeftContext::Uniform(b)) if a == b => self,
            _ => LeftContext::Diverse,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    lo: usize,
    ctx: LeftContext,
    leaf: bool,
    /// 子节点全是叶子且左邻符号两两不同
    unique_leaves: bool,
}

/// 一个极大重复：后缀树内部节点及其出现位置
#[derive(Debug, Clone, Copy)]
pub struct MaxRepeat<'a> {
    tree: Tree<'a>,
    node: Node,
}

impl<'a> MaxRepeat<'a> {
    pub fn node(&self) -> Node {
        self.node
    }

    pub fn length(&self) -> usize {
        self.node.rep_length
    }

    pub fn representative(&self) -> &'a [u8] {
        self.tree.representative(&self.node)
    }

    pub fn count(&self) -> usize {
        self.node.count_occurrences()
    }

    pub fn occurrences(&self) -> &'a [u32] {
        self.tree.occurrences(&self.node)
    }

    pub fn local_occurrences(&self) -> Vec<(usize, usize)> {
        self.tree.local_occurrences(&self.node)
    }
}

/// 长度不小于 `min_len` 的全部极大重复，按后序给出。需要 SA、LCP 与 BWT。
#[derive(Debug, Clone)]
pub struct MaxRepeats<'a> {
    nodes: BottomUp<'a>,
    bwt: &'a Bwt,
    min_len: usize,
    supermaximal: bool,
    stack: Vec<Frame>,
    /// 超极大判定时已见过的左邻符号，节点间复用
    seen: HashSet<u8>,
}

impl<'a> MaxRepeats<'a> {
    pub fn new(index: &'a Index<'_>, min_len: usize) -> Result<Self> {
        Ok(Self {
            bwt: index.bwt()?,
            // 每个出现的左邻符号都要参与合并，$ 叶子不能跳过
            nodes: BottomUp::with_empty_edges(index, EmptyEdges::Show)?,
            min_len: min_len.max(1),
            supermaximal: false,
            stack: Vec::new(),
            seen: HashSet::new(),
        })
    }

    fn leaf_context(&self, i: usize) -> LeftContext {
        let tree = self.nodes.tree();
        if tree.text().is_seq_start(tree.sa()[i] as usize) {
            return LeftContext::Diverse;
        }
        self.bwt.get(i).map_or(LeftContext::Diverse, LeftContext::Uniform)
    }

    /// 弹出 `node` 的全部子节点（后序下它们位于栈顶），合并出节点的帧
    fn absorb(&mut self, node: &Node) -> Frame {
        if node.is_leaf() {
            return Frame {
                lo: node.lo,
                ctx: self.leaf_context(node.lo),
                leaf: true,
                unique_leaves: false,
            };
        }
        let mut ctx: Option<LeftContext> = None;
        let mut unique_leaves = self.supermaximal;
        self.seen.clear();
        while let Some(&child) = self.stack.last() {
            if child.lo < node.lo {
                break;
            }
            self.stack.pop();
            ctx = Some(ctx.map_or(child.ctx, |c| c.merge(child.ctx)));
            unique_leaves = unique_leaves
                && child.leaf
                && match child.ctx {
                    LeftContext::Uniform(c) => self.seen.insert(c),
                    LeftContext::Diverse => true,
                };
        }
        Frame {
            lo: node.lo,
            ctx: ctx.unwrap_or(LeftContext::Diverse),
            leaf: false,
            unique_leaves,
        }
    }
}

impl<'a> Iterator for MaxRepeats<'a> {
    type Item = MaxRepeat<'a>;

    fn next(&mut self) -> Option<MaxRepeat<'a>> {
        loop {
            let node = self.nodes.next()?;
            let frame = self.absorb(&node);
            self.stack.push(frame);
            let report = !frame.leaf
                && node.rep_length >= self.min_len
                && frame.ctx == LeftContext::Diverse
                && (!self.supermaximal || frame.unique_leaves);
            if report {
                return Some(MaxRepeat {
                    tree: *self.nodes.tree(),
                    node,
                });
            }
        }
    }
}

/// 超极大重复：任何单符号扩展都至多出现一次的极大重复
#[derive(Debug, Clone)]
pub struct SuperMaxRepeats<'a>(MaxRepeats<'a>);

impl<'a> SuperMaxRepeats<'a> {
    pub fn new(index: &'a Index<'_>, min_len: usize) -> Result<Self> {
        let mut inner = MaxRepeats::new(index, min_len)?;
        inner.supermaximal = true;
        Ok(Self(inner))
    }
}

impl<'a> Iterator for SuperMaxRepeats<'a> {
    type Item = MaxRepeat<'a>;

    fn next(&mut self) -> Option<MaxRepeat<'a>> {
        self.0.next()
    }
}
