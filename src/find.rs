//! 基于索引的精确模式匹配。
//!
//! 模式串的全部出现对应 SA 上一段连续区间。两种定位方式：
//! 沿子表自顶向下（O(m)，需要子表），或在 SA 上二分（O(m log n)，只需 SA）。
//! 两者对同一模式返回完全相同的区间；未命中时区间为 `0..0`。

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use clap::ValueEnum;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{Fibre, Index};
use crate::stree::{EmptyEdges, TopDown, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum FindAlgorithm {
    /// 子表驱动的下降
    #[default]
    TopDown,
    /// SA 上的二分查找
    BinarySearch,
}

impl fmt::Display for FindAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FindAlgorithm::TopDown => "top-down",
            FindAlgorithm::BinarySearch => "binary-search",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Finder<'a> {
    tree: Tree<'a>,
    top_down: Option<TopDown<'a>>,
}

impl<'a> Finder<'a> {
    /// 有子表时自顶向下，否则二分；至少需要 SA 与 LCP
    pub fn new(index: &'a Index<'_>) -> Result<Self> {
        let algorithm = if index.supplied(Fibre::ChildTab) {
            FindAlgorithm::TopDown
        } else {
            FindAlgorithm::BinarySearch
        };
        Self::with_algorithm(index, algorithm)
    }

    pub fn with_algorithm(index: &'a Index<'_>, algorithm: FindAlgorithm) -> Result<Self> {
        let tree = Tree::new(index)?;
        let top_down = match algorithm {
            FindAlgorithm::TopDown => Some(TopDown::from_tree(tree, EmptyEdges::Hide)?),
            FindAlgorithm::BinarySearch => None,
        };
        Ok(Self { tree, top_down })
    }

    pub fn algorithm(&self) -> FindAlgorithm {
        if self.top_down.is_some() {
            FindAlgorithm::TopDown
        } else {
            FindAlgorithm::BinarySearch
        }
    }

    /// 以 `pattern` 为前缀的后缀在 SA 中的区间；空模式得到整个 SA
    pub fn sa_range(&self, pattern: &[u8]) -> Range<usize> {
        let range = match &self.top_down {
            Some(cursor) => {
                let mut it = cursor.clone();
                match it.go_down_pattern(pattern).then(|| it.node()).flatten() {
                    Some(node) => node.range(),
                    None => 0..0,
                }
            }
            None => self.binary_search(pattern),
        };
        if range.is_empty() {
            0..0
        } else {
            range
        }
    }

    fn binary_search(&self, pattern: &[u8]) -> Range<usize> {
        let text = self.tree.text();
        let cmp = |&p: &u32| {
            let suffix = text.suffix(p as usize);
            let k = suffix.len().min(pattern.len());
            suffix[..k].cmp(pattern)
        };
        let sa = self.tree.sa();
        let lo = sa.partition_point(|p| cmp(p) == Ordering::Less);
        let hi = lo + sa[lo..].partition_point(|p| cmp(p) == Ordering::Equal);
        lo..hi
    }

    pub fn count(&self, pattern: &[u8]) -> usize {
        self.sa_range(pattern).len()
    }

    /// 出现位置（全局坐标，SA 顺序）
    pub fn occurrences(&self, pattern: &[u8]) -> &'a [u32] {
        &self.tree.sa()[self.sa_range(pattern)]
    }

    /// 出现位置映射为 (序列编号, 偏移)，按位置排序
    pub fn local_occurrences(&self, pattern: &[u8]) -> Vec<(usize, usize)> {
        let mut hits: Vec<(usize, usize)> = self
            .occurrences(pattern)
            .iter()
            .map(|&p| self.tree.text().to_local(p as usize))
            .collect();
        hits.sort_unstable();
        hits
    }

    /// 并行查找一批模式，结果与输入顺序一致
    pub fn sa_ranges<P>(&self, patterns: &[P]) -> Vec<Range<usize>>
    where
        P: AsRef<[u8]> + Sync,
    {
        patterns.par_iter().map(|p| self.sa_range(p.as_ref())).collect()
    }
}

impl Index<'_> {
    pub fn finder(&self) -> Result<Finder<'_>> {
        Finder::new(self)
    }
}
