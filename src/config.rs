//! 各 fibre 的默认构建算法选择与索引元信息。

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 后缀数组构建算法。所有算法输出完全相同的数组。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum SaAlgorithm {
    /// DC3 / Skew（Kärkkäinen–Sanders），线性时间
    #[default]
    #[value(name = "skew3")]
    Skew3,
    /// 倍增法，O(n log² n)
    PrefixDoubling,
    /// 有界后缀的直接比较排序（大输入使用 rayon 并行）
    ParallelSort,
}

/// LCP 表构建算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum LcpAlgorithm {
    /// Kasai et al.，使用独立的逆后缀数组
    #[default]
    Kasai,
    /// 逆后缀数组复用输出缓冲区，仅支持 n < 2^31
    KasaiInPlace,
}

/// 子表（child table）构建算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum ChildTabAlgorithm {
    /// 先 up/down，再 nextl
    #[default]
    TwoPass,
    /// 单遍扫描输出 (slot, value)，排序后写回
    Streaming,
}

impl fmt::Display for SaAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SaAlgorithm::Skew3 => "skew3",
            SaAlgorithm::PrefixDoubling => "prefix-doubling",
            SaAlgorithm::ParallelSort => "parallel-sort",
        })
    }
}

impl fmt::Display for LcpAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LcpAlgorithm::Kasai => "kasai",
            LcpAlgorithm::KasaiInPlace => "kasai-in-place",
        })
    }
}

impl fmt::Display for ChildTabAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChildTabAlgorithm::TwoPass => "two-pass",
            ChildTabAlgorithm::Streaming => "streaming",
        })
    }
}

/// `Index::require` 在 fibre 缺失时使用的构建算法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    pub sa: SaAlgorithm,
    pub lcp: LcpAlgorithm,
    pub child_tab: ChildTabAlgorithm,
}

impl IndexConfig {
    pub fn with_sa(mut self, sa: SaAlgorithm) -> Self {
        self.sa = sa;
        self
    }

    pub fn with_lcp(mut self, lcp: LcpAlgorithm) -> Self {
        self.lcp = lcp;
        self
    }

    pub fn with_child_tab(mut self, child_tab: ChildTabAlgorithm) -> Self {
        self.child_tab = child_tab;
        self
    }
}

/// 索引元信息（随索引一同保存为 `<prefix>.meta`）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// 原始输入文件
    pub source: Option<String>,
    /// 各序列名称，顺序与文本中的序列编号一致
    pub sequence_names: Vec<String>,
    pub build_args: Option<String>,
    /// RFC 3339 时间戳
    pub build_timestamp: Option<String>,
}

impl IndexMeta {
    /// 序列名称；缺失时退化为 `seq<i>`
    pub fn sequence_name(&self, seq: usize) -> String {
        self.sequence_names
            .get(seq)
            .cloned()
            .unwrap_or_else(|| format!("seq{}", seq))
    }
}
