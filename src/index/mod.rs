//! 增强后缀数组（ESA）各 fibre 及其容器。

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod bwt;
pub mod childtab;
pub mod esa;
pub mod lcp;
pub mod persist;
pub mod sa;
mod skew;
pub mod text;

pub use bwt::Bwt;
pub use esa::Index;
pub use text::Text;

/// 索引中的一种数据数组。依赖顺序固定：
/// RawText → Sa → {Lcp, Bwt} → ChildTab。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fibre {
    RawText,
    Sa,
    Lcp,
    ChildTab,
    Bwt,
}

impl Fibre {
    pub const ALL: [Fibre; 5] = [Fibre::RawText, Fibre::Sa, Fibre::Lcp, Fibre::ChildTab, Fibre::Bwt];

    /// 构建该 fibre 前必须已经存在的 fibre
    pub fn dependency(self) -> Option<Fibre> {
        match self {
            Fibre::RawText => None,
            Fibre::Sa => Some(Fibre::RawText),
            Fibre::Lcp | Fibre::Bwt => Some(Fibre::Sa),
            Fibre::ChildTab => Some(Fibre::Lcp),
        }
    }

    /// 持久化文件的扩展名
    pub fn extension(self) -> &'static str {
        match self {
            Fibre::RawText => "txt",
            Fibre::Sa => "sa",
            Fibre::Lcp => "lcp",
            Fibre::ChildTab => "child",
            Fibre::Bwt => "bwt",
        }
    }
}

impl fmt::Display for Fibre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fibre::RawText => "raw text",
            Fibre::Sa => "suffix array",
            Fibre::Lcp => "LCP table",
            Fibre::ChildTab => "child table",
            Fibre::Bwt => "BWT",
        })
    }
}
