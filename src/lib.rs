//! # esa-rust
//!
//! 增强后缀数组（Enhanced Suffix Array）索引。
//!
//! 索引由若干 fibre 组成，按需构建、构建后只读：
//!
//! - **原始文本**：单条序列，或多条序列的虚拟拼接（每条序列末尾带隐式哨兵）
//! - **后缀数组**：DC3、倍增或并行排序，结果一致
//! - **LCP 表**：Kasai，或复用输出缓冲区的原地版本
//! - **子表**：up / down / nextl 三种链接压在一个数组里
//! - **BWT**
//!
//! 在这些平坦数组之上提供隐式后缀树的遍历（自顶向下、带父链接的
//! 先序 / 后序、自底向上、带剪枝），以及精确匹配与重复查找。
//!
//! ## 快速示例
//!
//! ```rust
//! use esa_rust::index::{Fibre, Index};
//!
//! let mut index = Index::from_sequences(["caterpillar", "catwoman", "pillow"]);
//! index.require(Fibre::ChildTab).unwrap();
//!
//! let finder = index.finder().unwrap();
//! assert_eq!(finder.count(b"cat"), 2);
//! assert_eq!(finder.local_occurrences(b"illow"), vec![(2, 1)]);
//!
//! // 出现至少两次的子串对应后缀树内部节点
//! let repeated = index
//!     .bottom_up()
//!     .unwrap()
//!     .filter(|n| !n.is_leaf() && n.rep_length >= 3)
//!     .count();
//! assert!(repeated > 0);
//! ```
//!
//! ## 模块说明
//!
//! - [`index`]：fibre 构建、索引容器与持久化
//! - [`stree`]：后缀树迭代器、节点查询与重复查找
//! - [`find`]：精确模式匹配
//! - [`config`]：构建算法选择与索引元信息
//! - [`error`]：错误类型
//! - [`io`]：FASTA 解析
//! - [`util`]：字母表工具

pub mod config;
pub mod error;
pub mod find;
pub mod index;
pub mod io;
pub mod stree;
pub mod util;

pub use error::{IndexError, Result};
pub use find::{FindAlgorithm, Finder};
pub use index::{Fibre, Index, Text};
