//! 输入文件解析。

pub mod fasta;
