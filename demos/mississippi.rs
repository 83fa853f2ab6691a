//! 演示在 library 模式下构建索引、遍历隐式后缀树并查找重复。
//!
//! 运行方式：
//! ```bash
//! cargo run --example mississippi
//! ```

use esa_rust::index::{Fibre, Index};
use esa_rust::stree::DfsOrder;
use esa_rust::util::alphabet::printable;

fn main() -> esa_rust::Result<()> {
    // 1. 单条序列，直接借用
    let text = b"mississippi";
    let mut index = Index::borrowed(text);
    index.require_all(&[Fibre::ChildTab, Fibre::Bwt])?;

    println!(" i  SA  LCP  BWT  suffix");
    let tree = index.tree()?;
    for i in 0..index.len() {
        let p = index.sa_at(i)?;
        let bwt = index.bwt_at(i)?.map_or('$', char::from);
        println!(
            "{:>2}  {:>2}  {:>3}  {:>3}  {}",
            i,
            p,
            index.lcp_at(i)?,
            bwt,
            printable(tree.text().suffix(p))
        );
    }

    // 2. 先序遍历，按树深度缩进
    println!("\n后缀树（先序）：");
    let mut it = index.top_down_history(DfsOrder::Preorder)?;
    while let Some(node) = it.node() {
        println!(
            "{}[{}, {}) \"{}\" x{}",
            "  ".repeat(it.depth()),
            node.lo,
            node.hi,
            printable(it.representative()),
            node.count_occurrences()
        );
        it.go_next();
    }

    // 3. 精确匹配
    let finder = index.finder()?;
    for pattern in ["ssi", "issi", "pp", "sis", "x"] {
        let mut occ = finder.occurrences(pattern.as_bytes()).to_vec();
        occ.sort_unstable();
        println!("{:>5}: {:?}", pattern, occ);
    }

    // 4. 多序列输入与极大重复
    let mut set = Index::from_sequences(["caterpillar", "catwoman", "pillow", "willow", "ill", "wow"]);
    set.require_all(&[Fibre::Lcp, Fibre::Bwt])?;
    println!("\n长度 >= 3 的极大重复：");
    for rep in set.max_repeats(3)? {
        println!("  {:<8} {:?}", printable(rep.representative()), rep.local_occurrences());
    }
    Ok(())
}
