use std::time::Instant;

use log::debug;

use super::text::Text;
use super::Fibre;
use crate::config::LcpAlgorithm;
use crate::error::{IndexError, Result};

/// 置换阶段用于标记“尚未移动”的最高位
const MARK: u32 = 1 << 31;

/// 构建 LCP 表：`lcp[0] = 0`，`lcp[i]` 为 `suffix(sa[i-1])` 与 `suffix(sa[i])`
/// 的最长公共前缀长度（后缀止于所在序列末尾）。
pub fn build_lcp(text: &Text<'_>, sa: &[u32], algo: LcpAlgorithm) -> Result<Vec<u32>> {
    if sa.len() != text.len() {
        return Err(IndexError::inconsistent(
            Fibre::Sa,
            format!("suffix array has {} entries, text has {}", sa.len(), text.len()),
        ));
    }
    let start = Instant::now();
    let lcp = match algo {
        LcpAlgorithm::Kasai => kasai(text, sa),
        LcpAlgorithm::KasaiInPlace => {
            if text.len() >= MARK as usize {
                return Err(IndexError::construction(
                    Fibre::Lcp,
                    algo,
                    format!("text length {} needs the top bit of a 32-bit cell", text.len()),
                ));
            }
            kasai_in_place(text, sa)
        }
    };
    debug!(
        "built LCP table with {}: n={} in {:.3}s",
        algo,
        text.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(lcp)
}

/// 从 `h` 开始继续比较两个后缀
#[inline]
fn extend_match(text: &Text<'_>, a: usize, b: usize, mut h: usize) -> usize {
    let max = text.suffix_len(a).min(text.suffix_len(b));
    let t = text.concat();
    while h < max && t[a + h] == t[b + h] {
        h += 1;
    }
    h
}

fn kasai(text: &Text<'_>, sa: &[u32]) -> Vec<u32> {
    let n = sa.len();
    let mut isa = vec![0u32; n];
    for (r, &p) in sa.iter().enumerate() {
        isa[p as usize] = r as u32;
    }
    let mut lcp = vec![0u32; n];
    let mut h = 0usize;
    for i in 0..n {
        let r = isa[i] as usize;
        if r == 0 {
            h = 0;
            continue;
        }
        let j = sa[r - 1] as usize;
        h = extend_match(text, i, j, h);
        lcp[r] = h as u32;
        h = h.saturating_sub(1);
    }
    lcp
}

/// 与 [`kasai`] 相同，但逆后缀数组直接放在输出缓冲区中：
/// 先按文本位置写出带 MARK 的 PLCP，再沿置换环把它搬到 SA 顺序。
fn kasai_in_place(text: &Text<'_>, sa: &[u32]) -> Vec<u32> {
    let n = sa.len();
    let mut buf = vec![0u32; n];
    for (r, &p) in sa.iter().enumerate() {
        buf[p as usize] = r as u32;
    }

    let mut h = 0usize;
    for i in 0..n {
        let r = buf[i] as usize;
        if r == 0 {
            h = 0;
            buf[i] = MARK;
            continue;
        }
        let j = sa[r - 1] as usize;
        h = extend_match(text, i, j, h);
        buf[i] = h as u32 | MARK;
        h = h.saturating_sub(1);
    }

    // lcp[r] = plcp[sa[r]]
    for r in 0..n {
        if buf[r] & MARK == 0 {
            continue;
        }
        let first = buf[r];
        let mut j = r;
        loop {
            let src = sa[j] as usize;
            if src == r {
                break;
            }
            buf[j] = buf[src] & !MARK;
            j = src;
        }
        buf[j] = first & !MARK;
    }
    buf
}
