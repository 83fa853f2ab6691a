use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use super::skew;
use super::text::Text;
use crate::config::SaAlgorithm;
use crate::error::{IndexError, Result};
use crate::util::alphabet::Alphabet;

/// fibre 取值为 u32，`u32::MAX` 保留作内部标记
pub const MAX_TEXT_LEN: usize = u32::MAX as usize - 1;

/// 超过该长度时比较排序改用 rayon 并行
const PAR_SORT_THRESHOLD: usize = 100_000;

/// 构建后缀数组。SA 中存放拼接文本的全局位置；多序列时按隐式哨兵
/// `$_0 < $_1 < … <` 真实符号排序（见 [`Text::cmp_suffixes`]）。
pub fn build_sa(text: &Text<'_>, algo: SaAlgorithm) -> Result<Vec<u32>> {
    check_text_len(text)?;
    let n = text.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let start = Instant::now();
    let sa = match algo {
        SaAlgorithm::Skew3 => {
            let (s, k) = sentinel_string(text);
            let order = skew::suffix_array(&s, k);
            strip_sentinels(text, &s, order)
        }
        SaAlgorithm::PrefixDoubling => {
            let (s, _) = sentinel_string(text);
            let order = prefix_doubling(&s);
            strip_sentinels(text, &s, order)
        }
        SaAlgorithm::ParallelSort => sort_suffixes(text),
    };
    debug!(
        "built suffix array with {}: n={} seqs={} in {:.3}s",
        algo,
        n,
        text.seq_count(),
        start.elapsed().as_secs_f64()
    );
    Ok(sa)
}

pub(crate) fn check_text_len(text: &Text<'_>) -> Result<()> {
    if text.len() > MAX_TEXT_LEN {
        return Err(IndexError::TextTooLong {
            len: text.len(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

/// 带显式哨兵的整数串：`seq_0 $_0 seq_1 $_1 …`。
/// 哨兵 `$_i` 编码为 `i + 1`，真实符号编码为 `k + 1 + rank(c)`（k 为序列数），
/// 0 留给 DC3 的尾部填充。返回 (整数串, 最大符号)。
fn sentinel_string(text: &Text<'_>) -> (Vec<usize>, usize) {
    let alphabet = Alphabet::of(text.concat());
    let k = text.seq_count();
    let mut s = Vec::with_capacity(text.len() + k);
    for (i, seq) in text.sequences().enumerate() {
        s.extend(seq.iter().map(|&c| k + 1 + alphabet.rank(c) as usize));
        s.push(i + 1);
    }
    (s, k + alphabet.sigma())
}

/// 去掉哨兵位置，并把整数串位置映射回全局位置
fn strip_sentinels(text: &Text<'_>, s: &[usize], order: Vec<usize>) -> Vec<u32> {
    let k = text.seq_count();
    let mut global = vec![u32::MAX; s.len()];
    let mut g = 0u32;
    for (p, &c) in s.iter().enumerate() {
        if c > k {
            global[p] = g;
            g += 1;
        }
    }
    order
        .into_iter()
        .map(|p| global[p])
        .filter(|&g| g != u32::MAX)
        .collect()
}

/// 倍增法：按 (rank[i], rank[i+k]) 排序，直到所有秩互不相同。
fn prefix_doubling(s: &[usize]) -> Vec<usize> {
    let n = s.len();
    let mut sa: Vec<usize> = (0..n).collect();
    // 秩从 1 开始，0 表示越过末尾
    let mut rank: Vec<usize> = s.iter().map(|&c| c + 1).collect();
    let mut tmp: Vec<usize> = vec![0; n];

    let mut k = 1usize;
    loop {
        let key = |i: usize| (rank[i], if i + k < n { rank[i + k] } else { 0 });
        sa.sort_unstable_by_key(|&i| key(i));

        tmp[sa[0]] = 1;
        for i in 1..n {
            let a = sa[i - 1];
            let b = sa[i];
            tmp[b] = tmp[a] + usize::from(key(a) != key(b));
        }

        std::mem::swap(&mut rank, &mut tmp);
        if rank[sa[n - 1]] == n || k >= n {
            break;
        }
        k <<= 1;
    }
    sa
}

/// 直接比较有界后缀。与带哨兵的整数串顺序一致：
/// 前缀较短者在前，内容完全相同时按序列编号。
fn sort_suffixes(text: &Text<'_>) -> Vec<u32> {
    let n = text.len();
    let mut sa: Vec<u32> = (0..n as u32).collect();
    let cmp = |a: &u32, b: &u32| text.cmp_suffixes(*a as usize, *b as usize);
    if n > PAR_SORT_THRESHOLD {
        sa.par_sort_unstable_by(cmp);
    } else {
        sa.sort_unstable_by(cmp);
    }
    sa
}
