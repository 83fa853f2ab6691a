//! 子表（child table）：把 up / down / nextlIndex 三种链接压进一个数组，
//! 只依赖 LCP 表即可在 O(1) 内找到 lcp 区间的子区间边界。
//!
//! 约定 `L[0] = L[n] = -1`（虚拟值，LCP 表本身的 `lcp[0]` 为 0）：
//!
//! - `cld[i-1] = up[i]`，当 `L[i-1] > L[i]`；
//! - `cld[i] = nextlIndex[i]`，当其存在（覆盖 down）；
//! - 否则 `cld[i] = down[i]`，当 `L[i+1] > L[i]`。
//!
//! 三者写入的槽位互不冲突（nextl 与 down 共用槽位时 nextl 优先），
//! 解码规则见 [`first_boundary`] 与 [`next_boundary`]。未使用的槽位为 0，
//! 而任何合法链接都不小于 1。

use std::time::Instant;

use log::debug;

use crate::config::ChildTabAlgorithm;

/// 扩展的 LCP 值：两端为 -1
#[inline]
fn ext(lcp: &[u32], i: usize) -> i64 {
    if i == 0 || i >= lcp.len() {
        -1
    } else {
        lcp[i] as i64
    }
}

/// 由 LCP 表构建子表。纯函数，不需要 SA 与文本。
pub fn build_child_tab(lcp: &[u32], algo: ChildTabAlgorithm) -> Vec<u32> {
    let start = Instant::now();
    let cld = match algo {
        ChildTabAlgorithm::TwoPass => two_pass(lcp),
        ChildTabAlgorithm::Streaming => streaming(lcp),
    };
    debug!(
        "built child table with {}: n={} in {:.3}s",
        algo,
        lcp.len(),
        start.elapsed().as_secs_f64()
    );
    cld
}

fn two_pass(lcp: &[u32]) -> Vec<u32> {
    let n = lcp.len();
    let mut cld = vec![0u32; n];
    if n < 2 {
        return cld;
    }

    // up / down
    let mut stack: Vec<usize> = vec![0];
    let mut last: Option<usize> = None;
    for i in 1..=n {
        let li = ext(lcp, i);
        while let Some(&top) = stack.last() {
            if li >= ext(lcp, top) {
                break;
            }
            stack.pop();
            last = Some(top);
            let below = stack[stack.len() - 1];
            if li <= ext(lcp, below) && ext(lcp, below) != ext(lcp, top) {
                cld[below] = top as u32;
            }
        }
        if let Some(up) = last.take() {
            cld[i - 1] = up as u32;
        }
        stack.push(i);
    }

    // nextlIndex
    stack.clear();
    stack.push(0);
    for i in 1..n {
        let li = ext(lcp, i);
        while li < ext(lcp, stack[stack.len() - 1]) {
            stack.pop();
        }
        let top = stack[stack.len() - 1];
        if li == ext(lcp, top) {
            stack.pop();
            cld[top] = i as u32;
        }
        stack.push(i);
    }
    cld
}

/// 单遍扫描：两个栈同时推进，按 (槽位, 值) 输出链接，排序后顺序写出。
/// 同一轮中 nextl 先于 down 计算；槽位相同时 down 被丢弃。
fn streaming(lcp: &[u32]) -> Vec<u32> {
    let n = lcp.len();
    let mut cld = vec![0u32; n];
    if n < 2 {
        return cld;
    }

    let mut links: Vec<(u32, u32)> = Vec::with_capacity(n);
    let mut updown: Vec<usize> = vec![0];
    let mut nextl: Vec<usize> = vec![0];
    for i in 1..=n {
        let li = ext(lcp, i);

        let mut nextl_slot = None;
        if i < n {
            while li < ext(lcp, nextl[nextl.len() - 1]) {
                nextl.pop();
            }
            let top = nextl[nextl.len() - 1];
            if li == ext(lcp, top) {
                nextl.pop();
                links.push((top as u32, i as u32));
                nextl_slot = Some(top);
            }
            nextl.push(i);
        }

        let mut last = None;
        while li < ext(lcp, updown[updown.len() - 1]) {
            let top = updown.pop().unwrap_or_default();
            last = Some(top);
            let below = updown[updown.len() - 1];
            if li <= ext(lcp, below) && ext(lcp, below) != ext(lcp, top) && nextl_slot != Some(below) {
                links.push((below as u32, top as u32));
            }
        }
        if let Some(up) = last {
            links.push(((i - 1) as u32, up as u32));
        }
        updown.push(i);
    }

    links.sort_unstable_by_key(|&(slot, _)| slot);
    for (slot, value) in links {
        cld[slot as usize] = value;
    }
    cld
}

/// 区间 `[lo, hi)`（`hi - lo >= 2`）的第一个子区间边界，即第一个 ℓ-index。
#[inline]
pub fn first_boundary(cld: &[u32], lo: usize, hi: usize) -> usize {
    debug_assert!(hi - lo >= 2);
    let up = cld[hi - 1] as usize;
    if lo < up && up < hi {
        up
    } else {
        cld[lo] as usize
    }
}

/// ℓ-index `k` 之后的下一个 ℓ-index；`cld[k]` 是 nextl 链接当且仅当
/// `k < cld[k] < n` 且 `lcp[cld[k]] == lcp[k]`。
#[inline]
pub fn next_boundary(lcp: &[u32], cld: &[u32], k: usize) -> Option<usize> {
    let n = lcp.len();
    if k >= n {
        return None;
    }
    let v = cld[k] as usize;
    (v > k && v < n && lcp[v] == lcp[k]).then_some(v)
}

/// lcp 区间 `[lo, hi)` 的字符串深度：叶子不在此处理，由调用方根据后缀长度给出
#[inline]
pub fn interval_depth(lcp: &[u32], cld: &[u32], lo: usize, hi: usize) -> usize {
    lcp[first_boundary(cld, lo, hi)] as usize
}
