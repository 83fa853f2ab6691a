//! DC3 / Skew 后缀排序（Kärkkäinen & Sanders, 2003）。
//!
//! 输入符号取值 `1..=k`，0 仅作为末尾的三个填充位。输入中的哨兵互不相同，
//! 因此任意两个后缀都不相等。

/// 返回整数串 `s` 的后缀数组。`s` 的符号须在 `1..=k` 之间。
pub(crate) fn suffix_array(s: &[usize], k: usize) -> Vec<usize> {
    let n = s.len();
    match n {
        0 => return Vec::new(),
        1 => return vec![0],
        _ => {}
    }
    let mut padded = Vec::with_capacity(n + 3);
    padded.extend_from_slice(s);
    padded.extend_from_slice(&[0, 0, 0]);
    let mut sa = vec![0usize; n];
    dc3(&padded, &mut sa, n, k);
    sa
}

#[inline]
fn leq2(a1: usize, a2: usize, b1: usize, b2: usize) -> bool {
    a1 < b1 || (a1 == b1 && a2 <= b2)
}

#[inline]
fn leq3(a1: usize, a2: usize, a3: usize, b1: usize, b2: usize, b3: usize) -> bool {
    a1 < b1 || (a1 == b1 && leq2(a2, a3, b2, b3))
}

/// 按 `r[x + offset]` 把 `a` 稳定地基数排序到 `b`，键取值 `0..=k`
fn radix_pass(a: &[usize], b: &mut [usize], r: &[usize], offset: usize, k: usize) {
    let mut count = vec![0usize; k + 1];
    for &x in a {
        count[r[x + offset]] += 1;
    }
    let mut sum = 0;
    for c in count.iter_mut() {
        let t = *c;
        *c = sum;
        sum += t;
    }
    for &x in a {
        let key = r[x + offset];
        b[count[key]] = x;
        count[key] += 1;
    }
}

/// `s` 长度为 n+3 且 `s[n..n+3] == 0`，n >= 2
fn dc3(s: &[usize], sa: &mut [usize], n: usize, k: usize) {
    let n0 = (n + 2) / 3;
    let n1 = (n + 1) / 3;
    let n2 = n / 3;
    let n02 = n0 + n2;

    let mut s12 = vec![0usize; n02 + 3];
    let mut sa12 = vec![0usize; n02 + 3];
    let mut s0 = vec![0usize; n0];
    let mut sa0 = vec![0usize; n0];

    // mod 1 与 mod 2 位置；n % 3 == 1 时额外加入一个虚拟的 mod 1 后缀
    let mut j = 0;
    for i in 0..(n + n0 - n1) {
        if i % 3 != 0 {
            s12[j] = i;
            j += 1;
        }
    }

    radix_pass(&s12[..n02], &mut sa12[..n02], s, 2, k);
    radix_pass(&sa12[..n02], &mut s12[..n02], s, 1, k);
    radix_pass(&s12[..n02], &mut sa12[..n02], s, 0, k);

    // 为三元组命名
    let mut name = 0;
    let mut last = (usize::MAX, usize::MAX, usize::MAX);
    for i in 0..n02 {
        let p = sa12[i];
        let triple = (s[p], s[p + 1], s[p + 2]);
        if triple != last {
            name += 1;
            last = triple;
        }
        if p % 3 == 1 {
            s12[p / 3] = name;
        } else {
            s12[p / 3 + n0] = name;
        }
    }

    if name < n02 {
        // 名字不唯一，递归
        dc3(&s12, &mut sa12, n02, name);
        for i in 0..n02 {
            s12[sa12[i]] = i + 1;
        }
    } else {
        for i in 0..n02 {
            sa12[s12[i] - 1] = i;
        }
    }

    // mod 0 后缀：按 sa12 中 mod 1 的顺序，再按首字符稳定排序
    let mut j = 0;
    for i in 0..n02 {
        if sa12[i] < n0 {
            s0[j] = 3 * sa12[i];
            j += 1;
        }
    }
    radix_pass(&s0, &mut sa0, s, 0, k);

    // 归并
    let pos12 = |t: usize| {
        if sa12[t] < n0 {
            sa12[t] * 3 + 1
        } else {
            (sa12[t] - n0) * 3 + 2
        }
    };
    let mut p = 0;
    let mut t = n0 - n1;
    let mut out = 0;
    while out < n {
        let i = pos12(t);
        let j = sa0[p];
        let take12 = if sa12[t] < n0 {
            leq2(s[i], s12[sa12[t] + n0], s[j], s12[j / 3])
        } else {
            leq3(s[i], s[i + 1], s12[sa12[t] - n0 + 1], s[j], s[j + 1], s12[j / 3 + n0])
        };
        if take12 {
            sa[out] = i;
            t += 1;
            if t == n02 {
                out += 1;
                while p < n0 {
                    sa[out] = sa0[p];
                    p += 1;
                    out += 1;
                }
                break;
            }
        } else {
            sa[out] = j;
            p += 1;
            if p == n0 {
                out += 1;
                while t < n02 {
                    sa[out] = pos12(t);
                    t += 1;
                    out += 1;
                }
                break;
            }
        }
        out += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(s: &[usize]) -> Vec<usize> {
        let mut sa: Vec<usize> = (0..s.len()).collect();
        sa.sort_by(|&a, &b| s[a..].cmp(&s[b..]));
        sa
    }

    #[test]
    fn skew_matches_naive_with_unique_terminator() {
        let mut x: u32 = 7;
        for len in 2..60 {
            let mut s: Vec<usize> = (0..len - 1)
                .map(|_| {
                    x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    2 + ((x >> 16) % 3) as usize
                })
                .collect();
            s.push(1);
            assert_eq!(suffix_array(&s, 4), naive(&s), "len={}", len);
        }
    }

    #[test]
    fn skew_unary_run() {
        let mut s = vec![2usize; 31];
        s.push(1);
        assert_eq!(suffix_array(&s, 2), naive(&s));
    }

    #[test]
    fn skew_tiny_inputs() {
        assert!(suffix_array(&[], 1).is_empty());
        assert_eq!(suffix_array(&[1], 1), vec![0]);
        assert_eq!(suffix_array(&[2, 1], 2), vec![1, 0]);
    }
}
