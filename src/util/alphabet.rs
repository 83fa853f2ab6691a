/// 文本中实际出现的符号到紧凑秩 `0..sigma` 的映射（保持字节序）。
///
/// DC3 的基数排序按字母表大小分配计数桶，先压缩字母表可以让
/// 桶数与 `sigma` 而不是 256 成正比。
#[derive(Debug, Clone)]
pub struct Alphabet {
    rank: [u32; 256],
    sigma: usize,
}

impl Alphabet {
    pub fn of(text: &[u8]) -> Self {
        let mut seen = [false; 256];
        for &b in text {
            seen[b as usize] = true;
        }
        let mut rank = [0u32; 256];
        let mut sigma = 0usize;
        for (c, &present) in seen.iter().enumerate() {
            if present {
                rank[c] = sigma as u32;
                sigma += 1;
            }
        }
        Self { rank, sigma }
    }

    #[inline]
    pub fn rank(&self, b: u8) -> u32 {
        self.rank[b as usize]
    }

    pub fn sigma(&self) -> usize {
        self.sigma
    }
}

/// 规范化 DNA 序列：大写化，U→T，其它非 ACGTN 字符记为 N。
pub fn normalize_dna(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|&b| {
            let up = b.to_ascii_uppercase();
            match up {
                b'A' | b'C' | b'G' | b'T' | b'N' => up,
                b'U' => b'T',
                _ => b'N',
            }
        })
        .collect()
}

/// 可打印形式，非图形字符转义为 `\xNN`
pub fn printable(seq: &[u8]) -> String {
    seq.iter().flat_map(|&b| std::ascii::escape_default(b)).map(char::from).collect()
}
