use std::borrow::Cow;

/// 索引的原始文本 fibre：单条序列，或多条序列的虚拟拼接。
///
/// 拼接中不插入分隔符；每条序列末尾有一个隐式哨兵 `$_i`，
/// 满足 `$_0 < $_1 < … <` 任意真实符号。因此后缀比较永远不会
/// 越过序列边界，[`Text::suffix`] 返回的切片也止于所在序列的末尾。
///
/// 单序列可以借用调用方的数据（[`Text::borrowed`]），此时生命周期
/// `'t` 保证文本活得比索引久。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text<'t> {
    concat: Cow<'t, [u8]>,
    /// limits[i] 为第 i 条序列的全局起点，末尾追加总长度
    limits: Vec<usize>,
}

impl<'t> Text<'t> {
    /// 借用一条序列，不复制
    pub fn borrowed(seq: &'t [u8]) -> Self {
        Self {
            limits: vec![0, seq.len()],
            concat: Cow::Borrowed(seq),
        }
    }

    /// 拼接多条序列（可以包含空序列）
    pub fn from_sequences<I, S>(seqs: I) -> Text<'static>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut concat = Vec::new();
        let mut limits = vec![0];
        for s in seqs {
            concat.extend_from_slice(s.as_ref());
            limits.push(concat.len());
        }
        Text {
            concat: Cow::Owned(concat),
            limits,
        }
    }

    /// 由拼接文本与序列边界直接构造；边界须以 0 开头、以总长度结尾且单调不减
    pub(crate) fn from_parts(concat: Vec<u8>, limits: Vec<usize>) -> Option<Text<'static>> {
        let well_formed = limits.first() == Some(&0)
            && limits.last() == Some(&concat.len())
            && limits.windows(2).all(|w| w[0] <= w[1]);
        if !well_formed {
            return None;
        }
        Some(Text {
            concat: Cow::Owned(concat),
            limits,
        })
    }

    pub fn into_owned(self) -> Text<'static> {
        Text {
            concat: Cow::Owned(self.concat.into_owned()),
            limits: self.limits,
        }
    }

    /// 拼接后的总长度
    #[inline]
    pub fn len(&self) -> usize {
        self.concat.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.concat.is_empty()
    }

    pub fn seq_count(&self) -> usize {
        self.limits.len() - 1
    }

    #[inline]
    pub fn concat(&self) -> &[u8] {
        &self.concat
    }

    pub fn limits(&self) -> &[usize] {
        &self.limits
    }

    pub fn sequence(&self, seq: usize) -> &[u8] {
        &self.concat[self.limits[seq]..self.limits[seq + 1]]
    }

    pub fn seq_len(&self, seq: usize) -> usize {
        self.limits[seq + 1] - self.limits[seq]
    }

    pub fn sequences(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.seq_count()).map(move |i| self.sequence(i))
    }

    /// 全局位置 → (序列编号, 序列内偏移)。空序列不占位置，不会被返回。
    pub fn to_local(&self, pos: usize) -> (usize, usize) {
        debug_assert!(pos < self.len());
        let seq = self.limits.partition_point(|&start| start <= pos) - 1;
        (seq, pos - self.limits[seq])
    }

    pub fn to_global(&self, seq: usize, offset: usize) -> usize {
        debug_assert!(offset < self.seq_len(seq));
        self.limits[seq] + offset
    }

    /// 从全局位置开始、止于所在序列末尾的后缀
    pub fn suffix(&self, pos: usize) -> &[u8] {
        let (seq, _) = self.to_local(pos);
        &self.concat[pos..self.limits[seq + 1]]
    }

    #[inline]
    pub fn suffix_len(&self, pos: usize) -> usize {
        let (seq, _) = self.to_local(pos);
        self.limits[seq + 1] - pos
    }

    /// 该位置是否为某条序列的第一个符号
    pub fn is_seq_start(&self, pos: usize) -> bool {
        self.limits.binary_search(&pos).is_ok()
    }

    /// 按隐式哨兵规则比较两个后缀，结果与所有 SA 构建算法一致
    pub fn cmp_suffixes(&self, a: usize, b: usize) -> std::cmp::Ordering {
        let (sa, _) = self.to_local(a);
        let (sb, _) = self.to_local(b);
        let xa = &self.concat[a..self.limits[sa + 1]];
        let xb = &self.concat[b..self.limits[sb + 1]];
        xa.cmp(xb).then(sa.cmp(&sb))
    }
}

impl Default for Text<'static> {
    fn default() -> Self {
        Text::from_sequences(std::iter::empty::<&[u8]>())
    }
}
