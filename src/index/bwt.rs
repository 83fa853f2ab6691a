use serde::{Deserialize, Serialize};

use super::text::Text;

/// BWT fibre：`values[i]` 为 `SA[i]` 前一个位置的符号。
///
/// 多序列时按拼接文本取前驱，只有全局位置 0 没有前驱，
/// 其 SA 下标记录在 `undefined` 中（该槽位的值为 0，不应读取）。
/// 其它序列起点的前驱是上一条序列的末尾符号，调用方需要时可用
/// [`Text::is_seq_start`] 判断。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bwt {
    values: Vec<u8>,
    undefined: Option<usize>,
}

impl Bwt {
    /// 根据后缀数组构建 BWT。
    pub fn build(text: &Text<'_>, sa: &[u32]) -> Self {
        let t = text.concat();
        let mut values = Vec::with_capacity(sa.len());
        let mut undefined = None;
        for (i, &p) in sa.iter().enumerate() {
            let p = p as usize;
            if p == 0 {
                undefined = Some(i);
                values.push(0);
            } else {
                values.push(t[p - 1]);
            }
        }
        Self { values, undefined }
    }

    pub(crate) fn from_parts(values: Vec<u8>, undefined: Option<usize>) -> Self {
        Self { values, undefined }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// SA 下标 `i` 处的前驱符号；未定义槽位返回 `None`
    #[inline]
    pub fn get(&self, i: usize) -> Option<u8> {
        if self.undefined == Some(i) {
            None
        } else {
            self.values.get(i).copied()
        }
    }

    pub fn undefined(&self) -> Option<usize> {
        self.undefined
    }

    /// 原始数组（未定义槽位为 0）
    pub fn values(&self) -> &[u8] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SaAlgorithm;
    use crate::index::sa::build_sa;

    #[test]
    fn bwt_mississippi() {
        let text = Text::borrowed(b"mississippi");
        let sa = build_sa(&text, SaAlgorithm::Skew3).unwrap();
        let bwt = Bwt::build(&text, &sa);
        // SA = [10,7,4,1,0,9,8,6,3,5,2]
        assert_eq!(bwt.undefined(), Some(4));
        let shown: Vec<u8> = (0..bwt.len()).map(|i| bwt.get(i).unwrap_or(b'$')).collect();
        assert_eq!(shown, b"pssm$pissii");
    }

    #[test]
    fn bwt_defined_slots_match_text() {
        let text = Text::from_sequences(["acgta", "gga", "tac"]);
        let sa = build_sa(&text, SaAlgorithm::PrefixDoubling).unwrap();
        let bwt = Bwt::build(&text, &sa);
        let undefined: Vec<usize> = (0..bwt.len()).filter(|&i| bwt.get(i).is_none()).collect();
        assert_eq!(undefined.len(), 1);
        assert_eq!(sa[undefined[0]], 0);
        for (i, &p) in sa.iter().enumerate() {
            if p > 0 {
                assert_eq!(bwt.get(i), Some(text.concat()[p as usize - 1]));
            }
        }
    }

    #[test]
    fn bwt_empty_and_single() {
        let empty = Bwt::build(&Text::borrowed(b""), &[]);
        assert!(empty.is_empty());
        assert_eq!(empty.undefined(), None);

        let one = Bwt::build(&Text::borrowed(b"q"), &[0]);
        assert_eq!(one.undefined(), Some(0));
        assert_eq!(one.get(0), None);
    }
}
