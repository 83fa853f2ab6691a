use log::trace;

use super::bwt::Bwt;
use super::childtab::build_child_tab;
use super::lcp::build_lcp;
use super::sa::{build_sa, check_text_len};
use super::text::Text;
use super::Fibre;
use crate::config::{IndexConfig, IndexMeta};
use crate::error::{IndexError, Result};

/// 增强后缀数组索引：原始文本加上按需构建的 SA / LCP / 子表 / BWT。
///
/// 访问分两类：
/// - [`Index::require`] 按依赖顺序构建缺失的 fibre，已存在时什么都不做；
/// - [`Index::sa`] 等直接访问器只读取已有 fibre，缺失时返回
///   [`IndexError::NotConstructed`]，不会隐式构建。
///
/// 构建失败时对应 fibre 保持缺失，不会留下半成品。
/// 索引本身不做同步：多个线程可以同时持有 `&Index` 读取，
/// 修改（`require` / `clear` / `set_text`）需要 `&mut`。
/// 原始文本在 fibre 构建后不应再被改动；改用 [`Index::set_text`] 替换。
#[derive(Debug, Clone)]
pub struct Index<'t> {
    text: Text<'t>,
    config: IndexConfig,
    sa: Option<Vec<u32>>,
    lcp: Option<Vec<u32>>,
    child_tab: Option<Vec<u32>>,
    bwt: Option<Bwt>,
    meta: Option<IndexMeta>,
}

impl<'t> Index<'t> {
    pub fn new(text: Text<'t>) -> Self {
        Self::with_config(text, IndexConfig::default())
    }

    pub fn with_config(text: Text<'t>, config: IndexConfig) -> Self {
        Self {
            text,
            config,
            sa: None,
            lcp: None,
            child_tab: None,
            bwt: None,
            meta: None,
        }
    }

    /// 在调用方的序列上建索引，不复制文本
    pub fn borrowed(seq: &'t [u8]) -> Self {
        Self::new(Text::borrowed(seq))
    }

    pub(crate) fn from_fibres(
        text: Text<'t>,
        sa: Option<Vec<u32>>,
        lcp: Option<Vec<u32>>,
        child_tab: Option<Vec<u32>>,
        bwt: Option<Bwt>,
        meta: Option<IndexMeta>,
    ) -> Self {
        Self {
            text,
            config: IndexConfig::default(),
            sa,
            lcp,
            child_tab,
            bwt,
            meta,
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// 只影响之后的构建，已有 fibre 保持不变
    pub fn set_config(&mut self, config: IndexConfig) {
        self.config = config;
    }

    pub fn meta(&self) -> Option<&IndexMeta> {
        self.meta.as_ref()
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = Some(meta);
    }

    /// 拼接文本长度，不需要任何派生 fibre
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> &Text<'t> {
        &self.text
    }

    pub fn raw_text(&self) -> &[u8] {
        self.text.concat()
    }

    /// 替换文本并丢弃全部派生 fibre
    pub fn set_text(&mut self, text: Text<'t>) {
        self.text = text;
        self.clear();
    }

    /// 丢弃全部派生 fibre（SA、LCP、子表、BWT），文本与配置保留
    pub fn clear(&mut self) {
        self.sa = None;
        self.lcp = None;
        self.child_tab = None;
        self.bwt = None;
    }

    /// 不触发构建的存在性检查
    pub fn supplied(&self, fibre: Fibre) -> bool {
        match fibre {
            Fibre::RawText => true,
            Fibre::Sa => self.sa.is_some(),
            Fibre::Lcp => self.lcp.is_some(),
            Fibre::ChildTab => self.child_tab.is_some(),
            Fibre::Bwt => self.bwt.is_some(),
        }
    }

    /// 确保 fibre 存在，必要时按依赖顺序用配置的算法构建。
    /// 空文本上所有 fibre 都构建为空数组。
    pub fn require(&mut self, fibre: Fibre) -> Result<()> {
        if self.supplied(fibre) {
            return Ok(());
        }
        if let Some(dep) = fibre.dependency() {
            self.require(dep)?;
        }
        check_text_len(&self.text)?;
        trace!("constructing {} over {} symbols", fibre, self.text.len());
        match fibre {
            Fibre::RawText => {}
            Fibre::Sa => {
                let sa = build_sa(&self.text, self.config.sa)?;
                self.sa = Some(sa);
            }
            Fibre::Lcp => {
                let lcp = build_lcp(&self.text, self.sa()?, self.config.lcp)?;
                self.lcp = Some(lcp);
            }
            Fibre::ChildTab => {
                let cld = build_child_tab(self.lcp()?, self.config.child_tab);
                self.child_tab = Some(cld);
            }
            Fibre::Bwt => {
                let bwt = Bwt::build(&self.text, self.sa()?);
                self.bwt = Some(bwt);
            }
        }
        Ok(())
    }

    pub fn require_all(&mut self, fibres: &[Fibre]) -> Result<()> {
        fibres.iter().try_for_each(|&f| self.require(f))
    }

    pub fn sa(&self) -> Result<&[u32]> {
        self.sa.as_deref().ok_or(IndexError::NotConstructed(Fibre::Sa))
    }

    pub fn lcp(&self) -> Result<&[u32]> {
        self.lcp.as_deref().ok_or(IndexError::NotConstructed(Fibre::Lcp))
    }

    pub fn child_tab(&self) -> Result<&[u32]> {
        self.child_tab
            .as_deref()
            .ok_or(IndexError::NotConstructed(Fibre::ChildTab))
    }

    pub fn bwt(&self) -> Result<&Bwt> {
        self.bwt.as_ref().ok_or(IndexError::NotConstructed(Fibre::Bwt))
    }

    /// `SA[i]`（全局位置）；`i` 越界时 panic
    pub fn sa_at(&self, i: usize) -> Result<usize> {
        Ok(self.sa()?[i] as usize)
    }

    /// `LCP[i]`；`i` 越界时 panic
    pub fn lcp_at(&self, i: usize) -> Result<usize> {
        Ok(self.lcp()?[i] as usize)
    }

    /// 子表第 `i` 格；`i` 越界时 panic
    pub fn child_at(&self, i: usize) -> Result<usize> {
        Ok(self.child_tab()?[i] as usize)
    }

    /// `BWT[i]`；未定义槽位与越界都为 `None`
    pub fn bwt_at(&self, i: usize) -> Result<Option<u8>> {
        Ok(self.bwt()?.get(i))
    }

    /// `SA[i]` 映射为 (序列编号, 序列内偏移)；`i` 越界时 panic
    pub fn sa_local_at(&self, i: usize) -> Result<(usize, usize)> {
        Ok(self.text.to_local(self.sa_at(i)?))
    }

    /// 复制文本，得到不再借用调用方数据的索引
    pub fn into_owned(self) -> Index<'static> {
        Index {
            text: self.text.into_owned(),
            config: self.config,
            sa: self.sa,
            lcp: self.lcp,
            child_tab: self.child_tab,
            bwt: self.bwt,
            meta: self.meta,
        }
    }
}

impl Index<'static> {
    pub fn from_sequences<I, S>(seqs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self::new(Text::from_sequences(seqs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChildTabAlgorithm, LcpAlgorithm, SaAlgorithm};

    #[test]
    fn require_builds_dependencies_in_order() {
        let mut index = Index::borrowed(b"mississippi");
        assert!(index.supplied(Fibre::RawText));
        assert!(!index.supplied(Fibre::Sa));

        index.require(Fibre::ChildTab).unwrap();
        assert!(index.supplied(Fibre::Sa));
        assert!(index.supplied(Fibre::Lcp));
        assert!(index.supplied(Fibre::ChildTab));
        assert!(!index.supplied(Fibre::Bwt));

        index.require(Fibre::Bwt).unwrap();
        assert_eq!(index.sa().unwrap().len(), 11);
        assert_eq!(index.sa_at(0).unwrap(), 10);
        assert_eq!(index.lcp_at(3).unwrap(), 4);
        assert_eq!(index.bwt_at(4).unwrap(), None);
    }

    #[test]
    fn direct_access_before_require_is_an_error() {
        let index = Index::borrowed(b"abc");
        assert!(matches!(index.sa(), Err(IndexError::NotConstructed(Fibre::Sa))));
        assert!(matches!(index.lcp_at(0), Err(IndexError::NotConstructed(Fibre::Lcp))));
        assert!(matches!(
            index.child_tab(),
            Err(IndexError::NotConstructed(Fibre::ChildTab))
        ));
        assert!(matches!(index.bwt(), Err(IndexError::NotConstructed(Fibre::Bwt))));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn require_is_idempotent() {
        let mut index = Index::borrowed(b"abracadabra");
        index.require(Fibre::Lcp).unwrap();
        let first = index.lcp().unwrap().to_vec();
        index.set_config(IndexConfig::default().with_lcp(LcpAlgorithm::KasaiInPlace));
        index.require(Fibre::Lcp).unwrap();
        assert_eq!(index.lcp().unwrap(), &first[..]);
    }

    #[test]
    fn clear_and_set_text_drop_derived_fibres() {
        let mut index = Index::from_sequences(["acgt", "ggt"]);
        index.require_all(&[Fibre::ChildTab, Fibre::Bwt]).unwrap();
        index.clear();
        for f in [Fibre::Sa, Fibre::Lcp, Fibre::ChildTab, Fibre::Bwt] {
            assert!(!index.supplied(f));
        }
        assert_eq!(index.len(), 7);

        index.require(Fibre::Sa).unwrap();
        index.set_text(Text::from_sequences(["t"]));
        assert!(!index.supplied(Fibre::Sa));
        index.require(Fibre::Sa).unwrap();
        assert_eq!(index.sa().unwrap(), &[0]);
    }

    #[test]
    fn empty_text_requires_trivially() {
        let mut index = Index::borrowed(b"");
        index.require_all(&[Fibre::ChildTab, Fibre::Bwt]).unwrap();
        assert!(index.sa().unwrap().is_empty());
        assert!(index.lcp().unwrap().is_empty());
        assert!(index.child_tab().unwrap().is_empty());
        assert!(index.bwt().unwrap().is_empty());
    }

    #[test]
    fn configured_algorithms_produce_identical_fibres() {
        let seqs = ["caterpillar", "catwoman", "pillow", "willow", "ill", "wow"];
        let mut reference = Index::from_sequences(seqs);
        reference.require_all(&[Fibre::ChildTab, Fibre::Bwt]).unwrap();

        let config = IndexConfig::default()
            .with_sa(SaAlgorithm::PrefixDoubling)
            .with_lcp(LcpAlgorithm::KasaiInPlace)
            .with_child_tab(ChildTabAlgorithm::Streaming);
        let mut other = Index::with_config(Text::from_sequences(seqs), config);
        other.require_all(&[Fibre::ChildTab, Fibre::Bwt]).unwrap();

        assert_eq!(reference.sa().unwrap(), other.sa().unwrap());
        assert_eq!(reference.lcp().unwrap(), other.lcp().unwrap());
        assert_eq!(reference.child_tab().unwrap(), other.child_tab().unwrap());
        assert_eq!(reference.bwt().unwrap(), other.bwt().unwrap());
    }

    #[test]
    #[should_panic]
    fn lcp_at_past_the_end_panics() {
        let mut index = Index::borrowed(b"abc");
        index.require(Fibre::Lcp).unwrap();
        let _ = index.lcp_at(3);
    }

    #[test]
    fn bwt_at_past_the_end_is_none() {
        let mut index = Index::borrowed(b"abc");
        index.require(Fibre::Bwt).unwrap();
        assert_eq!(index.bwt_at(3).unwrap(), None);
        assert_eq!(index.bwt_at(1).unwrap(), Some(b'a'));
    }

    #[test]
    fn sa_local_positions() {
        let mut index = Index::from_sequences(["ba", "a"]);
        index.require(Fibre::Sa).unwrap();
        // 后缀：a(0,1) a(1,0) ba(0,0)
        assert_eq!(index.sa_local_at(0).unwrap(), (0, 1));
        assert_eq!(index.sa_local_at(1).unwrap(), (1, 0));
        assert_eq!(index.sa_local_at(2).unwrap(), (0, 0));
    }
}
