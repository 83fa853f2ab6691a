//! 索引的保存与加载：每个 fibre 一个文件，`<prefix>.<ext>`。
//!
//! 文件内容为 bincode 编码的 `FibreHeader` 紧跟数组本体。
//! 加载时先读入并校验全部文件，全部通过后才生成索引。

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::bwt::Bwt;
use super::childtab::build_child_tab;
use super::esa::Index;
use super::lcp::build_lcp;
use super::text::Text;
use super::Fibre;
use crate::config::{ChildTabAlgorithm, IndexMeta, LcpAlgorithm};
use crate::error::{IndexError, Result};

const MAGIC: [u8; 4] = *b"ESAF";
const VERSION: u32 = 1;
const META_EXTENSION: &str = "meta";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct FibreHeader {
    magic: [u8; 4],
    version: u32,
    fibre: Fibre,
    /// 元素个数（文本为拼接长度）
    len: u64,
}

#[derive(Serialize, Deserialize)]
struct TextRecord {
    concat: Vec<u8>,
    limits: Vec<u64>,
}

#[derive(Serialize, Deserialize)]
struct BwtRecord {
    values: Vec<u8>,
    undefined: Option<u64>,
}

/// `<prefix>.<ext>`；prefix 自身可以带点号
pub fn fibre_path(prefix: &Path, fibre: Fibre) -> PathBuf {
    with_extension(prefix, fibre.extension())
}

fn with_extension(prefix: &Path, ext: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn write_file<T: Serialize>(path: &Path, fibre: Fibre, len: usize, body: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| IndexError::io(path, e))?;
    let mut w = BufWriter::new(file);
    let header = FibreHeader {
        magic: MAGIC,
        version: VERSION,
        fibre,
        len: len as u64,
    };
    bincode::serialize_into(&mut w, &header).map_err(|e| IndexError::codec(path, e))?;
    bincode::serialize_into(&mut w, body).map_err(|e| IndexError::codec(path, e))?;
    w.flush().map_err(|e| IndexError::io(path, e))
}

/// 文件不存在时返回 `None`
fn read_file<T: DeserializeOwned>(path: &Path, fibre: Fibre) -> Result<Option<(u64, T)>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(IndexError::io(path, e)),
    };
    let mut r = BufReader::new(file);
    let header: FibreHeader = bincode::deserialize_from(&mut r).map_err(|e| IndexError::codec(path, e))?;
    if header.magic != MAGIC {
        return Err(IndexError::corrupt(path, "bad magic number"));
    }
    if header.version != VERSION {
        return Err(IndexError::corrupt(
            path,
            format!("unsupported version {} (expected {})", header.version, VERSION),
        ));
    }
    if header.fibre != fibre {
        return Err(IndexError::corrupt(
            path,
            format!("file holds {}, expected {}", header.fibre, fibre),
        ));
    }
    let body: T = bincode::deserialize_from(&mut r).map_err(|e| IndexError::codec(path, e))?;
    Ok(Some((header.len, body)))
}

fn write_meta(path: &Path, meta: &IndexMeta) -> Result<()> {
    let file = File::create(path).map_err(|e| IndexError::io(path, e))?;
    let mut w = BufWriter::new(file);
    bincode::serialize_into(&mut w, meta).map_err(|e| IndexError::codec(path, e))?;
    w.flush().map_err(|e| IndexError::io(path, e))
}

fn read_meta(path: &Path) -> Result<Option<IndexMeta>> {
    match File::open(path) {
        Ok(f) => bincode::deserialize_from(BufReader::new(f))
            .map(Some)
            .map_err(|e| IndexError::codec(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(IndexError::io(path, e)),
    }
}

fn check_len(fibre: Fibre, header_len: u64, actual: usize, n: usize) -> Result<()> {
    if header_len != actual as u64 {
        return Err(IndexError::inconsistent(
            fibre,
            format!("header announces {} entries, file holds {}", header_len, actual),
        ));
    }
    if actual != n {
        return Err(IndexError::inconsistent(
            fibre,
            format!("{} entries, text has {} symbols", actual, n),
        ));
    }
    Ok(())
}

fn require_dependency(fibre: Fibre, present: bool) -> Result<()> {
    if present {
        return Ok(());
    }
    let dep = fibre.dependency().unwrap_or(Fibre::RawText);
    Err(IndexError::inconsistent(
        fibre,
        format!("stored without its dependency {}", dep),
    ))
}

impl Index<'_> {
    /// 写出文本与所有已构建的 fibre；未构建 fibre 的旧文件会被删除，
    /// 以免 `open` 读到与当前文本不符的数据。
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<()> {
        let prefix = prefix.as_ref();
        let text = self.text();

        let record = TextRecord {
            concat: text.concat().to_vec(),
            limits: text.limits().iter().map(|&l| l as u64).collect(),
        };
        write_file(&fibre_path(prefix, Fibre::RawText), Fibre::RawText, text.len(), &record)?;

        for fibre in [Fibre::Sa, Fibre::Lcp, Fibre::ChildTab, Fibre::Bwt] {
            let path = fibre_path(prefix, fibre);
            match fibre {
                Fibre::Sa if self.supplied(fibre) => write_file(&path, fibre, self.len(), &self.sa()?)?,
                Fibre::Lcp if self.supplied(fibre) => write_file(&path, fibre, self.len(), &self.lcp()?)?,
                Fibre::ChildTab if self.supplied(fibre) => {
                    write_file(&path, fibre, self.len(), &self.child_tab()?)?;
                }
                Fibre::Bwt if self.supplied(fibre) => {
                    let bwt = self.bwt()?;
                    let record = BwtRecord {
                        values: bwt.values().to_vec(),
                        undefined: bwt.undefined().map(|u| u as u64),
                    };
                    write_file(&path, fibre, bwt.len(), &record)?;
                }
                _ => remove_stale(&path)?,
            }
        }

        let meta_path = with_extension(prefix, META_EXTENSION);
        match self.meta() {
            Some(meta) => write_meta(&meta_path, meta)?,
            None => remove_stale(&meta_path)?,
        }

        info!("saved index with {} symbols to {}.*", text.len(), prefix.display());
        Ok(())
    }
}

impl Index<'static> {
    /// 从 `<prefix>.*` 加载索引。文本文件必须存在，其余 fibre 文件可缺省；
    /// 存在的文件须与文本长度一致且依赖齐全。
    pub fn open(prefix: impl AsRef<Path>) -> Result<Self> {
        let prefix = prefix.as_ref();

        let text_path = fibre_path(prefix, Fibre::RawText);
        let (text_len, record): (u64, TextRecord) = read_file(&text_path, Fibre::RawText)?.ok_or_else(|| {
            IndexError::io(
                &text_path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "text file missing"),
            )
        })?;
        if text_len != record.concat.len() as u64 {
            return Err(IndexError::inconsistent(
                Fibre::RawText,
                format!("header announces {} symbols, file holds {}", text_len, record.concat.len()),
            ));
        }
        let limits: Vec<usize> = record.limits.iter().map(|&l| l as usize).collect();
        let text = Text::from_parts(record.concat, limits)
            .ok_or_else(|| IndexError::corrupt(&text_path, "malformed sequence limits"))?;
        let n = text.len();

        let sa = match read_file::<Vec<u32>>(&fibre_path(prefix, Fibre::Sa), Fibre::Sa)? {
            Some((len, sa)) => {
                check_len(Fibre::Sa, len, sa.len(), n)?;
                check_permutation(&sa)?;
                Some(sa)
            }
            None => None,
        };

        let lcp = match read_file::<Vec<u32>>(&fibre_path(prefix, Fibre::Lcp), Fibre::Lcp)? {
            Some((len, lcp)) => {
                require_dependency(Fibre::Lcp, sa.is_some())?;
                check_len(Fibre::Lcp, len, lcp.len(), n)?;
                if let Some(sa) = &sa {
                    check_lcp(&text, sa, &lcp)?;
                }
                Some(lcp)
            }
            None => None,
        };

        let child_tab = match read_file::<Vec<u32>>(&fibre_path(prefix, Fibre::ChildTab), Fibre::ChildTab)? {
            Some((len, cld)) => {
                require_dependency(Fibre::ChildTab, lcp.is_some())?;
                check_len(Fibre::ChildTab, len, cld.len(), n)?;
                if let Some(lcp) = &lcp {
                    check_child_tab(lcp, &cld)?;
                }
                Some(cld)
            }
            None => None,
        };

        let bwt = match read_file::<BwtRecord>(&fibre_path(prefix, Fibre::Bwt), Fibre::Bwt)? {
            Some((len, record)) => {
                require_dependency(Fibre::Bwt, sa.is_some())?;
                check_len(Fibre::Bwt, len, record.values.len(), n)?;
                let undefined = record.undefined.map(|u| u as usize);
                let expected = sa.as_ref().and_then(|sa| sa.iter().position(|&p| p == 0));
                if undefined != expected {
                    return Err(IndexError::inconsistent(
                        Fibre::Bwt,
                        format!("undefined slot {:?} does not match suffix array ({:?})", undefined, expected),
                    ));
                }
                let bwt = Bwt::from_parts(record.values, undefined);
                if let Some(sa) = &sa {
                    check_bwt(&text, sa, &bwt)?;
                }
                Some(bwt)
            }
            None => None,
        };

        let meta = read_meta(&with_extension(prefix, META_EXTENSION))?;

        info!("opened index with {} symbols from {}.*", n, prefix.display());
        Ok(Index::from_fibres(text, sa, lcp, child_tab, bwt, meta))
    }
}

fn check_permutation(sa: &[u32]) -> Result<()> {
    let mut seen = vec![false; sa.len()];
    for &p in sa {
        let p = p as usize;
        if p >= sa.len() || seen[p] {
            return Err(IndexError::inconsistent(
                Fibre::Sa,
                format!("value {} is out of range or repeated", p),
            ));
        }
        seen[p] = true;
    }
    Ok(())
}

/// 位置 `i` 处第一个与 `want` 不同的值
fn first_mismatch<T: PartialEq>(got: &[T], want: &[T]) -> Option<usize> {
    got.iter().zip(want).position(|(a, b)| a != b)
}

/// LCP 值会被用作文本切片长度，必须与 SA 和文本完全吻合
fn check_lcp(text: &Text<'_>, sa: &[u32], lcp: &[u32]) -> Result<()> {
    let want = build_lcp(text, sa, LcpAlgorithm::Kasai)?;
    match first_mismatch(lcp, &want) {
        Some(i) => Err(IndexError::inconsistent(
            Fibre::Lcp,
            format!("entry {} is {}, text gives {}", i, lcp[i], want[i]),
        )),
        None => Ok(()),
    }
}

/// 子表由 LCP 唯一确定；两种构建算法输出相同
fn check_child_tab(lcp: &[u32], cld: &[u32]) -> Result<()> {
    let want = build_child_tab(lcp, ChildTabAlgorithm::TwoPass);
    match first_mismatch(cld, &want) {
        Some(i) => Err(IndexError::inconsistent(
            Fibre::ChildTab,
            format!("link {} is {}, LCP table gives {}", i, cld[i], want[i]),
        )),
        None => Ok(()),
    }
}

fn check_bwt(text: &Text<'_>, sa: &[u32], bwt: &Bwt) -> Result<()> {
    let want = Bwt::build(text, sa);
    // 未定义槽位的值不参与比较
    match (0..want.len()).find(|&i| want.get(i).is_some() && bwt.get(i) != want.get(i)) {
        Some(i) => Err(IndexError::inconsistent(
            Fibre::Bwt,
            format!("symbol {} does not precede its suffix in the text", i),
        )),
        None => Ok(()),
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            warn!("removed stale index file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(IndexError::io(path, e)),
    }
}
