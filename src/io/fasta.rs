use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::index::Text;
use crate::util::alphabet::normalize_dna;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// 逐条读取 FASTA 记录。序列行中的空白被丢弃，大小写原样保留。
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: String,
    pending_header: Option<String>,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pending_header: None,
            done: false,
        }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        Ok(self.reader.read_line(&mut self.line)? > 0)
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        // 第一条记录之前的内容被忽略
        let header = match self.pending_header.take() {
            Some(h) => h,
            None => loop {
                if !self.read_line()? {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(h) = self.line.strip_prefix('>') {
                    break h.trim().to_string();
                }
            },
        };

        let (id, desc) = match header.split_once(char::is_whitespace) {
            Some((id, rest)) => {
                let rest = rest.trim();
                (id.to_string(), (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (header, None),
        };

        let mut seq = Vec::new();
        while self.read_line()? {
            if let Some(h) = self.line.strip_prefix('>') {
                self.pending_header = Some(h.trim().to_string());
                return Ok(Some(FastaRecord { id, desc, seq }));
            }
            seq.extend(self.line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }
        self.done = true;
        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// 一个 FASTA 文件的全部序列，拼接为索引文本
#[derive(Debug, Clone)]
pub struct SequenceSet {
    pub names: Vec<String>,
    pub text: Text<'static>,
}

/// 读入整个 FASTA 文件；`dna` 为真时按 DNA 规范化（大写、U→T、其它记为 N）
pub fn read_sequence_set(path: &Path, dna: bool) -> Result<SequenceSet> {
    let fh = File::open(path).with_context(|| format!("cannot open FASTA '{}'", path.display()))?;
    let mut names = Vec::new();
    let mut seqs = Vec::new();
    for rec in FastaReader::new(BufReader::new(fh)) {
        let rec = rec.with_context(|| format!("cannot read FASTA '{}'", path.display()))?;
        names.push(rec.id);
        seqs.push(if dna { normalize_dna(&rec.seq) } else { rec.seq });
    }
    if names.is_empty() {
        anyhow::bail!("FASTA file '{}' contains no sequences", path.display());
    }
    Ok(SequenceSet {
        names,
        text: Text::from_sequences(seqs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn parse_records_with_descriptions() {
        let data = b">chr1 first copy\nACgTNN\n>chr2\nAAA\n";
        let mut r = FastaReader::new(Cursor::new(&data[..]));

        let r1 = r.next_record().unwrap().unwrap();
        assert_eq!(r1.id, "chr1");
        assert_eq!(r1.desc.as_deref(), Some("first copy"));
        assert_eq!(r1.seq, b"ACgTNN");

        let r2 = r.next_record().unwrap().unwrap();
        assert_eq!(r2.id, "chr2");
        assert_eq!(r2.desc, None);
        assert_eq!(r2.seq, b"AAA");

        assert!(r.next_record().unwrap().is_none());
        assert!(r.next_record().unwrap().is_none());
    }

    #[test]
    fn crlf_blank_lines_and_empty_records() {
        let data = b"\n\n>a desc\r\nAC g t\r\n acgt\r\n>empty\r\n>b \r\n N N \r\n";
        let records: Vec<FastaRecord> = FastaReader::new(Cursor::new(&data[..]))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].seq, b"ACgtacgt");
        assert!(records[1].seq.is_empty());
        assert_eq!(records[2].id, "b");
        assert_eq!(records[2].desc, None);
        assert_eq!(records[2].seq, b"NN");
    }

    #[test]
    fn sequence_set_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, ">x\nacgu\n>y\nGGRA\n").unwrap();
        let set = read_sequence_set(file.path(), true).unwrap();
        assert_eq!(set.names, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(set.text.sequence(0), b"ACGT");
        assert_eq!(set.text.sequence(1), b"GGNA");

        let raw = read_sequence_set(file.path(), false).unwrap();
        assert_eq!(raw.text.sequence(0), b"acgu");
    }

    #[test]
    fn file_without_records_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "no header here").unwrap();
        assert!(read_sequence_set(file.path(), false).is_err());
    }
}
