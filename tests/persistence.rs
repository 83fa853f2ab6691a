use std::fs;

use esa_rust::config::IndexMeta;
use esa_rust::index::persist::fibre_path;
use esa_rust::index::{Fibre, Index};
use esa_rust::stree::{DfsOrder, Node};
use esa_rust::IndexError;
use tempfile::tempdir;

#[test]
fn reopened_index_answers_like_the_original() {
    let dir = tempdir().unwrap();
    let prefix = dir.path().join("animals");

    let mut index = Index::from_sequences(["caterpillar", "catwoman", "pillow", "willow", "ill", "wow"]);
    index.require_all(&[Fibre::ChildTab, Fibre::Bwt]).unwrap();
    index.set_meta(IndexMeta {
        source: Some("animals.fa".into()),
        sequence_names: ["c1", "c2", "p", "w", "i", "o"].iter().map(|s| s.to_string()).collect(),
        build_args: None,
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });
    index.save(&prefix).unwrap();

    let loaded = Index::open(&prefix).unwrap();
    for fibre in Fibre::ALL {
        assert!(loaded.supplied(fibre), "{}", fibre);
    }
    assert_eq!(loaded.text().seq_count(), 6);
    assert_eq!(loaded.meta(), index.meta());
    assert_eq!(loaded.meta().unwrap().sequence_name(3), "w");

    let before: Vec<Node> = index
        .top_down_history(DfsOrder::Preorder)
        .unwrap()
        .into_nodes()
        .collect();
    let after: Vec<Node> = loaded
        .top_down_history(DfsOrder::Preorder)
        .unwrap()
        .into_nodes()
        .collect();
    assert_eq!(before, after);

    let finder = loaded.finder().unwrap();
    assert_eq!(finder.local_occurrences(b"llow"), vec![(2, 2), (3, 2)]);

    let a: Vec<Vec<u8>> = index.max_repeats(2).unwrap().map(|r| r.representative().to_vec()).collect();
    let b: Vec<Vec<u8>> = loaded.max_repeats(2).unwrap().map(|r| r.representative().to_vec()).collect();
    assert_eq!(a, b);
}

#[test]
fn missing_fibres_can_be_required_after_open() {
    let dir = tempdir().unwrap();
    let prefix = dir.path().join("partial");
    let mut index = Index::from_sequences(["banana", "bandana"]);
    index.require(Fibre::Sa).unwrap();
    index.save(&prefix).unwrap();
    assert!(!fibre_path(&prefix, Fibre::Lcp).exists());

    let mut loaded = Index::open(&prefix).unwrap();
    assert!(loaded.supplied(Fibre::Sa));
    assert!(matches!(loaded.lcp(), Err(IndexError::NotConstructed(Fibre::Lcp))));
    loaded.require(Fibre::ChildTab).unwrap();
    assert_eq!(loaded.finder().unwrap().count(b"ana"), 3);
}

#[test]
fn truncated_file_is_reported_with_its_path() {
    let dir = tempdir().unwrap();
    let prefix = dir.path().join("broken");
    let mut index = Index::borrowed(b"abracadabra");
    index.require(Fibre::Lcp).unwrap();
    index.save(&prefix).unwrap();

    let lcp_path = fibre_path(&prefix, Fibre::Lcp);
    let bytes = fs::read(&lcp_path).unwrap();
    fs::write(&lcp_path, &bytes[..bytes.len() / 2]).unwrap();

    let err = Index::open(&prefix).unwrap_err();
    match err {
        IndexError::Codec { path, .. } => assert_eq!(path, lcp_path),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn garbage_header_is_corrupt() {
    let dir = tempdir().unwrap();
    let prefix = dir.path().join("junk");
    Index::borrowed(b"abc").save(&prefix).unwrap();
    let sa_path = fibre_path(&prefix, Fibre::Sa);
    // 足够长，能被解码为头部，但魔数不对
    fs::write(&sa_path, vec![0x5a; 64]).unwrap();
    let err = Index::open(&prefix).unwrap_err();
    assert!(
        matches!(err, IndexError::Corrupt { .. } | IndexError::Codec { .. }),
        "{}",
        err
    );
}

#[test]
fn out_of_range_lcp_value_is_rejected_on_open() {
    let dir = tempdir().unwrap();
    let prefix = dir.path().join("miss");
    let mut index = Index::borrowed(b"mississippi");
    index.require(Fibre::ChildTab).unwrap();
    index.save(&prefix).unwrap();

    // 数组以小端 u32 结尾，改写最后一个 LCP 值，长度不变
    let lcp_path = fibre_path(&prefix, Fibre::Lcp);
    let mut bytes = fs::read(&lcp_path).unwrap();
    let end = bytes.len();
    bytes[end - 4..].copy_from_slice(&1000u32.to_le_bytes());
    fs::write(&lcp_path, &bytes).unwrap();

    let err = Index::open(&prefix).unwrap_err();
    assert!(
        matches!(err, IndexError::Inconsistent { fibre: Fibre::Lcp, .. }),
        "{}",
        err
    );
}

#[test]
fn shuffled_child_table_is_rejected_on_open() {
    let dir = tempdir().unwrap();
    let prefix = dir.path().join("cat");
    let mut index = Index::from_sequences(["caterpillar", "catwoman"]);
    index.require(Fibre::ChildTab).unwrap();
    index.save(&prefix).unwrap();

    // 交换两个不同的相邻链接，取值仍在范围内
    let cld = index.child_tab().unwrap();
    let i = (0..cld.len() - 1).find(|&i| cld[i] != cld[i + 1]).unwrap();
    let path = fibre_path(&prefix, Fibre::ChildTab);
    let mut bytes = fs::read(&path).unwrap();
    let at = bytes.len() - cld.len() * 4 + i * 4;
    bytes[at..at + 4].copy_from_slice(&cld[i + 1].to_le_bytes());
    bytes[at + 4..at + 8].copy_from_slice(&cld[i].to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let err = Index::open(&prefix).unwrap_err();
    assert!(
        matches!(err, IndexError::Inconsistent { fibre: Fibre::ChildTab, .. }),
        "{}",
        err
    );
}
