use std::path::PathBuf;

use thiserror::Error;

use crate::index::Fibre;

/// 索引构建、访问与持久化过程中的错误。
#[derive(Debug, Error)]
pub enum IndexError {
    /// 直接访问尚未构建的 fibre（应先调用 `require`）
    #[error("fibre {0} has not been constructed")]
    NotConstructed(Fibre),

    #[error("failed to build {fibre} with {algorithm}: {reason}")]
    Construction {
        fibre: Fibre,
        algorithm: String,
        reason: String,
    },

    #[error("text of length {len} exceeds the supported maximum of {max} symbols")]
    TextTooLong { len: usize, max: usize },

    /// 加载时发现 fibre 之间长度或取值不一致
    #[error("inconsistent fibre {fibre}: {reason}")]
    Inconsistent { fibre: Fibre, reason: String },

    #[error("invalid index file '{}': {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode/decode '{}': {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
}

impl IndexError {
    pub fn construction(fibre: Fibre, algorithm: impl ToString, reason: impl Into<String>) -> Self {
        Self::Construction {
            fibre,
            algorithm: algorithm.to_string(),
            reason: reason.into(),
        }
    }

    pub fn inconsistent(fibre: Fibre, reason: impl Into<String>) -> Self {
        Self::Inconsistent {
            fibre,
            reason: reason.into(),
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn codec(path: impl Into<PathBuf>, source: bincode::Error) -> Self {
        Self::Codec {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_fibre() {
        let e = IndexError::NotConstructed(Fibre::ChildTab);
        assert_eq!(e.to_string(), "fibre child table has not been constructed");

        let e = IndexError::construction(Fibre::Lcp, "kasai-in-place", "text too long");
        assert!(e.to_string().contains("LCP table"));
        assert!(e.to_string().contains("kasai-in-place"));
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = IndexError::io("/tmp/x.sa", inner);
        assert!(e.to_string().contains("/tmp/x.sa"));
        assert!(e.source().is_some());
    }
}
