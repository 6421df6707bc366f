//! 에러 타입
//!
//! 라이브러리 I/O 경계(요소 로드, 파싱 결과 로드)에서 사용하는 타입 에러입니다.
//! 표 평탄화와 청크/메타데이터 구성은 실패하지 않으므로 여기에 등장하지 않습니다.

use std::path::PathBuf;

use thiserror::Error;

/// 전처리 에러
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("파일 읽기/쓰기 실패: {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON 처리 실패: {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("중복된 elementid: {id} ({path:?})")]
    DuplicateElementId { id: i64, path: PathBuf },

    #[error("요소가 없습니다: {0:?}")]
    NoElements(PathBuf),
}

impl PrepError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type PrepResult<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrepError::DuplicateElementId {
            id: 7,
            path: PathBuf::from("a.json"),
        };
        assert!(err.to_string().contains("7"));

        let err = PrepError::NoElements(PathBuf::from("empty.json"));
        assert!(err.to_string().contains("empty.json"));
    }
}
