//! 내보내기 모듈 - 표현 쌍을 임베딩 단계용 파일로 저장
//!
//! 쌍 하나당 `{이름}.json` 파일 하나를 만들고, 각 행은
//! `{"content": ..., "metadata": {...}}` 입니다.
//! 저장 위치: `$RAG_PREP_DATA_DIR` 또는 `./data`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::construct::{ChunkMetadata, RepresentationPair, Representations};

/// 출력 루트 환경변수
pub const DATA_DIR_ENV: &str = "RAG_PREP_DATA_DIR";

// ============================================================================
// Data Directory
// ============================================================================

/// 출력 루트 (`$RAG_PREP_DATA_DIR`, 없으면 `./data`)
pub fn get_data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// 현재 시각 폴더 (`base/YYMMDD-HH-MM`)
pub fn timestamped_dir(base: &Path) -> PathBuf {
    base.join(chrono::Local::now().format("%y%m%d-%H-%M").to_string())
}

// ============================================================================
// Export
// ============================================================================

/// 저장 행
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    content: &'a str,
    metadata: &'a ChunkMetadata,
}

/// 표현 쌍 하나를 JSON 파일로 저장
pub fn write_pair(pair: &RepresentationPair, dir: &Path) -> Result<PathBuf> {
    let rows: Vec<ExportRow<'_>> = pair
        .contents
        .iter()
        .zip(&pair.metadatas)
        .map(|(content, metadata)| ExportRow { content, metadata })
        .collect();

    let path = dir.join(format!("{}.json", pair.name()));
    let json = serde_json::to_string_pretty(&rows).context("JSON 직렬화 실패")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write: {:?}", path))?;

    Ok(path)
}

/// 모든 표현 쌍 저장
pub fn write_representations(reps: &Representations, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let paths = reps
        .pairs()
        .iter()
        .map(|pair| write_pair(pair, dir))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("{}개의 content|metadata 파일 생성: {:?}", paths.len(), dir);
    Ok(paths)
}

// ============================================================================
// Tests
// ============================================================================
