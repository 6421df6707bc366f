//! 파일 수집 모듈
//!
//! 전처리 폴더에서 입력 파일을 찾고, 잘라낸 이미지와 이미지 설명 파일을
//! 요소 ID 기준으로 묶습니다.
//! .gitignore 패턴을 존중하고, 아는 파일 형식만 수집합니다.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use regex::Regex;

use crate::error::{PrepError, PrepResult};

// ============================================================================
// Input Kinds
// ============================================================================

/// 수집 대상 파일 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// 문서 파서 HTML
    Html,
    /// 문서 파서 응답 JSON (`*_result.json`)
    ParseResult,
    /// 요소 목록 JSON (`*_elements.json`)
    Elements,
    /// 블록 Markdown (`*_converted.md`)
    BlockMarkdown,
}

impl InputKind {
    /// 파일명으로 종류 결정
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();

        if name.ends_with("_result.json") {
            Some(InputKind::ParseResult)
        } else if name.ends_with("_elements.json") {
            Some(InputKind::Elements)
        } else if name.ends_with("_converted.md") {
            Some(InputKind::BlockMarkdown)
        } else if name.ends_with(".html") || name.ends_with(".htm") {
            Some(InputKind::Html)
        } else {
            None
        }
    }
}

// ============================================================================
// Collected File
// ============================================================================

/// 수집된 파일 정보
#[derive(Debug, Clone)]
pub struct CollectedFile {
    pub path: PathBuf,
    pub kind: InputKind,
    pub size: u64,
}

impl CollectedFile {
    /// 파일에서 CollectedFile 생성 (모르는 형식이면 None)
    pub fn from_path(path: PathBuf) -> Result<Option<Self>> {
        let kind = match InputKind::from_path(&path) {
            Some(kind) => kind,
            None => return Ok(None),
        };

        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?;

        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(Self {
            path,
            kind,
            size: metadata.len(),
        }))
    }

    /// 확장자와 종류 접미어를 뺀 파일명 (`doc_result.json` → `doc`)
    pub fn stem(&self) -> String {
        document_stem(&self.path)
    }
}

/// 종류 접미어를 뺀 문서 이름
pub fn document_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    for suffix in ["_result.json", "_elements.json", "_converted.md", ".html", ".htm", ".json"] {
        if let Some(stem) = name.strip_suffix(suffix) {
            return stem.to_string();
        }
    }

    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}

// ============================================================================
// File Collector
// ============================================================================

/// 파일 수집기 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// .gitignore 패턴 존중 여부
    pub respect_gitignore: bool,
    /// 숨김 파일 포함 여부
    pub include_hidden: bool,
    /// 최대 파일 크기 (바이트, 0이면 제한 없음)
    pub max_file_size: u64,
    /// 수집할 종류 (비어 있으면 전부)
    pub kinds: Vec<InputKind>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: 50 * 1024 * 1024, // 50MB
            kinds: vec![],
        }
    }
}

impl CollectorConfig {
    /// 특정 종류만 수집
    pub fn only(kinds: &[InputKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            ..Default::default()
        }
    }
}

/// 파일 수집기
pub struct FileCollector {
    config: CollectorConfig,
}

impl FileCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CollectorConfig::default())
    }

    /// 파일 또는 폴더에서 수집
    pub fn collect(&self, path: &Path) -> Result<Vec<CollectedFile>> {
        if path.is_dir() {
            self.collect_directory(path)
        } else {
            Ok(self.collect_file(path)?.into_iter().collect())
        }
    }

    /// 단일 파일 수집
    pub fn collect_file(&self, path: &Path) -> Result<Option<CollectedFile>> {
        if !path.exists() {
            anyhow::bail!("File not found: {:?}", path);
        }

        if !path.is_file() {
            anyhow::bail!("Not a file: {:?}", path);
        }

        let file = CollectedFile::from_path(path.to_path_buf())?;
        Ok(file.filter(|f| self.should_include(f)))
    }

    /// 폴더 재귀 수집 (경로 순 정렬)
    pub fn collect_directory(&self, path: &Path) -> Result<Vec<CollectedFile>> {
        if !path.exists() {
            anyhow::bail!("Directory not found: {:?}", path);
        }

        if !path.is_dir() {
            anyhow::bail!("Not a directory: {:?}", path);
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(path)
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            match CollectedFile::from_path(entry.path().to_path_buf()) {
                Ok(Some(file)) => {
                    if self.should_include(&file) {
                        files.push(file);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to collect file: {}", e);
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::info!("Collected {} files from {:?}", files.len(), path);
        Ok(files)
    }

    fn should_include(&self, file: &CollectedFile) -> bool {
        if self.config.max_file_size > 0 && file.size > self.config.max_file_size {
            tracing::debug!("Skipping large file: {:?} ({} bytes)", file.path, file.size);
            return false;
        }

        self.config.kinds.is_empty() || self.config.kinds.contains(&file.kind)
    }
}

/// 수집 통계
#[derive(Debug, Default)]
pub struct CollectionStats {
    pub total_files: usize,
    pub html_files: usize,
    pub result_files: usize,
    pub element_files: usize,
    pub block_files: usize,
    pub total_size: u64,
}

impl CollectionStats {
    pub fn from_files(files: &[CollectedFile]) -> Self {
        let mut stats = Self::default();

        for file in files {
            stats.total_files += 1;
            stats.total_size += file.size;

            match file.kind {
                InputKind::Html => stats.html_files += 1,
                InputKind::ParseResult => stats.result_files += 1,
                InputKind::Elements => stats.element_files += 1,
                InputKind::BlockMarkdown => stats.block_files += 1,
            }
        }

        stats
    }
}

// ============================================================================
// Cropped Images / Captions
// ============================================================================

/// 잘라낸 이미지 파일명: `{id}_page_{page}_{category}_{n}.png`
fn image_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)_page_\d+_\w+_\d+\.png$").expect("Invalid regex"))
}

/// 파일명 맨 앞 숫자(요소 ID)
fn leading_id(file_name: &str) -> Option<i64> {
    file_name.split('_').next().and_then(|s| s.parse().ok())
}

/// 요소 ID → 잘라낸 이미지 경로
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    by_id: HashMap<i64, PathBuf>,
}

impl ImageIndex {
    /// 이미지 경로 목록에서 생성 (패턴에 맞지 않는 파일은 무시)
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut by_id = HashMap::new();
        for path in paths {
            let path = path.into();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(id) = image_name_re()
                .captures(name)
                .and_then(|caps| caps[1].parse::<i64>().ok())
            else {
                continue;
            };
            by_id.insert(id, path);
        }
        Self { by_id }
    }

    /// 폴더의 이미지로 생성 (폴더가 없으면 빈 인덱스)
    pub fn from_dir(dir: &Path) -> PrepResult<Self> {
        if !dir.is_dir() {
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| PrepError::io(dir, e))?;
        let paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        Ok(Self::from_paths(paths))
    }

    pub fn get(&self, id: i64) -> Option<&Path> {
        self.by_id.get(&id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// `base_dir` 기준 상대 링크 (`./Items/3_page_1_table_1.png`)
    pub fn relative_link(&self, id: i64, base_dir: &Path) -> Option<String> {
        let path = self.get(id)?;
        let joined = |p: &Path| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        };

        match path.strip_prefix(base_dir) {
            Ok(rel) => Some(format!("./{}", joined(rel))),
            Err(_) => Some(path.to_string_lossy().replace('\\', "/")),
        }
    }
}

/// 전처리 폴더의 이미지 폴더 (`Items` 또는 `items`)
pub fn find_items_dir(base_dir: &Path) -> Option<PathBuf> {
    ["Items", "items"]
        .iter()
        .map(|name| base_dir.join(name))
        .find(|dir| dir.is_dir())
}

/// `*_caption.txt` 파일에서 요소 ID별 이미지 설명 로드
///
/// 한 요소에 설명이 여러 개면 파일명 순으로 줄바꿈 연결합니다.
pub fn load_captions(items_dir: &Path) -> PrepResult<HashMap<i64, String>> {
    let entries = std::fs::read_dir(items_dir).map_err(|e| PrepError::io(items_dir, e))?;

    let mut caption_files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with("_caption.txt"))
                .unwrap_or(false)
        })
        .collect();
    caption_files.sort();

    let mut captions: HashMap<i64, String> = HashMap::new();
    for path in caption_files {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let Some(id) = leading_id(name) else {
            tracing::warn!("요소 ID를 알 수 없는 설명 파일: {:?}", path);
            continue;
        };

        let text = std::fs::read_to_string(&path).map_err(|e| PrepError::io(&path, e))?;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        captions
            .entry(id)
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(text);
            })
            .or_insert_with(|| text.to_string());
    }

    tracing::debug!("Loaded {} captions from {:?}", captions.len(), items_dir);
    Ok(captions)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_input_kind_from_path() {
        assert_eq!(InputKind::from_path(Path::new("doc_result.json")), Some(InputKind::ParseResult));
        assert_eq!(InputKind::from_path(Path::new("doc_elements.json")), Some(InputKind::Elements));
        assert_eq!(InputKind::from_path(Path::new("doc_converted.md")), Some(InputKind::BlockMarkdown));
        assert_eq!(InputKind::from_path(Path::new("doc.HTML")), Some(InputKind::Html));
        assert_eq!(InputKind::from_path(Path::new("doc.md")), None);
        assert_eq!(InputKind::from_path(Path::new("other.json")), None);
    }

    #[test]
    fn test_document_stem() {
        assert_eq!(document_stem(Path::new("/a/250331-13-24_모니터_result.json")), "250331-13-24_모니터");
        assert_eq!(document_stem(Path::new("doc.html")), "doc");
        assert_eq!(document_stem(Path::new("doc.txt")), "doc");
    }

    #[test]
    fn test_collect_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.html"), "<p id='1'>a</p>").unwrap();
        std::fs::write(dir.path().join("a_result.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("b_elements.json"), "[]").unwrap();

        let files = FileCollector::with_defaults().collect(dir.path()).unwrap();
        assert_eq!(files.len(), 3);

        let stats = CollectionStats::from_files(&files);
        assert_eq!(stats.html_files, 1);
        assert_eq!(stats.result_files, 1);
        assert_eq!(stats.element_files, 1);

        let only_html = FileCollector::new(CollectorConfig::only(&[InputKind::Html]))
            .collect(dir.path())
            .unwrap();
        assert_eq!(only_html.len(), 1);
        assert_eq!(only_html[0].stem(), "a");
    }

    #[test]
    fn test_collect_missing_file() {
        let collector = FileCollector::with_defaults();
        assert!(collector.collect_file(Path::new("/nonexistent/x.html")).is_err());
    }

    #[test]
    fn test_image_index() {
        let index = ImageIndex::from_paths([
            "/data/doc/Items/7_page_1_chart_1.png",
            "/data/doc/Items/12_page_3_table_1.png",
            "/data/doc/Items/readme.png",
        ]);

        assert_eq!(index.len(), 2);
        assert!(index.get(7).is_some());
        assert_eq!(
            index.relative_link(12, Path::new("/data/doc")).as_deref(),
            Some("./Items/12_page_3_table_1.png")
        );
        assert_eq!(index.relative_link(99, Path::new("/data/doc")), None);
    }

    #[test]
    fn test_load_captions() {
        let dir = TempDir::new().unwrap();
        let items = dir.path().join("Items");
        std::fs::create_dir(&items).unwrap();
        std::fs::write(items.join("3_page_1_table_1_caption.txt"), " 표 설명 \n").unwrap();
        std::fs::write(items.join("5_page_2_figure_1_caption.txt"), "그림 A").unwrap();
        std::fs::write(items.join("5_page_2_figure_2_caption.txt"), "그림 B").unwrap();
        std::fs::write(items.join("5_page_2_figure_1.png"), "").unwrap();
        std::fs::write(items.join("x_caption.txt"), "id 없음").unwrap();

        assert_eq!(find_items_dir(dir.path()), Some(items.clone()));

        let captions = load_captions(&items).unwrap();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[&3], "표 설명");
        assert_eq!(captions[&5], "그림 A\n그림 B");
    }
}
