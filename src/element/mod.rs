//! 요소(Element) 모듈
//!
//! 문서 파서가 추출한 콘텐츠 단위입니다. 청크/메타데이터 구성의 입력이며,
//! 구성 단계에서는 읽기만 하고 수정하지 않습니다.
//!
//! 저장 형식은 요소 배열 JSON 파일(`*_elements.json`)입니다.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, PrepResult};

/// 이미지 설명 접두어
pub const CAPTION_PREFIX: &str = "이미지설명: ";

// ============================================================================
// Element
// ============================================================================

/// 추출된 문서 요소
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// 요소 ID (문서 내 유일, 읽기 순서)
    pub id: i64,
    /// 페이지 번호 (1부터 시작)
    pub page: u32,
    /// 카테고리 (table, figure, chart, paragraph, heading1 ...)
    pub category: String,
    /// 원본 파일명 (확장자 제외)
    #[serde(default)]
    pub filename: String,
    /// 텍스트 (표는 평탄화된 Markdown)
    pub text: String,
    /// 잘라낸 이미지 파일명 (있을 때만)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// 이미지 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Element {
    pub fn new(id: i64, page: u32, category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            page,
            category: category.into(),
            filename: String::new(),
            text: text.into(),
            alt: None,
            caption: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// 임베딩에 넘길 텍스트 (이미지 설명이 있으면 뒤에 붙임)
    pub fn embed_text(&self) -> String {
        match self.caption.as_deref().map(str::trim) {
            Some(caption) if !caption.is_empty() => {
                format!("{}\n\n{}{}", self.text, CAPTION_PREFIX, caption)
            }
            _ => self.text.clone(),
        }
    }
}

/// 요소 ID별 이미지 설명을 붙임
///
/// 설명이 없는 요소는 그대로 둡니다. 붙인 개수를 반환합니다.
pub fn attach_captions(elements: &mut [Element], captions: &HashMap<i64, String>) -> usize {
    let mut attached = 0;
    for element in elements.iter_mut() {
        if let Some(caption) = captions.get(&element.id) {
            element.caption = Some(caption.clone());
            attached += 1;
        }
    }
    attached
}

// ============================================================================
// Load / Save
// ============================================================================

/// 요소 JSON 파일 로드
pub fn load_elements(path: &Path) -> PrepResult<Vec<Element>> {
    let data = std::fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
    let elements: Vec<Element> =
        serde_json::from_str(&data).map_err(|e| PrepError::json(path, e))?;

    if elements.is_empty() {
        return Err(PrepError::NoElements(path.to_path_buf()));
    }

    let mut seen = HashSet::with_capacity(elements.len());
    for element in &elements {
        if !seen.insert(element.id) {
            return Err(PrepError::DuplicateElementId {
                id: element.id,
                path: path.to_path_buf(),
            });
        }
    }

    tracing::debug!("Loaded {} elements from {:?}", elements.len(), path);
    Ok(elements)
}

/// 요소 JSON 파일 저장
pub fn save_elements(path: &Path, elements: &[Element]) -> PrepResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| PrepError::io(parent, e))?;
        }
    }

    let json = serde_json::to_string_pretty(elements).map_err(|e| PrepError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| PrepError::io(path, e))
}

// ============================================================================
// Tests
// ============================================================================
