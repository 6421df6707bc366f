//! 문서 파서 응답 모듈
//!
//! 문서 파서 API 응답 JSON(`*_result.json`)을 읽어 요소 목록으로 바꿉니다.
//! API 호출 자체는 이 크레이트 밖에서 합니다.
//!
//! 응답 형식 (필요한 필드만):
//! ```json
//! {
//!   "content": {"html": "...", "markdown": "...", "text": "..."},
//!   "elements": [
//!     {"id": 0, "page": 1, "category": "heading1",
//!      "content": {"html": "<h1 id='0'>...</h1>", "markdown": "...", "text": "..."}}
//!   ]
//! }
//! ```

use std::path::Path;

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::error::{PrepError, PrepResult};
use crate::html::{element_text, selector, table_to_markdown};

// ============================================================================
// Response Types
// ============================================================================

/// 문서 파서 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    #[serde(default)]
    pub content: ParsedContent,
    #[serde(default)]
    pub elements: Vec<ParsedElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// 출력 형식별 콘텐츠
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedContent {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub text: String,
}

/// 응답의 요소 하나
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedElement {
    pub id: i64,
    pub page: u32,
    pub category: String,
    #[serde(default)]
    pub content: ParsedContent,
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
}

/// 정규화 좌표 (0~1)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl ParseResult {
    /// 응답의 페이지 수 (요소 기준)
    pub fn page_count(&self) -> u32 {
        self.elements.iter().map(|e| e.page).max().unwrap_or(0)
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// 응답 JSON 파일 로드
pub fn load_parse_result(path: &Path) -> PrepResult<ParseResult> {
    let data = std::fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| PrepError::json(path, e))
}

/// 응답에서 요소 목록 생성 (ID 순)
///
/// 표 요소는 HTML 조각을 평탄화한 Markdown을, 나머지는 text → markdown → HTML
/// 텍스트 순으로 처음 비어 있지 않은 값을 씁니다.
pub fn elements_from_result(result: &ParseResult, filename: &str) -> Vec<Element> {
    let mut elements: Vec<Element> = result
        .elements
        .iter()
        .map(|parsed| Element {
            id: parsed.id,
            page: parsed.page,
            category: parsed.category.clone(),
            filename: filename.to_string(),
            text: parsed_text(parsed),
            alt: None,
            caption: None,
        })
        .collect();

    elements.sort_by_key(|element| element.id);
    tracing::debug!("Converted {} parsed elements ({})", elements.len(), filename);
    elements
}

fn parsed_text(parsed: &ParsedElement) -> String {
    let content = &parsed.content;

    if parsed.category == "table" && !content.html.is_empty() {
        let fragment = Html::parse_fragment(&content.html);
        if let Some(table) = fragment.select(&selector("table")).next() {
            return table_to_markdown(table);
        }
    }

    for candidate in [&content.text, &content.markdown] {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    if content.html.is_empty() {
        return String::new();
    }
    element_text(Html::parse_fragment(&content.html).root_element())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RESULT: &str = r##"{
        "api": "2.0",
        "model": "document-parse",
        "content": {"html": "<h1 id='0'>제목</h1>", "markdown": "# 제목", "text": "제목"},
        "elements": [
            {"id": 2, "page": 2, "category": "table",
             "content": {"html": "<table id='2'><tr><td rowspan='2'>구분</td><td>A</td></tr><tr><td>B</td></tr></table>",
                         "markdown": "", "text": "구분 A B"},
             "coordinates": [{"x": 0.1, "y": 0.2}, {"x": 0.9, "y": 0.2}]},
            {"id": 0, "page": 1, "category": "heading1",
             "content": {"html": "<h1 id='0'>제목</h1>", "markdown": "# 제목", "text": "제목"}},
            {"id": 1, "page": 1, "category": "paragraph",
             "content": {"html": "<p id='1'>본문<br>둘째 줄</p>", "markdown": "", "text": ""}}
        ],
        "usage": {"pages": 2}
    }"##;

    #[test]
    fn test_elements_from_result() {
        let result: ParseResult = serde_json::from_str(RESULT).unwrap();
        assert_eq!(result.page_count(), 2);

        let elements = elements_from_result(&result, "manual");
        let ids: Vec<i64> = elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        assert_eq!(elements[0].text, "제목");
        assert_eq!(elements[1].text, "본문\n둘째 줄");
        assert_eq!(elements[2].text, "| 구분 | A |\n| --- | --- |\n| 구분 | B |");
        assert_eq!(elements[2].category, "table");
        assert!(elements.iter().all(|e| e.filename == "manual"));
    }

    #[test]
    fn test_load_parse_result() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc_result.json");
        std::fs::write(&path, RESULT).unwrap();

        let result = load_parse_result(&path).unwrap();
        assert_eq!(result.elements.len(), 3);
        assert_eq!(result.model.as_deref(), Some("document-parse"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad_result.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_parse_result(&path), Err(PrepError::Json { .. })));
    }
}
