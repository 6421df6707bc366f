//! HTML 모듈 - 문서 파서 HTML에서 요소/블록 Markdown 추출
//!
//! 문서 파서가 내보내는 HTML은 `<body>` 바로 아래에 요소가 한 줄로 나열되고,
//! 각 요소는 `id`, `data-category`, `data-page` 속성을 가집니다.
//!
//! - [`extract_elements`]: 최상위 요소 → [`Element`] 목록 (표는 Markdown으로 평탄화)
//! - [`render_blocks`]: 최상위 요소 → `elementId: N ... <<BLOCKEND>>` 블록 Markdown

mod table;

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::collector::ImageIndex;
use crate::element::Element;

pub use table::{parse_table_rows, table_to_markdown};

/// 블록 끝 표시
pub const BLOCK_END: &str = "<<BLOCKEND>>";

/// 블록 첫 줄의 요소 ID 접두어
pub const ELEMENT_ID_PREFIX: &str = "elementId:";

const TEXT_TAGS: [&str; 8] = ["p", "header", "h1", "h2", "h3", "h4", "h5", "h6"];

// ============================================================================
// Helpers
// ============================================================================

/// 고정 CSS 선택자 파싱
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n+").expect("Invalid regex"))
}

/// 요소 텍스트 (텍스트 노드를 줄바꿈으로 연결, 연속 빈 줄은 하나로)
pub fn element_text(element: ElementRef<'_>) -> String {
    let text = element.text().collect::<Vec<_>>().join("\n");
    blank_lines_re().replace_all(&text, "\n\n").trim().to_string()
}

/// `<body>` 바로 아래 요소들
fn top_level_elements(document: &Html) -> Vec<ElementRef<'_>> {
    let parent = document
        .select(&selector("body"))
        .next()
        .unwrap_or_else(|| document.root_element());

    parent.children().filter_map(ElementRef::wrap).collect()
}

fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn numeric_id(element: ElementRef<'_>) -> Option<i64> {
    attr(element, "id").and_then(|v| v.parse().ok())
}

// ============================================================================
// Element Extraction
// ============================================================================

/// HTML 문서에서 요소 목록 추출
///
/// - 숫자 `id`가 없는 최상위 요소는 건너뜀
/// - `data-page`가 없으면 앞 요소의 페이지를 이어받음 (첫 요소는 1)
/// - `data-category`가 없으면 태그 이름
/// - 결과는 ID 순
pub fn extract_elements(html: &str, filename: &str) -> Vec<Element> {
    let document = Html::parse_document(html);
    let mut elements = Vec::new();
    let mut last_page = 1;

    for node in top_level_elements(&document) {
        let tag = node.value().name().to_ascii_lowercase();
        if tag == "br" {
            continue;
        }

        let Some(id) = numeric_id(node) else {
            tracing::warn!("id 없는 <{}> 요소 건너뜀 ({})", tag, filename);
            continue;
        };

        let page = attr(node, "data-page")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(last_page);
        last_page = page;

        let category = attr(node, "data-category")
            .map(str::to_string)
            .unwrap_or_else(|| tag.clone());

        elements.push(Element {
            id,
            page,
            category,
            filename: filename.to_string(),
            text: element_content(node, &tag),
            alt: attr(node, "alt").map(str::to_string),
            caption: None,
        });
    }

    elements.sort_by_key(|element| element.id);
    tracing::debug!("Extracted {} elements from {}", elements.len(), filename);
    elements
}

/// 요소 본문 (표는 Markdown, 표를 품은 figure는 캡션 + Markdown)
fn element_content(node: ElementRef<'_>, tag: &str) -> String {
    match tag {
        "table" => table_to_markdown(node),
        "figure" => match node.select(&selector("table")).next() {
            Some(table) => {
                let caption = node
                    .select(&selector("figcaption"))
                    .next()
                    .map(element_text)
                    .unwrap_or_default();
                format!("{}\n{}", caption, table_to_markdown(table))
                    .trim()
                    .to_string()
            }
            None => element_text(node),
        },
        _ => element_text(node),
    }
}

// ============================================================================
// Block Markdown
// ============================================================================

/// HTML 문서를 블록 Markdown으로 변환
///
/// 블록 형식:
/// ```text
/// elementId: 3
/// (내용)
/// <<BLOCKEND>>
/// ```
/// 이미지 링크는 `base_dir` 기준 상대 경로입니다.
pub fn render_blocks(html: &str, images: &ImageIndex, base_dir: &Path) -> String {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();

    for node in top_level_elements(&document) {
        let tag = node.value().name().to_ascii_lowercase();
        let id = numeric_id(node);

        let content = match tag.as_str() {
            "br" => continue,
            t if TEXT_TAGS.contains(&t) => element_text(node),
            "table" => {
                let mut content = table_to_markdown(node);
                if let Some(id) = id {
                    if let Some(link) = images.relative_link(id, base_dir) {
                        content.push_str(&format!("\n![id_{}]({})", id, link));
                    }
                }
                content
            }
            "img" => image_block(node, id, images, base_dir),
            "figure" => figure_block(node, id, images, base_dir),
            _ => element_text(node),
        };

        blocks.push(render_block(id, &content));
    }

    blocks.join("\n")
}

fn render_block(id: Option<i64>, content: &str) -> String {
    let mut lines = Vec::with_capacity(2);
    if let Some(id) = id {
        lines.push(format!("{} {}", ELEMENT_ID_PREFIX, id));
    }
    if !content.is_empty() {
        lines.push(content.to_string());
    }
    format!("{}\n{}", lines.join("\n"), BLOCK_END)
}

fn image_source(
    img: ElementRef<'_>,
    id: Option<i64>,
    images: &ImageIndex,
    base_dir: &Path,
) -> String {
    attr(img, "src")
        .map(str::to_string)
        .or_else(|| id.and_then(|id| images.relative_link(id, base_dir)))
        .unwrap_or_default()
}

fn image_block(node: ElementRef<'_>, id: Option<i64>, images: &ImageIndex, base_dir: &Path) -> String {
    let mut content = format!("![]({})", image_source(node, id, images, base_dir));
    if let Some(alt) = attr(node, "alt") {
        content.push_str(&format!("\n*{}*", alt));
    }
    content
}

fn figure_block(node: ElementRef<'_>, id: Option<i64>, images: &ImageIndex, base_dir: &Path) -> String {
    let mut content = String::new();

    if let Some(img) = node.select(&selector("img")).next() {
        content.push_str(&image_block(img, id, images, base_dir));
    } else if let Some(link) = id.and_then(|id| images.relative_link(id, base_dir)) {
        content.push_str(&format!("![]({})", link));
    }

    if let Some(figcaption) = node.select(&selector("figcaption")).next() {
        content.push_str(&format!("\n#### {}", element_text(figcaption)));
    }

    if let Some(table) = node.select(&selector("table")).next() {
        let markdown = table_to_markdown(table);
        if !markdown.is_empty() {
            content.push('\n');
            content.push_str(&markdown);
        }
    }

    content
}

// ============================================================================
// Tests
// ============================================================================
