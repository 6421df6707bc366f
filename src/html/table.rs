//! HTML 표 → 셀 모델 / Markdown
//!
//! `<tr>` 아래의 `<td>`/`<th>`를 읽어 [`TableCell`] 행으로 만들고
//! 표 평탄화 모듈에 넘깁니다.

use scraper::ElementRef;

use crate::table::{flatten_table, TableCell, TableRow};

use super::selector;

/// `<table>` 요소에서 행/셀 구조 추출
///
/// 모든 하위 `tr`을 문서 순서대로, 각 행의 하위 `td`/`th`를 셀로 읽습니다.
pub fn parse_table_rows(table: ElementRef<'_>) -> Vec<TableRow> {
    let row_selector = selector("tr");
    let cell_selector = selector("td, th");

    table
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| {
                    TableCell::spanning(
                        cell_text(cell),
                        span_attr(cell, "rowspan"),
                        span_attr(cell, "colspan"),
                    )
                })
                .collect()
        })
        .collect()
}

/// `<table>` → Markdown 표 (헤더 구분선 + 캡션 줄 포함)
pub fn table_to_markdown(table: ElementRef<'_>) -> String {
    let rows = parse_table_rows(table);
    let flat = flatten_table(&rows);
    let mut markdown = flat.with_header_separator();

    if let Some(caption) = table_caption(table) {
        if !markdown.is_empty() {
            markdown.push('\n');
        }
        markdown.push_str(&format!("**{}**", caption));
    }

    markdown.trim().to_string()
}

/// `<caption>` 텍스트 (비어 있으면 None)
fn table_caption(table: ElementRef<'_>) -> Option<String> {
    let caption = table.select(&selector("caption")).next()?;
    let text: String = caption.text().map(str::trim).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// 셀 텍스트: 공백 제거한 텍스트 노드를 한 칸 띄어 연결
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// span 속성 (숫자가 아니면 1, usize를 넘으면 usize::MAX)
fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
        .map(|v| v.parse().unwrap_or(usize::MAX))
        .unwrap_or(1)
}
