//! 요소 조회 인덱스
//!
//! 구성 한 번마다 새로 만드는 읽기 전용 맵입니다.
//! - `id → 텍스트`
//! - `page → 페이지 묶음` (전체 텍스트, 첫/마지막 청크, 요소 ID 목록)
//!
//! 없는 ID/페이지 조회는 빈 문자열/빈 묶음으로 끝나고 실패하지 않습니다.

use std::collections::HashMap;

use crate::element::Element;

use super::labels::SEGMENT_SEPARATOR;

/// 한 페이지의 요소 묶음 (ID 순)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageGroup {
    pub full: String,
    pub first: String,
    pub last: String,
    pub ids: Vec<i64>,
}

/// ID/페이지 인접 조회용 인덱스
#[derive(Debug)]
pub struct ElementIndex<'a> {
    ordered: Vec<&'a Element>,
    texts: HashMap<i64, String>,
    pages: HashMap<u32, PageGroup>,
}

impl<'a> ElementIndex<'a> {
    /// 요소 목록에서 인덱스 생성 (ID 기준 안정 정렬)
    pub fn build(elements: &'a [Element]) -> Self {
        let mut ordered: Vec<&Element> = elements.iter().collect();
        ordered.sort_by_key(|element| element.id);

        let mut texts = HashMap::with_capacity(ordered.len());
        let mut page_texts: HashMap<u32, Vec<(i64, String)>> = HashMap::new();

        for element in &ordered {
            let text = element.embed_text();
            page_texts
                .entry(element.page)
                .or_default()
                .push((element.id, text.clone()));
            texts.insert(element.id, text);
        }

        let pages = page_texts
            .into_iter()
            .map(|(page, entries)| {
                let ids = entries.iter().map(|(id, _)| *id).collect();
                let first = entries.first().map(|(_, t)| t.clone()).unwrap_or_default();
                let last = entries.last().map(|(_, t)| t.clone()).unwrap_or_default();
                let full = entries
                    .iter()
                    .map(|(_, t)| t.as_str())
                    .collect::<Vec<_>>()
                    .join(SEGMENT_SEPARATOR);
                (page, PageGroup { full, first, last, ids })
            })
            .collect();

        Self {
            ordered,
            texts,
            pages,
        }
    }

    /// ID 순 요소 목록
    pub fn elements(&self) -> &[&'a Element] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// 요소 텍스트 (없는 ID는 빈 문자열)
    pub fn text_of(&self, id: i64) -> &str {
        self.texts.get(&id).map(String::as_str).unwrap_or("")
    }

    /// 이전 ID의 텍스트
    pub fn prev_text(&self, id: i64) -> &str {
        id.checked_sub(1).map(|prev| self.text_of(prev)).unwrap_or("")
    }

    /// 다음 ID의 텍스트
    pub fn next_text(&self, id: i64) -> &str {
        id.checked_add(1).map(|next| self.text_of(next)).unwrap_or("")
    }

    /// 페이지 묶음
    pub fn page(&self, page: u32) -> Option<&PageGroup> {
        self.pages.get(&page)
    }

    /// 상대 페이지 묶음 (`offset`만큼 떨어진 페이지)
    pub fn page_at(&self, page: u32, offset: i64) -> Option<&PageGroup> {
        let target = i64::from(page).checked_add(offset)?;
        u32::try_from(target).ok().and_then(|p| self.page(p))
    }

    /// 페이지 전체 텍스트 (없는 페이지는 빈 문자열)
    pub fn page_text(&self, page: u32) -> &str {
        self.page(page).map(|g| g.full.as_str()).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Element> {
        vec![
            Element::new(3, 2, "paragraph", "C"),
            Element::new(1, 1, "paragraph", "A"),
            Element::new(2, 1, "table", "B"),
        ]
    }

    #[test]
    fn test_sorted_by_id() {
        let elements = sample();
        let index = ElementIndex::build(&elements);
        let ids: Vec<i64> = index.elements().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_missing_lookups_are_empty() {
        let elements = sample();
        let index = ElementIndex::build(&elements);

        assert_eq!(index.text_of(42), "");
        assert_eq!(index.prev_text(1), "");
        assert_eq!(index.next_text(3), "");
        assert_eq!(index.page_text(9), "");
        assert!(index.page_at(1, -1).is_none());
        assert!(index.page_at(0, -1).is_none());
    }

    #[test]
    fn test_page_group() {
        let elements = sample();
        let index = ElementIndex::build(&elements);

        let page1 = index.page(1).unwrap();
        assert_eq!(page1.full, "A\n\nB");
        assert_eq!(page1.first, "A");
        assert_eq!(page1.last, "B");
        assert_eq!(page1.ids, vec![1, 2]);
        assert_eq!(index.page_at(1, 1).unwrap().ids, vec![3]);
    }

    #[test]
    fn test_caption_included_in_lookup() {
        let elements = vec![Element::new(1, 1, "figure", "그림").with_caption("설명")];
        let index = ElementIndex::build(&elements);
        assert_eq!(index.text_of(1), "그림\n\n이미지설명: 설명");
        assert_eq!(index.page_text(1), "그림\n\n이미지설명: 설명");
    }
}
