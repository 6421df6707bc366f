//! 청크/메타데이터 구성 모듈
//!
//! 요소 목록 하나에서 임베딩용 콘텐츠 4종과 메타데이터 3종을 만들고,
//! 호환되는 조합 11개를 `(콘텐츠 목록, 메타데이터 목록)` 쌍으로 묶습니다.
//!
//! - 콘텐츠: chunk_only / chunk_with_neighbors / page_plus_chunk / page_only
//! - 메타데이터: 1 이웃 청크 / 2 3페이지 윈도우 / 3 페이지 경계
//! - page_only는 이웃 메타데이터(1)와 짝짓지 않음
//!
//! 인접 관계는 ID(±1)와 페이지(±1) 숫자로만 계산합니다. 빠진 ID/페이지는
//! 빈 구간이 됩니다. 모든 목록은 ID 순 요소 순서에 맞춰 정렬됩니다.

mod index;
mod labels;

use serde::{Deserialize, Serialize};

use crate::element::Element;

pub use index::{ElementIndex, PageGroup};
pub use labels::{compose, parse_segments, SegmentLabel, SEGMENT_SEPARATOR};

// ============================================================================
// Representation Kinds
// ============================================================================

/// 콘텐츠 표현 (임베딩할 텍스트)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    ChunkOnly,
    ChunkWithNeighbors,
    PagePlusChunk,
    PageOnly,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::ChunkOnly,
        ContentKind::ChunkWithNeighbors,
        ContentKind::PagePlusChunk,
        ContentKind::PageOnly,
    ];

    /// 파일명 접두 번호
    pub fn code(self) -> &'static str {
        match self {
            ContentKind::ChunkOnly => "1",
            ContentKind::ChunkWithNeighbors => "2",
            ContentKind::PagePlusChunk => "3",
            ContentKind::PageOnly => "4",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ContentKind::ChunkOnly => "chunk_only",
            ContentKind::ChunkWithNeighbors => "chunk_with_neighbors",
            ContentKind::PagePlusChunk => "page_plus_chunk",
            ContentKind::PageOnly => "page_only",
        }
    }

    /// 짝지을 수 있는 메타데이터 전략
    pub fn strategies(self) -> &'static [MetadataStrategy] {
        match self {
            ContentKind::PageOnly => &[MetadataStrategy::PageWindow, MetadataStrategy::CrossPage],
            _ => &MetadataStrategy::ALL,
        }
    }

    pub fn supports(self, strategy: MetadataStrategy) -> bool {
        self.strategies().contains(&strategy)
    }
}

/// 메타데이터 표현 (청크 옆에 저장할 맥락)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataStrategy {
    /// 이전/현재/다음 청크
    Neighbor,
    /// 이전/현재/다음 페이지 전체
    PageWindow,
    /// 현재 페이지 + 이전 페이지 마지막 청크 + 다음 페이지 첫 청크
    CrossPage,
}

impl MetadataStrategy {
    pub const ALL: [MetadataStrategy; 3] = [
        MetadataStrategy::Neighbor,
        MetadataStrategy::PageWindow,
        MetadataStrategy::CrossPage,
    ];

    pub fn code(self) -> &'static str {
        match self {
            MetadataStrategy::Neighbor => "1",
            MetadataStrategy::PageWindow => "2",
            MetadataStrategy::CrossPage => "3",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

// ============================================================================
// Metadata / Pairs
// ============================================================================

/// 청크 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub elementid: Vec<i64>,
    pub category: String,
    pub filename: String,
    pub page: Vec<u32>,
    pub text: String,
}

/// 콘텐츠 목록과 메타데이터 목록 한 쌍 (인덱스 정렬)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentationPair {
    pub content: ContentKind,
    pub metadata: MetadataStrategy,
    pub contents: Vec<String>,
    pub metadatas: Vec<ChunkMetadata>,
}

impl RepresentationPair {
    /// `{콘텐츠번호}-{메타데이터번호}_{콘텐츠이름}` (예: `2-1_chunk_with_neighbors`)
    pub fn name(&self) -> String {
        format!(
            "{}-{}_{}",
            self.content.code(),
            self.metadata.code(),
            self.content.name()
        )
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// 11개 표현 쌍
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Representations {
    pairs: Vec<RepresentationPair>,
}

impl Representations {
    pub fn get(&self, content: ContentKind, metadata: MetadataStrategy) -> Option<&RepresentationPair> {
        self.pairs
            .iter()
            .find(|p| p.content == content && p.metadata == metadata)
    }

    pub fn pairs(&self) -> &[RepresentationPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// 다른 문서의 표현을 같은 쌍 뒤에 이어붙임
    pub fn extend(&mut self, other: Representations) {
        if self.pairs.is_empty() {
            self.pairs = other.pairs;
            return;
        }

        for pair in other.pairs {
            match self
                .pairs
                .iter_mut()
                .find(|p| p.content == pair.content && p.metadata == pair.metadata)
            {
                Some(existing) => {
                    existing.contents.extend(pair.contents);
                    existing.metadatas.extend(pair.metadatas);
                }
                None => self.pairs.push(pair),
            }
        }
    }
}

// ============================================================================
// Constructor
// ============================================================================

/// 청크/메타데이터 구성기
pub struct Constructor<'a> {
    index: ElementIndex<'a>,
}

impl<'a> Constructor<'a> {
    pub fn new(elements: &'a [Element]) -> Self {
        Self {
            index: ElementIndex::build(elements),
        }
    }

    pub fn index(&self) -> &ElementIndex<'a> {
        &self.index
    }

    /// 콘텐츠 목록 생성
    pub fn content(&self, kind: ContentKind) -> Vec<String> {
        self.index
            .elements()
            .iter()
            .map(|element| match kind {
                ContentKind::ChunkOnly => self.index.text_of(element.id).to_string(),
                ContentKind::ChunkWithNeighbors => self.neighbor_text(element.id),
                ContentKind::PagePlusChunk => compose(&[
                    (SegmentLabel::CurrPageFull, self.index.page_text(element.page)),
                    (SegmentLabel::CurrChunk, self.index.text_of(element.id)),
                ]),
                ContentKind::PageOnly => compose(&[(
                    SegmentLabel::CurrPageFull,
                    self.index.page_text(element.page),
                )]),
            })
            .collect()
    }

    /// 메타데이터 목록 생성
    pub fn metadata(&self, strategy: MetadataStrategy) -> Vec<ChunkMetadata> {
        self.index
            .elements()
            .iter()
            .map(|element| match strategy {
                MetadataStrategy::Neighbor => self.neighbor_metadata(element),
                MetadataStrategy::PageWindow => self.page_window_metadata(element),
                MetadataStrategy::CrossPage => self.cross_page_metadata(element),
            })
            .collect()
    }

    /// 11개 표현 쌍 생성
    pub fn construct(&self) -> Representations {
        let metadata: Vec<(MetadataStrategy, Vec<ChunkMetadata>)> = MetadataStrategy::ALL
            .into_iter()
            .map(|strategy| (strategy, self.metadata(strategy)))
            .collect();

        let mut pairs = Vec::with_capacity(11);
        for kind in ContentKind::ALL {
            let contents = self.content(kind);
            for (strategy, metadatas) in &metadata {
                if !kind.supports(*strategy) {
                    continue;
                }
                pairs.push(RepresentationPair {
                    content: kind,
                    metadata: *strategy,
                    contents: contents.clone(),
                    metadatas: metadatas.clone(),
                });
            }
        }

        tracing::debug!(
            "Constructed {} representation pairs for {} elements",
            pairs.len(),
            self.index.len()
        );

        Representations { pairs }
    }

    fn neighbor_text(&self, id: i64) -> String {
        compose(&[
            (SegmentLabel::PrevChunk, self.index.prev_text(id)),
            (SegmentLabel::CurrChunk, self.index.text_of(id)),
            (SegmentLabel::NextChunk, self.index.next_text(id)),
        ])
    }

    fn neighbor_metadata(&self, element: &Element) -> ChunkMetadata {
        ChunkMetadata {
            elementid: vec![element.id],
            category: element.category.clone(),
            filename: element.filename.clone(),
            page: vec![element.page],
            text: self.neighbor_text(element.id),
        }
    }

    fn page_window_metadata(&self, element: &Element) -> ChunkMetadata {
        let mut elementid = Vec::new();
        let mut page = Vec::new();
        let mut texts = [""; 3];

        for (slot, offset) in [-1i64, 0, 1].into_iter().enumerate() {
            if let Some(group) = self.index.page_at(element.page, offset) {
                texts[slot] = &group.full;
                elementid.extend_from_slice(&group.ids);
                let number = (i64::from(element.page) + offset) as u32;
                page.extend(std::iter::repeat(number).take(group.ids.len()));
            }
        }

        ChunkMetadata {
            elementid,
            category: element.category.clone(),
            filename: element.filename.clone(),
            page,
            text: compose(&[
                (SegmentLabel::PrevPage, texts[0]),
                (SegmentLabel::CurrPage, texts[1]),
                (SegmentLabel::NextPage, texts[2]),
            ]),
        }
    }

    fn cross_page_metadata(&self, element: &Element) -> ChunkMetadata {
        let current = self.index.page(element.page);
        let prev = self.index.page_at(element.page, -1);
        let next = self.index.page_at(element.page, 1);

        let mut elementid: Vec<i64> = current.map(|g| g.ids.clone()).unwrap_or_default();
        let mut page = vec![element.page; elementid.len()];

        if let Some(last_id) = prev.and_then(|g| g.ids.last()) {
            elementid.push(*last_id);
            page.push(element.page - 1);
        }
        if let Some(first_id) = next.and_then(|g| g.ids.first()) {
            elementid.push(*first_id);
            page.push(element.page + 1);
        }

        ChunkMetadata {
            elementid,
            category: element.category.clone(),
            filename: element.filename.clone(),
            page,
            text: compose(&[
                (SegmentLabel::CurrPageFull, current.map(|g| g.full.as_str()).unwrap_or("")),
                (SegmentLabel::PrevPageLastChunk, prev.map(|g| g.last.as_str()).unwrap_or("")),
                (SegmentLabel::NextPageFirstChunk, next.map(|g| g.first.as_str()).unwrap_or("")),
            ]),
        }
    }
}

/// 요소 목록 하나에서 11개 표현 쌍 생성
pub fn construct(elements: &[Element]) -> Representations {
    Constructor::new(elements).construct()
}

/// 여러 문서의 표현을 합침
///
/// ID는 문서 안에서만 유일하므로 문서별로 따로 구성한 뒤 이어붙입니다.
pub fn construct_many(documents: &[Vec<Element>]) -> Representations {
    let mut merged = Representations::default();
    for elements in documents {
        merged.extend(construct(elements));
    }
    merged
}

// ============================================================================
// Tests
// ============================================================================
