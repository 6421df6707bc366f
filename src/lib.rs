//! rag-prep - RAG 임베딩용 문서 전처리
//!
//! 문서 파서 결과(HTML/JSON)의 병합 셀 표를 Markdown으로 평탄화하고,
//! 요소 목록에서 임베딩용 content|metadata 표현 11종을 만듭니다.

pub mod cli;
pub mod collector;
pub mod construct;
pub mod document;
pub mod element;
pub mod error;
pub mod export;
pub mod html;
pub mod splitter;
pub mod table;

// Re-exports
pub use collector::{
    find_items_dir, load_captions, CollectedFile, CollectionStats, CollectorConfig,
    FileCollector, ImageIndex, InputKind,
};
pub use construct::{
    construct, construct_many, ChunkMetadata, Constructor, ContentKind, ElementIndex,
    MetadataStrategy, RepresentationPair, Representations, SegmentLabel,
};
pub use document::{elements_from_result, load_parse_result, ParseResult};
pub use element::{attach_captions, load_elements, save_elements, Element};
pub use error::{PrepError, PrepResult};
pub use export::{get_data_dir, timestamped_dir, write_representations};
pub use html::{extract_elements, render_blocks};
pub use splitter::{
    block_chunker, default_chunker, recursive_chunker, BlockOverlapChunker, Chunker,
    RecursiveChunker, SlidingWindowChunker, SplitConfig,
};
pub use table::{flatten, flatten_table, FlattenedTable, TableCell, TableRow, MAX_COLUMNS};
