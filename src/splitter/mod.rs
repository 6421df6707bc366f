//! 텍스트 분할 모듈
//!
//! 블록 Markdown(`elementId:` / `<<BLOCKEND>>`)에서 표시를 걷어낸 뒤
//! 고정 길이 청크로 다시 나눕니다. 길이는 모두 문자 수 기준입니다.
//!
//! - [`BlockOverlapChunker`]: `<<BLOCKEND>>` 블록 단위, 앞 블록 끝 `chunk_overlap`자를 이어붙임
//! - [`SlidingWindowChunker`]: `chunk_size` 창을 `chunk_size - chunk_overlap`씩 이동
//! - [`RecursiveChunker`]: 문단 → 줄 → 공백 → 문자 순으로 나눈 뒤 병합

use std::collections::VecDeque;

use crate::html::{BLOCK_END, ELEMENT_ID_PREFIX};

/// 슬라이딩 윈도우 출력의 청크 구분자
pub const SPLIT_MARKER: &str = "<<SPLIT>>";

// ============================================================================
// Split Configuration
// ============================================================================

/// 분할 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    /// 청크 최대 길이 (문자 수)
    pub chunk_size: usize,
    /// 이웃 청크 간 중첩 길이 (문자 수)
    pub chunk_overlap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

impl SplitConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// 잘게 나누는 설정 (표가 많은 문서용)
    pub fn for_fine() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
        }
    }

    /// 창 이동 폭 (최소 1)
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap).max(1)
    }
}

// ============================================================================
// Chunker Trait
// ============================================================================

/// 텍스트 청킹 전략 트레이트
pub trait Chunker: Send + Sync {
    /// 텍스트를 청크로 분할
    fn chunk(&self, text: &str) -> Vec<String>;

    /// 청커 이름
    fn name(&self) -> &'static str;
}

// ============================================================================
// Block Markers
// ============================================================================

/// `elementId:` 줄과 `<<BLOCKEND>>` 줄 제거
pub fn strip_block_markers(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with(ELEMENT_ID_PREFIX) && trimmed != BLOCK_END
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// 각 청크 뒤에 구분자를 붙여 연결
pub fn render_split(chunks: &[String], separator: &str) -> String {
    chunks
        .iter()
        .map(|chunk| format!("{}{}", chunk, separator))
        .collect()
}

// ============================================================================
// BlockOverlapChunker
// ============================================================================

/// 블록 단위 청커
///
/// 블록 Markdown을 `<<BLOCKEND>>`(또는 `<<SPLIT>>`)로 나누고, 첫 줄(`elementId: N`)은
/// 헤더로 유지합니다. 두 번째 블록부터 본문 앞에 이전 블록 본문의 끝
/// `chunk_overlap`자를 붙입니다. `accumulate`가 켜져 있으면 이전 블록이 짧을 때
/// 그 앞 블록들까지 거슬러 올라가 `chunk_overlap`자를 채웁니다.
pub struct BlockOverlapChunker {
    overlap: usize,
    accumulate: bool,
}

impl BlockOverlapChunker {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            overlap: config.chunk_overlap,
            accumulate: false,
        }
    }

    /// 이전 블록들을 누적해 중첩 길이를 채움
    pub fn accumulating(mut self) -> Self {
        self.accumulate = true;
        self
    }

    /// `(헤더, 본문)` 블록 목록
    fn parse_blocks(text: &str) -> Vec<(String, String)> {
        text.replace(SPLIT_MARKER, BLOCK_END)
            .split(BLOCK_END)
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| match block.split_once('\n') {
                Some((header, body)) => (header.to_string(), body.to_string()),
                None => (block.to_string(), String::new()),
            })
            .collect()
    }

    fn overlap_text(&self, blocks: &[(String, String)], current: usize) -> String {
        let mut accumulated = String::new();

        for (_, body) in blocks[..current].iter().rev() {
            if accumulated.is_empty() {
                accumulated = body.clone();
            } else {
                accumulated = format!("{}\n{}", body, accumulated);
            }
            if !self.accumulate || char_len(&accumulated) >= self.overlap {
                break;
            }
        }

        tail_chars(&accumulated, self.overlap)
    }
}

impl Chunker for BlockOverlapChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let blocks = Self::parse_blocks(text);

        blocks
            .iter()
            .enumerate()
            .map(|(i, (header, body))| {
                let overlap = if i > 0 {
                    self.overlap_text(&blocks, i)
                } else {
                    String::new()
                };

                let body = if overlap.is_empty() {
                    body.clone()
                } else {
                    format!("{}\n{}", overlap, body)
                };

                if body.is_empty() {
                    header.clone()
                } else {
                    format!("{}\n{}", header, body)
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "BlockOverlapChunker"
    }
}

// ============================================================================
// SlidingWindowChunker
// ============================================================================

/// 고정 창 청커
///
/// 마지막 창이 앞 창에 완전히 포함되더라도 그대로 내보냅니다.
pub struct SlidingWindowChunker {
    config: SplitConfig,
}

impl SlidingWindowChunker {
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }
}

impl Chunker for SlidingWindowChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();

        (0..chars.len())
            .step_by(self.config.step())
            .map(|start| {
                let end = (start + self.config.chunk_size).min(chars.len());
                chars[start..end].iter().collect()
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "SlidingWindowChunker"
    }
}

// ============================================================================
// RecursiveChunker
// ============================================================================

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// 구분자 재귀 청커
///
/// 텍스트에 들어 있는 첫 구분자로 나누고, `chunk_size` 이상인 조각은 다음
/// 구분자로 다시 나눕니다. 조각들은 `chunk_size`까지 병합하고, 새 청크는
/// 직전 청크의 끝 조각을 `chunk_overlap`까지 이어받습니다.
pub struct RecursiveChunker {
    config: SplitConfig,
    separators: Vec<String>,
}

impl RecursiveChunker {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            config,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];

        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut good: Vec<String> = Vec::new();

        for piece in splits {
            if char_len(&piece) < self.config.chunk_size {
                good.push(piece);
                continue;
            }

            if !good.is_empty() {
                chunks.extend(self.merge_splits(&good, separator));
                good.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !good.is_empty() {
            chunks.extend(self.merge_splits(&good, separator));
        }

        chunks
    }

    /// 조각들을 `chunk_size`까지 병합
    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let sep_len = char_len(separator);

        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(piece);
            let joined_len = |current: &VecDeque<&str>, total: usize| {
                total + len + if current.is_empty() { 0 } else { sep_len }
            };

            if joined_len(&current, total) > size && !current.is_empty() {
                push_joined(&mut docs, &current, separator);

                while total > overlap || (joined_len(&current, total) > size && total > 0) {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if current.is_empty() { 0 } else { sep_len };
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { sep_len } else { 0 };
        }

        push_joined(&mut docs, &current, separator);
        docs
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }
        self.split_recursive(text, &self.separators)
    }

    fn name(&self) -> &'static str {
        "RecursiveChunker"
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// 끝에서 `n`자
fn tail_chars(s: &str, n: usize) -> String {
    let skip = char_len(s).saturating_sub(n);
    s.chars().skip(skip).collect()
}

fn push_joined(docs: &mut Vec<String>, current: &VecDeque<&str>, separator: &str) {
    let doc = current
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();
    if !doc.is_empty() {
        docs.push(doc);
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// 기본 청커 생성 (슬라이딩 윈도우)
pub fn default_chunker() -> Box<dyn Chunker> {
    Box::new(SlidingWindowChunker::new(SplitConfig::default()))
}

/// 블록 청커 생성 (설정 지정)
pub fn block_chunker(config: SplitConfig, accumulate: bool) -> Box<dyn Chunker> {
    let chunker = BlockOverlapChunker::new(config);
    if accumulate {
        Box::new(chunker.accumulating())
    } else {
        Box::new(chunker)
    }
}

/// 재귀 청커 생성 (설정 지정)
pub fn recursive_chunker(config: SplitConfig) -> Box<dyn Chunker> {
    Box::new(RecursiveChunker::new(config))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_block_markers() {
        let text = "elementId: 1\n제목\n<<BLOCKEND>>\nelementId: 2\n본문\n  <<BLOCKEND>>  \n";
        assert_eq!(strip_block_markers(text), "제목\n본문");
    }

    #[test]
    fn test_sliding_window() {
        let chunker = SlidingWindowChunker::new(SplitConfig::new(4, 1));
        let chunks = chunker.chunk("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "defg", "ghij", "j"]);
    }

    #[test]
    fn test_sliding_window_counts_chars() {
        let chunker = SlidingWindowChunker::new(SplitConfig::new(3, 0));
        let chunks = chunker.chunk("가나다라마");
        assert_eq!(chunks, vec!["가나다", "라마"]);
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_step_never_zero() {
        assert_eq!(SplitConfig::new(5, 10).step(), 1);
        assert_eq!(SplitConfig::default().step(), 400);
    }

    #[test]
    fn test_recursive_prefers_paragraphs() {
        let chunker = RecursiveChunker::new(SplitConfig::new(12, 0));
        let chunks = chunker.chunk("첫 문단입니다\n\n둘째 문단입니다");
        assert_eq!(chunks, vec!["첫 문단입니다", "둘째 문단입니다"]);
    }

    #[test]
    fn test_recursive_merges_small_pieces() {
        let chunker = RecursiveChunker::new(SplitConfig::new(10, 0));
        let chunks = chunker.chunk("a b c d e f g h");
        assert_eq!(chunks, vec!["a b c d e", "f g h"]);
    }

    #[test]
    fn test_recursive_overlap() {
        let chunker = RecursiveChunker::new(SplitConfig::new(5, 3));
        let chunks = chunker.chunk("a b c d e");
        assert_eq!(chunks, vec!["a b c", "b c d", "c d e"]);
    }

    #[test]
    fn test_recursive_long_word_split_by_chars() {
        let chunker = RecursiveChunker::new(SplitConfig::new(3, 0));
        let chunks = chunker.chunk("abcdefg");
        assert_eq!(chunks, vec!["abc", "def", "g"]);
    }

    const BLOCKS: &str = "elementId: 1\n가나다라마\n<<BLOCKEND>>\n\
                          elementId: 2\nAB\n<<BLOCKEND>>\n\
                          elementId: 3\n바사\n<<BLOCKEND>>\n";

    #[test]
    fn test_block_keeps_headers_and_prepends_overlap() {
        let chunker = BlockOverlapChunker::new(SplitConfig::new(500, 3));
        let chunks = chunker.chunk(BLOCKS);

        assert_eq!(
            chunks,
            vec![
                "elementId: 1\n가나다라마",
                "elementId: 2\n다라마\nAB",
                "elementId: 3\nAB\n바사",
            ]
        );
    }

    #[test]
    fn test_block_accumulates_short_previous_blocks() {
        let chunker = BlockOverlapChunker::new(SplitConfig::new(500, 5)).accumulating();
        let chunks = chunker.chunk(BLOCKS);

        assert_eq!(chunks[1], "elementId: 2\n가나다라마\nAB");
        // "가나다라마\nAB"의 끝 5자
        assert_eq!(chunks[2], "elementId: 3\n라마\nAB\n바사");
    }

    #[test]
    fn test_block_accepts_split_markers_and_header_only_blocks() {
        let chunker = BlockOverlapChunker::new(SplitConfig::new(500, 0));
        let text = "elementId: 1\n본문\n<<SPLIT>>\nelementId: 2\n<<SPLIT>>\n\n<<BLOCKEND>>";
        assert_eq!(chunker.chunk(text), vec!["elementId: 1\n본문", "elementId: 2"]);
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_render_split() {
        let chunks = vec!["a".to_string(), "b".to_string()];
        assert_eq!(render_split(&chunks, "\n<<SPLIT>>\n"), "a\n<<SPLIT>>\nb\n<<SPLIT>>\n");
    }

    #[test]
    fn test_factories() {
        assert_eq!(default_chunker().name(), "SlidingWindowChunker");
        assert_eq!(recursive_chunker(SplitConfig::for_fine()).name(), "RecursiveChunker");
        assert_eq!(block_chunker(SplitConfig::default(), true).name(), "BlockOverlapChunker");
    }
}
