//! 세그먼트 라벨 - 콘텐츠/메타데이터 텍스트의 구간 표시
//!
//! 라벨 문자열은 임베딩 품질 비교에서 구간을 구분하는 고정 어휘입니다.
//! 라벨을 바꾸면 기존 산출물과 비교할 수 없게 되므로 값을 유지해야 합니다.

use std::fmt;

/// 라벨 공통 접두어
const LABEL_OPEN: &str = "[[[[[[";

/// 라벨과 본문 사이 구분자
pub const SEGMENT_SEPARATOR: &str = "\n\n";

/// 세그먼트 라벨 (닫힌 열거형)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentLabel {
    PrevChunk,
    CurrChunk,
    NextChunk,
    CurrPageFull,
    PrevPage,
    CurrPage,
    NextPage,
    PrevPageLastChunk,
    NextPageFirstChunk,
}

impl SegmentLabel {
    pub const ALL: [SegmentLabel; 9] = [
        SegmentLabel::PrevChunk,
        SegmentLabel::CurrChunk,
        SegmentLabel::NextChunk,
        SegmentLabel::CurrPageFull,
        SegmentLabel::PrevPage,
        SegmentLabel::CurrPage,
        SegmentLabel::NextPage,
        SegmentLabel::PrevPageLastChunk,
        SegmentLabel::NextPageFirstChunk,
    ];

    /// 렌더링된 라벨 토큰
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentLabel::PrevChunk => "[[[[[[이전청크]",
            SegmentLabel::CurrChunk => "[[[[[[현재청크]",
            SegmentLabel::NextChunk => "[[[[[[다음청크]",
            SegmentLabel::CurrPageFull => "[[[[[[현재페이지 전체내용]",
            SegmentLabel::PrevPage => "[[[[[[이전페이지]",
            SegmentLabel::CurrPage => "[[[[[[현재페이지]",
            SegmentLabel::NextPage => "[[[[[[다음페이지]",
            SegmentLabel::PrevPageLastChunk => "[[[[[[이전페이지 마지막 청크]",
            SegmentLabel::NextPageFirstChunk => "[[[[[[다음페이지 첫번째 청크]",
        }
    }

    /// 토큰에서 라벨 복원
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == token)
    }
}

impl fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `라벨 + 본문` 쌍을 고정 순서로 결합
pub fn compose(segments: &[(SegmentLabel, &str)]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(segments.len() * 2);
    for (label, text) in segments {
        parts.push(label.as_str());
        parts.push(text);
    }
    parts.join(SEGMENT_SEPARATOR)
}

/// 결합된 텍스트에서 세그먼트를 다시 분리
///
/// 첫 라벨 이전의 텍스트는 버립니다. 라벨이 아닌 `[[[[[[`는 본문으로 취급합니다.
pub fn parse_segments(content: &str) -> Vec<(SegmentLabel, String)> {
    let mut marks: Vec<(usize, SegmentLabel)> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = content[pos..].find(LABEL_OPEN) {
        let start = pos + offset;
        match SegmentLabel::ALL
            .into_iter()
            .find(|label| content[start..].starts_with(label.as_str()))
        {
            Some(label) => {
                marks.push((start, label));
                pos = start + label.as_str().len();
            }
            None => pos = start + LABEL_OPEN.len(),
        }
    }

    marks
        .iter()
        .enumerate()
        .map(|(i, &(start, label))| {
            let body_start = start + label.as_str().len();
            let body_end = marks.get(i + 1).map(|&(next, _)| next).unwrap_or(content.len());
            let mut body = &content[body_start..body_end];
            body = body.strip_prefix(SEGMENT_SEPARATOR).unwrap_or(body);
            if i + 1 < marks.len() {
                body = body.strip_suffix(SEGMENT_SEPARATOR).unwrap_or(body);
            }
            (label, body.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_labels_unique() {
        let tokens: HashSet<&str> = SegmentLabel::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(tokens.len(), SegmentLabel::ALL.len());

        for label in SegmentLabel::ALL {
            assert_eq!(SegmentLabel::from_token(label.as_str()), Some(label));
        }
        assert_eq!(SegmentLabel::from_token("[[[[[[없는라벨]"), None);
    }

    #[test]
    fn test_compose() {
        let text = compose(&[(SegmentLabel::CurrPageFull, "A\n\nB")]);
        assert_eq!(text, "[[[[[[현재페이지 전체내용]\n\nA\n\nB");
    }

    #[test]
    fn test_parse_segments_with_empty_body() {
        let text = compose(&[
            (SegmentLabel::PrevChunk, ""),
            (SegmentLabel::CurrChunk, "현재"),
            (SegmentLabel::NextChunk, ""),
        ]);
        let segments = parse_segments(&text);
        assert_eq!(
            segments,
            vec![
                (SegmentLabel::PrevChunk, String::new()),
                (SegmentLabel::CurrChunk, "현재".to_string()),
                (SegmentLabel::NextChunk, String::new()),
            ]
        );
    }

    #[test]
    fn test_parse_distinguishes_page_labels() {
        let text = compose(&[
            (SegmentLabel::CurrPageFull, "전체"),
            (SegmentLabel::PrevPageLastChunk, "이전 마지막"),
            (SegmentLabel::NextPageFirstChunk, "다음 첫번째"),
        ]);
        let labels: Vec<SegmentLabel> = parse_segments(&text).into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            labels,
            vec![
                SegmentLabel::CurrPageFull,
                SegmentLabel::PrevPageLastChunk,
                SegmentLabel::NextPageFirstChunk,
            ]
        );
    }

    #[test]
    fn test_parse_ignores_unknown_brackets() {
        let text = compose(&[(SegmentLabel::CurrChunk, "값 [[[[[[기타] 포함")]);
        let segments = parse_segments(&text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].1, "값 [[[[[[기타] 포함");
    }
}
