//! 표 평탄화 모듈 - rowspan/colspan 병합 셀을 직사각형 격자로 펼침
//!
//! HTML 표의 행/셀 구조를 받아 `rows × cols` 격자에 각 셀의 텍스트를 찍고,
//! 파이프 구분 Markdown 행으로 직렬화합니다.
//!
//! - 병합 셀이 덮는 모든 칸에는 같은 텍스트가 복사됩니다 (빈칸으로 남기지 않음)
//! - 격자 크기를 넘는 span은 경계에서 잘리고, 잘린 칸 수는 보고됩니다
//! - 헤더 구분선(`| --- |`)과 캡션은 호출자가 붙입니다

// ============================================================================
// Table Cell
// ============================================================================

/// 표 셀 (텍스트 + 병합 범위)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub text: String,
    pub rowspan: usize,
    pub colspan: usize,
}

impl TableCell {
    /// 병합 없는 셀
    pub fn new(text: impl Into<String>) -> Self {
        Self::spanning(text, 1, 1)
    }

    /// 병합 셀 (0은 1로 취급)
    pub fn spanning(text: impl Into<String>, rowspan: usize, colspan: usize) -> Self {
        Self {
            text: text.into(),
            rowspan: rowspan.max(1),
            colspan: colspan.max(1),
        }
    }
}

/// 표의 한 행
pub type TableRow = Vec<TableCell>;

/// 격자 열 수 상한 (넘는 colspan은 경계에서 잘림)
pub const MAX_COLUMNS: usize = 1024;

// ============================================================================
// Table Grid
// ============================================================================

/// 평탄화용 격자
///
/// 행 수는 원본 행 수의 2배로 넉넉하게 잡고, 직렬화 시 뒤쪽 빈 행을 버립니다.
struct TableGrid {
    cols: usize,
    slots: Vec<Vec<Option<String>>>,
}

impl TableGrid {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            slots: vec![vec![None; cols]; rows],
        }
    }

    fn row_count(&self) -> usize {
        self.slots.len()
    }

    fn is_row_full(&self, row: usize) -> bool {
        self.slots[row].iter().all(Option::is_some)
    }

    fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.slots[row][col].is_some()
    }

    /// 셀의 footprint에 텍스트를 찍고, 격자 밖으로 잘린 칸 수를 반환
    fn stamp(&mut self, row: usize, col: usize, cell: &TableCell) -> usize {
        let rows_in = cell.rowspan.min(self.row_count().saturating_sub(row));
        let cols_in = cell.colspan.min(self.cols.saturating_sub(col));

        for r in row..row + rows_in {
            for c in col..col + cols_in {
                self.slots[r][c] = Some(cell.text.clone());
            }
        }

        cell.rowspan
            .saturating_mul(cell.colspan)
            .saturating_sub(rows_in * cols_in)
    }

    /// 값이 하나라도 있는 마지막 행 (없으면 0)
    fn last_filled_row(&self) -> usize {
        self.slots
            .iter()
            .rposition(|row| row.iter().any(Option::is_some))
            .unwrap_or(0)
    }

    fn to_markdown_lines(&self) -> Vec<String> {
        self.slots[..=self.last_filled_row()]
            .iter()
            .map(|row| {
                let cells: Vec<&str> = row.iter().map(|s| s.as_deref().unwrap_or("")).collect();
                format!("| {} |", cells.join(" | "))
            })
            .collect()
    }
}

// ============================================================================
// Flattening
// ============================================================================

/// 평탄화 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedTable {
    /// 파이프 구분 Markdown 행 (`\n` 연결, 헤더 구분선 없음)
    pub markdown: String,
    /// 격자 열 수
    pub columns: usize,
    /// 출력된 행 수
    pub rows: usize,
    /// 격자 경계 밖으로 잘린 칸 수
    pub clipped_slots: usize,
    /// 빈 열이 없어 찍히지 못한 셀 수
    pub dropped_cells: usize,
}

impl FlattenedTable {
    /// 잘리거나 버려진 내용이 있는지
    pub fn is_lossy(&self) -> bool {
        self.clipped_slots > 0 || self.dropped_cells > 0
    }

    /// 첫 행 아래에 헤더 구분선을 넣은 Markdown
    pub fn with_header_separator(&self) -> String {
        insert_header_separator(&self.markdown, self.columns)
    }
}

/// 표를 Markdown 행으로 평탄화
pub fn flatten(rows: &[TableRow]) -> String {
    flatten_table(rows).markdown
}

/// 표를 평탄화하고 손실 통계를 함께 반환
pub fn flatten_table(rows: &[TableRow]) -> FlattenedTable {
    let wanted_cols = rows
        .iter()
        .map(|row| {
            row.iter()
                .fold(0usize, |sum, cell| sum.saturating_add(cell.colspan.max(1)))
        })
        .max()
        .unwrap_or(0);

    if wanted_cols == 0 {
        return FlattenedTable::default();
    }

    let max_cols = wanted_cols.min(MAX_COLUMNS);
    if max_cols < wanted_cols {
        tracing::warn!("표 열 수 {} → {}로 제한", wanted_cols, MAX_COLUMNS);
    }

    let max_rows = rows.len() * 2;
    let mut grid = TableGrid::new(max_rows, max_cols);
    let mut clipped_slots: usize = 0;
    let mut dropped_cells = 0;
    let mut current_row = 0;

    for (row_idx, row) in rows.iter().enumerate() {
        if row.is_empty() {
            current_row += 1;
            continue;
        }

        // 위쪽 rowspan으로 꽉 찬 행은 건너뜀
        while current_row < max_rows && grid.is_row_full(current_row) {
            current_row += 1;
        }
        if current_row >= max_rows {
            dropped_cells += rows[row_idx..].iter().map(Vec::len).sum::<usize>();
            break;
        }

        let mut col_idx = 0;
        for (cell_idx, cell) in row.iter().enumerate() {
            while col_idx < max_cols && grid.is_occupied(current_row, col_idx) {
                col_idx += 1;
            }
            if col_idx >= max_cols {
                dropped_cells += row.len() - cell_idx;
                break;
            }

            clipped_slots = clipped_slots.saturating_add(grid.stamp(current_row, col_idx, cell));
            col_idx = col_idx.saturating_add(cell.colspan);
        }

        current_row += 1;
    }

    if clipped_slots > 0 || dropped_cells > 0 {
        tracing::warn!(
            "표 span 초과: 잘린 칸 {}, 버려진 셀 {} (격자 {}x{})",
            clipped_slots,
            dropped_cells,
            max_rows,
            max_cols
        );
    }

    let lines = grid.to_markdown_lines();

    FlattenedTable {
        rows: lines.len(),
        markdown: lines.join("\n"),
        columns: max_cols,
        clipped_slots,
        dropped_cells,
    }
}

/// 첫 행 아래에 `| --- | --- |` 구분선 삽입 (2행 이상일 때만)
pub fn insert_header_separator(markdown: &str, columns: usize) -> String {
    let mut lines: Vec<&str> = markdown.lines().collect();
    if lines.len() < 2 || columns == 0 {
        return markdown.to_string();
    }

    let separator = format!("| {} |", vec!["---"; columns].join(" | "));
    lines.insert(1, &separator);
    lines.join("\n")
}

// ============================================================================
// Tests
// ============================================================================
