//! CLI 모듈
//!
//! rag-prep CLI 명령어 정의 및 구현

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scraper::Html;
use tokio::task::JoinSet;

use crate::collector::{
    find_items_dir, load_captions, CollectedFile, CollectionStats, CollectorConfig, FileCollector,
    ImageIndex, InputKind,
};
use crate::construct::{construct, construct_many, Representations};
use crate::document::{elements_from_result, load_parse_result};
use crate::element::{attach_captions, load_elements, save_elements, Element};
use crate::export::{get_data_dir, timestamped_dir, write_representations, DATA_DIR_ENV};
use crate::html::{extract_elements, render_blocks, table_to_markdown};
use crate::splitter::{
    block_chunker, render_split, strip_block_markers, Chunker, RecursiveChunker,
    SlidingWindowChunker, SplitConfig, SPLIT_MARKER,
};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "rag-prep")]
#[command(version, about = "RAG 임베딩용 문서 전처리 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTML 파일의 표를 Markdown으로 출력
    Table {
        /// 문서 파서 HTML 파일
        file: PathBuf,
    },

    /// HTML 또는 파서 응답 JSON에서 요소 목록(`_elements.json`) 생성
    Elements {
        /// 입력 파일 또는 폴더 (재귀)
        input: PathBuf,

        /// 출력 폴더 (기본: 입력 파일 옆)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 이미지 설명(`Items/*_caption.txt`) 붙이지 않기
        #[arg(long)]
        no_captions: bool,
    },

    /// HTML을 블록 Markdown(`_converted.md`)으로 변환
    Convert {
        /// 입력 파일 또는 폴더 (재귀)
        input: PathBuf,
    },

    /// 요소 목록에서 content|metadata 표현 11종 생성
    Construct {
        /// 입력 파일 또는 폴더 (여러 개 가능)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 출력 루트 (기본: $RAG_PREP_DATA_DIR 또는 ./data)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 문서별 결과를 합친 폴더 생성 생략
        #[arg(long)]
        no_merge: bool,
    },

    /// 블록 Markdown을 청크로 분할
    Split {
        /// 블록 Markdown 파일
        file: PathBuf,

        /// 분할 방식
        #[arg(short, long, value_enum, default_value = "sliding")]
        mode: SplitMode,

        /// 청크 최대 길이 (문자 수)
        #[arg(short, long, default_value = "500")]
        size: usize,

        /// 청크 중첩 길이 (문자 수)
        #[arg(long, default_value = "100")]
        overlap: usize,

        /// block 방식에서 앞 블록이 짧으면 그 앞 블록들까지 누적
        #[arg(long)]
        accumulate: bool,

        /// 출력 파일 (기본: `{이름}_split.md`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 상태 확인
    Status,
}

/// 분할 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitMode {
    /// `<<BLOCKEND>>` 블록 단위 + 앞 블록 끝 중첩
    Block,
    /// 고정 창
    Sliding,
    /// 문단/줄/공백 단위 재귀
    Recursive,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Table { file } => cmd_table(&file).await,
        Commands::Elements {
            input,
            output,
            no_captions,
        } => cmd_elements(&input, output, no_captions).await,
        Commands::Convert { input } => cmd_convert(&input).await,
        Commands::Construct {
            inputs,
            output,
            no_merge,
        } => cmd_construct(&inputs, output, no_merge).await,
        Commands::Split {
            file,
            mode,
            size,
            overlap,
            accumulate,
            output,
        } => {
            let config = SplitConfig::new(size, overlap);
            cmd_split(&file, mode, config, accumulate, output).await
        }
        Commands::Status => cmd_status().await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 표 출력 명령어 (table)
async fn cmd_table(file: &Path) -> Result<()> {
    let html = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read: {:?}", file))?;

    let tables = html_tables(&html);
    if tables.is_empty() {
        println!("[!] 표가 없습니다: {:?}", file);
        return Ok(());
    }

    println!("[OK] 표 {} 개\n", tables.len());
    for (i, markdown) in tables.iter().enumerate() {
        println!("#{}", i + 1);
        println!("{}\n", markdown);
    }

    Ok(())
}

/// 요소 목록 생성 명령어 (elements)
async fn cmd_elements(input: &Path, output: Option<PathBuf>, no_captions: bool) -> Result<()> {
    let collector = FileCollector::new(CollectorConfig::only(&[
        InputKind::Html,
        InputKind::ParseResult,
    ]));
    let files = collector.collect(input)?;

    if files.is_empty() {
        println!("[!] 처리할 HTML/응답 파일이 없습니다.");
        return Ok(());
    }
    print_stats(&files);

    if let Some(ref dir) = output {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    let (documents, failed) = load_documents(files, !no_captions).await?;
    let mut written = 0;

    for (file, elements) in &documents {
        let dir = match output {
            Some(ref dir) => dir.clone(),
            None => parent_dir(&file.path),
        };
        let path = dir.join(format!("{}_elements.json", file.stem()));

        match save_elements(&path, elements) {
            Ok(()) => {
                println!("  {} 요소 → {:?}", elements.len(), path);
                written += 1;
            }
            Err(e) => println!("[!] 저장 실패: {}", e),
        }
    }

    println!();
    println!("[OK] 완료: 성공 {}, 실패 {}", written, failed + documents.len() - written);
    Ok(())
}

/// 블록 Markdown 변환 명령어 (convert)
async fn cmd_convert(input: &Path) -> Result<()> {
    let collector = FileCollector::new(CollectorConfig::only(&[InputKind::Html]));
    let files = collector.collect(input)?;

    if files.is_empty() {
        println!("[!] 변환할 HTML 파일이 없습니다.");
        return Ok(());
    }

    let mut tasks = JoinSet::new();
    for file in files {
        tasks.spawn_blocking(move || {
            let result = convert_file(&file.path);
            (file, result)
        });
    }

    let mut success_count = 0;
    let mut error_count = 0;

    while let Some(joined) = tasks.join_next().await {
        let (file, result) = joined.context("변환 작업 실패")?;
        match result {
            Ok(path) => {
                println!("  {:?} → {:?}", file.path, path);
                success_count += 1;
            }
            Err(e) => {
                println!("[!] {:?}: {:#}", file.path, e);
                error_count += 1;
            }
        }
    }

    println!();
    println!("[OK] 완료: 성공 {}, 실패 {}", success_count, error_count);
    Ok(())
}

/// 표현 생성 명령어 (construct)
async fn cmd_construct(inputs: &[PathBuf], output: Option<PathBuf>, no_merge: bool) -> Result<()> {
    // 같은 문서의 여러 형식 중 요소 목록을 우선
    let collector = FileCollector::new(CollectorConfig::only(&[
        InputKind::Elements,
        InputKind::ParseResult,
        InputKind::Html,
    ]));

    let mut files = Vec::new();
    for input in inputs {
        files.extend(collector.collect(input)?);
    }
    let files = dedupe_documents(files);

    if files.is_empty() {
        println!("[!] 처리할 요소 파일이 없습니다.");
        return Ok(());
    }
    print_stats(&files);

    let (documents, failed) = load_documents(files, true).await?;
    if documents.is_empty() {
        bail!("요소를 읽은 문서가 없습니다 (실패 {})", failed);
    }

    let root = output.unwrap_or_else(get_data_dir);
    println!("[*] 출력 폴더: {}", root.display());

    let files: Vec<&CollectedFile> = documents.iter().map(|(file, _)| file).collect();
    let names = output_names(&files);

    for ((_, elements), name) in documents.iter().zip(&names) {
        let reps = construct(elements);
        let dir = root.join(name);
        write_representations(&reps, &dir)
            .with_context(|| format!("표현 저장 실패: {}", name))?;
        println!("  {} ({} 요소) → {:?}", name, elements.len(), dir);
    }

    if !no_merge && documents.len() > 1 {
        let all: Vec<Vec<Element>> = documents.iter().map(|(_, e)| e.clone()).collect();
        let merged: Representations = construct_many(&all);
        let dir = timestamped_dir(&root);
        write_representations(&merged, &dir).context("병합 표현 저장 실패")?;
        println!("[*] 병합: {} 문서 → {:?}", all.len(), dir);
    }

    println!();
    println!("[OK] 완료: 성공 {}, 실패 {}", documents.len(), failed);
    Ok(())
}

/// 분할 명령어 (split)
async fn cmd_split(
    file: &Path,
    mode: SplitMode,
    config: SplitConfig,
    accumulate: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read: {:?}", file))?;

    let chunker: Box<dyn Chunker> = match mode {
        SplitMode::Block => block_chunker(config, accumulate),
        SplitMode::Sliding => Box::new(SlidingWindowChunker::new(config)),
        SplitMode::Recursive => Box::new(RecursiveChunker::new(config)),
    };

    // 블록 방식은 elementId 헤더를 그대로 둠
    let chunks = match mode {
        SplitMode::Block => chunker.chunk(&text),
        _ => chunker.chunk(&strip_block_markers(&text)),
    };
    if chunks.is_empty() {
        println!("[!] 분할할 내용이 없습니다: {:?}", file);
        return Ok(());
    }

    let path = output.unwrap_or_else(|| {
        parent_dir(file).join(format!("{}_split.md", crate::collector::document_stem(file)))
    });
    let separator = format!("\n{}\n", SPLIT_MARKER);
    tokio::fs::write(&path, render_split(&chunks, &separator))
        .await
        .with_context(|| format!("Failed to write: {:?}", path))?;

    println!(
        "[OK] {} 청크 ({}, size {}, overlap {}) → {:?}",
        chunks.len(),
        chunker.name(),
        config.chunk_size,
        config.chunk_overlap,
        path
    );
    if let Some(first) = chunks.first() {
        println!("     첫 청크: {}", truncate_text(first, 80));
    }

    Ok(())
}

/// 상태 명령어 (status)
async fn cmd_status() -> Result<()> {
    println!("rag-prep v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let data_dir = get_data_dir();
    println!("[*] 데이터 디렉토리: {}", data_dir.display());

    if std::env::var_os(DATA_DIR_ENV).is_some() {
        println!("[OK] {}: 설정됨", DATA_DIR_ENV);
    } else {
        println!("[!] {}: 미설정 (기본값 사용)", DATA_DIR_ENV);
    }

    if !data_dir.is_dir() {
        println!("[!] 데이터 디렉토리가 아직 없습니다.");
        return Ok(());
    }

    let mut entries = tokio::fs::read_dir(&data_dir)
        .await
        .with_context(|| format!("Failed to read: {:?}", data_dir))?;
    let mut runs = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            runs += 1;
        }
    }
    println!("[OK] 출력 폴더: {} 개", runs);

    Ok(())
}

// ============================================================================
// Document Loading
// ============================================================================

/// 파일 하나에서 요소 목록 로드
///
/// HTML/응답 JSON이면 같은 폴더의 `Items`에서 이미지 설명을 붙입니다.
fn load_document(file: &CollectedFile, with_captions: bool) -> Result<Vec<Element>> {
    let stem = file.stem();

    let mut elements = match file.kind {
        InputKind::Elements => return Ok(load_elements(&file.path)?),
        InputKind::Html => {
            let html = std::fs::read_to_string(&file.path)
                .with_context(|| format!("Failed to read: {:?}", file.path))?;
            extract_elements(&html, &stem)
        }
        InputKind::ParseResult => elements_from_result(&load_parse_result(&file.path)?, &stem),
        InputKind::BlockMarkdown => bail!("블록 Markdown은 요소 입력이 아닙니다: {:?}", file.path),
    };

    if elements.is_empty() {
        bail!("요소가 없습니다: {:?}", file.path);
    }

    if with_captions {
        if let Some(items) = find_items_dir(&parent_dir(&file.path)) {
            let captions = load_captions(&items)?;
            let attached = attach_captions(&mut elements, &captions);
            tracing::debug!("{}: 이미지 설명 {} 개 연결", stem, attached);
        }
    }

    Ok(elements)
}

/// 파일들을 병렬로 로드 (입력 순서 유지, 실패 수 반환)
async fn load_documents(
    files: Vec<CollectedFile>,
    with_captions: bool,
) -> Result<(Vec<(CollectedFile, Vec<Element>)>, usize)> {
    let total = files.len();
    let mut tasks = JoinSet::new();

    for (i, file) in files.into_iter().enumerate() {
        tasks.spawn_blocking(move || {
            let result = load_document(&file, with_captions);
            (i, file, result)
        });
    }

    let mut loaded = Vec::with_capacity(total);
    let mut failed = 0;

    while let Some(joined) = tasks.join_next().await {
        let (i, file, result) = joined.context("로드 작업 실패")?;
        match result {
            Ok(elements) => loaded.push((i, file, elements)),
            Err(e) => {
                println!("[!] {:?}: {:#}", file.path, e);
                failed += 1;
            }
        }
    }

    loaded.sort_by_key(|(i, _, _)| *i);
    let loaded = loaded.into_iter().map(|(_, file, elements)| (file, elements)).collect();
    Ok((loaded, failed))
}

/// HTML 하나를 `{이름}_converted.md`로 변환
fn convert_file(path: &Path) -> Result<PathBuf> {
    let html =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read: {:?}", path))?;

    let base_dir = parent_dir(path);
    let images = match find_items_dir(&base_dir) {
        Some(items) => ImageIndex::from_dir(&items)?,
        None => ImageIndex::default(),
    };

    let markdown = render_blocks(&html, &images, &base_dir);
    let out = base_dir.join(format!("{}_converted.md", crate::collector::document_stem(path)));
    std::fs::write(&out, markdown).with_context(|| format!("Failed to write: {:?}", out))?;

    Ok(out)
}

/// 문서당 파일 하나만 남김 (요소 목록 > 응답 JSON > HTML)
fn dedupe_documents(files: Vec<CollectedFile>) -> Vec<CollectedFile> {
    let rank = |kind: InputKind| match kind {
        InputKind::Elements => 0,
        InputKind::ParseResult => 1,
        InputKind::Html => 2,
        InputKind::BlockMarkdown => 3,
    };

    let mut kept: Vec<CollectedFile> = Vec::new();
    for file in files {
        let key = (parent_dir(&file.path), file.stem());
        match kept
            .iter_mut()
            .find(|k| (parent_dir(&k.path), k.stem()) == key)
        {
            Some(existing) if rank(file.kind) < rank(existing.kind) => *existing = file,
            Some(_) => {}
            None => kept.push(file),
        }
    }
    kept
}

/// 문서별 출력 폴더 이름
///
/// 이름이 겹치면 상위 폴더 이름을 앞에 붙이고, 그래도 겹치면 순번을 붙입니다.
fn output_names(files: &[&CollectedFile]) -> Vec<String> {
    let stems: Vec<String> = files.iter().map(|file| file.stem()).collect();
    let mut used: HashSet<String> = HashSet::new();

    files
        .iter()
        .zip(&stems)
        .map(|(file, stem)| {
            let repeated = stems.iter().filter(|s| *s == stem).count() > 1;
            let base = match parent_dir(&file.path).file_name().and_then(|n| n.to_str()) {
                Some(parent) if repeated => format!("{}_{}", parent, stem),
                _ => stem.clone(),
            };

            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{}_{}", base, n);
                n += 1;
            }
            name
        })
        .collect()
}

/// HTML 문서의 모든 표를 Markdown으로
fn html_tables(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&crate::html::selector("table"))
        .map(table_to_markdown)
        .filter(|markdown| !markdown.is_empty())
        .collect()
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn print_stats(files: &[CollectedFile]) {
    let stats = CollectionStats::from_files(files);
    println!("[*] 처리 대상: {} 파일", stats.total_files);
    println!(
        "    HTML: {}, 응답 JSON: {}, 요소 목록: {}",
        stats.html_files, stats.result_files, stats.element_files
    );
    println!("    총 크기: {}", format_bytes(stats.total_size as usize));
    println!();
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// 바이트 크기 포맷팅
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HTML: &str = "<html><body>\
        <h1 id='0' data-category='heading1' data-page='1'>설명서</h1>\
        <figure id='1' data-category='figure' data-page='1'><img src=''></figure>\
        <table id='2' data-category='table' data-page='2'><tr><td rowspan='2'>구분</td><td>A</td></tr><tr><td>B</td></tr></table>\
        </body></html>";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn collected(path: PathBuf) -> CollectedFile {
        CollectedFile::from_path(path).unwrap().unwrap()
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
        assert_eq!(truncate_text("안녕하세요 세계", 5), "안녕하세요...");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
    }

    #[test]
    fn test_html_tables() {
        let tables = html_tables(HTML);
        assert_eq!(tables, vec!["| 구분 | A |\n| --- | --- |\n| 구분 | B |"]);
    }

    #[test]
    fn test_load_document_attaches_captions() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "manual.html", HTML);
        let items = dir.path().join("Items");
        std::fs::create_dir(&items).unwrap();
        write(&items, "1_page_1_figure_1_caption.txt", "제품 외관 사진");

        let elements = load_document(&collected(path.clone()), true).unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1].caption.as_deref(), Some("제품 외관 사진"));
        assert!(elements.iter().all(|e| e.filename == "manual"));

        let bare = load_document(&collected(path), false).unwrap();
        assert!(bare[1].caption.is_none());
    }

    #[test]
    fn test_dedupe_prefers_element_lists() {
        let dir = TempDir::new().unwrap();
        let html = write(dir.path(), "doc.html", HTML);
        let elements = write(dir.path(), "doc_elements.json", "[]");
        let other = write(dir.path(), "other.html", HTML);

        let kept = dedupe_documents(vec![
            collected(html),
            collected(elements.clone()),
            collected(other.clone()),
        ]);
        let paths: Vec<PathBuf> = kept.into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec![elements, other]);
    }

    #[test]
    fn test_convert_file() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "manual.html", HTML);
        let items = dir.path().join("Items");
        std::fs::create_dir(&items).unwrap();
        write(&items, "1_page_1_figure_1.png", "");

        let out = convert_file(&path).unwrap();
        assert_eq!(out, dir.path().join("manual_converted.md"));

        let markdown = std::fs::read_to_string(out).unwrap();
        assert!(markdown.starts_with("elementId: 0\n설명서\n<<BLOCKEND>>"));
        assert!(markdown.contains("elementId: 1\n![](./Items/1_page_1_figure_1.png)\n<<BLOCKEND>>"));
        assert!(markdown.ends_with("| 구분 | B |\n<<BLOCKEND>>"));
    }

    #[tokio::test]
    async fn test_load_documents_keeps_order_and_counts_failures() {
        let dir = TempDir::new().unwrap();
        let a = write(dir.path(), "a.html", HTML);
        let broken = write(dir.path(), "b_result.json", "{not json");
        let c = write(dir.path(), "c.html", HTML);

        let files = vec![collected(a.clone()), collected(broken), collected(c.clone())];
        let (loaded, failed) = load_documents(files, false).await.unwrap();

        assert_eq!(failed, 1);
        let paths: Vec<&Path> = loaded.iter().map(|(f, _)| f.path.as_path()).collect();
        assert_eq!(paths, vec![a.as_path(), c.as_path()]);
    }

    #[tokio::test]
    async fn test_construct_writes_per_document_and_merged() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir(&input).unwrap();
        write(&input, "a.html", HTML);
        write(&input, "b.html", HTML);
        let out = dir.path().join("out");

        cmd_construct(&[input], Some(out.clone()), false).await.unwrap();

        assert!(out.join("a").join("1-1_chunk_only.json").exists());
        assert!(out.join("b").join("4-3_page_only.json").exists());

        let run_dirs: Vec<PathBuf> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.file_name().unwrap() != "a" && p.file_name().unwrap() != "b")
            .collect();
        assert_eq!(run_dirs.len(), 1);

        let merged = std::fs::read_to_string(run_dirs[0].join("1-1_chunk_only.json")).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&merged).unwrap();
        assert_eq!(rows.len(), 6);
    }

    #[tokio::test]
    async fn test_split_writes_marked_chunks() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "doc_converted.md", "elementId: 1\nabcdef\n<<BLOCKEND>>");

        cmd_split(&path, SplitMode::Sliding, SplitConfig::new(4, 2), false, None)
            .await
            .unwrap();

        let split = std::fs::read_to_string(dir.path().join("doc_split.md")).unwrap();
        assert_eq!(split, "abcd\n<<SPLIT>>\ncdef\n<<SPLIT>>\nef\n<<SPLIT>>\n");
    }

    #[tokio::test]
    async fn test_split_block_mode_keeps_headers() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "doc_converted.md",
            "elementId: 1\nabcdef\n<<BLOCKEND>>\nelementId: 2\ngh\n<<BLOCKEND>>",
        );
        let out = dir.path().join("blocks.md");

        cmd_split(&path, SplitMode::Block, SplitConfig::new(500, 3), false, Some(out.clone()))
            .await
            .unwrap();

        let split = std::fs::read_to_string(out).unwrap();
        assert_eq!(
            split,
            "elementId: 1\nabcdef\n<<SPLIT>>\nelementId: 2\ndef\ngh\n<<SPLIT>>\n"
        );
    }

    #[test]
    fn test_output_names_disambiguate_repeated_stems() {
        let dir = TempDir::new().unwrap();
        for sub in ["a", "b"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
        }
        let first = collected(write(&dir.path().join("a"), "doc.html", HTML));
        let second = collected(write(&dir.path().join("b"), "doc_elements.json", "[]"));
        let other = collected(write(dir.path(), "other.html", HTML));

        let names = output_names(&[&first, &second, &other]);
        assert_eq!(names, vec!["a_doc", "b_doc", "other"]);

        // 상위 폴더 이름까지 같으면 순번
        let names = output_names(&[&first, &first]);
        assert_eq!(names, vec!["a_doc", "a_doc_2"]);
    }

    #[tokio::test]
    async fn test_construct_same_stem_in_different_folders() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        for sub in ["x", "y"] {
            std::fs::create_dir_all(input.join(sub)).unwrap();
            write(&input.join(sub), "manual.html", HTML);
        }
        let out = dir.path().join("out");

        cmd_construct(&[input], Some(out.clone()), true).await.unwrap();

        assert!(out.join("x_manual").join("1-1_chunk_only.json").exists());
        assert!(out.join("y_manual").join("1-1_chunk_only.json").exists());
        assert!(!out.join("manual").exists());
    }
}
