//! Plain-text ingestion: walks a directory of `.txt`/`.md` files and turns
//! them into overlapping word-window chunks.
use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use crate::config::CorpusConfig;
use crate::types::Chunk;

const PAGE_BREAK: char = '\x0c';
const EXTENSIONS: [&str; 2] = ["txt", "md"];

/// A line that opens a new section: a markdown heading up to level 3, a
/// `Title Words:` line, or a numbered heading such as `2. Wiring`.
static SECTION_START: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\n(?:#{1,3}\s|[A-Z][A-Za-z\s]{3,80}:|\d+\.?\s+[A-Z])").ok());

#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_words: usize,
    overlap_words: usize,
}

impl Default for Chunker {
    fn default() -> Self { Self::from_config(&CorpusConfig::default()) }
}

impl Chunker {
    pub fn new(chunk_words: usize, overlap_words: usize) -> Self { Self { chunk_words: chunk_words.max(1), overlap_words } }

    pub fn from_config(config: &CorpusConfig) -> Self { Self::new(config.chunk_words, config.overlap_words) }

    /// Splits one document into chunks.
    ///
    /// Pages are separated by form feeds; a document without one is a single
    /// page 1. Each page is cut into sections at headings before the word
    /// windows are taken, so no chunk straddles two sections. Chunk ids are
    /// `"{source}-chunk-{n}"`, with `n` counting from 1 across the whole
    /// document and doubling as the chunk's sequence.
    pub fn chunk_document(&self, source: &str, text: &str, ingested_at: DateTime<Utc>) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut sequence = 0usize;
        for (page_index, page_text) in text.split(PAGE_BREAK).enumerate() {
            let page = u32::try_from(page_index + 1).unwrap_or(u32::MAX);
            for piece in sections(page_text).into_iter().flat_map(|section| self.word_windows(section)) {
                sequence += 1;
                chunks.push(
                    Chunk::new(format!("{source}-chunk-{sequence}"), source, piece)
                        .with_page(page)
                        .with_sequence(sequence)
                        .ingested_at(ingested_at),
                );
            }
        }
        chunks
    }

    fn word_windows(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let step = self.chunk_words.saturating_sub(self.overlap_words).max(1);
        let mut windows = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.chunk_words).min(words.len());
            windows.push(words[start..end].join(" "));
            if end == words.len() { break; }
            start += step;
        }
        windows
    }
}

fn sections(page: &str) -> Vec<&str> {
    let Some(heading) = SECTION_START.as_ref() else { return vec![page] };
    let mut starts: Vec<usize> = vec![0];
    starts.extend(page.match_indices('\n').map(|(i, _)| i).filter(|&i| i > 0 && heading.is_match(&page[i..])));
    starts.push(page.len());
    starts.windows(2).map(|w| &page[w[0]..w[1]]).collect()
}

#[derive(Default)]
pub struct DataProcessor {
    chunker: Chunker,
}

impl DataProcessor {
    pub fn new(chunker: Chunker) -> Self { Self { chunker } }

    /// Chunks every supported file under `data_dir`, in path order. A file's
    /// source name is its path relative to `data_dir`.
    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<Chunk>> {
        let files = list_text_files(data_dir);
        let mut all_chunks = Vec::new();
        for file_path in &files {
            let content = read_file_content(file_path)?;
            let source = source_name(file_path, data_dir);
            let ingested_at = fs::metadata(file_path)
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            all_chunks.extend(self.chunker.chunk_document(&source, &content, ingested_at));
        }
        debug!(dir = %data_dir.display(), files = files.len(), chunks = all_chunks.len(), "processed directory");
        Ok(all_chunks)
    }
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}

fn source_name(file_path: &Path, data_dir: &Path) -> String {
    let relative = file_path.strip_prefix(data_dir).unwrap_or(file_path);
    relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

fn list_text_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()).is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String { (1..=n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ") }

    #[test]
    fn short_document_is_one_chunk() {
        let chunks = Chunker::new(10, 2).chunk_document("a.txt", "  hello \n\n world  ", Utc::now());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "a.txt-chunk-1");
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].page, Some(1));
        assert_eq!(chunks[0].sequence, Some(1));
    }

    #[test]
    fn windows_overlap() {
        let chunks = Chunker::new(4, 1).chunk_document("doc.md", &words(10), Utc::now());
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["w1 w2 w3 w4", "w4 w5 w6 w7", "w7 w8 w9 w10"]);
    }

    #[test]
    fn form_feed_starts_a_new_page() {
        let chunks = Chunker::new(50, 5).chunk_document("book.txt", "first page\x0csecond page\x0c\x0cfourth", Utc::now());
        let pages: Vec<Option<u32>> = chunks.iter().map(|c| c.page).collect();
        assert_eq!(pages, vec![Some(1), Some(2), Some(4)]);
        let sequences: Vec<Option<usize>> = chunks.iter().map(|c| c.sequence).collect();
        assert_eq!(sequences, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn headings_start_new_chunks() {
        let text = "# Intro\nwhy solar\n## Sizing\ncount the loads\nSafety Notes: fuse every string\n2. Wiring the bank\nhello";
        let chunks = Chunker::new(50, 5).chunk_document("guide.md", text, Utc::now());
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["# Intro why solar", "## Sizing count the loads", "Safety Notes: fuse every string", "2. Wiring the bank hello"]
        );
        assert_eq!(chunks[3].id, "guide.md-chunk-4");
        assert!(chunks.iter().all(|c| c.page == Some(1)));
    }

    #[test]
    fn plain_lines_do_not_split_sections() {
        let chunks = Chunker::new(50, 5).chunk_document("notes.txt", "first line\nsecond line\n#hashtag here\n3 apples", Utc::now());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn blank_document_has_no_chunks() {
        assert!(Chunker::default().chunk_document("empty.txt", " \n\t ", Utc::now()).is_empty());
    }
}
