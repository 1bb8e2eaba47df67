use std::fs;
use tempfile::TempDir;

use ragcite_core::data_processor::{Chunker, DataProcessor};
use ragcite_core::store::DirectoryCorpusStore;
use ragcite_core::traits::CorpusStore;
use ragcite_core::UserId;

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "Short text\n").unwrap();

    let processor = DataProcessor::new(Chunker::default());
    let chunks = processor.process_directory(dir).expect("process");

    assert_eq!(chunks.len(), 1, "one small file becomes one chunk");
    assert_eq!(chunks[0].text, "Short text");
    assert_eq!(chunks[0].source, "a.txt");
    assert_eq!(chunks[0].id, "a.txt-chunk-1");
}

#[test]
fn process_directory_skips_unsupported_files_and_keeps_relative_sources() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("guides")).unwrap();
    fs::write(dir.join("guides/setup.md"), "install the tool").unwrap();
    fs::write(dir.join("notes.txt"), "remember the milk").unwrap();
    fs::write(dir.join("image.png"), [0u8, 1, 2]).unwrap();

    let chunks = DataProcessor::default().process_directory(dir).expect("process");
    let sources: Vec<&str> = chunks.iter().map(|c| c.source.as_str()).collect();
    assert_eq!(sources, vec!["guides/setup.md", "notes.txt"]);
}

#[test]
fn directory_store_reads_only_the_users_directory() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("alice")).unwrap();
    fs::create_dir_all(root.join("bob")).unwrap();
    fs::write(root.join("alice/plan.txt"), "alice quarterly plan").unwrap();
    fs::write(root.join("bob/secret.txt"), "bob private notes").unwrap();

    let store = DirectoryCorpusStore::new(root, Chunker::new(100, 10));
    let alice = store.corpus(&UserId::from("alice")).expect("corpus");
    assert_eq!(alice.len(), 1);
    assert!(alice.iter().all(|c| !c.text.contains("bob")));

    assert!(store.corpus(&UserId::from("carol")).expect("missing dir is empty").is_empty());
    assert!(store.corpus(&UserId::from("../bob")).is_err());
    assert_eq!(store.sources(&UserId::from("bob")).expect("sources"), vec![("secret.txt".to_string(), 1)]);
}
