//! Corpus stores.
//!
//! Both stores are strictly per user: a corpus is always looked up by
//! `UserId` and nothing is shared between users.
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

use crate::data_processor::{Chunker, DataProcessor};
use crate::error::{Error, Result};
use crate::traits::CorpusStore;
use crate::types::{Chunk, ChunkId, UserId};

/// In-process store, keyed by user and then by chunk id so `corpus` returns
/// chunks in a stable order.
#[derive(Default)]
pub struct InMemoryCorpusStore {
    users: RwLock<HashMap<UserId, BTreeMap<ChunkId, Chunk>>>,
}

impl InMemoryCorpusStore {
    pub fn new() -> Self { Self::default() }

    /// Adds a chunk, replacing any chunk with the same id.
    pub fn insert(&self, user: &UserId, chunk: Chunk) -> Result<()> {
        self.extend(user, std::iter::once(chunk))
    }

    pub fn extend(&self, user: &UserId, chunks: impl IntoIterator<Item = Chunk>) -> Result<()> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let corpus = users.entry(user.clone()).or_default();
        for chunk in chunks { corpus.insert(chunk.id.clone(), chunk); }
        Ok(())
    }

    /// Sources in the user's corpus with their chunk counts, sorted by source.
    pub fn sources(&self, user: &UserId) -> Result<Vec<(String, usize)>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        let chunks = users.get(user).map(|c| c.values().cloned().collect::<Vec<_>>()).unwrap_or_default();
        Ok(count_sources(&chunks))
    }

    /// Drops every chunk of `source` from the user's corpus and returns how
    /// many were removed.
    pub fn remove_source(&self, user: &UserId, source: &str) -> Result<usize> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        let Some(corpus) = users.get_mut(user) else { return Ok(0) };
        let before = corpus.len();
        corpus.retain(|_, chunk| chunk.source != source);
        Ok(before - corpus.len())
    }

    pub fn clear(&self, user: &UserId) -> Result<()> {
        self.users.write().map_err(|_| poisoned())?.remove(user);
        Ok(())
    }
}

impl CorpusStore for InMemoryCorpusStore {
    fn corpus(&self, user: &UserId) -> anyhow::Result<Vec<Chunk>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(user).map(|c| c.values().cloned().collect()).unwrap_or_default())
    }
}

/// Reads `root/<user>/**/*.{txt,md}` on every call, so the corpus is always
/// current with the files on disk.
pub struct DirectoryCorpusStore {
    root: PathBuf,
    processor: DataProcessor,
}

impl DirectoryCorpusStore {
    pub fn new(root: impl Into<PathBuf>, chunker: Chunker) -> Self {
        Self { root: root.into(), processor: DataProcessor::new(chunker) }
    }

    pub fn root(&self) -> &Path { &self.root }

    /// The user's directory. Ids that are not a single plain path component
    /// are rejected so one user can never address another user's files.
    pub fn user_dir(&self, user: &UserId) -> Result<PathBuf> {
        let mut components = Path::new(user.as_str()).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !user.as_str().contains(['/', '\\']) => Ok(self.root.join(name)),
            _ => Err(Error::NotFound(format!("no corpus for user '{user}'"))),
        }
    }

    pub fn sources(&self, user: &UserId) -> anyhow::Result<Vec<(String, usize)>> {
        Ok(count_sources(&self.corpus(user)?))
    }
}

impl CorpusStore for DirectoryCorpusStore {
    fn corpus(&self, user: &UserId) -> anyhow::Result<Vec<Chunk>> {
        let dir = self.user_dir(user)?;
        if !dir.is_dir() { return Ok(Vec::new()); }
        self.processor.process_directory(&dir)
    }
}

fn count_sources(chunks: &[Chunk]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for chunk in chunks { *counts.entry(chunk.source.as_str()).or_default() += 1; }
    counts.into_iter().map(|(s, n)| (s.to_string(), n)).collect()
}

fn poisoned() -> Error { Error::Operation("corpus store lock poisoned".to_string()) }
