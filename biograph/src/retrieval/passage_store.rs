//! In-memory passage store ranked by term overlap (PassageStore).
//!
//! Passages come from the built-in catalog notes or from a directory of `.txt` / `.md`
//! files, where each blank-line separated paragraph is one passage.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::retrieval::Retriever;

/// Catalog notes the store starts with when no passage directory is configured.
pub const SEED_PASSAGES: [&str; 6] = [
    "Bioinformatics data analysis usually involves several kinds of omics data, such as genomics, transcriptomics and proteomics.",
    "GEO (Gene Expression Omnibus) is the NCBI database of gene expression experiments; its series records have accessions such as GSE10000.",
    "Bioinformatics combines methods from biology, computer science and statistics to analyze large-scale biological data.",
    "Single-cell RNA sequencing (scRNA-seq) reveals the heterogeneity between individual cells.",
    "GSE10000 is a mouse liver expression dataset containing gene expression data from multiple samples.",
    "GSE20000 is a human brain single-cell sequencing dataset used to study the heterogeneity of brain cells.",
];

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Passages held in memory. Score = number of distinct query terms a passage contains;
/// ties keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct PassageStore {
    passages: Vec<(String, HashSet<String>)>,
}

impl PassageStore {
    pub fn new<I, T>(passages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut store = Self::default();
        for p in passages {
            store.add(p);
        }
        store
    }

    /// Store holding [`SEED_PASSAGES`].
    pub fn seeded() -> Self {
        Self::new(SEED_PASSAGES)
    }

    /// Loads every `.txt` / `.md` file directly under `dir`, sorted by file name.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CapabilityError> {
        let dir = dir.as_ref();
        let read_err = |e: std::io::Error| {
            CapabilityError::Retrieval(format!("{}: {}", dir.display(), e))
        };
        let mut files = std::fs::read_dir(dir)
            .map_err(read_err)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|p| {
                p.is_file()
                    && matches!(
                        p.extension().and_then(|e| e.to_str()),
                        Some("txt") | Some("md")
                    )
            })
            .collect::<Vec<_>>();
        files.sort();

        let mut store = Self::default();
        for file in &files {
            let text = std::fs::read_to_string(file).map_err(read_err)?;
            for paragraph in text.split("\n\n") {
                store.add(paragraph);
            }
        }
        tracing::info!(
            dir = %dir.display(),
            files = files.len(),
            passages = store.len(),
            "loaded knowledge-base passages"
        );
        Ok(store)
    }

    /// Adds one passage; blank text is ignored.
    pub fn add(&mut self, passage: impl Into<String>) {
        let passage = passage.into();
        let passage = passage.trim();
        if passage.is_empty() {
            return;
        }
        let t = terms(passage);
        self.passages.push((passage.to_string(), t));
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    fn rank(&self, query: &str, k: usize) -> Vec<String> {
        let query_terms = terms(query);
        let mut scored: Vec<(usize, usize)> = self
            .passages
            .iter()
            .enumerate()
            .map(|(i, (_, t))| (query_terms.intersection(t).count(), i))
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(k)
            .map(|(_, i)| self.passages[i].0.clone())
            .collect()
    }
}

#[async_trait]
impl Retriever for PassageStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, CapabilityError> {
        Ok(self.rank(query, k))
    }
}
