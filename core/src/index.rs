use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::record::Record;
use crate::tokenizer::Segmenter;

pub type DocId = u64;

/// A title hit counts an order of magnitude more than a body hit. Policy
/// constants, not derived values.
pub const TITLE_WEIGHT: u32 = 10;
pub const CONTENT_WEIGHT: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocRecord {
    pub title: String,
    /// Tag-stripped, newline-free body text.
    pub content: String,
    pub url: String,
    pub doc_id: DocId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term: String,
    pub weight: u32,
}

/// Where a term occurred within one document. Term frequency is folded into
/// the posting weight, never into duplicate postings.
#[derive(Default)]
struct TermTally {
    title: u32,
    content: u32,
}

/// Forward index (doc_id -> record) and inverted index (term -> postings),
/// built in one pass per document and held in memory for the process
/// lifetime. The forward index owns the records; postings refer to documents
/// by id only.
#[derive(Default)]
pub struct Index {
    forward: Vec<DocRecord>,
    inverted: HashMap<String, Vec<Posting>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a record file, one serialized record per line, and build both
    /// indexes. Fails only when the source itself cannot be opened; per-line
    /// problems are logged and skipped.
    pub fn build_from_path<P: AsRef<Path>>(
        &mut self,
        path: P,
        segmenter: &dyn Segmenter,
    ) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        self.build_from_reader(BufReader::new(file), segmenter)
    }

    pub fn build_from_reader<R: BufRead>(
        &mut self,
        reader: R,
        segmenter: &dyn Segmenter,
    ) -> Result<()> {
        let mut skipped = 0usize;
        for line in reader.lines() {
            let line = line?;
            match Record::parse_line(&line) {
                Some(record) => {
                    self.add_document(record, segmenter);
                }
                None => {
                    skipped += 1;
                    tracing::warn!(len = line.len(), "record line does not split into three fields, skipping");
                }
            }
        }
        tracing::info!(
            docs = self.forward.len(),
            terms = self.inverted.len(),
            skipped,
            "index built"
        );
        Ok(())
    }

    /// Append one document. The forward entry is committed first and never
    /// rolled back: if segmentation fails, the document stays retrievable by
    /// id even though it is unsearchable by its terms.
    pub fn add_document(&mut self, record: Record, segmenter: &dyn Segmenter) -> DocId {
        let doc_id = self.forward.len() as DocId;
        let Record { title, content, url } = record;
        self.forward.push(DocRecord { title, content, url, doc_id });
        if let Err(err) = self.index_terms(doc_id, segmenter) {
            tracing::warn!(doc_id, %err, "tokenization failed, document indexed forward-only");
        }
        doc_id
    }

    fn index_terms(&mut self, doc_id: DocId, segmenter: &dyn Segmenter) -> Result<()> {
        let doc = &self.forward[doc_id as usize];
        let mut tallies: HashMap<String, TermTally> = HashMap::new();
        for token in segmenter.segment(&doc.title)? {
            tallies.entry(token.to_lowercase()).or_default().title += 1;
        }
        for token in segmenter.segment(&doc.content)? {
            tallies.entry(token.to_lowercase()).or_default().content += 1;
        }
        for (term, tally) in tallies {
            let weight = TITLE_WEIGHT * tally.title + CONTENT_WEIGHT * tally.content;
            self.inverted
                .entry(term.clone())
                .or_default()
                .push(Posting { doc_id, term, weight });
        }
        Ok(())
    }

    /// Look up a document by id. `None` when the id is out of range.
    pub fn forward_record(&self, doc_id: DocId) -> Option<&DocRecord> {
        self.forward.get(doc_id as usize)
    }

    /// Postings list for a term as stored (lowercased). `None` covers both
    /// "zero matches" and "never indexed"; callers cannot tell them apart.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.inverted.get(term).map(|list| list.as_slice())
    }

    pub fn doc_count(&self) -> usize {
        self.forward.len()
    }

    pub fn term_count(&self) -> usize {
        self.inverted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::io::Cursor;

    /// Deterministic stand-in for the real segmenter: split on whitespace,
    /// no normalization of its own.
    struct WhitespaceSegmenter;

    impl Segmenter for WhitespaceSegmenter {
        fn segment(&self, text: &str) -> Result<Vec<String>> {
            Ok(text.split_whitespace().map(str::to_string).collect())
        }
    }

    struct FailingSegmenter;

    impl Segmenter for FailingSegmenter {
        fn segment(&self, _text: &str) -> Result<Vec<String>> {
            Err(anyhow!("dictionary unavailable"))
        }
    }

    fn record(title: &str, content: &str, url: &str) -> Record {
        Record {
            title: title.into(),
            content: content.into(),
            url: url.into(),
        }
    }

    #[test]
    fn weights_title_ten_to_one() {
        let mut index = Index::new();
        let doc_id = index.add_document(
            record("rust rust", "rust rust rust", "http://x/a"),
            &WhitespaceSegmenter,
        );
        let postings = index.postings("rust").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].doc_id, doc_id);
        assert_eq!(postings[0].weight, 10 * 2 + 3);
    }

    #[test]
    fn one_posting_per_term_and_document() {
        let mut index = Index::new();
        index.add_document(record("alpha", "alpha beta alpha", "u0"), &WhitespaceSegmenter);
        index.add_document(record("beta", "alpha", "u1"), &WhitespaceSegmenter);
        let alpha = index.postings("alpha").unwrap();
        assert_eq!(alpha.len(), 2);
        // Insertion order is document processing order.
        assert_eq!(alpha[0].doc_id, 0);
        assert_eq!(alpha[1].doc_id, 1);
        assert!(alpha.iter().all(|p| p.term == "alpha"));
    }

    #[test]
    fn case_folds_terms() {
        let mut index = Index::new();
        index.add_document(record("Hello HELLO", "hello", "u"), &WhitespaceSegmenter);
        assert_eq!(index.postings("hello").unwrap()[0].weight, 10 * 2 + 1);
        assert!(index.postings("Hello").is_none());
    }

    #[test]
    fn empty_title_or_content_still_indexes() {
        let mut index = Index::new();
        index.add_document(record("", "body words", "u0"), &WhitespaceSegmenter);
        index.add_document(record("title words", "", "u1"), &WhitespaceSegmenter);
        assert_eq!(index.doc_count(), 2);
        assert_eq!(index.postings("body").unwrap()[0].weight, 1);
        assert_eq!(index.postings("title").unwrap()[0].weight, 10);
    }

    #[test]
    fn tokenization_failure_keeps_forward_entry() {
        let mut index = Index::new();
        let doc_id = index.add_document(record("t", "c", "u"), &FailingSegmenter);
        assert_eq!(index.forward_record(doc_id).unwrap().title, "t");
        assert_eq!(index.term_count(), 0);
    }

    #[test]
    fn malformed_lines_never_consume_doc_ids() {
        let input = "\
only two\x03fields\n\
First\x03first body\x03http://x/1\n\
a\x03b\x03c\x03d\n\
Second\x03second body\x03http://x/2\n";
        let mut index = Index::new();
        index
            .build_from_reader(Cursor::new(input), &WhitespaceSegmenter)
            .unwrap();
        assert_eq!(index.doc_count(), 2);
        assert_eq!(index.forward_record(0).unwrap().title, "First");
        assert_eq!(index.forward_record(1).unwrap().title, "Second");
        assert_eq!(index.forward_record(1).unwrap().doc_id, 1);
    }

    #[test]
    fn worked_example_from_one_line() {
        let input = "Hello World\x03This is hello content\x03http://x/y\n";
        let mut index = Index::new();
        index
            .build_from_reader(Cursor::new(input), &WhitespaceSegmenter)
            .unwrap();
        let rec = index.forward_record(0).unwrap();
        assert_eq!(rec.title, "Hello World");
        assert_eq!(rec.url, "http://x/y");
        let postings = index.postings("hello").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].doc_id, 0);
        assert_eq!(postings[0].weight, 11);
    }

    #[test]
    fn lookup_misses_are_not_found() {
        let mut index = Index::new();
        index.add_document(record("a", "b", "u"), &WhitespaceSegmenter);
        assert!(index.forward_record(1).is_none());
        assert!(index.postings("unindexed").is_none());
    }

    #[test]
    fn unopenable_source_is_fatal() {
        let mut index = Index::new();
        let err = index
            .build_from_path("no/such/records.txt", &WhitespaceSegmenter)
            .unwrap_err();
        assert!(err.to_string().contains("no/such/records.txt"));
    }
}
