//! Tests for the post-order chunking engine.

use std::sync::{Arc, Mutex};

use crumbs_core::{
    ChunkerConfig, ContentOrder, CrumbsError, PageSet, Result, SemanticChunk, TreeElement,
};

use super::helpers::{combine, merge_adjacent};
use super::strategies::PostOrderChunker;
use crate::document::format::format_chunk;
use crate::document::splitter::{FallbackSplitter, SentenceSplitter};
use crate::document::MarkdownChunker;
use crate::tokenizer::{Tokenizer, WhitespaceTokenizer};

fn config(max_tokens: usize) -> ChunkerConfig {
    ChunkerConfig {
        max_tokens,
        ..ChunkerConfig::default()
    }
}

fn pipeline(config: ChunkerConfig) -> MarkdownChunker {
    MarkdownChunker::new(config, Arc::new(WhitespaceTokenizer))
}

fn chunk(content: &str, headers: &[&str], pages: &[usize]) -> SemanticChunk {
    SemanticChunk::new(
        content,
        WhitespaceTokenizer.token_length(content).unwrap(),
        headers.iter().map(|h| h.to_string()).collect(),
        pages.iter().copied().collect(),
    )
}

fn headers(chunk: &SemanticChunk) -> Vec<&str> {
    chunk.headers.iter().map(String::as_str).collect()
}

const TWO_SECTIONS: &str = "# Title\n\n## A\n\nword1 word2\n\n## B\n\nword3 word4 word5";

// ── Scenarios ───────────────────────────────────────────────────────

#[test]
fn single_section_round_trip() {
    let chunks = pipeline(config(100))
        .semantic_chunks("# Title\n\nHello world.")
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(headers(&chunks[0]), vec!["Title"]);
    assert_eq!(chunks[0].token_length, 2);
    assert_eq!(format_chunk(&chunks[0]), "Title\n\nHello world.");
}

#[test]
fn sibling_subsections_merge_under_shared_parent() {
    let chunks = pipeline(config(10)).semantic_chunks(TWO_SECTIONS).unwrap();

    assert_eq!(chunks.len(), 1);
    let merged = &chunks[0];
    assert_eq!(headers(merged), vec!["Title"]);
    assert_eq!(
        merged.content,
        "## A\n\nword1 word2\n\n## B\n\nword3 word4 word5"
    );
    // 5 body words plus two `##` markers and two heading words.
    assert_eq!(merged.token_length, 9);
    assert_eq!(merged.pages, PageSet::from([0]));
}

#[test]
fn tight_budget_keeps_subsections_apart() {
    let chunks = pipeline(config(3)).semantic_chunks(TWO_SECTIONS).unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(headers(&chunks[0]), vec!["Title", "A"]);
    assert_eq!(chunks[0].content, "word1 word2");
    assert_eq!(headers(&chunks[1]), vec!["Title", "B"]);
    assert_eq!(chunks[1].content, "word3 word4 word5");
}

#[test]
fn blank_input_is_rejected() {
    let chunker = pipeline(config(100));
    assert!(matches!(
        chunker.semantic_chunks(""),
        Err(CrumbsError::InvalidInput(_))
    ));
    assert!(matches!(
        chunker.formatted_chunks("   \n\n  "),
        Err(CrumbsError::InvalidInput(_))
    ));
}

#[test]
fn document_without_headings_is_chunked_as_plain_text() {
    let formatted = pipeline(config(100))
        .formatted_chunks("Plain text with no headings at all.")
        .unwrap();
    assert_eq!(formatted, vec!["Plain text with no headings at all.".to_string()]);
}

// ── Content order ───────────────────────────────────────────────────
//
// A node's own text precedes its subsections in the document, but the
// traversal emits it after them unless `ContentOrder::ReadingOrder` is set.
// Both behaviours are pinned here.

const INTRO_THEN_SUBSECTION: &str = "# Title\n\nIntro words here.\n\n## A\n\nalpha";

#[test]
fn own_text_follows_subsections_by_default() {
    let chunks = pipeline(config(3))
        .semantic_chunks(INTRO_THEN_SUBSECTION)
        .unwrap();

    let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["alpha", "Intro words here."]);
}

#[test]
fn reading_order_puts_own_text_first() {
    let cfg = ChunkerConfig {
        content_order: ContentOrder::ReadingOrder,
        ..config(3)
    };
    let chunks = pipeline(cfg).semantic_chunks(INTRO_THEN_SUBSECTION).unwrap();

    let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["Intro words here.", "alpha"]);
}

#[test]
fn merged_content_order_differs_between_modes() {
    let default_order = pipeline(config(100))
        .semantic_chunks(INTRO_THEN_SUBSECTION)
        .unwrap();
    assert_eq!(default_order.len(), 1);
    assert_eq!(default_order[0].content, "## A\n\nalpha\n\nIntro words here.");

    let cfg = ChunkerConfig {
        content_order: ContentOrder::ReadingOrder,
        ..config(100)
    };
    let reading = pipeline(cfg).semantic_chunks(INTRO_THEN_SUBSECTION).unwrap();
    assert_eq!(reading[0].content, "Intro words here.\n\n## A\n\nalpha");
    assert_eq!(headers(&reading[0]), vec!["Title"]);
}

// ── combine ─────────────────────────────────────────────────────────

#[test]
fn combine_same_headers_joins_with_blank_line() {
    let a = chunk("first part", &["T", "A"], &[0]);
    let b = chunk("second part", &["T", "A"], &[1]);
    let merged = combine(&a, &b, &WhitespaceTokenizer).unwrap();

    assert_eq!(merged.content, "first part\n\nsecond part");
    assert_eq!(headers(&merged), vec!["T", "A"]);
    assert_eq!(merged.token_length, 4);
    assert_eq!(merged.pages, PageSet::from([0, 1]));
}

#[test]
fn combine_keeps_only_common_prefix_and_inlines_the_rest() {
    let a = chunk("deep text", &["T", "A", "A1"], &[2]);
    let b = chunk("b text", &["T", "B"], &[3, 4]);
    let merged = combine(&a, &b, &WhitespaceTokenizer).unwrap();

    assert_eq!(headers(&merged), vec!["T"]);
    assert_eq!(
        merged.content,
        "## A\n\n### A1\n\ndeep text\n\n## B\n\nb text"
    );
    assert_eq!(merged.pages, PageSet::from([2, 3, 4]));
    assert_eq!(
        merged.token_length,
        WhitespaceTokenizer.token_length(&merged.content).unwrap()
    );
}

#[test]
fn combine_with_prefix_headers_only_inlines_the_deeper_side() {
    let parent = chunk("parent text", &["T"], &[0]);
    let child = chunk("child text", &["T", "C"], &[0]);
    let merged = combine(&parent, &child, &WhitespaceTokenizer).unwrap();

    assert_eq!(headers(&merged), vec!["T"]);
    assert_eq!(merged.content, "parent text\n\n## C\n\nchild text");
}

#[test]
fn combine_with_disjoint_roots_has_no_headers() {
    let a = chunk("x", &["One"], &[]);
    let b = chunk("y", &["Two"], &[]);
    let merged = combine(&a, &b, &WhitespaceTokenizer).unwrap();

    assert!(merged.headers.is_empty());
    assert_eq!(merged.content, "# One\n\nx\n\n# Two\n\ny");
    assert_eq!(format_chunk(&merged), merged.content);
}

#[test]
fn combine_recounts_instead_of_summing() {
    let a = chunk("a b", &["X"], &[]);
    let b = chunk("c d", &["Y"], &[]);
    let merged = combine(&a, &b, &WhitespaceTokenizer).unwrap();
    assert!(merged.token_length > a.token_length + b.token_length);
}

// ── merge_adjacent ──────────────────────────────────────────────────

#[test]
fn merge_flushes_when_budget_exceeded() {
    let chunks = vec![
        chunk("a a a", &["T"], &[0]),
        chunk("b b b", &["T"], &[0]),
        chunk("c c c", &["T"], &[1]),
    ];
    let merged = merge_adjacent(chunks, 6, &WhitespaceTokenizer).unwrap();

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].content, "a a a\n\nb b b");
    assert_eq!(merged[1].content, "c c c");
    assert_eq!(merged[1].pages, PageSet::from([1]));
}

#[test]
fn merge_of_empty_list_is_empty() {
    assert!(merge_adjacent(Vec::new(), 10, &WhitespaceTokenizer)
        .unwrap()
        .is_empty());
}

#[test]
fn merge_never_drops_an_oversized_chunk() {
    let big = chunk(&"w ".repeat(20), &["T"], &[0]);
    let merged = merge_adjacent(
        vec![chunk("x", &["T"], &[0]), big.clone()],
        5,
        &WhitespaceTokenizer,
    )
    .unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[1], big);
}

// ── Properties ──────────────────────────────────────────────────────

/// A document with uneven sections across several heading levels and pages.
fn sample_document() -> String {
    let mut doc = String::from("# Manual\n\nOverview of the manual in a few words.\n\n");
    for chapter in 0..4 {
        doc.push_str(&format!("## Chapter {chapter}\n\n"));
        doc.push_str(&"chapter intro ".repeat(chapter + 1));
        doc.push_str("\n\n");
        for section in 0..3 {
            doc.push_str(&format!("### Section {chapter}.{section}\n\n"));
            doc.push_str(&"body ".repeat(3 + chapter * 2 + section));
            doc.push_str("\n\n");
        }
        if chapter % 2 == 1 {
            doc.push_str("---\n");
        }
    }
    doc
}

#[test]
fn merged_output_respects_budget_and_is_locally_maximal() {
    let max_tokens = 30;
    let chunks = pipeline(config(max_tokens))
        .semantic_chunks(&sample_document())
        .unwrap();

    assert!(chunks.len() > 1);
    for c in &chunks {
        assert!(c.token_length <= max_tokens, "chunk over budget: {c:?}");
        assert_eq!(c.token_length, WhitespaceTokenizer.token_length(&c.content).unwrap());
    }
    for pair in chunks.windows(2) {
        let combined = combine(&pair[0], &pair[1], &WhitespaceTokenizer).unwrap();
        assert!(
            combined.token_length > max_tokens,
            "adjacent chunks could still merge: {:?} + {:?}",
            pair[0].content,
            pair[1].content
        );
    }
}

#[test]
fn merged_headers_are_longest_common_prefix() {
    let a = chunk("x", &["M", "C1", "S1"], &[0]);
    let b = chunk("y", &["M", "C1", "S2"], &[1]);
    let c = chunk("z", &["M", "C2"], &[2]);

    let ab = combine(&a, &b, &WhitespaceTokenizer).unwrap();
    assert_eq!(headers(&ab), vec!["M", "C1"]);
    assert!(a.headers.starts_with(&ab.headers));
    assert!(b.headers.starts_with(&ab.headers));

    let abc = combine(&ab, &c, &WhitespaceTokenizer).unwrap();
    assert_eq!(headers(&abc), vec!["M"]);
    assert_eq!(abc.pages, PageSet::from([0, 1, 2]));
}

#[test]
fn pages_survive_merging() {
    let doc = "# Report\n\n## Part 1\n\nearly text\n---\n## Part 2\n\nlater text";
    let chunks = pipeline(config(100)).semantic_chunks(doc).unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].pages, PageSet::from([0, 1]));
    assert!(!chunks[0].content.contains("---"));
}

// ── Fallback splitting ──────────────────────────────────────────────

#[test]
fn oversized_leaf_falls_back_to_sentence_groups() {
    let body = (0..60)
        .map(|i| format!("Sentence {i} has exactly six words."))
        .collect::<Vec<_>>()
        .join(" ");
    let doc = format!("# Big\n\n{body}");
    let cfg = ChunkerConfig {
        max_tokens: 50,
        chunk_size: 40,
        overlap: 10,
        ..ChunkerConfig::default()
    };
    let chunks = pipeline(cfg.clone()).semantic_chunks(&doc).unwrap();

    assert!(chunks.len() > 1);
    for c in &chunks {
        assert_eq!(headers(c), vec!["Big"]);
        assert!(c.token_length <= cfg.max_tokens);
        assert_eq!(c.pages, PageSet::from([0]));
    }
}

#[test]
fn fallback_groups_stay_within_overlap_of_target() {
    let body = "lorem ipsum dolor sit amet ".repeat(80);
    let mut leaf = TreeElement::leaf(
        Some("Wall".to_string()),
        body.trim().to_string(),
        0,
        PageSet::from([3]),
    );
    leaf.token_length = WhitespaceTokenizer.token_length(&leaf.content).unwrap();

    let cfg = ChunkerConfig {
        max_tokens: 60,
        chunk_size: 50,
        overlap: 10,
        ..ChunkerConfig::default()
    };
    let splitter = SentenceSplitter::new(Arc::new(WhitespaceTokenizer));
    let chunker = PostOrderChunker::new(&WhitespaceTokenizer, &splitter, &cfg);
    let groups = splitter
        .split(&leaf.content, cfg.chunk_size, cfg.overlap)
        .unwrap();

    for group in &groups {
        assert!(WhitespaceTokenizer.token_length(group).unwrap() <= cfg.chunk_size + cfg.overlap);
    }

    let path = vec!["Wall".to_string()];
    let chunks = chunker.process(&leaf, &path).unwrap();
    assert!(!chunks.is_empty());
    assert!(chunks.iter().all(|c| c.pages == PageSet::from([3])));
}

/// Records the arguments it was called with and returns canned groups.
struct RecordingSplitter {
    calls: Mutex<Vec<(String, usize, usize)>>,
    groups: Vec<String>,
}

impl FallbackSplitter for RecordingSplitter {
    fn split(&self, text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), chunk_size, overlap));
        Ok(self.groups.clone())
    }
}

#[test]
fn splitter_receives_configured_size_and_overlap() {
    let splitter = Arc::new(RecordingSplitter {
        calls: Mutex::new(Vec::new()),
        groups: vec![
            "one two three four five six seven eight".to_string(),
            "nine ten eleven twelve thirteen fourteen fifteen sixteen".to_string(),
        ],
    });
    let cfg = ChunkerConfig {
        max_tokens: 10,
        chunk_size: 8,
        overlap: 2,
        ..ChunkerConfig::default()
    };
    let body = "word ".repeat(30);
    let chunks = pipeline(cfg)
        .with_splitter(splitter.clone())
        .semantic_chunks(&format!("# H\n\n{body}"))
        .unwrap();

    let calls = splitter.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!((calls[0].1, calls[0].2), (8, 2));
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].token_length, 8);
    assert_eq!(headers(&chunks[1]), vec!["H"]);
}

#[test]
fn tiny_oversized_fragment_is_dropped() {
    // 7 words: over a 5-token budget but under the 10-token split threshold.
    let chunks = pipeline(config(5))
        .semantic_chunks("# Short\n\none two three four five six seven\n\n## Kept\n\nfine")
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, "fine");
    assert_eq!(headers(&chunks[0]), vec!["Short", "Kept"]);
}

#[test]
fn intermediate_nodes_emit_nothing_themselves() {
    let root = TreeElement {
        children: vec![TreeElement {
            children: vec![TreeElement::leaf(
                Some("Leaf".to_string()),
                "leaf words".to_string(),
                2,
                PageSet::from([0]),
            )],
            ..TreeElement::intermediate("Holder")
        }],
        ..TreeElement::root()
    };
    let cfg = config(100);
    let splitter = SentenceSplitter::new(Arc::new(WhitespaceTokenizer));
    let chunks = PostOrderChunker::new(&WhitespaceTokenizer, &splitter, &cfg)
        .process(&root, &[])
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(headers(&chunks[0]), vec!["Holder", "Leaf"]);
}

// ── Failure propagation ─────────────────────────────────────────────

/// Counts words but refuses any text containing `marker`.
struct PickyTokenizer {
    marker: &'static str,
}

impl Tokenizer for PickyTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        if text.contains(self.marker) {
            return Err(CrumbsError::Tokenizer(format!("cannot encode {:?}", self.marker)));
        }
        WhitespaceTokenizer.tokenize(text)
    }

    fn name(&self) -> &str {
        "picky"
    }
}

#[test]
fn unencodable_section_fails_instead_of_counting_zero() {
    let tokenizer = PickyTokenizer { marker: "\u{fffd}" };
    let chunker = MarkdownChunker::new(config(3), Arc::new(tokenizer));
    let doc = "# Ok\n\nfine words\n\n# Broken\n\nfar too many words \u{fffd} for the budget";

    assert!(matches!(
        chunker.semantic_chunks(doc),
        Err(CrumbsError::Tokenizer(_))
    ));
}

#[test]
fn merge_candidate_that_cannot_be_measured_is_an_error() {
    let tokenizer = PickyTokenizer { marker: "\n\n" };
    let a = chunk("alpha", &["T"], &[0]);
    let b = chunk("beta", &["T"], &[0]);

    assert!(matches!(
        merge_adjacent(vec![a, b], 10, &tokenizer),
        Err(CrumbsError::Tokenizer(_))
    ));
}
