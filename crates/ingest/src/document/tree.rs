//! Heading hierarchy construction from flat sections.

use crumbs_core::{CrumbsError, PageSet, Result, Section, TreeElement};
use tracing::debug;

use super::segment::{parse_heading, SegmentSource};
use crate::tokenizer::Tokenizer;

/// Builds a [`TreeElement`] hierarchy from a document.
pub struct TreeBuilder<'a> {
    segmenter: &'a dyn SegmentSource,
    tokenizer: &'a dyn Tokenizer,
    page_break: &'a str,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        segmenter: &'a dyn SegmentSource,
        tokenizer: &'a dyn Tokenizer,
        page_break: &'a str,
    ) -> Self {
        Self {
            segmenter,
            tokenizer,
            page_break,
        }
    }

    /// Parse `text` into a tree rooted at a header-less node.
    ///
    /// Fails with [`CrumbsError::InvalidInput`] for blank documents and for
    /// documents the segmenter finds no sections in.
    pub fn build(&self, text: &str) -> Result<TreeElement> {
        if text.trim().is_empty() {
            return Err(CrumbsError::InvalidInput(
                "empty markdown text provided".to_string(),
            ));
        }

        let pages: Vec<&str> = text.split(self.page_break).collect();
        let sections = self.segmenter.segment(text);
        if sections.is_empty() {
            return Err(CrumbsError::InvalidInput(
                "no content found in markdown text".to_string(),
            ));
        }

        let mut root = TreeElement::root();
        for section in &sections {
            let leaf = self.leaf_from_section(section, &pages)?;

            // Empty headings carry no breadcrumb, so they never become nodes.
            let mut node = &mut root;
            for part in section.header_path.iter().filter(|p| !p.is_empty()) {
                node = node.child_or_insert(part);
            }
            node.children.push(leaf);
        }

        debug!(
            sections = sections.len(),
            pages = pages.len(),
            nodes = root.node_count(),
            depth = root.depth(),
            "built heading tree"
        );
        Ok(root)
    }

    fn leaf_from_section(&self, section: &Section, pages: &[&str]) -> Result<TreeElement> {
        let marker = self.page_break.trim();
        let lines: Vec<&str> = section
            .raw_text
            .split('\n')
            .filter(|line| line.trim() != marker)
            .collect();

        let heading = lines.first().and_then(|line| parse_heading(line.trim_end()));
        let (header, content) = match heading {
            Some((_, title)) => (
                Some(title.to_string()).filter(|t| !t.is_empty()),
                lines[1..].join("\n").trim().to_string(),
            ),
            None => (None, lines.join("\n").trim().to_string()),
        };

        let token_length = self.tokenizer.token_length(&content)?;
        let pages = self.page_span(section, lines.first().copied(), pages);
        Ok(TreeElement::leaf(header, content, token_length, pages))
    }

    /// Pages from the first one containing the section's opening line,
    /// extended by the page breaks inside the section itself.
    fn page_span(&self, section: &Section, first_line: Option<&str>, pages: &[&str]) -> PageSet {
        let first_line = first_line
            .or_else(|| section.raw_text.lines().next())
            .unwrap_or_default();
        let breaks = section.raw_text.matches(self.page_break).count();

        match pages.iter().position(|page| page.contains(first_line)) {
            Some(start) => (start..=start + breaks).collect(),
            None => {
                debug!(line = first_line, "section start not found in any page");
                PageSet::new()
            }
        }
    }
}
