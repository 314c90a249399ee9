use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Page indices (0-based slices between page-break markers).
pub type PageSet = BTreeSet<usize>;

/// Separator used by the string form of a heading path.
pub const PATH_SEPARATOR: char = '/';

/// A flat section produced by a segmenter, in document reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Raw section text, including its own heading line if it has one.
    pub raw_text: String,
    /// Ancestor headings, root first. Does not include the section's own heading.
    pub header_path: Vec<String>,
}

impl Section {
    pub fn new(raw_text: impl Into<String>, header_path: Vec<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            header_path,
        }
    }

    /// Encode a heading path as `/a/b/` (`/` alone for the root level).
    /// Slashes and backslashes inside components are escaped with `\`.
    pub fn encode_path(components: &[String]) -> String {
        let mut encoded = String::from(PATH_SEPARATOR);
        for component in components {
            for c in component.chars() {
                if c == PATH_SEPARATOR || c == '\\' {
                    encoded.push('\\');
                }
                encoded.push(c);
            }
            encoded.push(PATH_SEPARATOR);
        }
        encoded
    }

    /// Inverse of [`Section::encode_path`]. A missing trailing separator is tolerated.
    pub fn decode_path(encoded: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut chars = encoded
            .strip_prefix(PATH_SEPARATOR)
            .unwrap_or(encoded)
            .chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                PATH_SEPARATOR => parts.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        if !current.is_empty() {
            parts.push(current);
        }
        parts
    }
}

/// A node in the heading hierarchy.
///
/// The root has no header. Intermediate nodes created only to hold children
/// carry empty content and a zero token length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeElement {
    pub header: Option<String>,
    /// Text under this heading and before its first subheading.
    pub content: String,
    pub token_length: usize,
    pub children: Vec<TreeElement>,
    pub pages: PageSet,
}

impl TreeElement {
    pub fn root() -> Self {
        Self {
            header: None,
            content: String::new(),
            token_length: 0,
            children: Vec::new(),
            pages: PageSet::new(),
        }
    }

    /// Empty placeholder for a heading that has no section of its own (yet).
    pub fn intermediate(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            ..Self::root()
        }
    }

    pub fn leaf(
        header: Option<String>,
        content: String,
        token_length: usize,
        pages: PageSet,
    ) -> Self {
        Self {
            header,
            content,
            token_length,
            children: Vec::new(),
            pages,
        }
    }

    /// First child whose header equals `header`, appending an intermediate
    /// node when none exists.
    pub fn child_or_insert(&mut self, header: &str) -> &mut TreeElement {
        let index = match self
            .children
            .iter()
            .position(|child| child.header.as_deref() == Some(header))
        {
            Some(index) => index,
            None => {
                self.children.push(TreeElement::intermediate(header));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeElement::node_count).sum::<usize>()
    }

    /// Depth of the deepest descendant (a lone node has depth 0).
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// A unit of chunked output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticChunk {
    pub content: String,
    pub token_length: usize,
    /// Heading context, most general first.
    pub headers: Vec<String>,
    pub pages: PageSet,
}

impl SemanticChunk {
    pub fn new(
        content: impl Into<String>,
        token_length: usize,
        headers: Vec<String>,
        pages: PageSet,
    ) -> Self {
        Self {
            content: content.into(),
            token_length,
            headers,
            pages,
        }
    }

    /// Length of the longest common prefix of both heading lists.
    pub fn common_prefix_len(&self, other: &SemanticChunk) -> usize {
        self.headers
            .iter()
            .zip(&other.headers)
            .take_while(|(a, b)| a == b)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn encode_root_path() {
        assert_eq!(Section::encode_path(&[]), "/");
        assert!(Section::decode_path("/").is_empty());
        assert!(Section::decode_path("").is_empty());
    }

    #[test]
    fn path_with_slashes_survives_encoding() {
        let original = path(&["Intro", "Input/Output", r"C:\temp"]);
        let encoded = Section::encode_path(&original);
        assert_eq!(encoded, r"/Intro/Input\/Output/C:\\temp/");
        assert_eq!(Section::decode_path(&encoded), original);
    }

    #[test]
    fn decode_tolerates_missing_trailing_separator() {
        assert_eq!(Section::decode_path("/a/b"), path(&["a", "b"]));
    }

    #[test]
    fn child_or_insert_reuses_existing_child() {
        let mut root = TreeElement::root();
        root.child_or_insert("A").content = "kept".to_string();
        root.child_or_insert("B");
        let again = root.child_or_insert("A");
        assert_eq!(again.content, "kept");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.node_count(), 3);
        assert_eq!(root.depth(), 1);
    }

    #[test]
    fn common_prefix_stops_at_first_difference() {
        let a = SemanticChunk::new("", 0, path(&["T", "A", "X"]), PageSet::new());
        let b = SemanticChunk::new("", 0, path(&["T", "B", "X"]), PageSet::new());
        assert_eq!(a.common_prefix_len(&b), 1);
        assert_eq!(a.common_prefix_len(&a), 3);
    }

    #[test]
    fn chunk_serializes_pages_as_sorted_list() {
        let chunk = SemanticChunk::new("body", 1, path(&["Guide"]), PageSet::from([2, 0]));
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["pages"], serde_json::json!([0, 2]));
        assert_eq!(value["headers"], serde_json::json!(["Guide"]));

        let back: SemanticChunk = serde_json::from_value(value).unwrap();
        assert_eq!(back, chunk);
    }
}
