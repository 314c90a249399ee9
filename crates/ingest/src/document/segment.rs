//! Markdown segmentation into flat, heading-annotated sections.

use crumbs_core::Section;

/// Produces ordered flat sections, each annotated with the headings above it.
pub trait SegmentSource: Send + Sync {
    /// Sections in reading order. `header_path` lists ancestor headings only;
    /// the section's own heading stays as the first line of `raw_text`.
    fn segment(&self, text: &str) -> Vec<Section>;
}

/// Parse an ATX heading line (`#`, `##`, ... then whitespace, then text).
///
/// Returns the level and the trimmed heading text. The text may be empty
/// (`"## "` or a bare `"##"`). Leading indentation is not accepted.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if level == 0 {
        return None;
    }
    let rest = &line[level..];
    if rest.trim().is_empty() {
        return Some((level, ""));
    }
    let text = rest.strip_prefix(|c: char| c.is_whitespace())?;
    Some((level, text.trim()))
}

/// Splits on ATX headings outside fenced code blocks and tracks the heading
/// stack to derive each section's ancestry.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownSegmenter;

impl SegmentSource for MarkdownSegmenter {
    fn segment(&self, text: &str) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut stack: Vec<(usize, String)> = Vec::new();
        let mut current = String::new();
        let mut in_fence = false;

        for line in text.split('\n') {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
            } else if !in_fence {
                if let Some((level, heading)) = parse_heading(line) {
                    flush(&mut sections, &current, &stack);
                    while stack.last().is_some_and(|(l, _)| *l >= level) {
                        stack.pop();
                    }
                    stack.push((level, heading.to_string()));
                    current.clear();
                }
            }
            current.push_str(line);
            current.push('\n');
        }
        flush(&mut sections, &current, &stack);

        sections
    }
}

/// Emit the pending section unless it is blank. The last stack entry is the
/// section's own heading, so the path is everything before it. Empty
/// headings still bound sections but are left out of paths.
fn flush(sections: &mut Vec<Section>, current: &str, stack: &[(usize, String)]) {
    let text = current.trim();
    if text.is_empty() {
        return;
    }
    let ancestors = &stack[..stack.len().saturating_sub(1)];
    sections.push(Section::new(
        text,
        ancestors
            .iter()
            .filter(|(_, h)| !h.is_empty())
            .map(|(_, h)| h.clone())
            .collect(),
    ));
}
