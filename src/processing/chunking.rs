//! Paragraph-level chunking.
//!
//! Chunk boundaries are blank lines. This is a deliberately simple heuristic: the chunk
//! is the unit of retrieval granularity, and paragraph splits keep each unit coherent
//! without any model-dependent tokenization.

/// Split raw text into ordered, non-empty paragraphs.
///
/// CRLF line endings are normalized first; each paragraph is trimmed of surrounding
/// whitespace and empty pieces are dropped. All-whitespace input yields an empty vector.
pub fn chunk_paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird.";
        assert_eq!(
            chunk_paragraphs(text),
            vec!["First paragraph.", "Second paragraph.", "Third."]
        );
    }

    #[test]
    fn trims_and_drops_empty_pieces() {
        let text = "  lead  \n\n\n\n   \n\n trail \n";
        assert_eq!(chunk_paragraphs(text), vec!["lead", "trail"]);
    }

    #[test]
    fn normalizes_crlf_boundaries() {
        let text = "alpha\r\n\r\nbeta";
        assert_eq!(chunk_paragraphs(text), vec!["alpha", "beta"]);
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        assert!(chunk_paragraphs("   \n\n \t \n\n  ").is_empty());
        assert!(chunk_paragraphs("").is_empty());
    }

    #[test]
    fn single_paragraph_stays_whole() {
        let text = "One paragraph with\na soft line break.";
        assert_eq!(chunk_paragraphs(text), vec![text]);
    }
}
