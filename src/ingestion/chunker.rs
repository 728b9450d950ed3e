//! Text chunking with sentence-boundary snapping

use crate::config::ChunkingConfig;

/// How far back from a proposed window end to look for a sentence terminator
const BOUNDARY_SCAN: usize = 100;

/// Splits raw text into overlapping windows, preferring sentence-terminal
/// cut points near each window end.
///
/// Pure and deterministic; all positions are in characters, so multi-byte
/// input never lands mid-codepoint.
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between adjacent chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split text into chunks.
    ///
    /// Text at most `chunk_size` characters long comes back as a single
    /// chunk. Otherwise the chunker walks forward in `chunk_size` windows;
    /// each window end is pulled back to the nearest `.` `!` `?` within the
    /// final `BOUNDARY_SCAN` characters of the window, when one exists.
    /// The next window starts `overlap` characters before the previous end.
    /// Forward progress is guaranteed: if the overlap would not advance the
    /// start (overlap >= effective window), the next window starts at the
    /// previous end instead.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        if total <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < total {
            let mut end = (start + self.chunk_size).min(total);

            if end < total {
                end = self.snap_to_sentence(&chars, start, end);
            }

            chunks.push(chars[start..end].iter().collect());

            if end == total {
                break;
            }

            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        chunks
    }

    /// Scan backward from `end` for a sentence terminator, bounded by
    /// `chunk_size - BOUNDARY_SCAN` characters past `start`. Returns the
    /// position just after the terminator, or `end` unchanged.
    fn snap_to_sentence(&self, chars: &[char], start: usize, end: usize) -> usize {
        let floor = start + self.chunk_size.saturating_sub(BOUNDARY_SCAN);
        let floor = floor.max(start);

        let mut pos = end;
        while pos > floor {
            if matches!(chars[pos - 1], '.' | '!' | '?') {
                return pos;
            }
            pos -= 1;
        }

        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = TextChunker::new(100, 20);
        let text = "A short paragraph.";
        assert_eq!(chunker.split(text), vec![text.to_string()]);
    }

    #[test]
    fn text_at_exact_size_is_a_single_chunk() {
        let chunker = TextChunker::new(10, 2);
        let text = "abcdefghij";
        assert_eq!(chunker.split(text), vec![text.to_string()]);
    }

    #[test]
    fn cuts_at_sentence_boundary_when_nearby() {
        let chunker = TextChunker::new(50, 10);
        let text = "First sentence ends here. Second sentence is much longer and keeps going past the window.";
        let chunks = chunker.split(text);
        assert!(chunks[0].ends_with('.'), "first chunk: {:?}", chunks[0]);
        assert_eq!(chunks[0], "First sentence ends here.");
    }

    #[test]
    fn falls_back_to_raw_boundary_without_terminator() {
        let chunker = TextChunker::new(20, 5);
        let text = "x".repeat(65);
        let chunks = chunker.split(&text);
        assert_eq!(chunks[0].chars().count(), 20);
        // every window advances by chunk_size - overlap
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn adjacent_chunks_share_overlap() {
        let chunker = TextChunker::new(20, 5);
        let text: String = ('a'..='z').cycle().take(100).collect();
        let chunks = chunker.split(&text);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - 5..].iter().collect();
            let head: String = next[..5].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn terminates_when_overlap_exceeds_chunk_size() {
        let chunker = TextChunker::new(10, 50);
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        let chunks = chunker.split(text);
        // progress guard forces disjoint windows
        let rebuilt: String = chunks.concat();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn step_count_is_bounded() {
        let chunker = TextChunker::new(100, 20);
        let text = "y".repeat(10_000);
        let chunks = chunker.split(&text);
        // ceil(len / (chunk_size - overlap)) plus slack for the final window
        assert!(chunks.len() <= 10_000 / (100 - 20) + 2);
    }

    #[test]
    fn non_overlapping_spans_reconstruct_the_text() {
        let chunker = TextChunker::new(30, 8);
        let text = "One sentence here. Another one follows! A question too? Plain trailing text without end";
        let chunks = chunker.split(text);
        assert!(chunks.len() > 1);

        // Each chunk starts inside the text already rebuilt; strip the
        // longest prefix shared with the rebuilt tail and append the rest.
        let mut rebuilt: Vec<char> = Vec::new();
        for chunk in &chunks {
            let chars: Vec<char> = chunk.chars().collect();
            let max_shared = chars.len().min(rebuilt.len());
            let shared = (0..=max_shared)
                .rev()
                .find(|&n| rebuilt[rebuilt.len() - n..] == chars[..n])
                .unwrap_or(0);
            rebuilt.extend_from_slice(&chars[shared..]);
        }
        assert_eq!(rebuilt.iter().collect::<String>(), text);
    }

    #[test]
    fn multibyte_text_never_panics() {
        let chunker = TextChunker::new(12, 4);
        let text = "héllo wörld. ünïcode tèxt! ça va? plus de contenu ici pour déborder";
        let chunks = chunker.split(text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 12);
        }
    }
}
