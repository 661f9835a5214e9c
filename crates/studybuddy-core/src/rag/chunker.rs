//! Word-window text chunking.
//!
//! Documents are split into overlapping windows of whole words so that a
//! sentence straddling a window boundary is still fully present in one of the
//! two adjacent chunks. Windows advance by `chunk_size - overlap` words; the
//! final window is emitted even when it is shorter than `chunk_size`, so the
//! tail of the document is never lost.

use crate::error::{Result, StudyBuddyError};

/// Configuration for the word-window chunker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Window size in words
    pub chunk_size: usize,

    /// Words shared between consecutive windows
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 100,
        }
    }
}

impl ChunkerConfig {
    /// Create a validated configuration.
    ///
    /// Fails when `chunk_size` is zero or `overlap >= chunk_size`, which
    /// would produce a non-advancing window stride.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(StudyBuddyError::invalid_config(
                "chunk_size must be greater than zero",
            ));
        }
        if overlap >= chunk_size {
            return Err(StudyBuddyError::invalid_config(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Words each window advances past the previous one
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Split `text` into overlapping word windows.
///
/// Words are whitespace-delimited; each chunk re-joins its words with single
/// spaces, so chunking also whitespace-normalizes the text. Empty or
/// whitespace-only input yields no chunks; input at or under `chunk_size`
/// words yields exactly one.
pub fn chunk_text(text: &str, config: &ChunkerConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    if words.len() <= config.chunk_size {
        return vec![words.join(" ")];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + config.chunk_size).min(words.len());
        let chunk = words[start..end].join(" ");
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        // The window covering the tail has been emitted; stop here rather
        // than producing a final sliver that only repeats overlap words.
        if start + config.chunk_size >= words.len() {
            break;
        }
        start += config.stride();
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let config = ChunkerConfig::default();
        assert!(chunk_text("", &config).is_empty());
        assert!(chunk_text("   ", &config).is_empty());
        assert!(chunk_text("\n\t  \n", &config).is_empty());
    }

    #[test]
    fn test_short_input_single_chunk() {
        let config = ChunkerConfig::default();
        let chunks = chunk_text("alpha beta gamma", &config);
        assert_eq!(chunks, vec!["alpha beta gamma".to_string()]);
    }

    #[test]
    fn test_short_input_is_whitespace_normalized() {
        let config = ChunkerConfig::default();
        let chunks = chunk_text("  alpha\n beta\t\tgamma ", &config);
        assert_eq!(chunks, vec!["alpha beta gamma".to_string()]);
    }

    #[test]
    fn test_exactly_chunk_size_is_single_chunk() {
        let config = ChunkerConfig::default();
        let chunks = chunk_text(&words(500), &config);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_chunk_count_formula() {
        // For N > chunk_size with defaults, count = ceil((N - 500) / 400) + 1
        let config = ChunkerConfig::default();
        for (n, expected) in [(501, 2), (600, 2), (900, 2), (901, 3), (1000, 3), (1300, 3)] {
            let chunks = chunk_text(&words(n), &config);
            assert_eq!(chunks.len(), expected, "word count {n}");
        }
    }

    #[test]
    fn test_windows_overlap_and_cover_every_word() {
        let config = ChunkerConfig::default();
        let text = words(1000);
        let chunks = chunk_text(&text, &config);
        assert_eq!(chunks.len(), 3);

        // Window boundaries: [0..500), [400..900), [800..1000)
        assert!(chunks[0].starts_with("word0 "));
        assert!(chunks[0].ends_with(" word499"));
        assert!(chunks[1].starts_with("word400 "));
        assert!(chunks[1].ends_with(" word899"));
        assert!(chunks[2].starts_with("word800 "));
        assert!(chunks[2].ends_with(" word999"));

        // Every source word appears in at least one chunk
        let mut seen = std::collections::HashSet::new();
        for chunk in &chunks {
            for w in chunk.split(' ') {
                seen.insert(w.to_string());
            }
        }
        for i in 0..1000 {
            assert!(seen.contains(&format!("word{i}")), "word{i} lost");
        }
    }

    #[test]
    fn test_tail_shorter_than_chunk_size_is_kept() {
        let config = ChunkerConfig::new(10, 2).unwrap();
        // Windows of 10, stride 8: [0..10), [8..13)
        let chunks = chunk_text(&words(13), &config);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].starts_with("word8 "));
        assert!(chunks[1].ends_with(" word12"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(ChunkerConfig::new(0, 0).is_err());
        assert!(ChunkerConfig::new(100, 100).is_err());
        assert!(ChunkerConfig::new(100, 150).is_err());
        assert!(ChunkerConfig::new(100, 99).is_ok());
    }

    #[test]
    fn test_zero_overlap() {
        let config = ChunkerConfig::new(5, 0).unwrap();
        let chunks = chunk_text(&words(12), &config);
        // [0..5), [5..10), [10..12)
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "word10 word11");
    }
}
