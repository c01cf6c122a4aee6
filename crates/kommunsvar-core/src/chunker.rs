// Sliding-window chunker. Splits page text into overlapping windows that
// become the unit of embedding and retrieval. Windows are measured in
// characters so a slice never lands inside a multi-byte code point.

/// Window size and overlap, in characters.
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: 1200,
            overlap: 150,
        }
    }
}

impl ChunkConfig {
    /// Cursor advance per chunk. Clamped to at least 1 so an overlap >=
    /// size still terminates.
    pub fn step(&self) -> usize {
        self.size.saturating_sub(self.overlap).max(1)
    }
}

/// Lazy iterator over trimmed, non-empty chunks of `text`, in source
/// order. Restartable by calling `chunks` again.
pub fn chunks(text: &str, config: ChunkConfig) -> Chunks<'_> {
    // Byte offset of every char boundary, plus the end of the text.
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    Chunks {
        text,
        bounds,
        cursor: 0,
        size: config.size.max(1),
        step: config.step(),
    }
}

pub struct Chunks<'a> {
    text: &'a str,
    bounds: Vec<usize>,
    cursor: usize,
    size: usize,
    step: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let char_len = self.bounds.len() - 1;
        while self.cursor < char_len {
            let start = self.bounds[self.cursor];
            let end = self.bounds[(self.cursor + self.size).min(char_len)];
            self.cursor += self.step;

            let slice = self.text[start..end].trim();
            if !slice.is_empty() {
                return Some(slice);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(size: usize, overlap: usize) -> ChunkConfig {
        ChunkConfig { size, overlap }
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(chunks("", ChunkConfig::default()).count(), 0);
        assert_eq!(chunks("   \n\t  ", cfg(4, 1)).count(), 0);
    }

    #[test]
    fn test_chunk_count_matches_stride() {
        // 26 chars, size 10, overlap 2 -> step 8 -> ceil(26/8) = 4 chunks
        let text = "abcdefghijklmnopqrstuvwxyz";
        let out: Vec<&str> = chunks(text, cfg(10, 2)).collect();
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], "abcdefghij");
        assert_eq!(out[1], "ijklmnopqr");
        assert!(out.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_overlap_reconstructs_source() {
        let text = "abcdefghijklmnopqrst";
        let config = cfg(8, 3);
        let out: Vec<&str> = chunks(text, config).collect();

        // Dropping the leading `overlap` chars of every chunk after the
        // first rebuilds the original text.
        let mut rebuilt = String::from(out[0]);
        for chunk in &out[1..] {
            rebuilt.extend(chunk.chars().skip(config.overlap));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_overlap_ge_size_still_terminates() {
        let text = "abcdef";
        let out: Vec<&str> = chunks(text, cfg(3, 5)).collect();
        // step clamps to 1: one window per start position
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], "abc");
        assert_eq!(out[5], "f");
    }

    #[test]
    fn test_multibyte_boundaries() {
        // Swedish page text is full of å/ä/ö; slicing must stay on char
        // boundaries.
        let text = "bygglov för fågelhus på tomtgräns — åäö".repeat(40);
        for chunk in chunks(&text, ChunkConfig::default()) {
            assert!(chunk.chars().count() <= 1200);
        }
        let n = chunks(&text, ChunkConfig::default()).count();
        assert!(n >= 1);
    }

    #[test]
    fn test_restartable() {
        let text = "abcdefghij";
        let first: Vec<&str> = chunks(text, cfg(4, 1)).collect();
        let second: Vec<&str> = chunks(text, cfg(4, 1)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_whitespace_only_windows_are_skipped() {
        let text = "ab        cd";
        let out: Vec<&str> = chunks(text, cfg(4, 0)).collect();
        assert!(out.iter().all(|c| !c.trim().is_empty()));
        assert!(out.contains(&"ab"));
        assert!(out.contains(&"cd"));
    }
}
