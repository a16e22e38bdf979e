//! Deterministic, boundary-aware text chunking.
//!
//! The joined trace text is cut into chunks of at most `chunk_size` bytes
//! with zero overlap. Natural boundaries are preferred: paragraph breaks
//! first, then line breaks, then spaces, and only as a last resort a hard
//! character split. Identical input always produces identical chunks.

/// Separators tried in order, coarsest first.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Splits text into content-bounded chunks for the budget search.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Split `text` into chunks of at most `chunk_size` bytes. Empty input
    /// produces no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            Vec::new()
        } else {
            self.split_level(text, 0)
        }
    }

    fn split_level(&self, text: &str, level: usize) -> Vec<String> {
        if text.len() <= self.chunk_size {
            return vec![text.to_string()];
        }
        let Some(&separator) = SEPARATORS.get(level) else {
            return self.split_chars(text);
        };
        if !text.contains(separator) {
            return self.split_level(text, level + 1);
        }
        // Break on the separator, then re-merge greedily so chunks stay as
        // large as possible without crossing the limit. Oversized fragments
        // fall through to the next, finer separator.
        let mut fragments = Vec::new();
        for piece in text.split(separator) {
            if piece.len() > self.chunk_size {
                fragments.extend(self.split_level(piece, level + 1));
            } else {
                fragments.push(piece.to_string());
            }
        }
        self.merge(fragments, separator)
    }

    fn merge(&self, fragments: Vec<String>, separator: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        for fragment in fragments {
            if !current.is_empty()
                && current.len() + separator.len() + fragment.len() > self.chunk_size
            {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push_str(separator);
            }
            current.push_str(&fragment);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    fn split_chars(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        for ch in text.chars() {
            if !current.is_empty() && current.len() + ch.len_utf8() > self.chunk_size {
                chunks.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(TextSplitter::new(100).split("").is_empty());
    }

    #[test]
    fn test_short_input_is_one_chunk() {
        let chunks = TextSplitter::new(100).split("hello world");
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_splits_on_newlines_when_possible() {
        let splitter = TextSplitter::new(12);
        let chunks = splitter.split("first line\nsecond line\nthird line");
        assert!(chunks.iter().all(|c| c.len() <= 12));
        assert_eq!(chunks, vec!["first line", "second line", "third line"]);
    }

    #[test]
    fn test_merges_small_lines_into_one_chunk() {
        let splitter = TextSplitter::new(20);
        let chunks = splitter.split("aa\nbb\ncc\ndddddddddddddddddddd");
        assert_eq!(chunks[0], "aa\nbb\ncc");
        assert_eq!(chunks[1], "dddddddddddddddddddd");
    }

    #[test]
    fn test_hard_split_without_separators() {
        let splitter = TextSplitter::new(4);
        let chunks = splitter.split("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunks_respect_size_bound() {
        let splitter = TextSplitter::new(30);
        let text = "Listed /home\nCreated /home/x\nMoved /home/x to /tmp/x\nRemoved /tmp/x\n\nChecked results";
        for chunk in splitter.split(text) {
            assert!(chunk.len() <= 30, "chunk too large: {:?}", chunk);
        }
    }

    #[test]
    fn test_deterministic() {
        let splitter = TextSplitter::new(16);
        let text = "one two three four five six seven eight";
        assert_eq!(splitter.split(text), splitter.split(text));
    }

    #[test]
    fn test_no_overlap_and_order_preserved() {
        let splitter = TextSplitter::new(10);
        let text = "alpha beta gamma delta epsilon";
        let chunks = splitter.split(text);
        // Every word appears exactly once, in order.
        let rejoined = chunks.join(" ");
        for word in ["alpha", "beta", "gamma", "delta", "epsilon"] {
            assert_eq!(rejoined.matches(word).count(), 1);
        }
    }
}
